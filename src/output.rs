//! Persistence for the merged extract and analysis reports.
//!
//! Supports writing the flat merge cache as CSV and the combined report as
//! pretty-printed JSON.

use anyhow::{Context, Result};
use tracing::info;

use crate::analyzers::types::SalesReport;
use crate::records::RawRecord;
use csv::WriterBuilder;
use std::fs::{self, File};
use std::path::Path;

/// Writes the merged raw rows to `path` as a single CSV with one header.
///
/// The header uses the extract column names, so the cache reads back with
/// the same deserializer as the extracts themselves.
pub fn write_merged(path: &Path, rows: &[RawRecord]) -> Result<()> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            fs::create_dir_all(parent)
                .with_context(|| format!("creating {}", parent.display()))?;
        }
    }

    let file = File::create(path).with_context(|| format!("creating {}", path.display()))?;
    let mut writer = WriterBuilder::new().from_writer(file);

    for row in rows {
        writer.serialize(row)?;
    }
    writer.flush()?;

    Ok(())
}

/// Writes a [`SalesReport`] to `path` as pretty-printed JSON.
pub fn write_report(path: &Path, report: &SalesReport) -> Result<()> {
    let file = File::create(path).with_context(|| format!("creating {}", path.display()))?;
    serde_json::to_writer_pretty(file, report)?;
    Ok(())
}

/// Logs a report as pretty-printed JSON, for the headless path.
pub fn print_report(report: &SalesReport) -> Result<()> {
    info!("{}", serde_json::to_string_pretty(report)?);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::env;

    fn temp_path(name: &str) -> std::path::PathBuf {
        env::temp_dir().join(name)
    }

    fn sample_row() -> RawRecord {
        RawRecord {
            order_id: "176558".to_string(),
            product: "USB-C Charging Cable".to_string(),
            quantity: "2".to_string(),
            unit_price: "11.95".to_string(),
            order_date: "04/19/19 08:46".to_string(),
            address: "917 1st St, Dallas, TX 75001".to_string(),
        }
    }

    #[test]
    fn test_write_merged_single_header() {
        let path = temp_path("sales_insights_test_merged.csv");
        let _ = fs::remove_file(&path);

        write_merged(&path, &[sample_row(), sample_row()]).unwrap();

        let content = fs::read_to_string(&path).unwrap();
        let header_count = content.lines().filter(|l| l.contains("Order ID")).count();
        assert_eq!(header_count, 1);
        assert_eq!(content.lines().count(), 3);

        fs::remove_file(&path).unwrap();
    }

    #[test]
    fn test_write_merged_reads_back() {
        let path = temp_path("sales_insights_test_roundtrip.csv");
        let _ = fs::remove_file(&path);

        write_merged(&path, &[sample_row()]).unwrap();
        let rows = crate::ingest::read_cache(&path).unwrap();

        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].product, "USB-C Charging Cable");

        fs::remove_file(&path).unwrap();
    }

    #[test]
    fn test_write_merged_creates_parent_dir() {
        let dir = temp_path("sales_insights_test_nested");
        let _ = fs::remove_dir_all(&dir);
        let path = dir.join("cache").join("merged.csv");

        write_merged(&path, &[sample_row()]).unwrap();
        assert!(path.exists());

        fs::remove_dir_all(&dir).unwrap();
    }
}
