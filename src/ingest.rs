//! Discovery and merging of the monthly sales extracts.
//!
//! The twelve extracts are merged once into a flat cache CSV; later runs
//! read the cache directly instead of re-scanning the data directory.

use anyhow::{Context, Result, bail};
use std::fs::{self, File};
use std::path::{Path, PathBuf};
use tracing::{debug, info};

use crate::records::RawRecord;

/// Lists the CSV extracts in `data_dir`, sorted by file name.
pub fn discover_extracts(data_dir: &Path) -> Result<Vec<PathBuf>> {
    let entries = fs::read_dir(data_dir)
        .with_context(|| format!("reading data directory {}", data_dir.display()))?;

    let mut paths = Vec::new();
    for entry in entries {
        let path = entry?.path();
        if path.extension().and_then(|e| e.to_str()) == Some("csv") {
            paths.push(path);
        }
    }
    paths.sort();

    Ok(paths)
}

/// Reads every extract in `data_dir` into raw rows, in file-name order.
///
/// Rows the CSV reader cannot decode at all (wrong field count, broken
/// quoting) are skipped; they get filtered like any other malformed row.
pub fn read_extracts(data_dir: &Path) -> Result<Vec<RawRecord>> {
    let paths = discover_extracts(data_dir)?;
    if paths.is_empty() {
        bail!("no CSV extracts found in {}", data_dir.display());
    }

    let mut rows = Vec::new();
    for path in &paths {
        let before = rows.len();
        read_rows(path, &mut rows)?;
        debug!(file = %path.display(), rows = rows.len() - before, "Extract read");
    }

    info!(extracts = paths.len(), rows = rows.len(), "Extracts merged");
    Ok(rows)
}

/// Loads raw rows from the merge cache, producing it from the extracts
/// first if it is not on disk yet.
pub fn load_or_merge(data_dir: &Path, cache_path: &Path) -> Result<Vec<RawRecord>> {
    if cache_path.exists() {
        info!(cache = %cache_path.display(), "Merged file already on disk");
        return read_cache(cache_path);
    }

    let rows = read_extracts(data_dir)?;
    crate::output::write_merged(cache_path, &rows)?;
    info!(cache = %cache_path.display(), rows = rows.len(), "Merged file written");

    Ok(rows)
}

/// Reads raw rows back from a previously written merge cache.
pub fn read_cache(path: &Path) -> Result<Vec<RawRecord>> {
    let mut rows = Vec::new();
    read_rows(path, &mut rows)?;
    info!(cache = %path.display(), rows = rows.len(), "Merged file read");
    Ok(rows)
}

fn read_rows(path: &Path, rows: &mut Vec<RawRecord>) -> Result<()> {
    let file = File::open(path).with_context(|| format!("opening {}", path.display()))?;
    let mut rdr = csv::ReaderBuilder::new().flexible(true).from_reader(file);

    let mut skipped = 0usize;
    for result in rdr.deserialize::<RawRecord>() {
        match result {
            Ok(record) => rows.push(record),
            Err(e) => {
                debug!(error = %e, "Skipping undecodable row");
                skipped += 1;
            }
        }
    }
    if skipped > 0 {
        debug!(file = %path.display(), skipped, "Undecodable rows skipped");
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::env;
    use std::io::Write;

    fn temp_dir(name: &str) -> PathBuf {
        let dir = env::temp_dir().join(name);
        let _ = fs::remove_dir_all(&dir);
        fs::create_dir_all(&dir).unwrap();
        dir
    }

    fn write_extract(dir: &Path, name: &str, body: &str) {
        let mut file = File::create(dir.join(name)).unwrap();
        writeln!(
            file,
            "Order ID,Product,Quantity Ordered,Price Each,Order Date,Purchase Address"
        )
        .unwrap();
        write!(file, "{}", body).unwrap();
    }

    #[test]
    fn test_discover_ignores_non_csv() {
        let dir = temp_dir("sales_insights_discover");
        write_extract(&dir, "sales_january.csv", "");
        write_extract(&dir, "sales_february.csv", "");
        fs::write(dir.join("notes.txt"), "not an extract").unwrap();

        let paths = discover_extracts(&dir).unwrap();
        assert_eq!(paths.len(), 2);
        // sorted by file name
        assert!(paths[0].ends_with("sales_february.csv"));

        fs::remove_dir_all(&dir).unwrap();
    }

    #[test]
    fn test_read_extracts_concatenates_all_files() {
        let dir = temp_dir("sales_insights_concat");
        write_extract(
            &dir,
            "a.csv",
            "1001,Wired Headphones,1,11.99,01/05/19 10:00,\"1 Main St, Austin, TX 73301\"\n",
        );
        write_extract(
            &dir,
            "b.csv",
            "1002,Google Phone,1,600.0,02/06/19 11:00,\"2 Elm St, Austin, TX 73301\"\n\
             1003,Wired Headphones,2,11.99,02/07/19 12:00,\"3 Oak St, Austin, TX 73301\"\n",
        );

        let rows = read_extracts(&dir).unwrap();
        assert_eq!(rows.len(), 3);
        assert_eq!(rows[0].order_id, "1001");

        fs::remove_dir_all(&dir).unwrap();
    }

    #[test]
    fn test_read_extracts_fails_on_empty_dir() {
        let dir = temp_dir("sales_insights_empty");
        assert!(read_extracts(&dir).is_err());
        fs::remove_dir_all(&dir).unwrap();
    }

    #[test]
    fn test_load_or_merge_uses_cache_on_second_call() {
        let dir = temp_dir("sales_insights_cache");
        write_extract(
            &dir,
            "a.csv",
            "1001,Wired Headphones,1,11.99,01/05/19 10:00,\"1 Main St, Austin, TX 73301\"\n",
        );
        let cache = dir.join("cache").join("merged.csv");

        let first = load_or_merge(&dir, &cache).unwrap();
        assert!(cache.exists());

        // New extract appears after the merge; the cache still wins.
        write_extract(
            &dir,
            "b.csv",
            "1002,Google Phone,1,600.0,02/06/19 11:00,\"2 Elm St, Austin, TX 73301\"\n",
        );
        let second = load_or_merge(&dir, &cache).unwrap();
        assert_eq!(first.len(), second.len());

        fs::remove_dir_all(&dir).unwrap();
    }
}
