//! Sales record types and row-level cleaning.
//!
//! Rows come off the CSV reader string-typed, exactly as they appear in the
//! monthly extracts. Cleaning filters header repeats and incomplete rows,
//! then parses the survivors into [`SaleRecord`]s with the derived month,
//! hour, sale amount, and city fields.

use anyhow::{Context, Result, anyhow};
use chrono::{Datelike, NaiveDateTime, Timelike};
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

/// Timestamp layout used by the extracts, e.g. `04/19/19 08:46`.
pub const ORDER_DATE_FORMAT: &str = "%m/%d/%y %H:%M";

/// A row as it appears in a monthly extract, before any validation.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct RawRecord {
    #[serde(rename = "Order ID")]
    pub order_id: String,
    #[serde(rename = "Product")]
    pub product: String,
    #[serde(rename = "Quantity Ordered")]
    pub quantity: String,
    #[serde(rename = "Price Each")]
    pub unit_price: String,
    #[serde(rename = "Order Date")]
    pub order_date: String,
    #[serde(rename = "Purchase Address")]
    pub address: String,
}

impl RawRecord {
    /// The extracts repeat their header line mid-file; those rows carry the
    /// column names as values.
    pub fn is_header_repeat(&self) -> bool {
        self.order_id.trim() == "Order ID"
    }

    /// True when any field is empty or whitespace.
    pub fn has_missing_field(&self) -> bool {
        [
            &self.order_id,
            &self.product,
            &self.quantity,
            &self.unit_price,
            &self.order_date,
            &self.address,
        ]
        .iter()
        .any(|f| f.trim().is_empty())
    }
}

/// A cleaned sales record with parsed base fields and derived attributes.
#[derive(Debug, Clone, Serialize)]
pub struct SaleRecord {
    pub order_id: u32,
    pub product: String,
    pub quantity: u32,
    pub unit_price: f64,
    pub ordered_at: NaiveDateTime,
    pub address: String,

    // derived
    pub month: u32,
    pub hour: u32,
    pub amount: f64,
    pub city: String,
}

impl SaleRecord {
    /// Parses a raw row into a typed record.
    ///
    /// # Errors
    ///
    /// Returns an error if any numeric field, the timestamp, or the address
    /// does not match the extract conventions.
    pub fn from_raw(raw: &RawRecord) -> Result<Self> {
        let order_id: u32 = raw
            .order_id
            .trim()
            .parse()
            .with_context(|| format!("bad order id {:?}", raw.order_id))?;
        let quantity: u32 = raw
            .quantity
            .trim()
            .parse()
            .with_context(|| format!("bad quantity {:?}", raw.quantity))?;
        let unit_price: f64 = raw
            .unit_price
            .trim()
            .parse()
            .with_context(|| format!("bad unit price {:?}", raw.unit_price))?;
        let ordered_at = NaiveDateTime::parse_from_str(raw.order_date.trim(), ORDER_DATE_FORMAT)
            .with_context(|| format!("bad order date {:?}", raw.order_date))?;
        let city = parse_city(&raw.address)?;

        Ok(SaleRecord {
            order_id,
            product: raw.product.trim().to_string(),
            quantity,
            unit_price,
            ordered_at,
            address: raw.address.trim().to_string(),
            month: ordered_at.month(),
            hour: ordered_at.hour(),
            amount: f64::from(quantity) * unit_price,
            city,
        })
    }
}

/// Extracts `"City (ST)"` from a `street, city, ST zip` address.
///
/// The state is the two-letter code opening the third comma segment. City
/// alone is ambiguous (Portland OR vs Portland ME), so the state stays in
/// the label.
fn parse_city(address: &str) -> Result<String> {
    let mut segments = address.split(',');
    let _street = segments.next();
    let city = segments
        .next()
        .map(str::trim)
        .filter(|c| !c.is_empty())
        .ok_or_else(|| anyhow!("address missing city segment: {:?}", address))?;
    let state = segments
        .next()
        .map(str::trim)
        .and_then(|s| s.get(..2))
        .ok_or_else(|| anyhow!("address missing state segment: {:?}", address))?;

    Ok(format!("{} ({})", city, state))
}

/// Filters and parses raw rows into clean records.
///
/// Header repeats, rows with missing fields, and rows that fail parsing are
/// dropped silently; only totals are logged.
pub fn clean_records(raw_rows: Vec<RawRecord>) -> Vec<SaleRecord> {
    let mut records = Vec::with_capacity(raw_rows.len());
    let mut header_repeats = 0usize;
    let mut incomplete = 0usize;
    let mut unparseable = 0usize;

    for raw in &raw_rows {
        if raw.is_header_repeat() {
            header_repeats += 1;
            continue;
        }
        if raw.has_missing_field() {
            incomplete += 1;
            continue;
        }
        match SaleRecord::from_raw(raw) {
            Ok(record) => records.push(record),
            Err(e) => {
                debug!(error = %e, "Dropping unparseable row");
                unparseable += 1;
            }
        }
    }

    info!(
        kept = records.len(),
        header_repeats, incomplete, unparseable, "Rows cleaned"
    );

    records
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_raw() -> RawRecord {
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
    fn test_header_repeat_detected() {
        let mut raw = sample_raw();
        raw.order_id = "Order ID".to_string();
        assert!(raw.is_header_repeat());
        assert!(!sample_raw().is_header_repeat());
    }

    #[test]
    fn test_missing_field_detected() {
        let mut raw = sample_raw();
        raw.unit_price = "".to_string();
        assert!(raw.has_missing_field());

        let mut raw = sample_raw();
        raw.address = "   ".to_string();
        assert!(raw.has_missing_field());

        assert!(!sample_raw().has_missing_field());
    }

    #[test]
    fn test_from_raw_derivations() {
        let record = SaleRecord::from_raw(&sample_raw()).unwrap();

        assert_eq!(record.order_id, 176558);
        assert_eq!(record.quantity, 2);
        assert_eq!(record.month, 4);
        assert_eq!(record.hour, 8);
        assert!((record.amount - 23.90).abs() < 1e-9);
        assert_eq!(record.city, "Dallas (TX)");
    }

    #[test]
    fn test_from_raw_rejects_bad_fields() {
        let mut raw = sample_raw();
        raw.quantity = "two".to_string();
        assert!(SaleRecord::from_raw(&raw).is_err());

        let mut raw = sample_raw();
        raw.order_date = "2019-04-19 08:46".to_string();
        assert!(SaleRecord::from_raw(&raw).is_err());

        let mut raw = sample_raw();
        raw.address = "no commas here".to_string();
        assert!(SaleRecord::from_raw(&raw).is_err());
    }

    #[test]
    fn test_parse_city_convention() {
        assert_eq!(
            parse_city("682 Chestnut St, Boston, MA 02215").unwrap(),
            "Boston (MA)"
        );
        assert_eq!(
            parse_city("136 Church St, New York City, NY 10001").unwrap(),
            "New York City (NY)"
        );
    }

    #[test]
    fn test_clean_records_filters_bad_rows() {
        let mut header = sample_raw();
        header.order_id = "Order ID".to_string();
        header.product = "Product".to_string();

        let empty = RawRecord::default();

        let mut garbled = sample_raw();
        garbled.order_date = "not a date".to_string();

        let rows = vec![sample_raw(), header, empty, garbled, sample_raw()];
        let records = clean_records(rows);

        assert_eq!(records.len(), 2);
        for record in &records {
            assert!((record.amount - f64::from(record.quantity) * record.unit_price).abs() < 1e-9);
        }
    }
}
