//! Result types produced by the analyses.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Revenue total for one calendar month.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MonthRevenue {
    pub month: u32,
    /// Three-letter label, `Jan` through `Dec`.
    pub label: String,
    pub revenue: f64,
}

/// Revenue total for one city, labeled `"City (ST)"`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CityRevenue {
    pub city: String,
    pub revenue: f64,
}

/// Line items ordered during one hour of the day.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HourOrders {
    pub hour: u32,
    pub orders: usize,
}

/// Co-occurrence count for an unordered product pair.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProductPair {
    pub first: String,
    pub second: String,
    pub count: usize,
}

/// Demand and price summary for one product.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProductDemand {
    pub product: String,
    pub quantity: u64,
    pub mean_price: f64,
}

/// One-line takeaway per dashboard panel. `None` when the table is empty.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Insights {
    pub best_month: Option<String>,
    pub best_city: Option<String>,
    pub peak_hour: Option<String>,
    pub top_pair: Option<String>,
    pub top_product: Option<String>,
}

/// Combined result of all five analyses, served as `/api/report`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SalesReport {
    pub generated_at: DateTime<Utc>,
    pub record_count: usize,
    pub monthly: Vec<MonthRevenue>,
    pub cities: Vec<CityRevenue>,
    pub hours: Vec<HourOrders>,
    pub pairs: Vec<ProductPair>,
    pub products: Vec<ProductDemand>,
    pub insights: Insights,
}
