use crate::analyzers::types::{
    CityRevenue, HourOrders, Insights, MonthRevenue, ProductDemand, ProductPair, SalesReport,
};
use crate::analyzers::utility::{mean, month_label};
use crate::records::SaleRecord;
use chrono::Utc;
use std::collections::{BTreeMap, HashMap};

/// Pair cutoff shown on the dashboard.
pub const TOP_PAIRS: usize = 10;

/// Revenue summed per calendar month, in month order.
pub fn monthly_revenue(records: &[SaleRecord]) -> Vec<MonthRevenue> {
    let mut totals: BTreeMap<u32, f64> = BTreeMap::new();
    for r in records {
        *totals.entry(r.month).or_default() += r.amount;
    }

    totals
        .into_iter()
        .map(|(month, revenue)| MonthRevenue {
            month,
            label: month_label(month).to_string(),
            revenue,
        })
        .collect()
}

/// Revenue summed per city, in city-name order.
pub fn city_revenue(records: &[SaleRecord]) -> Vec<CityRevenue> {
    let mut totals: BTreeMap<&str, f64> = BTreeMap::new();
    for r in records {
        *totals.entry(r.city.as_str()).or_default() += r.amount;
    }

    totals
        .into_iter()
        .map(|(city, revenue)| CityRevenue {
            city: city.to_string(),
            revenue,
        })
        .collect()
}

/// Line items counted per hour of day, hours 0 through 23 always present.
pub fn orders_by_hour(records: &[SaleRecord]) -> Vec<HourOrders> {
    let mut counts = [0usize; 24];
    for r in records {
        counts[r.hour as usize] += 1;
    }

    counts
        .iter()
        .enumerate()
        .map(|(hour, &orders)| HourOrders {
            hour: hour as u32,
            orders,
        })
        .collect()
}

/// Unordered product-pair co-occurrence counts, highest first, at most
/// `limit` pairs.
///
/// Line items are grouped into per-order baskets by order id; a product
/// appearing on several lines of one order still counts once toward its
/// pairs. Ties break by product name so the cutoff is deterministic.
pub fn frequent_pairs(records: &[SaleRecord], limit: usize) -> Vec<ProductPair> {
    let mut baskets: HashMap<u32, Vec<&str>> = HashMap::new();
    for r in records {
        let basket = baskets.entry(r.order_id).or_default();
        if !basket.contains(&r.product.as_str()) {
            basket.push(r.product.as_str());
        }
    }

    let mut counts: HashMap<(&str, &str), usize> = HashMap::new();
    for basket in baskets.values() {
        for i in 0..basket.len() {
            for j in i + 1..basket.len() {
                let (a, b) = if basket[i] <= basket[j] {
                    (basket[i], basket[j])
                } else {
                    (basket[j], basket[i])
                };
                *counts.entry((a, b)).or_default() += 1;
            }
        }
    }

    let mut pairs: Vec<ProductPair> = counts
        .into_iter()
        .map(|((first, second), count)| ProductPair {
            first: first.to_string(),
            second: second.to_string(),
            count,
        })
        .collect();
    pairs.sort_by(|a, b| {
        b.count
            .cmp(&a.count)
            .then_with(|| a.first.cmp(&b.first))
            .then_with(|| a.second.cmp(&b.second))
    });
    pairs.truncate(limit);

    pairs
}

/// Total quantity and mean unit price per product, in product-name order.
///
/// The mean is over line items, not quantity-weighted; it answers "what
/// does this product usually cost", not "average dollars per unit moved".
pub fn product_demand(records: &[SaleRecord]) -> Vec<ProductDemand> {
    let mut quantities: BTreeMap<&str, u64> = BTreeMap::new();
    let mut prices: HashMap<&str, Vec<f64>> = HashMap::new();
    for r in records {
        *quantities.entry(r.product.as_str()).or_default() += u64::from(r.quantity);
        prices.entry(r.product.as_str()).or_default().push(r.unit_price);
    }

    quantities
        .into_iter()
        .map(|(product, quantity)| ProductDemand {
            product: product.to_string(),
            quantity,
            mean_price: mean(&prices[product]),
        })
        .collect()
}

/// Runs all five analyses and bundles them with their takeaway lines.
pub fn build_report(records: &[SaleRecord]) -> SalesReport {
    let monthly = monthly_revenue(records);
    let cities = city_revenue(records);
    let hours = orders_by_hour(records);
    let pairs = frequent_pairs(records, TOP_PAIRS);
    let products = product_demand(records);

    let insights = Insights {
        best_month: monthly
            .iter()
            .max_by(|a, b| a.revenue.total_cmp(&b.revenue))
            .map(|m| format!("Best month: {} with ${:.2} in sales", m.label, m.revenue)),
        best_city: cities
            .iter()
            .max_by(|a, b| a.revenue.total_cmp(&b.revenue))
            .map(|c| format!("Top city: {} with ${:.2} in sales", c.city, c.revenue)),
        peak_hour: hours
            .iter()
            .max_by_key(|h| h.orders)
            .filter(|h| h.orders > 0)
            .map(|h| {
                format!(
                    "Peak ordering hour: {:02}:00 with {} line items; adverts land best just before it",
                    h.hour, h.orders
                )
            }),
        top_pair: pairs.first().map(|p| {
            format!(
                "Most co-purchased: {} and {}, together in {} orders",
                p.first, p.second, p.count
            )
        }),
        top_product: products
            .iter()
            .max_by_key(|p| p.quantity)
            .filter(|p| p.quantity > 0)
            .map(|p| {
                format!(
                    "Best seller: {} with {} units, averaging ${:.2} each",
                    p.product, p.quantity, p.mean_price
                )
            }),
    };

    SalesReport {
        generated_at: Utc::now(),
        record_count: records.len(),
        monthly,
        cities,
        hours,
        pairs,
        products,
        insights,
    }
}
