//! Single-page sales dashboard and its JSON API.
//!
//! Serves an embedded HTML page that renders the five analysis panels
//! client-side with Plotly, fed by the `/api/*` endpoints. The cleaned
//! table is shared immutably with the handlers; each page load recomputes
//! the aggregates from it.

use axum::{
    Json, Router,
    extract::State,
    response::Html,
    routing::get,
};
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::net::SocketAddr;
use std::sync::Arc;
use tower_http::cors::CorsLayer;
use tracing::info;

use crate::analyzers::analyzer::{self, TOP_PAIRS};
use crate::analyzers::types::{
    CityRevenue, HourOrders, MonthRevenue, ProductDemand, ProductPair, SalesReport,
};
use crate::records::SaleRecord;
use anyhow::Result;

#[derive(Clone)]
pub struct DashboardState {
    records: Arc<Vec<SaleRecord>>,
}

pub struct DashboardServer {
    port: u16,
    state: DashboardState,
}

impl DashboardServer {
    pub fn new(port: u16, records: Vec<SaleRecord>) -> Self {
        Self {
            port,
            state: DashboardState {
                records: Arc::new(records),
            },
        }
    }

    pub async fn start(self) -> Result<()> {
        let app = router(self.state);

        let addr = SocketAddr::from(([127, 0, 0, 1], self.port));
        info!(%addr, "Dashboard listening");

        let listener = tokio::net::TcpListener::bind(&addr).await?;
        axum::serve(listener, app).await?;

        Ok(())
    }
}

/// Builds the dashboard router; split out so tests can drive it directly.
pub fn router(state: DashboardState) -> Router {
    Router::new()
        // Dashboard UI
        .route("/", get(dashboard_home))
        // API endpoints
        .route("/api/report", get(report))
        .route("/api/monthly", get(monthly))
        .route("/api/cities", get(cities))
        .route("/api/hours", get(hours))
        .route("/api/pairs", get(pairs))
        .route("/api/products", get(products))
        .route("/api/health", get(health_check))
        .layer(CorsLayer::permissive())
        .with_state(state)
}

// Route handlers

async fn dashboard_home() -> Html<&'static str> {
    Html(DASHBOARD_HTML)
}

async fn health_check() -> Json<HealthStatus> {
    Json(HealthStatus {
        status: "healthy".to_string(),
        timestamp: Utc::now(),
    })
}

async fn report(State(state): State<DashboardState>) -> Json<SalesReport> {
    Json(analyzer::build_report(&state.records))
}

async fn monthly(State(state): State<DashboardState>) -> Json<Vec<MonthRevenue>> {
    Json(analyzer::monthly_revenue(&state.records))
}

async fn cities(State(state): State<DashboardState>) -> Json<Vec<CityRevenue>> {
    Json(analyzer::city_revenue(&state.records))
}

async fn hours(State(state): State<DashboardState>) -> Json<Vec<HourOrders>> {
    Json(analyzer::orders_by_hour(&state.records))
}

async fn pairs(State(state): State<DashboardState>) -> Json<Vec<ProductPair>> {
    Json(analyzer::frequent_pairs(&state.records, TOP_PAIRS))
}

async fn products(State(state): State<DashboardState>) -> Json<Vec<ProductDemand>> {
    Json(analyzer::product_demand(&state.records))
}

#[derive(Debug, Serialize)]
struct HealthStatus {
    status: String,
    timestamp: DateTime<Utc>,
}

// Dashboard page; the panels mirror the five analyses one to one.
const DASHBOARD_HTML: &str = r#"
<!DOCTYPE html>
<html lang="en">
<head>
    <meta charset="UTF-8">
    <meta name="viewport" content="width=device-width, initial-scale=1.0">
    <title>Sales Analysis</title>
    <script src="https://cdn.plot.ly/plotly-2.35.2.min.js"></script>
    <style>
        body {
            font-family: -apple-system, BlinkMacSystemFont, 'Segoe UI', Roboto, sans-serif;
            margin: 0;
            padding: 0;
            background-color: #f5f5f5;
        }
        .header {
            background-color: #2c3e50;
            color: white;
            padding: 20px;
            text-align: center;
        }
        .container {
            max-width: 1200px;
            margin: 0 auto;
            padding: 20px;
        }
        .card {
            background-color: white;
            border-radius: 8px;
            box-shadow: 0 2px 4px rgba(0,0,0,0.1);
            padding: 20px;
            margin-bottom: 20px;
        }
        h2 {
            margin-top: 0;
            color: #2c3e50;
        }
        .insight {
            font-size: 14px;
            color: #666;
            border-left: 3px solid #3498db;
            padding-left: 10px;
        }
        .summary {
            font-size: 14px;
            color: #666;
        }
    </style>
</head>
<body>
    <div class="header">
        <h1>Sales Analysis</h1>
        <p>Twelve months of sales extracts, five questions</p>
    </div>
    <div class="container">
        <div class="card">
            <p class="summary" id="summary">Loading the cleaned sales table...</p>
        </div>

        <div class="card">
            <h2>1. What was the best month for sales?</h2>
            <div id="monthly-chart"></div>
            <p class="insight" id="monthly-insight"></p>
        </div>

        <div class="card">
            <h2>2. What city sold the most product?</h2>
            <div id="cities-chart"></div>
            <p class="insight" id="cities-insight"></p>
        </div>

        <div class="card">
            <h2>3. What time is best for advertisement?</h2>
            <div id="hours-chart"></div>
            <p class="insight" id="hours-insight"></p>
        </div>

        <div class="card">
            <h2>4. What products are most often sold together?</h2>
            <div id="pairs-chart"></div>
            <p class="insight" id="pairs-insight"></p>
        </div>

        <div class="card">
            <h2>5. What product sold the most, and why?</h2>
            <div id="products-chart"></div>
            <p class="insight" id="products-insight"></p>
        </div>
    </div>

    <script>
        function setInsight(id, text) {
            const el = document.getElementById(id);
            el.textContent = text || 'No data for this panel.';
        }

        async function loadDashboard() {
            try {
                const res = await fetch('/api/report');
                const report = await res.json();

                document.getElementById('summary').textContent =
                    `${report.record_count} cleaned line items, report generated ${new Date(report.generated_at).toLocaleString()}`;

                Plotly.newPlot('monthly-chart', [{
                    x: report.monthly.map(m => m.label),
                    y: report.monthly.map(m => m.revenue),
                    type: 'bar',
                    name: 'Sales Amount in USD',
                    marker: { color: '#3498db' }
                }], {
                    title: 'Monthly Sales',
                    xaxis: { title: 'Months', tickangle: -45 },
                    yaxis: { title: 'Sales Amount in USD' }
                });
                setInsight('monthly-insight', report.insights.best_month);

                Plotly.newPlot('cities-chart', [{
                    x: report.cities.map(c => c.city),
                    y: report.cities.map(c => c.revenue),
                    type: 'bar',
                    name: 'Sales Amount in USD',
                    marker: { color: '#3498db' }
                }], {
                    title: 'City Sales',
                    xaxis: { title: 'City Names', tickangle: -45 },
                    yaxis: { title: 'Sales Amount in USD' }
                });
                setInsight('cities-insight', report.insights.best_city);

                Plotly.newPlot('hours-chart', [{
                    x: report.hours.map(h => h.hour),
                    y: report.hours.map(h => h.orders),
                    mode: 'lines+markers',
                    name: 'Order Counts'
                }], {
                    title: 'Order Count Progression in Hours',
                    xaxis: { title: 'Hours' },
                    yaxis: { title: 'Order Counts' }
                });
                setInsight('hours-insight', report.insights.peak_hour);

                Plotly.newPlot('pairs-chart', [{
                    x: report.pairs.map(p => `(${p.first}, ${p.second})`),
                    y: report.pairs.map(p => p.count),
                    type: 'bar',
                    name: 'Frequency (Count)',
                    marker: { color: '#3498db' }
                }], {
                    title: 'Most Products Sold Together',
                    xaxis: { title: 'Products', tickangle: -45 },
                    yaxis: { title: 'Frequency (Count)' },
                    height: 500
                });
                setInsight('pairs-insight', report.insights.top_pair);

                Plotly.newPlot('products-chart', [{
                    x: report.products.map(p => p.product),
                    y: report.products.map(p => p.quantity),
                    type: 'bar',
                    name: 'Quantity Ordered',
                    marker: { color: '#3498db' }
                }, {
                    x: report.products.map(p => p.product),
                    y: report.products.map(p => p.mean_price),
                    mode: 'lines+markers',
                    name: 'Prices',
                    yaxis: 'y2',
                    line: { color: '#e74c3c' }
                }], {
                    title: 'Price Overlayed on Quantity Ordered',
                    xaxis: { title: 'Products', tickangle: -45 },
                    yaxis: { title: 'Quantity Ordered' },
                    yaxis2: { title: 'Prices', overlaying: 'y', side: 'right' }
                });
                setInsight('products-insight', report.insights.top_product);
            } catch (error) {
                console.error('Failed to load dashboard:', error);
                document.getElementById('summary').textContent = 'Failed to load the sales report.';
            }
        }

        loadDashboard();
    </script>
</body>
</html>
"#;
