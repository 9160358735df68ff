//! Reporting handlers for stock, sales, and purchase reports

use axum::{
    extract::{Query, State},
    http::header,
    response::IntoResponse,
    Json,
};
use chrono::NaiveDate;
use serde::Deserialize;

use crate::error::AppResult;
use crate::services::report::{LowStockRow, PurchaseReport, ReportService, SalesReport, StockReport};
use crate::AppState;
use shared::DateRange;

#[derive(Deserialize)]
pub struct ReportQuery {
    pub start_date: Option<String>,
    pub end_date: Option<String>,
}

#[derive(Deserialize)]
pub struct StockReportQuery {
    pub format: Option<String>, // "json" or "csv"
}

#[derive(Deserialize)]
pub struct LowStockQuery {
    pub threshold: Option<i64>,
}

fn range_from_query(query: &ReportQuery) -> DateRange {
    DateRange {
        start: query
            .start_date
            .as_deref()
            .and_then(|s| s.parse().ok())
            .unwrap_or(NaiveDate::from_ymd_opt(2000, 1, 1).unwrap()),
        end: query
            .end_date
            .as_deref()
            .and_then(|s| s.parse().ok())
            .unwrap_or(NaiveDate::from_ymd_opt(2100, 12, 31).unwrap()),
    }
}

/// Get the stock report (JSON, or CSV with ?format=csv)
pub async fn get_stock_report(
    State(state): State<AppState>,
    Query(query): Query<StockReportQuery>,
) -> AppResult<impl IntoResponse> {
    let service = ReportService::new(state.db);
    let report: StockReport = service.stock_report().await?;

    if query.format.as_deref() == Some("csv") {
        let csv = ReportService::export_to_csv(&report.rows)?;
        Ok((
            [
                (header::CONTENT_TYPE, "text/csv"),
                (
                    header::CONTENT_DISPOSITION,
                    "attachment; filename=\"stock_report.csv\"",
                ),
            ],
            csv,
        )
            .into_response())
    } else {
        Ok(Json(report).into_response())
    }
}

/// Get products at or below the low-stock threshold
pub async fn get_low_stock(
    State(state): State<AppState>,
    Query(query): Query<LowStockQuery>,
) -> AppResult<Json<Vec<LowStockRow>>> {
    let threshold = query
        .threshold
        .unwrap_or(state.config.inventory.low_stock_threshold);
    let service = ReportService::new(state.db);
    let rows = service.low_stock(threshold).await?;
    Ok(Json(rows))
}

/// Get the sales report over a date range
pub async fn get_sales_report(
    State(state): State<AppState>,
    Query(query): Query<ReportQuery>,
) -> AppResult<Json<SalesReport>> {
    let range = range_from_query(&query);
    let service = ReportService::new(state.db);
    let report = service.sales_report(&range).await?;
    Ok(Json(report))
}

/// Get the purchase report over a date range
pub async fn get_purchase_report(
    State(state): State<AppState>,
    Query(query): Query<ReportQuery>,
) -> AppResult<Json<PurchaseReport>> {
    let range = range_from_query(&query);
    let service = ReportService::new(state.db);
    let report = service.purchase_report(&range).await?;
    Ok(Json(report))
}
