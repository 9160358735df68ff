//! Reporting service over ledger state and order/purchase history
//!
//! Read-only aggregation: consumes current stock and historical line
//! items, mutates nothing.

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::Serialize;
use sqlx::PgPool;
use uuid::Uuid;

use crate::error::AppResult;
use shared::DateRange;

/// Reporting service
#[derive(Clone)]
pub struct ReportService {
    db: PgPool,
}

/// Stock report entry for one product
#[derive(Debug, Serialize, sqlx::FromRow)]
pub struct StockReportRow {
    pub product_id: Uuid,
    pub sku: String,
    pub name: String,
    pub category: Option<String>,
    pub stock: i64,
    pub buying_price: Decimal,
    pub selling_price: Decimal,
    /// Valuation of the on-hand quantity at buying price
    pub stock_value: Decimal,
}

/// Full stock report with aggregate totals
#[derive(Debug, Serialize)]
pub struct StockReport {
    pub rows: Vec<StockReportRow>,
    pub total_units: i64,
    pub total_value: Decimal,
}

/// Low-stock entry for the external notification collaborator
#[derive(Debug, Serialize, sqlx::FromRow)]
pub struct LowStockRow {
    pub product_id: Uuid,
    pub sku: String,
    pub name: String,
    pub stock: i64,
}

/// Sales report data point (completed orders per day)
#[derive(Debug, Serialize, sqlx::FromRow)]
pub struct SalesReportRow {
    pub day: NaiveDate,
    pub orders: i64,
    pub revenue: Decimal,
}

/// Sales report over a date range
#[derive(Debug, Serialize)]
pub struct SalesReport {
    pub rows: Vec<SalesReportRow>,
    pub total_orders: i64,
    pub total_revenue: Decimal,
    pub total_items_sold: i64,
}

/// Purchase report data point
#[derive(Debug, Serialize, sqlx::FromRow)]
pub struct PurchaseReportRow {
    pub day: NaiveDate,
    pub purchases: i64,
    pub spend: Decimal,
    pub refunds: Decimal,
}

/// Purchase report over a date range
#[derive(Debug, Serialize)]
pub struct PurchaseReport {
    pub rows: Vec<PurchaseReportRow>,
    pub total_purchases: i64,
    pub total_spend: Decimal,
    pub total_refunds: Decimal,
}

impl ReportService {
    /// Create a new ReportService instance
    pub fn new(db: PgPool) -> Self {
        Self { db }
    }

    /// Current stock and valuation for every product
    pub async fn stock_report(&self) -> AppResult<StockReport> {
        let rows = sqlx::query_as::<_, StockReportRow>(
            r#"
            SELECT id AS product_id, sku, name, category, stock, buying_price, selling_price,
                   (stock::numeric * buying_price) AS stock_value
            FROM products
            ORDER BY name
            "#,
        )
        .fetch_all(&self.db)
        .await?;

        let total_units = rows.iter().map(|r| r.stock).sum();
        let total_value = rows.iter().map(|r| r.stock_value).sum();

        Ok(StockReport {
            rows,
            total_units,
            total_value,
        })
    }

    /// Products at or below the low-stock threshold
    pub async fn low_stock(&self, threshold: i64) -> AppResult<Vec<LowStockRow>> {
        let rows = sqlx::query_as::<_, LowStockRow>(
            r#"
            SELECT id AS product_id, sku, name, stock
            FROM products
            WHERE stock <= $1
            ORDER BY stock ASC, name
            "#,
        )
        .bind(threshold)
        .fetch_all(&self.db)
        .await?;

        Ok(rows)
    }

    /// Completed-order revenue per day over a date range
    pub async fn sales_report(&self, range: &DateRange) -> AppResult<SalesReport> {
        let rows = sqlx::query_as::<_, SalesReportRow>(
            r#"
            SELECT created_at::date AS day,
                   COUNT(*) AS orders,
                   COALESCE(SUM(total), 0) AS revenue
            FROM orders
            WHERE status = 'completed'
              AND created_at::date BETWEEN $1 AND $2
            GROUP BY created_at::date
            ORDER BY day ASC
            "#,
        )
        .bind(range.start)
        .bind(range.end)
        .fetch_all(&self.db)
        .await?;

        let total_items_sold = sqlx::query_scalar::<_, i64>(
            r#"
            SELECT COALESCE(SUM(oi.quantity), 0)::bigint
            FROM order_items oi
            JOIN orders o ON o.id = oi.order_id
            WHERE o.status = 'completed'
              AND o.created_at::date BETWEEN $1 AND $2
            "#,
        )
        .bind(range.start)
        .bind(range.end)
        .fetch_one(&self.db)
        .await?;

        let total_orders = rows.iter().map(|r| r.orders).sum();
        let total_revenue = rows.iter().map(|r| r.revenue).sum();

        Ok(SalesReport {
            rows,
            total_orders,
            total_revenue,
            total_items_sold,
        })
    }

    /// Purchase spend and refunds per day over a date range
    pub async fn purchase_report(&self, range: &DateRange) -> AppResult<PurchaseReport> {
        let rows = sqlx::query_as::<_, PurchaseReportRow>(
            r#"
            SELECT created_at::date AS day,
                   COUNT(*) AS purchases,
                   COALESCE(SUM(sub_total), 0) AS spend,
                   COALESCE(SUM(total_refund), 0) AS refunds
            FROM purchases
            WHERE status IN ('completed', 'returned')
              AND created_at::date BETWEEN $1 AND $2
            GROUP BY created_at::date
            ORDER BY day ASC
            "#,
        )
        .bind(range.start)
        .bind(range.end)
        .fetch_all(&self.db)
        .await?;

        let total_purchases = rows.iter().map(|r| r.purchases).sum();
        let total_spend = rows.iter().map(|r| r.spend).sum();
        let total_refunds = rows.iter().map(|r| r.refunds).sum();

        Ok(PurchaseReport {
            rows,
            total_purchases,
            total_spend,
            total_refunds,
        })
    }

    /// Export a report as CSV
    pub fn export_to_csv<T: Serialize>(data: &[T]) -> AppResult<String> {
        let mut wtr = csv::Writer::from_writer(vec![]);
        for record in data {
            wtr.serialize(record).map_err(|e| {
                crate::error::AppError::Internal(format!("CSV serialization error: {}", e))
            })?;
        }
        let csv_data = String::from_utf8(wtr.into_inner().map_err(|e| {
            crate::error::AppError::Internal(format!("CSV writer error: {}", e))
        })?)
        .map_err(|e| crate::error::AppError::Internal(format!("UTF-8 conversion error: {}", e)))?;
        Ok(csv_data)
    }
}
