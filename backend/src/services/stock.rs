//! Stock ledger service: the single authority over product stock
//!
//! Every mutation of `products.stock` in the system goes through the
//! debit/credit operations here. Both are single conditional UPDATE
//! statements, so concurrent callers for the same product are serialized
//! by the database row lock; callers for different products proceed
//! independently.

use sqlx::{PgConnection, PgPool};
use uuid::Uuid;

use crate::error::{AppError, AppResult};
use shared::StockLevel;

/// Stock ledger service
#[derive(Clone)]
pub struct StockService {
    db: PgPool,
}

impl StockService {
    /// Create a new StockService instance
    pub fn new(db: PgPool) -> Self {
        Self { db }
    }

    /// Subtract `quantity` units from a product's stock
    ///
    /// Fails with `InsufficientStock` if fewer than `quantity` units are
    /// on hand; stock never goes negative. Returns the new stock level.
    pub async fn debit(&self, product_id: Uuid, quantity: i64) -> AppResult<i64> {
        let mut conn = self.db.acquire().await?;
        Self::debit_in_tx(&mut *conn, product_id, quantity).await
    }

    /// Add `quantity` units to a product's stock; no upper bound
    pub async fn credit(&self, product_id: Uuid, quantity: i64) -> AppResult<i64> {
        let mut conn = self.db.acquire().await?;
        Self::credit_in_tx(&mut *conn, product_id, quantity).await
    }

    /// Debit on a borrowed connection, for callers that apply ledger
    /// effects inside their own transaction
    pub async fn debit_in_tx(
        conn: &mut PgConnection,
        product_id: Uuid,
        quantity: i64,
    ) -> AppResult<i64> {
        validate_ledger_quantity(quantity)?;

        // The stock >= quantity guard makes the decrement and the
        // sufficiency check one atomic statement
        let updated = sqlx::query_scalar::<_, i64>(
            r#"
            UPDATE products
            SET stock = stock - $1, updated_at = NOW()
            WHERE id = $2 AND stock >= $1
            RETURNING stock
            "#,
        )
        .bind(quantity)
        .bind(product_id)
        .fetch_optional(&mut *conn)
        .await?;

        match updated {
            Some(stock) => Ok(stock),
            None => {
                // Zero rows: either the product is unknown or stock ran short
                let (name, available) =
                    sqlx::query_as::<_, (String, i64)>("SELECT name, stock FROM products WHERE id = $1")
                        .bind(product_id)
                        .fetch_optional(&mut *conn)
                        .await?
                        .ok_or_else(|| AppError::NotFound("Product".to_string()))?;

                Err(AppError::InsufficientStock {
                    product: name,
                    requested: quantity,
                    available,
                })
            }
        }
    }

    /// Credit on a borrowed connection, for callers that apply ledger
    /// effects inside their own transaction
    pub async fn credit_in_tx(
        conn: &mut PgConnection,
        product_id: Uuid,
        quantity: i64,
    ) -> AppResult<i64> {
        validate_ledger_quantity(quantity)?;

        sqlx::query_scalar::<_, i64>(
            r#"
            UPDATE products
            SET stock = stock + $1, updated_at = NOW()
            WHERE id = $2
            RETURNING stock
            "#,
        )
        .bind(quantity)
        .bind(product_id)
        .fetch_optional(&mut *conn)
        .await?
        .ok_or_else(|| AppError::NotFound("Product".to_string()))
    }

    /// Read-only current stock for a product
    pub async fn current_stock(&self, product_id: Uuid) -> AppResult<i64> {
        sqlx::query_scalar::<_, i64>("SELECT stock FROM products WHERE id = $1")
            .bind(product_id)
            .fetch_optional(&self.db)
            .await?
            .ok_or_else(|| AppError::NotFound("Product".to_string()))
    }

    /// Read-only stock level with product identification, for the stock
    /// query endpoint and external consumers
    pub async fn stock_level(&self, product_id: Uuid) -> AppResult<StockLevel> {
        let row = sqlx::query_as::<_, (Uuid, String, String, i64)>(
            "SELECT id, sku, name, stock FROM products WHERE id = $1",
        )
        .bind(product_id)
        .fetch_optional(&self.db)
        .await?
        .ok_or_else(|| AppError::NotFound("Product".to_string()))?;

        Ok(StockLevel {
            product_id: row.0,
            sku: row.1,
            name: row.2,
            stock: row.3,
        })
    }
}

fn validate_ledger_quantity(quantity: i64) -> AppResult<()> {
    if quantity <= 0 {
        return Err(AppError::Validation {
            field: "quantity".to_string(),
            message: "Quantity must be positive".to_string(),
        });
    }
    Ok(())
}
