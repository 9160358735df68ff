//! Purchase lifecycle service
//!
//! Owns purchase creation, the purchase status state machine, and return
//! processing. Completing a purchase credits each line item's quantity
//! into the stock ledger once (`stock_applied` flag). Returns follow a
//! preview-then-commit discipline: the preview is a read-only projection
//! of how much can still be returned given live stock, and the commit
//! recomputes the same clamps against live stock inside its transaction,
//! so a return can never drive stock negative even when sales have
//! consumed part of the purchased units.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::PgPool;
use uuid::Uuid;

use crate::error::{AppError, AppResult};
use crate::services::stock::StockService;
use shared::{
    line_total, returnable_quantity, validate_line_item_count, validate_quantity,
    validate_reference_no, validate_unit_cost, Purchase, PurchaseLineItem, PurchaseStatus,
    ReturnPreview, ReturnPreviewLine,
};

/// Purchase lifecycle service
#[derive(Clone)]
pub struct PurchaseService {
    db: PgPool,
}

/// Database row for a purchase
#[derive(Debug, sqlx::FromRow)]
struct PurchaseRow {
    id: Uuid,
    supplier_id: Uuid,
    purchase_no: String,
    status: String,
    sub_total: Decimal,
    total_refund: Option<Decimal>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl PurchaseRow {
    fn into_purchase(self) -> AppResult<Purchase> {
        let status = PurchaseStatus::parse(&self.status).ok_or_else(|| {
            AppError::Internal(format!("Unknown purchase status '{}'", self.status))
        })?;
        Ok(Purchase {
            id: self.id,
            supplier_id: self.supplier_id,
            purchase_no: self.purchase_no,
            status,
            sub_total: self.sub_total,
            total_refund: self.total_refund,
            created_at: self.created_at,
            updated_at: self.updated_at,
        })
    }
}

/// Database row for a purchase line item
#[derive(Debug, sqlx::FromRow)]
struct PurchaseItemRow {
    id: Uuid,
    purchase_id: Uuid,
    product_id: Uuid,
    quantity: i64,
    unit_cost: Decimal,
    line_total: Decimal,
    stock_applied: bool,
    returned_quantity: Option<i64>,
    refund_amount: Option<Decimal>,
}

impl From<PurchaseItemRow> for PurchaseLineItem {
    fn from(row: PurchaseItemRow) -> Self {
        PurchaseLineItem {
            id: row.id,
            purchase_id: row.purchase_id,
            product_id: row.product_id,
            quantity: row.quantity,
            unit_cost: row.unit_cost,
            line_total: row.line_total,
            stock_applied: row.stock_applied,
            returned_quantity: row.returned_quantity,
            refund_amount: row.refund_amount,
        }
    }
}

/// Input for creating a purchase
#[derive(Debug, Deserialize)]
pub struct CreatePurchaseInput {
    pub supplier_id: Uuid,
    pub purchase_no: String,
    pub items: Vec<PurchaseItemInput>,
}

/// One requested purchase line
#[derive(Debug, Deserialize)]
pub struct PurchaseItemInput {
    pub product_id: Uuid,
    pub quantity: i64,
    /// Overrides the product's buying price when provided
    pub unit_cost: Option<Decimal>,
}

/// A purchase with its line items
#[derive(Debug, Serialize)]
pub struct PurchaseDetail {
    pub purchase: Purchase,
    pub items: Vec<PurchaseLineItem>,
}

/// Outcome of a committed return
#[derive(Debug, Serialize)]
pub struct ReturnOutcome {
    pub purchase_id: Uuid,
    pub lines: Vec<ReturnedLine>,
    pub total_refund: Decimal,
}

/// One returned line as actually committed
#[derive(Debug, Serialize)]
pub struct ReturnedLine {
    pub product_id: Uuid,
    pub purchased_quantity: i64,
    pub returned_quantity: i64,
    pub refund_amount: Decimal,
}

impl PurchaseService {
    /// Create a new PurchaseService instance
    pub fn new(db: PgPool) -> Self {
        Self { db }
    }

    /// Create a purchase with its line items
    ///
    /// Persists purchase + items all-or-nothing, status `pending`. Never
    /// touches the stock ledger; stock moves when the purchase
    /// transitions to `completed`.
    pub async fn create_purchase(&self, input: CreatePurchaseInput) -> AppResult<PurchaseDetail> {
        validate_reference_no(&input.purchase_no).map_err(|e| AppError::Validation {
            field: "purchase_no".to_string(),
            message: e.to_string(),
        })?;

        validate_line_item_count(input.items.len()).map_err(|e| AppError::Validation {
            field: "items".to_string(),
            message: e.to_string(),
        })?;

        // Validate supplier exists
        let supplier_exists =
            sqlx::query_scalar::<_, bool>("SELECT EXISTS(SELECT 1 FROM suppliers WHERE id = $1)")
                .bind(input.supplier_id)
                .fetch_one(&self.db)
                .await?;

        if !supplier_exists {
            return Err(AppError::NotFound("Supplier".to_string()));
        }

        // Validate purchase number uniqueness
        let number_taken = sqlx::query_scalar::<_, bool>(
            "SELECT EXISTS(SELECT 1 FROM purchases WHERE purchase_no = $1)",
        )
        .bind(&input.purchase_no)
        .fetch_one(&self.db)
        .await?;

        if number_taken {
            return Err(AppError::DuplicateEntry(format!(
                "purchase number '{}'",
                input.purchase_no
            )));
        }

        // Resolve line items against the catalog
        let mut lines = Vec::with_capacity(input.items.len());
        for item in &input.items {
            validate_quantity(item.quantity).map_err(|e| AppError::Validation {
                field: "quantity".to_string(),
                message: e.to_string(),
            })?;

            let buying_price =
                sqlx::query_scalar::<_, Decimal>("SELECT buying_price FROM products WHERE id = $1")
                    .bind(item.product_id)
                    .fetch_optional(&self.db)
                    .await?
                    .ok_or_else(|| AppError::NotFound(format!("Product {}", item.product_id)))?;

            let unit_cost = item.unit_cost.unwrap_or(buying_price);
            validate_unit_cost(unit_cost).map_err(|e| AppError::Validation {
                field: "unit_cost".to_string(),
                message: e.to_string(),
            })?;

            lines.push((item.product_id, item.quantity, unit_cost));
        }

        let sub_total: Decimal = lines
            .iter()
            .map(|(_, qty, cost)| line_total(*qty, *cost))
            .sum();

        // Persist purchase + items all-or-nothing
        let mut tx = self.db.begin().await?;

        let purchase_id = sqlx::query_scalar::<_, Uuid>(
            r#"
            INSERT INTO purchases (supplier_id, purchase_no, status, sub_total)
            VALUES ($1, $2, 'pending', $3)
            RETURNING id
            "#,
        )
        .bind(input.supplier_id)
        .bind(&input.purchase_no)
        .bind(sub_total)
        .fetch_one(&mut *tx)
        .await?;

        for (product_id, quantity, unit_cost) in &lines {
            sqlx::query(
                r#"
                INSERT INTO purchase_items (purchase_id, product_id, quantity, unit_cost, line_total, stock_applied)
                VALUES ($1, $2, $3, $4, $5, false)
                "#,
            )
            .bind(purchase_id)
            .bind(product_id)
            .bind(quantity)
            .bind(unit_cost)
            .bind(line_total(*quantity, *unit_cost))
            .execute(&mut *tx)
            .await?;
        }

        tx.commit().await?;

        self.get_purchase(purchase_id).await
    }

    /// Transition a purchase to a new status
    ///
    /// Accepts `pending`, `completed`, or `approved` (stored as
    /// `completed`). Entering `completed` credits every line whose
    /// `stock_applied` flag is still false, making retries no-ops.
    /// Returns are a distinct operation (`commit_return`), not a status
    /// transition, because they require the preview-then-commit
    /// discipline.
    pub async fn transition(&self, purchase_id: Uuid, new_status: &str) -> AppResult<PurchaseDetail> {
        let parsed = PurchaseStatus::parse(new_status).ok_or_else(|| AppError::Validation {
            field: "status".to_string(),
            message: format!("Unknown purchase status '{}'", new_status),
        })?;

        if parsed == PurchaseStatus::Returned {
            return Err(AppError::InvalidStateTransition(
                "Purchase returns are committed through the return operation, not a status update"
                    .to_string(),
            ));
        }

        let mut tx = self.db.begin().await?;

        // Lock the purchase row; serializes concurrent transitions
        let current = sqlx::query_scalar::<_, String>(
            "SELECT status FROM purchases WHERE id = $1 FOR UPDATE",
        )
        .bind(purchase_id)
        .fetch_optional(&mut *tx)
        .await?
        .ok_or_else(|| AppError::NotFound("Purchase".to_string()))?;

        let current = PurchaseStatus::parse(&current)
            .ok_or_else(|| AppError::Internal(format!("Unknown purchase status '{}'", current)))?;

        if !current.can_transition_to(parsed) {
            return Err(AppError::InvalidStateTransition(format!(
                "Purchase cannot move from '{}' to '{}'",
                current, parsed
            )));
        }

        if parsed == PurchaseStatus::Completed {
            let pending_items = sqlx::query_as::<_, (Uuid, Uuid, i64)>(
                r#"
                SELECT id, product_id, quantity FROM purchase_items
                WHERE purchase_id = $1 AND stock_applied = false
                ORDER BY id
                "#,
            )
            .bind(purchase_id)
            .fetch_all(&mut *tx)
            .await?;

            for (item_id, product_id, quantity) in pending_items {
                StockService::credit_in_tx(&mut *tx, product_id, quantity).await?;
                sqlx::query("UPDATE purchase_items SET stock_applied = true WHERE id = $1")
                    .bind(item_id)
                    .execute(&mut *tx)
                    .await?;
            }
        }

        sqlx::query("UPDATE purchases SET status = $1, updated_at = NOW() WHERE id = $2")
            .bind(parsed.as_str())
            .bind(purchase_id)
            .execute(&mut *tx)
            .await?;

        tx.commit().await?;

        tracing::info!(%purchase_id, from = %current, to = %parsed, "purchase transitioned");

        self.get_purchase(purchase_id).await
    }

    /// Preview how much of a completed purchase can still be returned
    ///
    /// Purely read-only; safe to call repeatedly. Stock may move between
    /// preview and commit, so the commit recomputes the clamps.
    pub async fn preview_return(&self, purchase_id: Uuid) -> AppResult<ReturnPreview> {
        let purchase = self.get_purchase(purchase_id).await?;

        if purchase.purchase.status != PurchaseStatus::Completed {
            return Err(AppError::InvalidStateTransition(format!(
                "Only completed purchases can be returned; purchase is '{}'",
                purchase.purchase.status
            )));
        }

        let rows = sqlx::query_as::<_, (Uuid, String, i64, i64, Decimal)>(
            r#"
            SELECT pi.product_id, p.name, pi.quantity, p.stock, pi.unit_cost
            FROM purchase_items pi
            JOIN products p ON p.id = pi.product_id
            WHERE pi.purchase_id = $1
            ORDER BY pi.id
            "#,
        )
        .bind(purchase_id)
        .fetch_all(&self.db)
        .await?;

        let lines = rows
            .into_iter()
            .map(|(product_id, name, purchased, stock, unit_cost)| {
                ReturnPreviewLine::compute(product_id, name, purchased, stock, unit_cost)
            })
            .collect();

        Ok(ReturnPreview::from_lines(purchase_id, lines))
    }

    /// Commit a return of a completed purchase
    ///
    /// Recomputes the stock-constrained quantities against live stock
    /// inside the transaction (the clamp, not the preview, is
    /// authoritative: if stock dropped since the preview the refund
    /// shrinks rather than the commit failing), debits the ledger per
    /// line, records per-line returned quantity and refund, and marks
    /// the purchase `returned`. Already-returned purchases are rejected.
    pub async fn commit_return(&self, purchase_id: Uuid) -> AppResult<ReturnOutcome> {
        let mut tx = self.db.begin().await?;

        // Lock the purchase row; serializes against concurrent
        // transitions and double-return attempts
        let current = sqlx::query_scalar::<_, String>(
            "SELECT status FROM purchases WHERE id = $1 FOR UPDATE",
        )
        .bind(purchase_id)
        .fetch_optional(&mut *tx)
        .await?
        .ok_or_else(|| AppError::NotFound("Purchase".to_string()))?;

        let current = PurchaseStatus::parse(&current)
            .ok_or_else(|| AppError::Internal(format!("Unknown purchase status '{}'", current)))?;

        if !current.can_transition_to(PurchaseStatus::Returned) {
            return Err(AppError::InvalidStateTransition(format!(
                "Purchase cannot be returned from '{}'",
                current
            )));
        }

        let items = sqlx::query_as::<_, (Uuid, Uuid, i64, Decimal)>(
            r#"
            SELECT id, product_id, quantity, unit_cost FROM purchase_items
            WHERE purchase_id = $1
            ORDER BY id
            "#,
        )
        .bind(purchase_id)
        .fetch_all(&mut *tx)
        .await?;

        let mut lines = Vec::with_capacity(items.len());
        let mut total_refund = Decimal::ZERO;

        for (item_id, product_id, purchased, unit_cost) in items {
            // Lock the product row so the clamp and the debit see the
            // same stock value
            let live_stock = sqlx::query_scalar::<_, i64>(
                "SELECT stock FROM products WHERE id = $1 FOR UPDATE",
            )
            .bind(product_id)
            .fetch_optional(&mut *tx)
            .await?
            .ok_or_else(|| AppError::NotFound("Product".to_string()))?;

            let returnable = returnable_quantity(purchased, live_stock);
            if returnable > 0 {
                StockService::debit_in_tx(&mut *tx, product_id, returnable).await?;
            }

            let refund = Decimal::from(returnable) * unit_cost;
            total_refund += refund;

            sqlx::query(
                "UPDATE purchase_items SET returned_quantity = $1, refund_amount = $2 WHERE id = $3",
            )
            .bind(returnable)
            .bind(refund)
            .bind(item_id)
            .execute(&mut *tx)
            .await?;

            lines.push(ReturnedLine {
                product_id,
                purchased_quantity: purchased,
                returned_quantity: returnable,
                refund_amount: refund,
            });
        }

        sqlx::query(
            "UPDATE purchases SET status = 'returned', total_refund = $1, updated_at = NOW() WHERE id = $2",
        )
        .bind(total_refund)
        .bind(purchase_id)
        .execute(&mut *tx)
        .await?;

        tx.commit().await?;

        tracing::info!(%purchase_id, %total_refund, "purchase returned");

        Ok(ReturnOutcome {
            purchase_id,
            lines,
            total_refund,
        })
    }

    /// Get a purchase with its line items
    pub async fn get_purchase(&self, purchase_id: Uuid) -> AppResult<PurchaseDetail> {
        let purchase = sqlx::query_as::<_, PurchaseRow>(
            r#"
            SELECT id, supplier_id, purchase_no, status, sub_total, total_refund,
                   created_at, updated_at
            FROM purchases
            WHERE id = $1
            "#,
        )
        .bind(purchase_id)
        .fetch_optional(&self.db)
        .await?
        .ok_or_else(|| AppError::NotFound("Purchase".to_string()))?
        .into_purchase()?;

        let items = sqlx::query_as::<_, PurchaseItemRow>(
            r#"
            SELECT id, purchase_id, product_id, quantity, unit_cost, line_total,
                   stock_applied, returned_quantity, refund_amount
            FROM purchase_items
            WHERE purchase_id = $1
            ORDER BY id
            "#,
        )
        .bind(purchase_id)
        .fetch_all(&self.db)
        .await?
        .into_iter()
        .map(PurchaseLineItem::from)
        .collect();

        Ok(PurchaseDetail { purchase, items })
    }

    /// List all purchases, newest first
    pub async fn list_purchases(&self) -> AppResult<Vec<Purchase>> {
        sqlx::query_as::<_, PurchaseRow>(
            r#"
            SELECT id, supplier_id, purchase_no, status, sub_total, total_refund,
                   created_at, updated_at
            FROM purchases
            ORDER BY created_at DESC
            "#,
        )
        .fetch_all(&self.db)
        .await?
        .into_iter()
        .map(PurchaseRow::into_purchase)
        .collect()
    }
}
