//! Sales order lifecycle service
//!
//! Owns order creation, the order status state machine, and the invoice
//! projection. Ledger effects happen at exactly one transition per
//! direction: entering `completed` debits each line item once, and
//! `completed -> cancelled` credits the same quantities back. The
//! per-line `stock_applied` flag records whether a line's debit is
//! currently applied, which makes retried transitions no-ops.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::PgPool;
use uuid::Uuid;

use crate::error::{AppError, AppResult};
use crate::services::stock::StockService;
use shared::{
    compute_order_totals, line_total, validate_gst_percent, validate_line_item_count,
    validate_quantity, validate_reference_no, validate_unit_cost, Customer, Order, OrderLineItem,
    OrderStatus,
};

/// Order lifecycle service
#[derive(Clone)]
pub struct OrderService {
    db: PgPool,
}

/// Database row for an order
#[derive(Debug, sqlx::FromRow)]
struct OrderRow {
    id: Uuid,
    customer_id: Uuid,
    invoice_no: String,
    status: String,
    sub_total: Decimal,
    gst_percent: Decimal,
    tax: Decimal,
    total: Decimal,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl OrderRow {
    fn into_order(self) -> AppResult<Order> {
        let status = OrderStatus::parse(&self.status)
            .ok_or_else(|| AppError::Internal(format!("Unknown order status '{}'", self.status)))?;
        Ok(Order {
            id: self.id,
            customer_id: self.customer_id,
            invoice_no: self.invoice_no,
            status,
            sub_total: self.sub_total,
            gst_percent: self.gst_percent,
            tax: self.tax,
            total: self.total,
            created_at: self.created_at,
            updated_at: self.updated_at,
        })
    }
}

/// Database row for an order line item
#[derive(Debug, sqlx::FromRow)]
struct OrderItemRow {
    id: Uuid,
    order_id: Uuid,
    product_id: Uuid,
    quantity: i64,
    unit_cost: Decimal,
    line_total: Decimal,
    stock_applied: bool,
}

impl From<OrderItemRow> for OrderLineItem {
    fn from(row: OrderItemRow) -> Self {
        OrderLineItem {
            id: row.id,
            order_id: row.order_id,
            product_id: row.product_id,
            quantity: row.quantity,
            unit_cost: row.unit_cost,
            line_total: row.line_total,
            stock_applied: row.stock_applied,
        }
    }
}

/// Input for creating an order
#[derive(Debug, Deserialize)]
pub struct CreateOrderInput {
    pub customer_id: Uuid,
    pub invoice_no: String,
    /// GST percentage; the configured default applies when omitted
    pub gst_percent: Option<Decimal>,
    pub items: Vec<OrderItemInput>,
}

/// One requested line item
#[derive(Debug, Deserialize)]
pub struct OrderItemInput {
    pub product_id: Uuid,
    pub quantity: i64,
    /// Overrides the product's selling price when provided
    pub unit_cost: Option<Decimal>,
}

/// An order with its line items
#[derive(Debug, Serialize)]
pub struct OrderDetail {
    pub order: Order,
    pub items: Vec<OrderLineItem>,
}

/// Invoice projection for external document rendering
#[derive(Debug, Serialize)]
pub struct InvoiceData {
    pub order: Order,
    pub customer: Customer,
    pub items: Vec<InvoiceLine>,
}

/// One invoice line with product identification
#[derive(Debug, Serialize, sqlx::FromRow)]
pub struct InvoiceLine {
    pub product_id: Uuid,
    pub product_name: String,
    pub sku: String,
    pub quantity: i64,
    pub unit_cost: Decimal,
    pub line_total: Decimal,
}

impl OrderService {
    /// Create a new OrderService instance
    pub fn new(db: PgPool) -> Self {
        Self { db }
    }

    /// Create an order with its line items
    ///
    /// Computes totals once (tax defaults to the configured GST) and
    /// persists order + items all-or-nothing. Never touches the stock
    /// ledger; stock moves when the order transitions to `completed`.
    pub async fn create_order(
        &self,
        default_gst_percent: Decimal,
        input: CreateOrderInput,
    ) -> AppResult<OrderDetail> {
        validate_reference_no(&input.invoice_no).map_err(|e| AppError::Validation {
            field: "invoice_no".to_string(),
            message: e.to_string(),
        })?;

        validate_line_item_count(input.items.len()).map_err(|e| AppError::Validation {
            field: "items".to_string(),
            message: e.to_string(),
        })?;

        let gst_percent = input.gst_percent.unwrap_or(default_gst_percent);
        validate_gst_percent(gst_percent).map_err(|e| AppError::Validation {
            field: "gst_percent".to_string(),
            message: e.to_string(),
        })?;

        // Validate customer exists
        let customer_exists =
            sqlx::query_scalar::<_, bool>("SELECT EXISTS(SELECT 1 FROM customers WHERE id = $1)")
                .bind(input.customer_id)
                .fetch_one(&self.db)
                .await?;

        if !customer_exists {
            return Err(AppError::NotFound("Customer".to_string()));
        }

        // Validate invoice number uniqueness
        let invoice_taken =
            sqlx::query_scalar::<_, bool>("SELECT EXISTS(SELECT 1 FROM orders WHERE invoice_no = $1)")
                .bind(&input.invoice_no)
                .fetch_one(&self.db)
                .await?;

        if invoice_taken {
            return Err(AppError::DuplicateEntry(format!(
                "invoice number '{}'",
                input.invoice_no
            )));
        }

        // Resolve line items against the catalog
        let mut lines = Vec::with_capacity(input.items.len());
        for item in &input.items {
            validate_quantity(item.quantity).map_err(|e| AppError::Validation {
                field: "quantity".to_string(),
                message: e.to_string(),
            })?;

            let selling_price = sqlx::query_scalar::<_, Decimal>(
                "SELECT selling_price FROM products WHERE id = $1",
            )
            .bind(item.product_id)
            .fetch_optional(&self.db)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Product {}", item.product_id)))?;

            let unit_cost = item.unit_cost.unwrap_or(selling_price);
            validate_unit_cost(unit_cost).map_err(|e| AppError::Validation {
                field: "unit_cost".to_string(),
                message: e.to_string(),
            })?;

            lines.push((item.product_id, item.quantity, unit_cost));
        }

        let totals = compute_order_totals(
            lines.iter().map(|(_, qty, cost)| line_total(*qty, *cost)),
            gst_percent,
        );

        // Persist order + items all-or-nothing
        let mut tx = self.db.begin().await?;

        let order_id = sqlx::query_scalar::<_, Uuid>(
            r#"
            INSERT INTO orders (customer_id, invoice_no, status, sub_total, gst_percent, tax, total)
            VALUES ($1, $2, 'pending', $3, $4, $5, $6)
            RETURNING id
            "#,
        )
        .bind(input.customer_id)
        .bind(&input.invoice_no)
        .bind(totals.sub_total)
        .bind(gst_percent)
        .bind(totals.tax)
        .bind(totals.total)
        .fetch_one(&mut *tx)
        .await?;

        for (product_id, quantity, unit_cost) in &lines {
            sqlx::query(
                r#"
                INSERT INTO order_items (order_id, product_id, quantity, unit_cost, line_total, stock_applied)
                VALUES ($1, $2, $3, $4, $5, false)
                "#,
            )
            .bind(order_id)
            .bind(product_id)
            .bind(quantity)
            .bind(unit_cost)
            .bind(line_total(*quantity, *unit_cost))
            .execute(&mut *tx)
            .await?;
        }

        tx.commit().await?;

        self.get_order(order_id).await
    }

    /// Transition an order to a new status
    ///
    /// The order row is locked for the duration, so concurrent
    /// transitions on the same order are serialized. Entering
    /// `completed` debits every line whose `stock_applied` flag is still
    /// false; an `InsufficientStock` failure on any line rolls the whole
    /// transition back, leaving status, flags, and stock untouched.
    /// `completed -> cancelled` credits every applied line back, the
    /// exact compensating action.
    pub async fn transition(&self, order_id: Uuid, new_status: &str) -> AppResult<OrderDetail> {
        let new_status = OrderStatus::parse(new_status).ok_or_else(|| AppError::Validation {
            field: "status".to_string(),
            message: format!("Unknown order status '{}'", new_status),
        })?;

        let mut tx = self.db.begin().await?;

        // Lock the order row; serializes concurrent transitions per order
        let current = sqlx::query_scalar::<_, String>(
            "SELECT status FROM orders WHERE id = $1 FOR UPDATE",
        )
        .bind(order_id)
        .fetch_optional(&mut *tx)
        .await?
        .ok_or_else(|| AppError::NotFound("Order".to_string()))?;

        let current = OrderStatus::parse(&current)
            .ok_or_else(|| AppError::Internal(format!("Unknown order status '{}'", current)))?;

        if !current.can_transition_to(new_status) {
            return Err(AppError::InvalidStateTransition(format!(
                "Order cannot move from '{}' to '{}'",
                current, new_status
            )));
        }

        match new_status {
            OrderStatus::Completed => {
                let pending_items = sqlx::query_as::<_, (Uuid, Uuid, i64)>(
                    r#"
                    SELECT id, product_id, quantity FROM order_items
                    WHERE order_id = $1 AND stock_applied = false
                    ORDER BY id
                    "#,
                )
                .bind(order_id)
                .fetch_all(&mut *tx)
                .await?;

                for (item_id, product_id, quantity) in pending_items {
                    StockService::debit_in_tx(&mut *tx, product_id, quantity).await?;
                    sqlx::query("UPDATE order_items SET stock_applied = true WHERE id = $1")
                        .bind(item_id)
                        .execute(&mut *tx)
                        .await?;
                }
            }
            OrderStatus::Cancelled => {
                // Credits back whatever the completion debit applied;
                // a no-op for orders cancelled before completion
                let applied_items = sqlx::query_as::<_, (Uuid, Uuid, i64)>(
                    r#"
                    SELECT id, product_id, quantity FROM order_items
                    WHERE order_id = $1 AND stock_applied = true
                    ORDER BY id
                    "#,
                )
                .bind(order_id)
                .fetch_all(&mut *tx)
                .await?;

                for (item_id, product_id, quantity) in applied_items {
                    StockService::credit_in_tx(&mut *tx, product_id, quantity).await?;
                    sqlx::query("UPDATE order_items SET stock_applied = false WHERE id = $1")
                        .bind(item_id)
                        .execute(&mut *tx)
                        .await?;
                }
            }
            _ => {}
        }

        sqlx::query("UPDATE orders SET status = $1, updated_at = NOW() WHERE id = $2")
            .bind(new_status.as_str())
            .bind(order_id)
            .execute(&mut *tx)
            .await?;

        tx.commit().await?;

        tracing::info!(%order_id, from = %current, to = %new_status, "order transitioned");

        self.get_order(order_id).await
    }

    /// Get an order with its line items
    pub async fn get_order(&self, order_id: Uuid) -> AppResult<OrderDetail> {
        let order = sqlx::query_as::<_, OrderRow>(
            r#"
            SELECT id, customer_id, invoice_no, status, sub_total, gst_percent, tax, total,
                   created_at, updated_at
            FROM orders
            WHERE id = $1
            "#,
        )
        .bind(order_id)
        .fetch_optional(&self.db)
        .await?
        .ok_or_else(|| AppError::NotFound("Order".to_string()))?
        .into_order()?;

        let items = sqlx::query_as::<_, OrderItemRow>(
            r#"
            SELECT id, order_id, product_id, quantity, unit_cost, line_total, stock_applied
            FROM order_items
            WHERE order_id = $1
            ORDER BY id
            "#,
        )
        .bind(order_id)
        .fetch_all(&self.db)
        .await?
        .into_iter()
        .map(OrderLineItem::from)
        .collect();

        Ok(OrderDetail { order, items })
    }

    /// List all orders, newest first
    pub async fn list_orders(&self) -> AppResult<Vec<Order>> {
        sqlx::query_as::<_, OrderRow>(
            r#"
            SELECT id, customer_id, invoice_no, status, sub_total, gst_percent, tax, total,
                   created_at, updated_at
            FROM orders
            ORDER BY created_at DESC
            "#,
        )
        .fetch_all(&self.db)
        .await?
        .into_iter()
        .map(OrderRow::into_order)
        .collect()
    }

    /// Invoice projection joining customer and product names, consumed
    /// by the external document renderer
    pub async fn invoice_data(&self, order_id: Uuid) -> AppResult<InvoiceData> {
        let detail = self.get_order(order_id).await?;

        let customer = sqlx::query_as::<
            _,
            (
                Uuid,
                String,
                Option<String>,
                Option<String>,
                Option<String>,
                DateTime<Utc>,
                DateTime<Utc>,
            ),
        >(
            r#"
            SELECT id, name, email, phone, address, created_at, updated_at
            FROM customers
            WHERE id = $1
            "#,
        )
        .bind(detail.order.customer_id)
        .fetch_optional(&self.db)
        .await?
        .ok_or_else(|| AppError::NotFound("Customer".to_string()))?;

        let customer = Customer {
            id: customer.0,
            name: customer.1,
            email: customer.2,
            phone: customer.3,
            address: customer.4,
            created_at: customer.5,
            updated_at: customer.6,
        };

        let items = sqlx::query_as::<_, InvoiceLine>(
            r#"
            SELECT oi.product_id, p.name AS product_name, p.sku, oi.quantity, oi.unit_cost, oi.line_total
            FROM order_items oi
            JOIN products p ON p.id = oi.product_id
            WHERE oi.order_id = $1
            ORDER BY oi.id
            "#,
        )
        .bind(order_id)
        .fetch_all(&self.db)
        .await?;

        Ok(InvoiceData {
            order: detail.order,
            customer,
            items,
        })
    }
}
