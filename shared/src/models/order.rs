//! Sales order models and the order status state machine

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A sales order
///
/// Totals are computed once at creation (`total = sub_total + tax`,
/// `sub_total = Σ line_total`) and never re-derived afterwards.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Order {
    pub id: Uuid,
    pub customer_id: Uuid,
    /// Unique invoice number (e.g., "INV-2024-0001")
    pub invoice_no: String,
    pub status: OrderStatus,
    pub sub_total: Decimal,
    /// GST percentage applied at creation
    pub gst_percent: Decimal,
    pub tax: Decimal,
    pub total: Decimal,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// One product line within a sales order
///
/// Immutable after creation except for `stock_applied`, which records
/// whether this line's debit has been applied to the stock ledger.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OrderLineItem {
    pub id: Uuid,
    pub order_id: Uuid,
    pub product_id: Uuid,
    pub quantity: i64,
    pub unit_cost: Decimal,
    pub line_total: Decimal,
    pub stock_applied: bool,
}

/// Status of a sales order
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OrderStatus {
    Pending,
    Processing,
    Completed,
    Cancelled,
}

impl OrderStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            OrderStatus::Pending => "pending",
            OrderStatus::Processing => "processing",
            OrderStatus::Completed => "completed",
            OrderStatus::Cancelled => "cancelled",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "pending" => Some(OrderStatus::Pending),
            "processing" => Some(OrderStatus::Processing),
            "completed" => Some(OrderStatus::Completed),
            "cancelled" => Some(OrderStatus::Cancelled),
            _ => None,
        }
    }

    /// Whether the edge `self -> next` is a legal status transition.
    ///
    /// Same-status transitions are legal retries. Status only moves
    /// forward, with one exception: `completed -> cancelled`, which
    /// compensates the completion debit. Nothing leaves `cancelled`.
    pub fn can_transition_to(self, next: OrderStatus) -> bool {
        use OrderStatus::*;
        match (self, next) {
            (a, b) if a == b => true,
            (Pending, Processing | Completed | Cancelled) => true,
            (Processing, Completed | Cancelled) => true,
            (Completed, Cancelled) => true,
            _ => false,
        }
    }
}

impl std::fmt::Display for OrderStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Order totals computed at creation time
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrderTotals {
    pub sub_total: Decimal,
    pub tax: Decimal,
    pub total: Decimal,
}

/// Line total for a quantity at a unit cost
pub fn line_total(quantity: i64, unit_cost: Decimal) -> Decimal {
    Decimal::from(quantity) * unit_cost
}

/// Compute order totals from line totals and a GST percentage.
///
/// Tax is rounded to 2 decimal places; the stored totals are
/// authoritative from then on.
pub fn compute_order_totals<I>(line_totals: I, gst_percent: Decimal) -> OrderTotals
where
    I: IntoIterator<Item = Decimal>,
{
    let sub_total: Decimal = line_totals.into_iter().sum();
    let tax = (sub_total * gst_percent / Decimal::from(100)).round_dp(2);
    OrderTotals {
        sub_total,
        tax,
        total: sub_total + tax,
    }
}
