//! Purchase models, the purchase status state machine, and return math

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A purchase from a supplier
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Purchase {
    pub id: Uuid,
    pub supplier_id: Uuid,
    /// Unique purchase number (e.g., "PUR-2024-0001")
    pub purchase_no: String,
    pub status: PurchaseStatus,
    pub sub_total: Decimal,
    /// Aggregate refund, set when the purchase is returned
    pub total_refund: Option<Decimal>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// One product line within a purchase
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PurchaseLineItem {
    pub id: Uuid,
    pub purchase_id: Uuid,
    pub product_id: Uuid,
    pub quantity: i64,
    pub unit_cost: Decimal,
    pub line_total: Decimal,
    pub stock_applied: bool,
    /// Quantity actually returned, set when the purchase is returned
    pub returned_quantity: Option<i64>,
    /// Refund for this line, set when the purchase is returned
    pub refund_amount: Option<Decimal>,
}

/// Status of a purchase
///
/// "approved" is accepted as an input synonym of `completed` and is never
/// stored as its own state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PurchaseStatus {
    Pending,
    Completed,
    Returned,
}

impl PurchaseStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            PurchaseStatus::Pending => "pending",
            PurchaseStatus::Completed => "completed",
            PurchaseStatus::Returned => "returned",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "pending" => Some(PurchaseStatus::Pending),
            "completed" | "approved" => Some(PurchaseStatus::Completed),
            "returned" => Some(PurchaseStatus::Returned),
            _ => None,
        }
    }

    /// Whether the edge `self -> next` is a legal status transition.
    ///
    /// `returned` is terminal and is never re-entered: the returnable
    /// amount can legitimately differ on retry, so callers must re-preview
    /// instead of repeating a return.
    pub fn can_transition_to(self, next: PurchaseStatus) -> bool {
        use PurchaseStatus::*;
        match (self, next) {
            (Returned, _) => false,
            (a, b) if a == b => true,
            (Pending, Completed) => true,
            (Completed, Returned) => true,
            _ => false,
        }
    }
}

impl std::fmt::Display for PurchaseStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// How much of a purchased quantity can still be returned, given the
/// product's live stock. Stock is shared with the sales workflow, so the
/// returnable amount is capped by whatever remains on hand.
pub fn returnable_quantity(purchased: i64, current_stock: i64) -> i64 {
    purchased.min(current_stock).max(0)
}

/// Read-only, per-line projection of how much of a purchase can be
/// returned at preview time. Never persisted; stock may move between
/// preview and commit, so the commit recomputes these against live stock.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReturnPreviewLine {
    pub product_id: Uuid,
    pub product_name: String,
    pub purchased_quantity: i64,
    pub current_stock: i64,
    pub returnable_quantity: i64,
    pub can_fully_return: bool,
    pub unit_cost: Decimal,
    pub potential_refund: Decimal,
}

impl ReturnPreviewLine {
    pub fn compute(
        product_id: Uuid,
        product_name: String,
        purchased_quantity: i64,
        current_stock: i64,
        unit_cost: Decimal,
    ) -> Self {
        let returnable = returnable_quantity(purchased_quantity, current_stock);
        Self {
            product_id,
            product_name,
            purchased_quantity,
            current_stock,
            returnable_quantity: returnable,
            can_fully_return: returnable == purchased_quantity,
            unit_cost,
            potential_refund: Decimal::from(returnable) * unit_cost,
        }
    }
}

/// Stock-constrained projection of a full purchase return
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReturnPreview {
    pub purchase_id: Uuid,
    pub lines: Vec<ReturnPreviewLine>,
    pub total_refund: Decimal,
    pub can_fully_return: bool,
}

impl ReturnPreview {
    pub fn from_lines(purchase_id: Uuid, lines: Vec<ReturnPreviewLine>) -> Self {
        let total_refund = lines.iter().map(|l| l.potential_refund).sum();
        let can_fully_return = lines.iter().all(|l| l.can_fully_return);
        Self {
            purchase_id,
            lines,
            total_refund,
            can_fully_return,
        }
    }
}
