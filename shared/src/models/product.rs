//! Product catalog models

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A sellable product tracked by the stock ledger
///
/// `stock` is the on-hand quantity and is mutated only through the stock
/// ledger's debit/credit operations, never by catalog updates.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Product {
    pub id: Uuid,
    /// Unique stock-keeping unit (e.g., "SKU-00042")
    pub sku: String,
    pub name: String,
    pub category: Option<String>,
    /// Unit of sale (e.g., "pcs", "box")
    pub unit: Option<String>,
    pub buying_price: Decimal,
    pub selling_price: Decimal,
    /// On-hand quantity, never negative
    pub stock: i64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Current stock level for a product, as reported by the ledger
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StockLevel {
    pub product_id: Uuid,
    pub sku: String,
    pub name: String,
    pub stock: i64,
}
