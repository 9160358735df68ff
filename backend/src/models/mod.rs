//! Database models for the Retail Inventory Management System
//!
//! Re-exports models from the shared crate

pub use shared::models::*;
