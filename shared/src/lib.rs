//! Shared types and models for the Retail Inventory Management System
//!
//! This crate contains the domain models, status state machines, and pure
//! business math shared between the backend and other components of the
//! system.

pub mod models;
pub mod types;
pub mod validation;

pub use models::*;
pub use types::*;
pub use validation::*;
