//! Business logic services for the Retail Inventory Management System

pub mod customer;
pub mod order;
pub mod product;
pub mod purchase;
pub mod report;
pub mod stock;
pub mod supplier;

pub use customer::CustomerService;
pub use order::OrderService;
pub use product::ProductService;
pub use purchase::PurchaseService;
pub use report::ReportService;
pub use stock::StockService;
pub use supplier::SupplierService;
