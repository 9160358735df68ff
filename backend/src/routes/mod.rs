//! Route definitions for the Retail Inventory Management System

use axum::{
    routing::{get, post},
    Router,
};

use crate::{handlers, AppState};

/// Create API routes
pub fn api_routes() -> Router<AppState> {
    Router::new()
        // Health check
        .route("/health", get(handlers::health_check))
        // Product catalog and stock queries
        .nest("/products", product_routes())
        // Customer profiles
        .nest("/customers", customer_routes())
        // Supplier profiles
        .nest("/suppliers", supplier_routes())
        // Sales order lifecycle
        .nest("/orders", order_routes())
        // Purchase lifecycle and returns
        .nest("/purchases", purchase_routes())
        // Reporting
        .nest("/reports", report_routes())
}

/// Product management routes
fn product_routes() -> Router<AppState> {
    Router::new()
        .route(
            "/",
            get(handlers::list_products).post(handlers::create_product),
        )
        .route(
            "/:product_id",
            get(handlers::get_product)
                .put(handlers::update_product)
                .delete(handlers::delete_product),
        )
        .route("/:product_id/stock", get(handlers::get_stock_level))
}

/// Customer management routes
fn customer_routes() -> Router<AppState> {
    Router::new()
        .route(
            "/",
            get(handlers::list_customers).post(handlers::create_customer),
        )
        .route(
            "/:customer_id",
            get(handlers::get_customer)
                .put(handlers::update_customer)
                .delete(handlers::delete_customer),
        )
}

/// Supplier management routes
fn supplier_routes() -> Router<AppState> {
    Router::new()
        .route(
            "/",
            get(handlers::list_suppliers).post(handlers::create_supplier),
        )
        .route(
            "/:supplier_id",
            get(handlers::get_supplier)
                .put(handlers::update_supplier)
                .delete(handlers::delete_supplier),
        )
}

/// Sales order routes
fn order_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(handlers::list_orders).post(handlers::create_order))
        .route("/:order_id", get(handlers::get_order))
        .route("/:order_id/status", post(handlers::transition_order))
        .route("/:order_id/invoice", get(handlers::get_order_invoice))
}

/// Purchase routes
fn purchase_routes() -> Router<AppState> {
    Router::new()
        .route(
            "/",
            get(handlers::list_purchases).post(handlers::create_purchase),
        )
        .route("/:purchase_id", get(handlers::get_purchase))
        .route("/:purchase_id/status", post(handlers::transition_purchase))
        .route(
            "/:purchase_id/return",
            get(handlers::preview_purchase_return).post(handlers::commit_purchase_return),
        )
}

/// Reporting routes
fn report_routes() -> Router<AppState> {
    Router::new()
        .route("/stock", get(handlers::get_stock_report))
        .route("/stock/low", get(handlers::get_low_stock))
        .route("/sales", get(handlers::get_sales_report))
        .route("/purchases", get(handlers::get_purchase_report))
}
