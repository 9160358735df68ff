//! HTTP handlers for sales order endpoints

use axum::{
    extract::{Path, State},
    Json,
};
use rust_decimal::Decimal;
use serde::Deserialize;
use uuid::Uuid;

use crate::error::AppResult;
use crate::services::order::{CreateOrderInput, InvoiceData, OrderDetail, OrderService};
use crate::AppState;
use shared::Order;

/// Status update request body
#[derive(Debug, Deserialize)]
pub struct OrderStatusInput {
    pub status: String,
}

/// Create an order with line items
pub async fn create_order(
    State(state): State<AppState>,
    Json(input): Json<CreateOrderInput>,
) -> AppResult<Json<OrderDetail>> {
    let default_gst = Decimal::from(state.config.tax.default_gst_percent);
    let service = OrderService::new(state.db);
    let order = service.create_order(default_gst, input).await?;
    Ok(Json(order))
}

/// Get an order with its line items
pub async fn get_order(
    State(state): State<AppState>,
    Path(order_id): Path<Uuid>,
) -> AppResult<Json<OrderDetail>> {
    let service = OrderService::new(state.db);
    let order = service.get_order(order_id).await?;
    Ok(Json(order))
}

/// List all orders
pub async fn list_orders(State(state): State<AppState>) -> AppResult<Json<Vec<Order>>> {
    let service = OrderService::new(state.db);
    let orders = service.list_orders().await?;
    Ok(Json(orders))
}

/// Transition an order to a new status
pub async fn transition_order(
    State(state): State<AppState>,
    Path(order_id): Path<Uuid>,
    Json(input): Json<OrderStatusInput>,
) -> AppResult<Json<OrderDetail>> {
    let service = OrderService::new(state.db);
    let order = service.transition(order_id, &input.status).await?;
    Ok(Json(order))
}

/// Get invoice data for an order, for external document rendering
pub async fn get_order_invoice(
    State(state): State<AppState>,
    Path(order_id): Path<Uuid>,
) -> AppResult<Json<InvoiceData>> {
    let service = OrderService::new(state.db);
    let invoice = service.invoice_data(order_id).await?;
    Ok(Json(invoice))
}
