//! HTTP handlers for purchase endpoints

use axum::{
    extract::{Path, State},
    Json,
};
use serde::Deserialize;
use uuid::Uuid;

use crate::error::AppResult;
use crate::services::purchase::{
    CreatePurchaseInput, PurchaseDetail, PurchaseService, ReturnOutcome,
};
use crate::AppState;
use shared::{Purchase, ReturnPreview};

/// Status update request body
#[derive(Debug, Deserialize)]
pub struct PurchaseStatusInput {
    pub status: String,
}

/// Create a purchase with line items
pub async fn create_purchase(
    State(state): State<AppState>,
    Json(input): Json<CreatePurchaseInput>,
) -> AppResult<Json<PurchaseDetail>> {
    let service = PurchaseService::new(state.db);
    let purchase = service.create_purchase(input).await?;
    Ok(Json(purchase))
}

/// Get a purchase with its line items
pub async fn get_purchase(
    State(state): State<AppState>,
    Path(purchase_id): Path<Uuid>,
) -> AppResult<Json<PurchaseDetail>> {
    let service = PurchaseService::new(state.db);
    let purchase = service.get_purchase(purchase_id).await?;
    Ok(Json(purchase))
}

/// List all purchases
pub async fn list_purchases(State(state): State<AppState>) -> AppResult<Json<Vec<Purchase>>> {
    let service = PurchaseService::new(state.db);
    let purchases = service.list_purchases().await?;
    Ok(Json(purchases))
}

/// Transition a purchase to a new status (pending, completed, approved)
pub async fn transition_purchase(
    State(state): State<AppState>,
    Path(purchase_id): Path<Uuid>,
    Json(input): Json<PurchaseStatusInput>,
) -> AppResult<Json<PurchaseDetail>> {
    let service = PurchaseService::new(state.db);
    let purchase = service.transition(purchase_id, &input.status).await?;
    Ok(Json(purchase))
}

/// Preview how much of a completed purchase can still be returned
pub async fn preview_purchase_return(
    State(state): State<AppState>,
    Path(purchase_id): Path<Uuid>,
) -> AppResult<Json<ReturnPreview>> {
    let service = PurchaseService::new(state.db);
    let preview = service.preview_return(purchase_id).await?;
    Ok(Json(preview))
}

/// Commit a return of a completed purchase
pub async fn commit_purchase_return(
    State(state): State<AppState>,
    Path(purchase_id): Path<Uuid>,
) -> AppResult<Json<ReturnOutcome>> {
    let service = PurchaseService::new(state.db);
    let outcome = service.commit_return(purchase_id).await?;
    Ok(Json(outcome))
}
