//! Order API Handlers

use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
};

use shared::models::Role;
use shared::order::{OrderDto, OrderRequest, OrderStatusUpdate};

use crate::api::identity::{IdempotencyKey, Identity};
use crate::common::AppResult;
use crate::core::ServerState;

/// Place a new order for the calling customer.
pub async fn place_order(
    State(state): State<ServerState>,
    identity: Identity,
    IdempotencyKey(key): IdempotencyKey,
    Json(request): Json<OrderRequest>,
) -> AppResult<Json<OrderDto>> {
    identity.require(Role::Customer)?;
    let order = state
        .orders
        .place_order(identity.user_id, &key, request)
        .await?;
    Ok(Json(order))
}

/// Orders placed by the calling customer.
pub async fn get_user_orders(
    State(state): State<ServerState>,
    identity: Identity,
) -> AppResult<Json<Vec<OrderDto>>> {
    identity.require(Role::Customer)?;
    let orders = state.orders.list_user_orders(identity.user_id).await?;
    Ok(Json(orders))
}

/// Orders owned by the calling restaurant.
pub async fn get_restaurant_orders(
    State(state): State<ServerState>,
    identity: Identity,
) -> AppResult<Json<Vec<OrderDto>>> {
    identity.require(Role::Restaurant)?;
    let orders = state
        .orders
        .list_restaurant_orders(identity.user_id)
        .await?;
    Ok(Json(orders))
}

/// Transition an order's status on behalf of the calling restaurant.
pub async fn update_order_status(
    State(state): State<ServerState>,
    identity: Identity,
    Json(update): Json<OrderStatusUpdate>,
) -> AppResult<Json<OrderDto>> {
    identity.require(Role::Restaurant)?;
    let order = state.orders.update_status(identity.user_id, update).await?;
    Ok(Json(order))
}

/// Get order by id.
pub async fn get_order_details(
    State(state): State<ServerState>,
    Path(order_id): Path<String>,
) -> AppResult<Json<OrderDto>> {
    let order = state.orders.get_order(&order_id).await?;
    Ok(Json(order))
}

/// Delete a resolved order owned by the calling restaurant.
pub async fn delete_order(
    State(state): State<ServerState>,
    identity: Identity,
    Path(order_id): Path<String>,
) -> AppResult<StatusCode> {
    identity.require(Role::Restaurant)?;
    state
        .orders
        .delete_order(identity.user_id, &order_id)
        .await?;
    Ok(StatusCode::NO_CONTENT)
}
