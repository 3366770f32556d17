//! Order API Module
//!
//! Thin request layer over the orchestrator: header identity, role checks
//! and HTTP mapping. No orchestration logic lives here.

mod handler;

use axum::{
    Router,
    routing::{get, post, put},
};

use crate::core::ServerState;

/// Order router
pub fn router() -> Router<ServerState> {
    Router::new().nest("/api/orders", routes())
}

fn routes() -> Router<ServerState> {
    Router::new()
        // Place a new order (idempotent per Idempotency-Key header)
        .route("/", post(handler::place_order))
        // Orders of the calling customer
        .route("/user", get(handler::get_user_orders))
        // Orders owned by the calling restaurant
        .route("/restaurant", get(handler::get_restaurant_orders))
        // Status transition by the owning restaurant
        .route("/status", put(handler::update_order_status))
        // Order detail / deletion
        .route(
            "/{order_id}",
            get(handler::get_order_details).delete(handler::delete_order),
        )
}
