//! Order wire DTOs

use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::models::PaymentMethod;
use crate::order::OrderStatus;

/// Line item as submitted with an order and echoed back in responses.
///
/// Name and unit price are snapshots taken at order time; later catalog
/// changes do not affect existing orders.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct OrderItemDto {
    pub menu_item_id: i64,
    pub item_name: String,
    pub quantity: i32,
    pub price: f64,
}

/// Place-order request body.
///
/// The acting user comes from the identity headers, never from the body;
/// item prices were already validated against the catalog upstream.
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct OrderRequest {
    pub restaurant_id: i64,
    #[validate(length(min = 1, message = "delivery address is required"))]
    pub delivery_address: String,
    #[validate(length(min = 1, message = "cannot place order with empty items"))]
    pub items: Vec<OrderItemDto>,
    /// Defaults to card when omitted.
    #[serde(default)]
    pub payment_method: Option<PaymentMethod>,
}

/// Status transition request (the acting restaurant id is injected from the
/// identity headers).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OrderStatusUpdate {
    pub order_id: String,
    pub status: OrderStatus,
}

/// External representation of an order.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OrderDto {
    pub order_id: String,
    pub user_id: i64,
    pub restaurant_id: i64,
    pub status: OrderStatus,
    pub delivery_address: String,
    pub total_amount: f64,
    /// Unix millis, set at creation.
    pub order_time: i64,
    /// Unix millis, set at terminal delivery completion.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub delivery_time: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub payment_id: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub delivery_agent_id: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub delivery_id: Option<i64>,
    pub idempotency_key: String,
    /// Best-effort customer enrichment (fallback when the profile service
    /// is down).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub customer_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub customer_phone: Option<String>,
    pub items: Vec<OrderItemDto>,
}
