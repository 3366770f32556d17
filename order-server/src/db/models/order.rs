//! Order aggregate (persisted model)
//!
//! The order document owns its line items by value; items carry no
//! back-reference to the order. Immutable fields (`user_id`,
//! `restaurant_id`, `idempotency_key`, `items`, `total_amount`) are set at
//! creation and never rewritten; `status` and the delivery/payment
//! references are only mutated through the orchestrator.

use serde::{Deserialize, Serialize};
use shared::order::{OrderItemDto, OrderStatus};
use surrealdb::RecordId;

/// Persisted order record
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Order {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<RecordId>,
    pub idempotency_key: String,
    pub user_id: i64,
    pub restaurant_id: i64,
    pub status: OrderStatus,
    pub delivery_address: String,
    pub total_amount: f64,
    /// Unix millis, set at creation.
    pub order_time: i64,
    /// Unix millis, stamped on completion.
    #[serde(default)]
    pub delivery_time: Option<i64>,
    /// Set once after a successful payment capture.
    #[serde(default)]
    pub payment_id: Option<i64>,
    /// Set once a delivery agent is assigned.
    #[serde(default)]
    pub delivery_agent_id: Option<i64>,
    #[serde(default)]
    pub delivery_id: Option<i64>,
    pub items: Vec<OrderItem>,
}

/// Line item owned by its order. Quantity and unit price are frozen at
/// order time.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct OrderItem {
    pub menu_item_id: i64,
    pub item_name: String,
    pub quantity: i32,
    pub price: f64,
}

impl Order {
    /// String form of the record id ("order:<key>").
    pub fn external_id(&self) -> String {
        self.id
            .as_ref()
            .map(|id| id.to_string())
            .unwrap_or_default()
    }
}

impl From<&OrderItemDto> for OrderItem {
    fn from(dto: &OrderItemDto) -> Self {
        Self {
            menu_item_id: dto.menu_item_id,
            item_name: dto.item_name.clone(),
            quantity: dto.quantity,
            price: dto.price,
        }
    }
}

impl From<&OrderItem> for OrderItemDto {
    fn from(item: &OrderItem) -> Self {
        Self {
            menu_item_id: item.menu_item_id,
            item_name: item.item_name.clone(),
            quantity: item.quantity,
            price: item.price,
        }
    }
}
