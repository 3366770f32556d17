//! Delivery service contract

use serde::{Deserialize, Serialize};

/// Delivery agent availability.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum AgentStatus {
    Available,
    Assigned,
    Offline,
}

/// Delivery progress as tracked by the delivery service.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum DeliveryStatus {
    Assigned,
    InTransit,
    Delivered,
}

/// Agent creation request.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AgentCreate {
    pub agent_name: String,
    pub agent_phone_number: String,
    pub agent_status: AgentStatus,
}

/// Agent creation response.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AgentResponse {
    pub agent_id: i64,
    /// Delivery record opened alongside the assignment, when the delivery
    /// service tracks one.
    #[serde(default)]
    pub delivery_id: Option<i64>,
}

/// Status push for an existing delivery.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DeliveryStatusUpdate {
    pub status: DeliveryStatus,
    /// Unix millis at which the status became effective.
    pub timestamp: i64,
}
