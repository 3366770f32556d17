//! Payment service contract

use serde::{Deserialize, Serialize};

/// Payment method selected by the customer.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
pub enum PaymentMethod {
    Cash,
    #[default]
    Card,
    Online,
}

/// Payment status as reported by the payment service.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum PaymentStatus {
    Pending,
    Success,
    Failed,
}

/// Capture request sent to the payment service. One capture per order;
/// the payment service rejects duplicates for the same order id.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PaymentRequest {
    pub order_id: String,
    pub payment_amount: f64,
    pub payment_method: PaymentMethod,
    /// Initiator of the payment (the ordering user).
    pub created_by: String,
}

/// Capture response.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PaymentResponse {
    pub payment_id: i64,
    pub payment_status: PaymentStatus,
}
