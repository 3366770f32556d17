//! Outbound collaborator gateways
//!
//! Trait seams over the payment, delivery and customer services. The
//! production implementations speak JSON over HTTP via reqwest with a
//! bounded per-request timeout; tests script the traits directly.

pub mod customer;
pub mod delivery;
pub mod payment;

pub use customer::{CustomerDirectory, HttpCustomerDirectory};
pub use delivery::{DeliveryGateway, HttpDeliveryGateway};
pub use payment::{HttpPaymentGateway, PaymentGateway};

use std::time::Duration;
use thiserror::Error;

/// Errors surfaced by collaborator gateways
#[derive(Debug, Error)]
pub enum GatewayError {
    #[error("{service} request failed: {source}")]
    Request {
        service: &'static str,
        #[source]
        source: reqwest::Error,
    },

    #[error("{service} returned status {status}: {body}")]
    Status {
        service: &'static str,
        status: u16,
        body: String,
    },
}

/// Result type for gateway calls
pub type GatewayResult<T> = Result<T, GatewayError>;

/// Build the shared reqwest client with the configured request timeout.
pub(crate) fn build_http_client(timeout: Duration) -> reqwest::Client {
    reqwest::Client::builder()
        .timeout(timeout)
        .build()
        .expect("Failed to build HTTP client")
}

/// Normalize a configured base URL (no trailing slash).
pub(crate) fn normalize_base_url(base_url: &str) -> String {
    base_url.trim_end_matches('/').to_string()
}
