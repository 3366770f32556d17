//! Payment service client

use async_trait::async_trait;
use std::time::Duration;

use super::{GatewayError, GatewayResult};
use shared::models::{PaymentRequest, PaymentResponse};

const SERVICE: &str = "payment-service";

/// Synchronous payment capture endpoint.
///
/// Capture failures are business failures for the caller to surface; the
/// gateway performs no automatic retry.
#[async_trait]
pub trait PaymentGateway: Send + Sync {
    async fn capture(&self, request: &PaymentRequest) -> GatewayResult<PaymentResponse>;
}

/// HTTP payment gateway
#[derive(Debug, Clone)]
pub struct HttpPaymentGateway {
    client: reqwest::Client,
    base_url: String,
}

impl HttpPaymentGateway {
    pub fn new(base_url: &str, timeout: Duration) -> Self {
        Self {
            client: super::build_http_client(timeout),
            base_url: super::normalize_base_url(base_url),
        }
    }
}

#[async_trait]
impl PaymentGateway for HttpPaymentGateway {
    async fn capture(&self, request: &PaymentRequest) -> GatewayResult<PaymentResponse> {
        let url = format!("{}/api/payments", self.base_url);

        let response = self
            .client
            .post(&url)
            .json(request)
            .send()
            .await
            .map_err(|e| GatewayError::Request {
                service: SERVICE,
                source: e,
            })?;

        if !response.status().is_success() {
            let status = response.status().as_u16();
            let body = response.text().await.unwrap_or_default();
            return Err(GatewayError::Status {
                service: SERVICE,
                status,
                body,
            });
        }

        response.json().await.map_err(|e| GatewayError::Request {
            service: SERVICE,
            source: e,
        })
    }
}
