//! Customer service client

use async_trait::async_trait;
use std::time::Duration;

use super::{GatewayError, GatewayResult};
use shared::models::CustomerProfile;

const SERVICE: &str = "customer-service";

/// Customer profile lookup.
///
/// Callers treat failures as non-fatal and fall back to
/// [`CustomerProfile::fallback`]; enrichment must never fail a read.
#[async_trait]
pub trait CustomerDirectory: Send + Sync {
    async fn profile(&self, user_id: i64) -> GatewayResult<CustomerProfile>;
}

/// HTTP customer directory
#[derive(Debug, Clone)]
pub struct HttpCustomerDirectory {
    client: reqwest::Client,
    base_url: String,
}

impl HttpCustomerDirectory {
    pub fn new(base_url: &str, timeout: Duration) -> Self {
        Self {
            client: super::build_http_client(timeout),
            base_url: super::normalize_base_url(base_url),
        }
    }
}

#[async_trait]
impl CustomerDirectory for HttpCustomerDirectory {
    async fn profile(&self, user_id: i64) -> GatewayResult<CustomerProfile> {
        let url = format!("{}/api/customers/user", self.base_url);

        // The customer service expects the same internal identity headers
        // the gateway forwards.
        let response = self
            .client
            .get(&url)
            .header("X-Internal-User-Id", user_id.to_string())
            .header("X-Internal-User-Roles", "CUSTOMER")
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
