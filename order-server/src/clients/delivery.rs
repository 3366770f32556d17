//! Delivery service client

use async_trait::async_trait;
use std::time::Duration;

use super::{GatewayError, GatewayResult};
use shared::models::{AgentCreate, AgentResponse, DeliveryStatusUpdate};

const SERVICE: &str = "delivery-service";

/// Delivery/agent collaborator.
#[async_trait]
pub trait DeliveryGateway: Send + Sync {
    /// Create (and implicitly assign) a delivery agent.
    async fn create_agent(&self, request: &AgentCreate) -> GatewayResult<AgentResponse>;

    /// Push a delivery status update. Callers treat this as
    /// fire-and-forget; the order's own state stays authoritative.
    async fn update_delivery_status(
        &self,
        delivery_id: i64,
        update: &DeliveryStatusUpdate,
    ) -> GatewayResult<()>;
}

/// HTTP delivery gateway
#[derive(Debug, Clone)]
pub struct HttpDeliveryGateway {
    client: reqwest::Client,
    base_url: String,
}

impl HttpDeliveryGateway {
    pub fn new(base_url: &str, timeout: Duration) -> Self {
        Self {
            client: super::build_http_client(timeout),
            base_url: super::normalize_base_url(base_url),
        }
    }
}

#[async_trait]
impl DeliveryGateway for HttpDeliveryGateway {
    async fn create_agent(&self, request: &AgentCreate) -> GatewayResult<AgentResponse> {
        let url = format!("{}/api/agents", self.base_url);

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

    async fn update_delivery_status(
        &self,
        delivery_id: i64,
        update: &DeliveryStatusUpdate,
    ) -> GatewayResult<()> {
        let url = format!("{}/api/deliveries/{}/status", self.base_url, delivery_id);

        let response = self
            .client
            .put(&url)
            .json(update)
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

        Ok(())
    }
}
