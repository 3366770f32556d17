//! Order lifecycle orchestrator
//!
//! Composes the order store, the payment/delivery/customer gateways, the
//! per-order locks and the completion scheduler to implement order
//! placement, status transitions, deferred auto-completion, deletion and
//! the read projections.
//!
//! # Placement flow
//!
//! ```text
//! place_order(user, key, request)
//!     ├─ 1. Idempotency pre-check (replay stored order)
//!     ├─ 2. Validate request and line items
//!     ├─ 3. Compute total (Decimal)
//!     ├─ 4. Persist PENDING order + items (unique index = final arbiter)
//!     ├─ 5. Capture payment (no retry; failure leaves PENDING row)
//!     ├─ 6. Persist payment reference
//!     └─ 7. Return enriched DTO
//! ```
//!
//! # Status update flow
//!
//! ```text
//! update_status(restaurant, order, target)
//!     ├─ 1. Acquire per-order lock (bounded wait)
//!     ├─ 2. Ownership check, transition-table check
//!     ├─ 3. Pre-persist side effect
//!     │      OUT_FOR_DELIVERY: assign agent (must succeed first)
//!     │      COMPLETED: stamp delivery time
//!     ├─ 4. Persist status + side-effect fields atomically
//!     ├─ 5. Post-persist side effects
//!     │      OUT_FOR_DELIVERY: schedule deferred completion job
//!     │      COMPLETED: cancel pending job, push DELIVERED (swallowed)
//!     │      CANCELLED: cancel pending job
//!     └─ 6. Return enriched DTO
//! ```

use std::sync::Arc;
use std::time::Duration;

use surrealdb::RecordId;
use tokio::sync::OwnedMutexGuard;
use tokio_util::sync::CancellationToken;
use validator::Validate;

use shared::models::{
    AgentCreate, AgentResponse, AgentStatus, CustomerProfile, DeliveryStatus,
    DeliveryStatusUpdate, PaymentRequest,
};
use shared::order::{OrderDto, OrderItemDto, OrderRequest, OrderStatus, OrderStatusUpdate};

use crate::clients::{CustomerDirectory, DeliveryGateway, PaymentGateway};
use crate::common::{AppError, AppResult};
use crate::db::models::{Order, OrderItem};
use crate::db::repository::{OrderRepository, RepoError, StatusPatch};
use crate::orders::completion::CompletionScheduler;
use crate::orders::locks::OrderLocks;
use crate::orders::money;

/// Operation bounds for the orchestrator.
#[derive(Debug, Clone)]
pub struct OrderSettings {
    /// Upper bound for the whole placement operation.
    pub place_timeout: Duration,
    /// Upper bound for acquiring an order's row lock.
    pub lock_timeout: Duration,
    /// Deferred auto-completion delay window.
    pub auto_complete_min: Duration,
    pub auto_complete_max: Duration,
}

impl Default for OrderSettings {
    fn default() -> Self {
        Self {
            place_timeout: Duration::from_secs(30),
            lock_timeout: Duration::from_secs(10),
            auto_complete_min: Duration::from_secs(30),
            auto_complete_max: Duration::from_secs(45),
        }
    }
}

/// Order lifecycle orchestrator. Cheap to clone: every field is a shared
/// handle, so the deferred completion task can own its own copy.
#[derive(Clone)]
pub struct OrderService {
    repo: OrderRepository,
    payment: Arc<dyn PaymentGateway>,
    delivery: Arc<dyn DeliveryGateway>,
    customers: Arc<dyn CustomerDirectory>,
    locks: Arc<OrderLocks>,
    scheduler: Arc<CompletionScheduler>,
    settings: OrderSettings,
}

impl OrderService {
    pub fn new(
        repo: OrderRepository,
        payment: Arc<dyn PaymentGateway>,
        delivery: Arc<dyn DeliveryGateway>,
        customers: Arc<dyn CustomerDirectory>,
        settings: OrderSettings,
        shutdown: CancellationToken,
    ) -> Self {
        let scheduler = Arc::new(CompletionScheduler::new(
            settings.auto_complete_min,
            settings.auto_complete_max,
            shutdown,
        ));
        Self {
            repo,
            payment,
            delivery,
            customers,
            locks: Arc::new(OrderLocks::new()),
            scheduler,
            settings,
        }
    }

    /// Completion job registry (used by flow tests).
    #[cfg(test)]
    pub(crate) fn jobs(&self) -> &CompletionScheduler {
        &self.scheduler
    }

    // ========================================================================
    // Placement
    // ========================================================================

    /// Place an order exactly once per idempotency key.
    ///
    /// Bounded by `place_timeout`; a timeout aborts the operation without
    /// leaving a half-written document (every write is a single atomic
    /// document operation).
    pub async fn place_order(
        &self,
        user_id: i64,
        idempotency_key: &str,
        request: OrderRequest,
    ) -> AppResult<OrderDto> {
        tokio::time::timeout(
            self.settings.place_timeout,
            self.place_order_inner(user_id, idempotency_key, request),
        )
        .await
        .map_err(|_| AppError::timeout("Order placement timed out"))?
    }

    async fn place_order_inner(
        &self,
        user_id: i64,
        idempotency_key: &str,
        request: OrderRequest,
    ) -> AppResult<OrderDto> {
        tracing::info!(
            user_id,
            restaurant_id = request.restaurant_id,
            idempotency_key,
            "Received place order request"
        );

        if idempotency_key.trim().is_empty() {
            return Err(AppError::validation("Idempotency key is required"));
        }

        // Idempotency pre-check: replay the stored order for a known key,
        // with no second payment capture.
        if self.repo.exists_by_idempotency_key(idempotency_key).await? {
            tracing::warn!(idempotency_key, "Duplicate order placement");
            return self.replay_existing(idempotency_key).await;
        }

        request.validate()?;
        for item in &request.items {
            money::validate_item(item)?;
        }

        let total_amount = money::order_total(&request.items);
        tracing::info!(total_amount, "Computed order total");

        let order = Order {
            id: None,
            idempotency_key: idempotency_key.to_string(),
            user_id,
            restaurant_id: request.restaurant_id,
            status: OrderStatus::Pending,
            delivery_address: request.delivery_address.clone(),
            total_amount,
            order_time: shared::util::now_millis(),
            delivery_time: None,
            payment_id: None,
            delivery_agent_id: None,
            delivery_id: None,
            items: request.items.iter().map(OrderItem::from).collect(),
        };

        // Persist PENDING before payment so a capture failure leaves a
        // traceable order row. Two racing requests with the same key cannot
        // both pass the unique index; the loser re-reads.
        let saved = match self.repo.create(order).await {
            Ok(saved) => saved,
            Err(RepoError::Duplicate(_)) => {
                tracing::warn!(idempotency_key, "Lost creation race, replaying stored order");
                return self.replay_existing(idempotency_key).await;
            }
            Err(e) => return Err(e.into()),
        };

        let record_id = saved
            .id
            .clone()
            .ok_or_else(|| AppError::internal("Stored order has no record id"))?;
        let order_id = saved.external_id();

        let payment_request = PaymentRequest {
            order_id: order_id.clone(),
            payment_amount: saved.total_amount,
            payment_method: request.payment_method.unwrap_or_default(),
            created_by: user_id.to_string(),
        };

        let payment = match self.payment.capture(&payment_request).await {
            Ok(response) => response,
            Err(e) => {
                // No compensation: the order stays PENDING with no payment
                // reference, an acknowledged gap.
                tracing::error!(order_id = %order_id, error = %e, "Payment capture failed");
                return Err(AppError::business_rule("Payment processing failed"));
            }
        };
        tracing::info!(
            order_id = %order_id,
            payment_id = payment.payment_id,
            "Payment captured"
        );

        let updated = self.repo.set_payment_id(&record_id, payment.payment_id).await?;

        tracing::info!(order_id = %order_id, "Order placed");
        Ok(self.to_dto(updated).await)
    }

    /// Re-read the order for a used idempotency key. A used key without a
    /// matching order is an unrecoverable consistency fault.
    async fn replay_existing(&self, idempotency_key: &str) -> AppResult<OrderDto> {
        match self.repo.find_by_idempotency_key(idempotency_key).await? {
            Some(order) => Ok(self.to_dto(order).await),
            None => {
                tracing::error!(idempotency_key, "Idempotency key exists but order not found");
                Err(AppError::internal("Inconsistent idempotency state"))
            }
        }
    }

    // ========================================================================
    // Status update
    // ========================================================================

    /// Transition an order on behalf of its restaurant.
    pub async fn update_status(
        &self,
        restaurant_id: i64,
        update: OrderStatusUpdate,
    ) -> AppResult<OrderDto> {
        tracing::info!(
            order_id = %update.order_id,
            status = %update.status,
            restaurant_id,
            "Updating order status"
        );

        let record_id = OrderRepository::parse_id(&update.order_id)?;
        let guard = self.lock(&update.order_id).await?;

        let order = self
            .repo
            .find_by_id(&record_id)
            .await?
            .ok_or_else(|| AppError::not_found(format!("Order {} not found", update.order_id)))?;

        if order.restaurant_id != restaurant_id {
            tracing::warn!(
                order_id = %update.order_id,
                restaurant_id,
                "Unauthorized status update attempt"
            );
            return Err(AppError::forbidden(
                "Restaurant is not authorized to update this order",
            ));
        }

        if !order.status.can_transition_to(update.status) {
            tracing::warn!(
                from = %order.status,
                to = %update.status,
                "Invalid status transition"
            );
            return Err(AppError::conflict(format!(
                "Invalid status transition from {} to {}",
                order.status, update.status
            )));
        }

        let updated = self.apply_transition(&record_id, &order, update.status).await?;

        // Enrichment is a remote call; do not hold the row lock across it.
        drop(guard);

        tracing::info!(
            order_id = %update.order_id,
            status = %updated.status,
            "Order status updated"
        );
        Ok(self.to_dto(updated).await)
    }

    async fn lock(&self, order_id: &str) -> AppResult<OwnedMutexGuard<()>> {
        self.locks
            .acquire(order_id, self.settings.lock_timeout)
            .await
            .ok_or_else(|| AppError::conflict("Order is locked by a concurrent update"))
    }

    /// Persist a validated transition and dispatch its side effects. The
    /// caller holds the order lock.
    ///
    /// Agent assignment must succeed before OUT_FOR_DELIVERY is persisted;
    /// that remote call is the dominant latency and failure source of the
    /// transition. The delivery status push on completion is dispatched
    /// outside the lock.
    async fn apply_transition(
        &self,
        record_id: &RecordId,
        order: &Order,
        target: OrderStatus,
    ) -> AppResult<Order> {
        let order_id = order.external_id();
        let mut patch = StatusPatch::new(target);

        match target {
            OrderStatus::OutForDelivery => {
                let agent = self.assign_delivery_agent(&order_id).await?;
                patch.delivery_agent_id = Some(agent.agent_id);
                patch.delivery_id = agent.delivery_id;
            }
            OrderStatus::Completed => {
                patch.delivery_time = Some(shared::util::now_millis());
            }
            _ => {}
        }

        let updated = self.repo.apply_transition(record_id, patch).await?;

        match target {
            OrderStatus::OutForDelivery => {
                self.schedule_auto_completion(&order_id);
            }
            OrderStatus::Completed => {
                // A manual completion beats any pending deferred job.
                self.scheduler.cancel(&order_id);
                self.push_delivered(&updated);
            }
            OrderStatus::Cancelled => {
                self.scheduler.cancel(&order_id);
            }
            _ => {}
        }

        Ok(updated)
    }

    async fn assign_delivery_agent(&self, order_id: &str) -> AppResult<AgentResponse> {
        let create = AgentCreate {
            agent_name: format!("AutoAgent_{}", uuid::Uuid::new_v4()),
            agent_phone_number: "9999999999".to_string(),
            agent_status: AgentStatus::Assigned,
        };

        match self.delivery.create_agent(&create).await {
            Ok(agent) => {
                tracing::info!(
                    order_id = %order_id,
                    agent_id = agent.agent_id,
                    "Delivery agent assigned"
                );
                Ok(agent)
            }
            Err(e) => {
                tracing::error!(
                    order_id = %order_id,
                    error = %e,
                    "Delivery agent assignment failed"
                );
                Err(AppError::dependency("Delivery service unavailable"))
            }
        }
    }

    /// Push the DELIVERED update to the delivery service. Fire-and-forget:
    /// the order's own state is already authoritative, so a failed push is
    /// logged and swallowed.
    fn push_delivered(&self, order: &Order) {
        let Some(delivery_id) = order.delivery_id else {
            tracing::warn!(
                order_id = %order.external_id(),
                "Order completed without a delivery id, skipping status push"
            );
            return;
        };

        let delivery = Arc::clone(&self.delivery);
        let order_id = order.external_id();
        let update = DeliveryStatusUpdate {
            status: DeliveryStatus::Delivered,
            timestamp: shared::util::now_millis(),
        };

        tokio::spawn(async move {
            match delivery.update_delivery_status(delivery_id, &update).await {
                Ok(()) => {
                    tracing::info!(order_id = %order_id, delivery_id, "Delivery status pushed");
                }
                Err(e) => {
                    tracing::error!(
                        order_id = %order_id,
                        delivery_id,
                        error = %e,
                        "Failed to push delivery status"
                    );
                }
            }
        });
    }

    // ========================================================================
    // Deferred auto-completion
    // ========================================================================

    fn schedule_auto_completion(&self, order_id: &str) {
        let service = self.clone();
        let id = order_id.to_string();
        self.scheduler.schedule(order_id, async move {
            service.auto_complete(&id).await;
        });
    }

    /// Deferred completion entry point: runs outside any request, re-enters
    /// the transition logic and completes the order only if it is still
    /// OUT_FOR_DELIVERY (a manual transition in the meantime wins).
    pub async fn auto_complete(&self, order_id: &str) {
        let record_id = match OrderRepository::parse_id(order_id) {
            Ok(id) => id,
            Err(e) => {
                tracing::error!(order_id, error = %e, "Invalid order id in completion job");
                return;
            }
        };

        let Some(_guard) = self
            .locks
            .acquire(order_id, self.settings.lock_timeout)
            .await
        else {
            tracing::warn!(order_id, "Could not lock order for auto-completion, skipping");
            return;
        };

        let order = match self.repo.find_by_id(&record_id).await {
            Ok(Some(order)) => order,
            Ok(None) => {
                tracing::warn!(order_id, "Order vanished before auto-completion");
                return;
            }
            Err(e) => {
                tracing::error!(order_id, error = %e, "Failed to load order for auto-completion");
                return;
            }
        };

        if order.status != OrderStatus::OutForDelivery
            || !order.status.can_transition_to(OrderStatus::Completed)
        {
            tracing::debug!(
                order_id,
                status = %order.status,
                "Order left OUT_FOR_DELIVERY, auto-completion skipped"
            );
            return;
        }

        match self
            .apply_transition(&record_id, &order, OrderStatus::Completed)
            .await
        {
            Ok(_) => tracing::info!(order_id, "Order auto-completed"),
            Err(e) => tracing::error!(order_id, error = %e, "Auto-completion failed"),
        }
    }

    // ========================================================================
    // Read paths
    // ========================================================================

    pub async fn get_order(&self, order_id: &str) -> AppResult<OrderDto> {
        let record_id = OrderRepository::parse_id(order_id)?;
        let order = self
            .repo
            .find_by_id(&record_id)
            .await?
            .ok_or_else(|| AppError::not_found(format!("Order {order_id} not found")))?;
        Ok(self.to_dto(order).await)
    }

    pub async fn list_user_orders(&self, user_id: i64) -> AppResult<Vec<OrderDto>> {
        let orders = self.repo.find_by_user(user_id).await?;
        let mut dtos = Vec::with_capacity(orders.len());
        for order in orders {
            dtos.push(self.to_dto(order).await);
        }
        Ok(dtos)
    }

    pub async fn list_restaurant_orders(&self, restaurant_id: i64) -> AppResult<Vec<OrderDto>> {
        let orders = self.repo.find_by_restaurant(restaurant_id).await?;
        let mut dtos = Vec::with_capacity(orders.len());
        for order in orders {
            dtos.push(self.to_dto(order).await);
        }
        Ok(dtos)
    }

    // ========================================================================
    // Deletion
    // ========================================================================

    /// Delete an order owned by the restaurant, only from a terminal
    /// status.
    pub async fn delete_order(&self, restaurant_id: i64, order_id: &str) -> AppResult<()> {
        tracing::info!(order_id, restaurant_id, "Deleting order");

        let record_id = OrderRepository::parse_id(order_id)?;
        let guard = self.lock(order_id).await?;

        let order = self
            .repo
            .find_by_id(&record_id)
            .await?
            .ok_or_else(|| AppError::not_found(format!("Order {order_id} not found")))?;

        if order.restaurant_id != restaurant_id {
            tracing::warn!(order_id, restaurant_id, "Unauthorized delete attempt");
            return Err(AppError::forbidden(
                "Order does not belong to the requesting restaurant",
            ));
        }

        if !order.status.is_terminal() {
            return Err(AppError::conflict(format!(
                "Only completed, cancelled or declined orders can be deleted, current status: {}",
                order.status
            )));
        }

        self.repo.delete(&record_id).await?;
        self.scheduler.cancel(order_id);

        drop(guard);
        self.locks.remove(order_id);

        tracing::info!(order_id, "Order deleted");
        Ok(())
    }

    // ========================================================================
    // Conversion
    // ========================================================================

    /// Convert to the external representation, enriched with a best-effort
    /// customer profile lookup. Enrichment failure never fails the read.
    async fn to_dto(&self, order: Order) -> OrderDto {
        let profile = match self.customers.profile(order.user_id).await {
            Ok(profile) => profile,
            Err(e) => {
                tracing::warn!(
                    user_id = order.user_id,
                    error = %e,
                    "Customer lookup failed, using fallback"
                );
                CustomerProfile::fallback(order.user_id)
            }
        };

        OrderDto {
            order_id: order.external_id(),
            user_id: order.user_id,
            restaurant_id: order.restaurant_id,
            status: order.status,
            delivery_address: order.delivery_address.clone(),
            total_amount: order.total_amount,
            order_time: order.order_time,
            delivery_time: order.delivery_time,
            payment_id: order.payment_id,
            delivery_agent_id: order.delivery_agent_id,
            delivery_id: order.delivery_id,
            idempotency_key: order.idempotency_key.clone(),
            customer_name: Some(profile.name),
            customer_phone: profile.phone,
            items: order.items.iter().map(OrderItemDto::from).collect(),
        }
    }
}
