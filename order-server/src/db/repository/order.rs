//! Order Repository
//!
//! All order mutations are single-document operations, so each one is
//! atomic on its own: a failed operation never leaves a half-written
//! order. Serialization of concurrent mutations on the same order is the
//! orchestrator's job (per-order locks), not the store's.

use serde::{Deserialize, Serialize};
use surrealdb::engine::local::Db;
use surrealdb::{RecordId, Surreal};

use super::{BaseRepository, RepoError, RepoResult};
use crate::db::models::Order;
use shared::order::OrderStatus;

const TABLE: &str = "order";

/// Fields written alongside a status change. `None` fields are left
/// untouched by the merge.
#[derive(Debug, Clone, Serialize)]
pub struct StatusPatch {
    pub status: OrderStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub delivery_time: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub delivery_agent_id: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub delivery_id: Option<i64>,
}

impl StatusPatch {
    pub fn new(status: OrderStatus) -> Self {
        Self {
            status,
            delivery_time: None,
            delivery_agent_id: None,
            delivery_id: None,
        }
    }
}

#[derive(Clone)]
pub struct OrderRepository {
    base: BaseRepository,
}

impl OrderRepository {
    pub fn new(db: Surreal<Db>) -> Self {
        Self {
            base: BaseRepository::new(db),
        }
    }

    /// Parse an external order id ("order:<key>") into a RecordId.
    pub fn parse_id(order_id: &str) -> RepoResult<RecordId> {
        let record_id: RecordId = order_id
            .parse()
            .map_err(|_| RepoError::Validation(format!("Invalid order ID format: {order_id}")))?;
        if record_id.table() != TABLE {
            return Err(RepoError::Validation(format!(
                "Invalid order ID format: {order_id}"
            )));
        }
        Ok(record_id)
    }

    /// Insert a new order together with its line items (one document).
    ///
    /// A unique-index violation on `idempotency_key` surfaces as
    /// [`RepoError::Duplicate`]; callers treat it as "duplicate, go
    /// re-read".
    pub async fn create(&self, order: Order) -> RepoResult<Order> {
        let created: Option<Order> = self.base.db().create(TABLE).content(order).await?;
        created.ok_or_else(|| RepoError::Database("Insert returned no record".to_string()))
    }

    pub async fn find_by_id(&self, id: &RecordId) -> RepoResult<Option<Order>> {
        let order: Option<Order> = self.base.db().select(id.clone()).await?;
        Ok(order)
    }

    /// Whether any order was ever created for this idempotency key.
    pub async fn exists_by_idempotency_key(&self, key: &str) -> RepoResult<bool> {
        #[derive(Debug, Deserialize)]
        struct CountRow {
            total: i64,
        }

        let mut result = self
            .base
            .db()
            .query("SELECT count() AS total FROM order WHERE idempotency_key = $key GROUP ALL")
            .bind(("key", key.to_string()))
            .await?;

        let rows: Vec<CountRow> = result.take(0)?;
        Ok(rows.first().map(|r| r.total > 0).unwrap_or(false))
    }

    pub async fn find_by_idempotency_key(&self, key: &str) -> RepoResult<Option<Order>> {
        let mut result = self
            .base
            .db()
            .query("SELECT * FROM order WHERE idempotency_key = $key LIMIT 1")
            .bind(("key", key.to_string()))
            .await?;

        let orders: Vec<Order> = result.take(0)?;
        Ok(orders.into_iter().next())
    }

    pub async fn find_by_user(&self, user_id: i64) -> RepoResult<Vec<Order>> {
        let mut result = self
            .base
            .db()
            .query("SELECT * FROM order WHERE user_id = $user_id ORDER BY order_time DESC")
            .bind(("user_id", user_id))
            .await?;

        let orders: Vec<Order> = result.take(0)?;
        Ok(orders)
    }

    pub async fn find_by_restaurant(&self, restaurant_id: i64) -> RepoResult<Vec<Order>> {
        let mut result = self
            .base
            .db()
            .query("SELECT * FROM order WHERE restaurant_id = $restaurant_id ORDER BY order_time DESC")
            .bind(("restaurant_id", restaurant_id))
            .await?;

        let orders: Vec<Order> = result.take(0)?;
        Ok(orders)
    }

    /// Record the captured payment reference.
    pub async fn set_payment_id(&self, id: &RecordId, payment_id: i64) -> RepoResult<Order> {
        let updated: Option<Order> = self
            .base
            .db()
            .update(id.clone())
            .merge(serde_json::json!({ "payment_id": payment_id }))
            .await?;
        updated.ok_or_else(|| RepoError::NotFound(format!("Order {id} not found")))
    }

    /// Apply a status transition and its side-effect fields in one atomic
    /// document update.
    pub async fn apply_transition(&self, id: &RecordId, patch: StatusPatch) -> RepoResult<Order> {
        let updated: Option<Order> = self.base.db().update(id.clone()).merge(patch).await?;
        updated.ok_or_else(|| RepoError::NotFound(format!("Order {id} not found")))
    }

    pub async fn delete(&self, id: &RecordId) -> RepoResult<()> {
        let _deleted: Option<Order> = self.base.db().delete(id.clone()).await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::DbService;
    use crate::db::models::OrderItem;

    fn sample_order(key: &str, user_id: i64, restaurant_id: i64) -> Order {
        Order {
            id: None,
            idempotency_key: key.to_string(),
            user_id,
            restaurant_id,
            status: OrderStatus::Pending,
            delivery_address: "12 Main St".to_string(),
            total_amount: 35.0,
            order_time: shared::util::now_millis(),
            delivery_time: None,
            payment_id: None,
            delivery_agent_id: None,
            delivery_id: None,
            items: vec![OrderItem {
                menu_item_id: 1,
                item_name: "Margherita".to_string(),
                quantity: 2,
                price: 10.0,
            }],
        }
    }

    async fn repo() -> OrderRepository {
        let service = DbService::open_in_memory().await.unwrap();
        OrderRepository::new(service.db)
    }

    #[tokio::test]
    async fn test_create_and_find_by_id() {
        let repo = repo().await;
        let created = repo.create(sample_order("key-1", 7, 42)).await.unwrap();
        let id = created.id.clone().unwrap();

        let found = repo.find_by_id(&id).await.unwrap().unwrap();
        assert_eq!(found.idempotency_key, "key-1");
        assert_eq!(found.status, OrderStatus::Pending);
        assert_eq!(found.items.len(), 1);
    }

    #[tokio::test]
    async fn test_duplicate_idempotency_key_is_rejected_by_index() {
        let repo = repo().await;
        repo.create(sample_order("key-dup", 7, 42)).await.unwrap();

        let result = repo.create(sample_order("key-dup", 8, 43)).await;
        assert!(matches!(result, Err(RepoError::Duplicate(_))));

        // The stored order is the first one.
        let stored = repo
            .find_by_idempotency_key("key-dup")
            .await
            .unwrap()
            .unwrap();
        assert_eq!(stored.user_id, 7);
    }

    #[tokio::test]
    async fn test_exists_by_idempotency_key() {
        let repo = repo().await;
        assert!(!repo.exists_by_idempotency_key("key-x").await.unwrap());
        repo.create(sample_order("key-x", 7, 42)).await.unwrap();
        assert!(repo.exists_by_idempotency_key("key-x").await.unwrap());
    }

    #[tokio::test]
    async fn test_find_by_user_and_restaurant() {
        let repo = repo().await;
        repo.create(sample_order("k1", 7, 42)).await.unwrap();
        repo.create(sample_order("k2", 7, 43)).await.unwrap();
        repo.create(sample_order("k3", 8, 42)).await.unwrap();

        assert_eq!(repo.find_by_user(7).await.unwrap().len(), 2);
        assert_eq!(repo.find_by_restaurant(42).await.unwrap().len(), 2);
        assert!(repo.find_by_user(99).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_apply_transition_merges_only_patch_fields() {
        let repo = repo().await;
        let created = repo.create(sample_order("k-t", 7, 42)).await.unwrap();
        let id = created.id.clone().unwrap();

        let mut patch = StatusPatch::new(OrderStatus::Accepted);
        patch.delivery_agent_id = None;
        let updated = repo.apply_transition(&id, patch).await.unwrap();

        assert_eq!(updated.status, OrderStatus::Accepted);
        // Untouched fields survive the merge.
        assert_eq!(updated.idempotency_key, "k-t");
        assert_eq!(updated.total_amount, 35.0);
        assert_eq!(updated.items.len(), 1);
        assert!(updated.delivery_agent_id.is_none());
    }

    #[tokio::test]
    async fn test_set_payment_id() {
        let repo = repo().await;
        let created = repo.create(sample_order("k-p", 7, 42)).await.unwrap();
        let id = created.id.clone().unwrap();

        let updated = repo.set_payment_id(&id, 9001).await.unwrap();
        assert_eq!(updated.payment_id, Some(9001));
        assert_eq!(updated.status, OrderStatus::Pending);
    }

    #[tokio::test]
    async fn test_delete() {
        let repo = repo().await;
        let created = repo.create(sample_order("k-d", 7, 42)).await.unwrap();
        let id = created.id.clone().unwrap();

        repo.delete(&id).await.unwrap();
        assert!(repo.find_by_id(&id).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_parse_id_rejects_other_tables() {
        assert!(OrderRepository::parse_id("order:abc123").is_ok());
        assert!(matches!(
            OrderRepository::parse_id("payment:abc123"),
            Err(RepoError::Validation(_))
        ));
        assert!(matches!(
            OrderRepository::parse_id("not an id"),
            Err(RepoError::Validation(_))
        ));
    }
}
