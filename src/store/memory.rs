use async_trait::async_trait;
use std::collections::{HashMap, HashSet};
use std::sync::Arc;
use tokio::sync::RwLock;
use uuid::Uuid;

use super::{OrderStore, ProductCatalog, StoreError};
use crate::domain::order::{Order, OrderPatch, UserId};
use crate::status::StatusDirectory;

// ============================================================================
// In-Memory Order Store
// ============================================================================

pub struct InMemoryOrderStore {
    orders: RwLock<HashMap<Uuid, Order>>,
    statuses: Arc<StatusDirectory>,
}

impl InMemoryOrderStore {
    pub fn new(statuses: Arc<StatusDirectory>) -> Self {
        Self {
            orders: RwLock::new(HashMap::new()),
            statuses,
        }
    }
}

/// Oldest first, id as tie-breaker so listings are stable
fn sorted(mut orders: Vec<Order>) -> Vec<Order> {
    orders.sort_by(|a, b| a.created_at.cmp(&b.created_at).then(a.id.cmp(&b.id)));
    orders
}

#[async_trait]
impl OrderStore for InMemoryOrderStore {
    async fn create(&self, order: Order) -> Result<Order, StoreError> {
        let mut orders = self.orders.write().await;
        orders.insert(order.id, order.clone());

        tracing::debug!(order_id = %order.id, total = orders.len(), "Stored order in memory");
        Ok(order)
    }

    async fn find_by_id(&self, id: Uuid) -> Result<Option<Order>, StoreError> {
        Ok(self.orders.read().await.get(&id).cloned())
    }

    async fn find_all(&self) -> Result<Vec<Order>, StoreError> {
        let orders = self.orders.read().await;
        Ok(sorted(orders.values().cloned().collect()))
    }

    async fn find_by_owner(&self, user_id: UserId) -> Result<Vec<Order>, StoreError> {
        let orders = self.orders.read().await;
        Ok(sorted(
            orders
                .values()
                .filter(|order| order.is_owned_by(user_id))
                .cloned()
                .collect(),
        ))
    }

    async fn current_fulfillment_status_name(&self, id: Uuid) -> Result<String, StoreError> {
        let orders = self.orders.read().await;
        let order = orders.get(&id).ok_or(StoreError::NotFound(id))?;

        self.statuses
            .fulfillment_status_name(order.fulfillment_status)
            .map(str::to_string)
            .ok_or_else(|| {
                StoreError::Corrupt(format!(
                    "order {} references unknown fulfillment status {}",
                    id, order.fulfillment_status
                ))
            })
    }

    async fn apply_partial_update(&self, id: Uuid, patch: OrderPatch) -> Result<Order, StoreError> {
        let mut orders = self.orders.write().await;
        let order = orders.get_mut(&id).ok_or(StoreError::NotFound(id))?;

        order.apply(&patch);
        Ok(order.clone())
    }
}

// ============================================================================
// In-Memory Product Catalog
// ============================================================================

#[derive(Debug, Default)]
pub struct InMemoryProductCatalog {
    products: HashSet<Uuid>,
}

impl InMemoryProductCatalog {
    pub fn new(products: impl IntoIterator<Item = Uuid>) -> Self {
        Self {
            products: products.into_iter().collect(),
        }
    }
}

#[async_trait]
impl ProductCatalog for InMemoryProductCatalog {
    async fn product_exists(&self, product_id: Uuid) -> Result<bool, StoreError> {
        Ok(self.products.contains(&product_id))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::order::{OrderItem, ShippingDetails, StatusId};
    use crate::status::test_directory;
    use chrono::{Duration, Utc};

    fn order_for(user_id: UserId, minutes_ago: i64) -> Order {
        Order {
            id: Uuid::new_v4(),
            user_id,
            shipping: ShippingDetails {
                full_name: "Choi Yuna".to_string(),
                phone_number: "010-5555-6666".to_string(),
                address: "Harbor Rd 3".to_string(),
                message: "Call first".to_string(),
            },
            products: vec![OrderItem {
                product_id: Uuid::new_v4(),
                quantity: 1,
            }],
            fulfillment_status: StatusId(1),
            cs_status: StatusId(1),
            created_at: Utc::now() - Duration::minutes(minutes_ago),
        }
    }

    fn store() -> InMemoryOrderStore {
        InMemoryOrderStore::new(Arc::new(test_directory()))
    }

    #[tokio::test]
    async fn test_create_and_find() {
        let store = store();
        let order = order_for(UserId(Uuid::new_v4()), 0);

        store.create(order.clone()).await.unwrap();

        assert_eq!(store.find_by_id(order.id).await.unwrap(), Some(order));
        assert_eq!(store.find_by_id(Uuid::new_v4()).await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_find_by_owner_filters_and_sorts() {
        let store = store();
        let alice = UserId(Uuid::new_v4());
        let bob = UserId(Uuid::new_v4());

        let newer = store.create(order_for(alice, 1)).await.unwrap();
        let older = store.create(order_for(alice, 10)).await.unwrap();
        store.create(order_for(bob, 5)).await.unwrap();

        let owned = store.find_by_owner(alice).await.unwrap();
        assert_eq!(owned.iter().map(|o| o.id).collect::<Vec<_>>(), vec![older.id, newer.id]);
        assert_eq!(store.find_all().await.unwrap().len(), 3);
    }

    #[tokio::test]
    async fn test_current_status_name() {
        let store = store();
        let order = store.create(order_for(UserId(Uuid::new_v4()), 0)).await.unwrap();

        assert_eq!(
            store.current_fulfillment_status_name(order.id).await.unwrap(),
            "order received"
        );
        assert!(matches!(
            store.current_fulfillment_status_name(Uuid::new_v4()).await,
            Err(StoreError::NotFound(_))
        ));
    }

    #[tokio::test]
    async fn test_partial_update_merges() {
        let store = store();
        let order = store.create(order_for(UserId(Uuid::new_v4()), 0)).await.unwrap();

        let updated = store
            .apply_partial_update(
                order.id,
                OrderPatch {
                    fulfillment_status: Some(StatusId(3)),
                    ..Default::default()
                },
            )
            .await
            .unwrap();

        assert_eq!(updated.fulfillment_status, StatusId(3));
        assert_eq!(updated.shipping, order.shipping);
        assert_eq!(store.find_by_id(order.id).await.unwrap(), Some(updated));
    }

    #[tokio::test]
    async fn test_partial_update_missing_order() {
        let store = store();
        let result = store
            .apply_partial_update(Uuid::new_v4(), OrderPatch::default())
            .await;
        assert!(matches!(result, Err(StoreError::NotFound(_))));
    }

    #[tokio::test]
    async fn test_catalog_membership() {
        let known = Uuid::new_v4();
        let catalog = InMemoryProductCatalog::new([known]);

        assert!(catalog.product_exists(known).await.unwrap());
        assert!(!catalog.product_exists(Uuid::new_v4()).await.unwrap());
    }
}
