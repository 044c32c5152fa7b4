// ============================================================================
// Store Layer - Persistence boundary for orders and the product catalog
// ============================================================================
//
// The service only talks to these traits. Two backends are provided:
// - memory/   - process-local maps, used for development and tests
// - postgres/ - PostgreSQL through sqlx
//
// ============================================================================

mod memory;
mod postgres;

use async_trait::async_trait;
use uuid::Uuid;

use crate::domain::order::{Order, OrderPatch, UserId};

pub use memory::{InMemoryOrderStore, InMemoryProductCatalog};
pub use postgres::{PgOrderStore, PgProductCatalog};

#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("Order not found: {0}")]
    NotFound(Uuid),

    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Corrupt record: {0}")]
    Corrupt(String),
}

/// Persistence of orders
///
/// Writes are single-record and atomic; nothing here serializes concurrent
/// updates to the same order (last writer wins).
#[async_trait]
pub trait OrderStore: Send + Sync {
    async fn create(&self, order: Order) -> Result<Order, StoreError>;

    async fn find_by_id(&self, id: Uuid) -> Result<Option<Order>, StoreError>;

    async fn find_all(&self) -> Result<Vec<Order>, StoreError>;

    async fn find_by_owner(&self, user_id: UserId) -> Result<Vec<Order>, StoreError>;

    /// Name of the order's current fulfillment status
    async fn current_fulfillment_status_name(&self, id: Uuid) -> Result<String, StoreError>;

    /// Apply a sparse update and return the resulting order
    async fn apply_partial_update(&self, id: Uuid, patch: OrderPatch) -> Result<Order, StoreError>;
}

/// Read-only view of the product catalog, used to validate new orders
#[async_trait]
pub trait ProductCatalog: Send + Sync {
    async fn product_exists(&self, product_id: Uuid) -> Result<bool, StoreError>;
}
