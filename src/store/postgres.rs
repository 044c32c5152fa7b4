use async_trait::async_trait;
use sqlx::postgres::{PgPool, PgPoolOptions, PgRow};
use sqlx::Row;
use uuid::Uuid;

use super::{OrderStore, ProductCatalog, StoreError};
use crate::domain::order::{Order, OrderPatch, ShippingDetails, StatusId, UserId};
use crate::status::{StatusDirectory, StatusEntry, StatusKind, StatusTable};

// ============================================================================
// PostgreSQL Order Store
// ============================================================================
//
// Tables:
// - order_statuses / cs_statuses - append-only (id, name) lookup tables
// - orders                       - one row per order, products as JSON text
//
// The products table belongs to the catalog service and is only read here.
//
// ============================================================================

const SCHEMA: &[&str] = &[
    "CREATE TABLE IF NOT EXISTS order_statuses (
        id SERIAL PRIMARY KEY,
        name TEXT NOT NULL UNIQUE
    )",
    "CREATE TABLE IF NOT EXISTS cs_statuses (
        id SERIAL PRIMARY KEY,
        name TEXT NOT NULL UNIQUE
    )",
    "CREATE TABLE IF NOT EXISTS orders (
        id UUID PRIMARY KEY,
        user_id UUID NOT NULL,
        full_name_to TEXT NOT NULL,
        phone_number_to TEXT NOT NULL,
        address_to TEXT NOT NULL,
        message_to TEXT NOT NULL,
        products TEXT NOT NULL,
        order_status_id INTEGER NOT NULL REFERENCES order_statuses (id),
        cs_status_id INTEGER NOT NULL REFERENCES cs_statuses (id),
        created_at TIMESTAMPTZ NOT NULL
    )",
    "CREATE INDEX IF NOT EXISTS orders_user_id_idx ON orders (user_id)",
];

const ORDER_COLUMNS: &str = "id, user_id, full_name_to, phone_number_to, address_to, message_to, \
                             products, order_status_id, cs_status_id, created_at";

pub struct PgOrderStore {
    pool: PgPool,
}

impl PgOrderStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn connect(database_url: &str, max_connections: u32) -> Result<Self, StoreError> {
        let pool = PgPoolOptions::new()
            .max_connections(max_connections)
            .connect(database_url)
            .await?;

        tracing::info!(max_connections, "Connected to PostgreSQL");
        Ok(Self::new(pool))
    }

    pub fn pool(&self) -> &PgPool {
        &self.pool
    }

    /// Create tables if they do not exist yet
    pub async fn ensure_schema(&self) -> Result<(), StoreError> {
        for statement in SCHEMA {
            sqlx::query(statement).execute(&self.pool).await?;
        }
        tracing::debug!("Order schema is in place");
        Ok(())
    }

    /// Seed both status tables with any missing names, then load them.
    ///
    /// Existing rows keep their ids; new names are appended. The initial
    /// status of each table is the first configured name, not the lowest id,
    /// so a database seeded in a different order still starts new orders in
    /// the configured status.
    pub async fn load_status_directory(
        &self,
        fulfillment: &[String],
        customer_service: &[String],
    ) -> Result<StatusDirectory, StoreError> {
        let fulfillment = self
            .load_status_table("order_statuses", StatusKind::Fulfillment, fulfillment)
            .await?;
        let customer_service = self
            .load_status_table("cs_statuses", StatusKind::CustomerService, customer_service)
            .await?;

        Ok(StatusDirectory::new(fulfillment, customer_service))
    }

    async fn load_status_table(
        &self,
        table: &str,
        kind: StatusKind,
        seed: &[String],
    ) -> Result<StatusTable, StoreError> {
        let insert = format!("INSERT INTO {table} (name) VALUES ($1) ON CONFLICT (name) DO NOTHING");
        for name in seed {
            sqlx::query(&insert).bind(name).execute(&self.pool).await?;
        }

        let rows = sqlx::query(&format!("SELECT id, name FROM {table} ORDER BY id"))
            .fetch_all(&self.pool)
            .await?;

        let entries = rows
            .iter()
            .map(|row| Ok(StatusEntry::new(StatusId(row.try_get("id")?), row.try_get::<String, _>("name")?)))
            .collect::<Result<Vec<_>, sqlx::Error>>()?;

        tracing::info!(table, count = entries.len(), "Loaded status table");

        let loaded = match seed.first() {
            Some(initial) => {
                if entries.first().is_some_and(|entry| &entry.name != initial) {
                    tracing::warn!(
                        table,
                        initial = %initial,
                        "Stored status order differs from configuration, using configured initial status"
                    );
                }
                StatusTable::with_initial(kind, entries, initial)
            }
            None => StatusTable::new(kind, entries),
        };

        loaded
            .ok_or_else(|| StoreError::Corrupt(format!("status table {table} is empty")))
    }
}

fn order_from_row(row: &PgRow) -> Result<Order, StoreError> {
    let products: String = row.try_get("products")?;

    Ok(Order {
        id: row.try_get("id")?,
        user_id: UserId(row.try_get("user_id")?),
        shipping: ShippingDetails {
            full_name: row.try_get("full_name_to")?,
            phone_number: row.try_get("phone_number_to")?,
            address: row.try_get("address_to")?,
            message: row.try_get("message_to")?,
        },
        products: serde_json::from_str(&products)?,
        fulfillment_status: StatusId(row.try_get("order_status_id")?),
        cs_status: StatusId(row.try_get("cs_status_id")?),
        created_at: row.try_get("created_at")?,
    })
}

#[async_trait]
impl OrderStore for PgOrderStore {
    async fn create(&self, order: Order) -> Result<Order, StoreError> {
        let products = serde_json::to_string(&order.products)?;

        let row = sqlx::query(&format!(
            "INSERT INTO orders ({ORDER_COLUMNS}) VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10) \
             RETURNING {ORDER_COLUMNS}"
        ))
        .bind(order.id)
        .bind(order.user_id.0)
        .bind(&order.shipping.full_name)
        .bind(&order.shipping.phone_number)
        .bind(&order.shipping.address)
        .bind(&order.shipping.message)
        .bind(products)
        .bind(order.fulfillment_status.0)
        .bind(order.cs_status.0)
        .bind(order.created_at)
        .fetch_one(&self.pool)
        .await?;

        tracing::debug!(order_id = %order.id, "Inserted order row");
        order_from_row(&row)
    }

    async fn find_by_id(&self, id: Uuid) -> Result<Option<Order>, StoreError> {
        let row = sqlx::query(&format!("SELECT {ORDER_COLUMNS} FROM orders WHERE id = $1"))
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;

        row.as_ref().map(order_from_row).transpose()
    }

    async fn find_all(&self) -> Result<Vec<Order>, StoreError> {
        let rows = sqlx::query(&format!("SELECT {ORDER_COLUMNS} FROM orders ORDER BY created_at, id"))
            .fetch_all(&self.pool)
            .await?;

        rows.iter().map(order_from_row).collect()
    }

    async fn find_by_owner(&self, user_id: UserId) -> Result<Vec<Order>, StoreError> {
        let rows = sqlx::query(&format!(
            "SELECT {ORDER_COLUMNS} FROM orders WHERE user_id = $1 ORDER BY created_at, id"
        ))
        .bind(user_id.0)
        .fetch_all(&self.pool)
        .await?;

        rows.iter().map(order_from_row).collect()
    }

    async fn current_fulfillment_status_name(&self, id: Uuid) -> Result<String, StoreError> {
        let row = sqlx::query(
            "SELECT s.name FROM orders o \
             JOIN order_statuses s ON s.id = o.order_status_id \
             WHERE o.id = $1",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?
        .ok_or(StoreError::NotFound(id))?;

        Ok(row.try_get("name")?)
    }

    async fn apply_partial_update(&self, id: Uuid, patch: OrderPatch) -> Result<Order, StoreError> {
        // COALESCE keeps the stored value for every absent (NULL) parameter
        let row = sqlx::query(&format!(
            "UPDATE orders SET \
                full_name_to = COALESCE($2, full_name_to), \
                phone_number_to = COALESCE($3, phone_number_to), \
                address_to = COALESCE($4, address_to), \
                message_to = COALESCE($5, message_to), \
                order_status_id = COALESCE($6, order_status_id), \
                cs_status_id = COALESCE($7, cs_status_id) \
             WHERE id = $1 \
             RETURNING {ORDER_COLUMNS}"
        ))
        .bind(id)
        .bind(patch.full_name)
        .bind(patch.phone_number)
        .bind(patch.address)
        .bind(patch.message)
        .bind(patch.fulfillment_status.map(|status| status.0))
        .bind(patch.cs_status.map(|status| status.0))
        .fetch_optional(&self.pool)
        .await?
        .ok_or(StoreError::NotFound(id))?;

        order_from_row(&row)
    }
}

// ============================================================================
// PostgreSQL Product Catalog
// ============================================================================
//
// Reads the `products` table owned by the catalog service. The schema setup
// above never creates it; startup checks `table_exists` and refuses to run
// without it.
//
// ============================================================================

pub struct PgProductCatalog {
    pool: PgPool,
}

impl PgProductCatalog {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn table_exists(&self) -> Result<bool, StoreError> {
        let row = sqlx::query("SELECT to_regclass('products') IS NOT NULL AS found")
            .fetch_one(&self.pool)
            .await?;

        Ok(row.try_get("found")?)
    }
}

#[async_trait]
impl ProductCatalog for PgProductCatalog {
    async fn product_exists(&self, product_id: Uuid) -> Result<bool, StoreError> {
        let row = sqlx::query("SELECT EXISTS (SELECT 1 FROM products WHERE id = $1) AS found")
            .bind(product_id)
            .fetch_one(&self.pool)
            .await?;

        Ok(row.try_get("found")?)
    }
}
