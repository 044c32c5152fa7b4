use chrono::Utc;
use std::sync::Arc;
use uuid::Uuid;

use crate::status::StatusDirectory;
use crate::store::{OrderStore, ProductCatalog};

use super::access::OrderAccessGuard;
use super::commands::{NewOrder, OrderPatch, OrderUpdate};
use super::errors::OrderError;
use super::policy::OrderMutationPolicy;
use super::value_objects::{Identity, Order, ShippingDetails};

// ============================================================================
// Order Service
// ============================================================================
//
// Orchestrates: Identity → Access Guard → Status Directory → Mutation Policy → Store
//
// Built once at startup and shared with the transport layer.
//
// ============================================================================

pub struct OrderService {
    store: Arc<dyn OrderStore>,
    catalog: Arc<dyn ProductCatalog>,
    statuses: Arc<StatusDirectory>,
    guard: OrderAccessGuard,
    policy: OrderMutationPolicy,
}

impl OrderService {
    pub fn new(
        store: Arc<dyn OrderStore>,
        catalog: Arc<dyn ProductCatalog>,
        statuses: Arc<StatusDirectory>,
        policy: OrderMutationPolicy,
    ) -> Self {
        Self {
            store,
            catalog,
            statuses,
            guard: OrderAccessGuard::new(),
            policy,
        }
    }

    pub fn statuses(&self) -> &StatusDirectory {
        &self.statuses
    }

    /// Admins see every order, everyone else only their own
    pub async fn list_orders(&self, identity: &Identity) -> Result<Vec<Order>, OrderError> {
        let orders = if identity.is_admin() {
            self.store.find_all().await?
        } else {
            self.store.find_by_owner(identity.user_id).await?
        };

        tracing::debug!(
            user_id = %identity.user_id,
            admin = identity.is_admin(),
            count = orders.len(),
            "Listed orders"
        );
        Ok(orders)
    }

    pub async fn get_order(&self, identity: &Identity, order_id: Uuid) -> Result<Order, OrderError> {
        let order = self.fetch(order_id).await?;
        self.guard.authorize_read(identity, &order)?;
        Ok(order)
    }

    pub async fn add_order(&self, identity: &Identity, payload: NewOrder) -> Result<Order, OrderError> {
        let shipping = self.validate_new_order(&payload).await?;

        let order = Order {
            id: Uuid::now_v7(),
            user_id: identity.user_id,
            shipping,
            products: payload.products,
            fulfillment_status: self.statuses.initial_fulfillment_status(),
            cs_status: self.statuses.initial_cs_status(),
            created_at: Utc::now(),
        };

        let order = self.store.create(order).await?;

        tracing::info!(
            order_id = %order.id,
            user_id = %order.user_id,
            item_count = order.products.len(),
            "Created order"
        );
        Ok(order)
    }

    pub async fn set_order(
        &self,
        identity: &Identity,
        order_id: Uuid,
        payload: OrderUpdate,
    ) -> Result<Order, OrderError> {
        if payload.is_empty() {
            return Err(OrderError::InvalidRequest("update contains no fields".to_string()));
        }

        let order = self.fetch(order_id).await?;
        self.guard.authorize_write(identity, &order)?;

        let current_status = self.store.current_fulfillment_status_name(order_id).await?;

        // Everything below must succeed before anything is written
        let mut patch = OrderPatch::from_update(&payload);
        if let Some(ref name) = payload.order_status {
            patch.fulfillment_status = Some(self.statuses.resolve_fulfillment_status_id(name)?);
        }
        if let Some(ref name) = payload.cs_status {
            patch.cs_status = Some(self.statuses.resolve_cs_status_id(name)?);
        }

        if let Err(e) = self.policy.authorize_field_edit(&current_status, &payload) {
            tracing::warn!(
                order_id = %order_id,
                user_id = %identity.user_id,
                current_status = %current_status,
                "Shipping edit blocked by order status"
            );
            return Err(e);
        }

        let updated = self.store.apply_partial_update(order_id, patch).await?;

        tracing::info!(
            order_id = %order_id,
            user_id = %identity.user_id,
            previous_status = %current_status,
            fulfillment_status = %updated.fulfillment_status,
            cs_status = %updated.cs_status,
            "Updated order"
        );
        Ok(updated)
    }

    async fn fetch(&self, order_id: Uuid) -> Result<Order, OrderError> {
        self.store
            .find_by_id(order_id)
            .await?
            .ok_or(OrderError::NotFound(order_id))
    }

    /// Check a purchase request and pull out its shipping details
    async fn validate_new_order(&self, payload: &NewOrder) -> Result<ShippingDetails, OrderError> {
        if payload.is_empty() {
            return Err(OrderError::InvalidRequest("order payload is empty".to_string()));
        }

        let full_name = required(&payload.full_name_to, "fullNameTo")?;
        let phone_number = required(&payload.phone_number_to, "phoneNumberTo")?;
        let address = required(&payload.address_to, "addressTo")?;

        if payload.products.is_empty() {
            return Err(OrderError::InvalidRequest("order must contain at least one product".to_string()));
        }

        for item in &payload.products {
            if item.quantity <= 0 {
                return Err(OrderError::InvalidRequest(format!(
                    "invalid quantity {} for product {}",
                    item.quantity, item.product_id
                )));
            }
            if !self.catalog.product_exists(item.product_id).await? {
                return Err(OrderError::InvalidRequest(format!("unknown product {}", item.product_id)));
            }
        }

        Ok(ShippingDetails {
            full_name,
            phone_number,
            address,
            message: payload.message_to.clone().unwrap_or_default(),
        })
    }
}

fn required(value: &Option<String>, field: &str) -> Result<String, OrderError> {
    match value {
        Some(value) if !value.trim().is_empty() => Ok(value.clone()),
        _ => Err(OrderError::InvalidRequest(format!("{field} is required"))),
    }
}

// ============================================================================
// Unit Tests
// ============================================================================
