use serde::{Deserialize, Serialize};

use super::value_objects::{OrderItem, StatusId};

// ============================================================================
// Order Commands - Represent user intent
// ============================================================================
//
// Field names follow the storefront wire format (fullNameTo, addressTo, ...).
// Every field is optional at this layer: a missing field is a validation
// failure for creation and "leave unchanged" for updates, never a parse error.
//
// ============================================================================

/// Payload of a purchase request
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct NewOrder {
    pub full_name_to: Option<String>,
    pub phone_number_to: Option<String>,
    pub address_to: Option<String>,
    pub message_to: Option<String>,
    pub products: Vec<OrderItem>,
}

impl NewOrder {
    pub fn is_empty(&self) -> bool {
        self.full_name_to.is_none()
            && self.phone_number_to.is_none()
            && self.address_to.is_none()
            && self.message_to.is_none()
            && self.products.is_empty()
    }
}

/// Payload of a partial update. Status tracks are addressed by name.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct OrderUpdate {
    pub full_name_to: Option<String>,
    pub phone_number_to: Option<String>,
    pub address_to: Option<String>,
    pub message_to: Option<String>,
    pub order_status: Option<String>,
    pub cs_status: Option<String>,
}

impl OrderUpdate {
    pub fn is_empty(&self) -> bool {
        !self.has_status_change() && !self.has_shipping_change()
    }

    /// True when either status track is addressed
    pub fn has_status_change(&self) -> bool {
        self.order_status.is_some() || self.cs_status.is_some()
    }

    pub fn has_shipping_change(&self) -> bool {
        self.full_name_to.is_some()
            || self.phone_number_to.is_some()
            || self.address_to.is_some()
            || self.message_to.is_some()
    }
}

/// Sparse update handed to the store, with status names already resolved
#[derive(Debug, Clone, Default, PartialEq)]
pub struct OrderPatch {
    pub full_name: Option<String>,
    pub phone_number: Option<String>,
    pub address: Option<String>,
    pub message: Option<String>,
    pub fulfillment_status: Option<StatusId>,
    pub cs_status: Option<StatusId>,
}

impl OrderPatch {
    /// Carry over the shipping fields of a request; statuses are filled in by the caller
    pub fn from_update(update: &OrderUpdate) -> Self {
        Self {
            full_name: update.full_name_to.clone(),
            phone_number: update.phone_number_to.clone(),
            address: update.address_to.clone(),
            message: update.message_to.clone(),
            fulfillment_status: None,
            cs_status: None,
        }
    }
}
