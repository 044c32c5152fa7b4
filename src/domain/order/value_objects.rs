use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

use super::commands::OrderPatch;

// ============================================================================
// Order Value Objects
// ============================================================================

/// Internal identifier of a fulfillment or customer-service status
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct StatusId(pub i32);

impl fmt::Display for StatusId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Id of an authenticated user, as issued by the authentication collaborator
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct UserId(pub Uuid);

impl fmt::Display for UserId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Role {
    Admin,
    BasicUser,
}

impl FromStr for Role {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "admin" => Ok(Role::Admin),
            "basic-user" => Ok(Role::BasicUser),
            other => Err(format!("unknown role: {other}")),
        }
    }
}

/// The authenticated caller. Trusted as-is.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Identity {
    pub user_id: UserId,
    pub role: Role,
}

impl Identity {
    pub fn new(user_id: UserId, role: Role) -> Self {
        Self { user_id, role }
    }

    pub fn admin(user_id: UserId) -> Self {
        Self::new(user_id, Role::Admin)
    }

    pub fn basic_user(user_id: UserId) -> Self {
        Self::new(user_id, Role::BasicUser)
    }

    pub fn is_admin(&self) -> bool {
        self.role == Role::Admin
    }
}

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct OrderItem {
    pub product_id: Uuid,
    pub quantity: i32,
}

/// Recipient details, the editable part of an order
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ShippingDetails {
    pub full_name: String,
    pub phone_number: String,
    pub address: String,
    pub message: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Order {
    // Identity
    pub id: Uuid,
    pub user_id: UserId,

    pub shipping: ShippingDetails,
    pub products: Vec<OrderItem>,

    // Status tracks (ids into the status directory)
    pub fulfillment_status: StatusId,
    pub cs_status: StatusId,

    pub created_at: DateTime<Utc>,
}

impl Order {
    pub fn is_owned_by(&self, user_id: UserId) -> bool {
        self.user_id == user_id
    }

    /// Merge a sparse update. Absent fields keep their current value.
    pub fn apply(&mut self, patch: &OrderPatch) {
        if let Some(ref full_name) = patch.full_name {
            self.shipping.full_name = full_name.clone();
        }
        if let Some(ref phone_number) = patch.phone_number {
            self.shipping.phone_number = phone_number.clone();
        }
        if let Some(ref address) = patch.address {
            self.shipping.address = address.clone();
        }
        if let Some(ref message) = patch.message {
            self.shipping.message = message.clone();
        }
        if let Some(status) = patch.fulfillment_status {
            self.fulfillment_status = status;
        }
        if let Some(status) = patch.cs_status {
            self.cs_status = status;
        }
    }
}

// ============================================================================
// Unit Tests
// ============================================================================
