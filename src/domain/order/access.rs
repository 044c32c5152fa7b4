use super::errors::OrderError;
use super::value_objects::{Identity, Order};

// ============================================================================
// Order Access Guard
// ============================================================================
//
// One rule for both reading and writing: admins may touch any order, everyone
// else only the orders they own.
//
// ============================================================================

#[derive(Debug, Clone, Copy, Default)]
pub struct OrderAccessGuard;

impl OrderAccessGuard {
    pub fn new() -> Self {
        Self
    }

    pub fn authorize_read(&self, identity: &Identity, order: &Order) -> Result<(), OrderError> {
        self.authorize(identity, order)
    }

    pub fn authorize_write(&self, identity: &Identity, order: &Order) -> Result<(), OrderError> {
        self.authorize(identity, order)
    }

    fn authorize(&self, identity: &Identity, order: &Order) -> Result<(), OrderError> {
        if identity.is_admin() || order.is_owned_by(identity.user_id) {
            return Ok(());
        }

        tracing::warn!(
            order_id = %order.id,
            user_id = %identity.user_id,
            "Access to order denied"
        );
        Err(OrderError::Forbidden)
    }
}
