use super::commands::OrderUpdate;
use super::errors::OrderError;

/// Fulfillment status in which shipping details may be edited on their own
pub const DEFAULT_SHIPPING_EDITABLE_STATUS: &str = "payment completed";

// ============================================================================
// Order Mutation Policy
// ============================================================================
//
// A request that only touches shipping details is accepted only while the
// order sits in the editable fulfillment status. A request that carries a
// fulfillment or customer-service status name skips the gate entirely, and
// any shipping fields bundled with it go through as well.
//
// ============================================================================

#[derive(Debug, Clone)]
pub struct OrderMutationPolicy {
    shipping_editable_status: String,
}

impl Default for OrderMutationPolicy {
    fn default() -> Self {
        Self::new(DEFAULT_SHIPPING_EDITABLE_STATUS)
    }
}

impl OrderMutationPolicy {
    pub fn new(shipping_editable_status: impl Into<String>) -> Self {
        Self {
            shipping_editable_status: shipping_editable_status.into(),
        }
    }

    /// Decide whether `update` may be applied to an order whose fulfillment
    /// status is currently `current_status`.
    pub fn authorize_field_edit(
        &self,
        current_status: &str,
        update: &OrderUpdate,
    ) -> Result<(), OrderError> {
        if update.has_status_change() {
            return Ok(());
        }

        if current_status == self.shipping_editable_status {
            return Ok(());
        }

        Err(OrderError::Blocked {
            current: current_status.to_string(),
        })
    }
}
