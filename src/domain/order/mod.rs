// ============================================================================
// Order Domain - Business Logic for the Order lifecycle
// ============================================================================
//
// This module contains ALL Order-specific code:
// - Value objects (Order, OrderItem, ShippingDetails, Identity, ...)
// - Commands (NewOrder, OrderUpdate, OrderPatch)
// - Errors (OrderError enum)
// - Access guard (who may see or change an order)
// - Mutation policy (when shipping details may change)
// - Service (OrderService, the entry point for the transport layer)
//
// ============================================================================

pub mod value_objects;
pub mod commands;
pub mod errors;
pub mod access;
pub mod policy;
pub mod service;

// Re-export for convenience
pub use value_objects::*;
pub use commands::*;
pub use errors::*;
pub use policy::*;
pub use service::*;
