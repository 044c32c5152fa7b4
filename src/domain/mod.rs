// ============================================================================
// Domain Layer - Business Logic
// ============================================================================
//
// This module contains the order lifecycle: value objects, request payloads,
// the error taxonomy, the access guard, the mutation policy and the service
// that ties them to a store.
//
// This layer knows nothing about HTTP or about a particular database.
//
// ============================================================================

pub mod order;
