use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;

use crate::domain::order::StatusId;

// ============================================================================
// Status Directory - Name <-> Id resolution for both status tracks
// ============================================================================
//
// Two independent, append-only lookup tables:
// - fulfillment statuses ("order received", "payment completed", ...)
// - customer-service statuses ("none", "inquiry open", ...)
//
// Orders only ever store ids. Names are the external vocabulary and are
// resolved here, at the API boundary. The first entry of each table is the
// initial status assigned to new orders.
//
// ============================================================================

/// Which of the two status tracks a name belongs to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum StatusKind {
    Fulfillment,
    CustomerService,
}

impl fmt::Display for StatusKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StatusKind::Fulfillment => write!(f, "fulfillment"),
            StatusKind::CustomerService => write!(f, "customer-service"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
#[error("Unknown {kind} status: {name:?}")]
pub struct UnknownStatus {
    pub kind: StatusKind,
    pub name: String,
}

/// A single (name, id) pair
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatusEntry {
    pub id: StatusId,
    pub name: String,
}

impl StatusEntry {
    pub fn new(id: StatusId, name: impl Into<String>) -> Self {
        Self { id, name: name.into() }
    }
}

/// One lookup table, indexed both ways
#[derive(Debug, Clone)]
pub struct StatusTable {
    kind: StatusKind,
    entries: Vec<StatusEntry>,
    by_name: HashMap<String, StatusId>,
    by_id: HashMap<StatusId, String>,
}

impl StatusTable {
    /// Build a table from explicit entries (e.g. rows loaded from the database).
    /// Returns `None` for an empty table: every order needs an initial status.
    pub fn new(kind: StatusKind, entries: Vec<StatusEntry>) -> Option<Self> {
        if entries.is_empty() {
            return None;
        }

        let by_name = entries
            .iter()
            .map(|entry| (entry.name.clone(), entry.id))
            .collect();
        let by_id = entries
            .iter()
            .map(|entry| (entry.id, entry.name.clone()))
            .collect();

        Some(Self {
            kind,
            entries,
            by_name,
            by_id,
        })
    }

    /// Build a table from names alone, numbering them from 1 in order
    pub fn from_names<S: AsRef<str>>(kind: StatusKind, names: &[S]) -> Option<Self> {
        let entries = names
            .iter()
            .enumerate()
            .map(|(index, name)| StatusEntry::new(StatusId(index as i32 + 1), name.as_ref()))
            .collect();
        Self::new(kind, entries)
    }

    /// Build a table whose initial status is `initial`, whatever its id.
    /// The remaining entries keep their order.
    pub fn with_initial(kind: StatusKind, mut entries: Vec<StatusEntry>, initial: &str) -> Option<Self> {
        if let Some(position) = entries.iter().position(|entry| entry.name == initial) {
            let entry = entries.remove(position);
            entries.insert(0, entry);
        }
        Self::new(kind, entries)
    }

    pub fn initial(&self) -> &StatusEntry {
        // Construction rejects empty tables
        &self.entries[0]
    }

    pub fn resolve(&self, name: &str) -> Result<StatusId, UnknownStatus> {
        self.by_name.get(name).copied().ok_or_else(|| UnknownStatus {
            kind: self.kind,
            name: name.to_string(),
        })
    }

    pub fn name_of(&self, id: StatusId) -> Option<&str> {
        self.by_id.get(&id).map(String::as_str)
    }
}

/// Read-only view over both status tracks, shared by the service and stores
#[derive(Debug, Clone)]
pub struct StatusDirectory {
    fulfillment: StatusTable,
    customer_service: StatusTable,
}

impl StatusDirectory {
    pub fn new(fulfillment: StatusTable, customer_service: StatusTable) -> Self {
        Self {
            fulfillment,
            customer_service,
        }
    }

    pub fn resolve_fulfillment_status_id(&self, name: &str) -> Result<StatusId, UnknownStatus> {
        self.fulfillment.resolve(name)
    }

    pub fn resolve_cs_status_id(&self, name: &str) -> Result<StatusId, UnknownStatus> {
        self.customer_service.resolve(name)
    }

    pub fn fulfillment_status_name(&self, id: StatusId) -> Option<&str> {
        self.fulfillment.name_of(id)
    }

    pub fn cs_status_name(&self, id: StatusId) -> Option<&str> {
        self.customer_service.name_of(id)
    }

    pub fn initial_fulfillment_status(&self) -> StatusId {
        self.fulfillment.initial().id
    }

    pub fn initial_cs_status(&self) -> StatusId {
        self.customer_service.initial().id
    }
}

#[cfg(test)]
pub(crate) fn test_directory() -> StatusDirectory {
    StatusDirectory::new(
        StatusTable::from_names(
            StatusKind::Fulfillment,
            &["order received", "payment completed", "shipped", "delivered"],
        )
        .unwrap(),
        StatusTable::from_names(
            StatusKind::CustomerService,
            &["none", "inquiry open", "resolved"],
        )
        .unwrap(),
    )
}
