// src/wallet/address_events.rs
//! Address lists shared with approved pages, and the change events pages
//! receive when those lists change.
//!
//! Entries are compared by their JSON text, so two address records are the
//! same entry only if every field matches.

use serde::Serialize;
use serde_json::Value;
use std::collections::HashSet;
use std::sync::RwLock;

use crate::utils::serialization::json_key;

/// Which address list changed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AddressKind {
    Fct,
    Ec,
}

impl AddressKind {
    /// Capability name shown in the approval prompt.
    pub fn approval_kind(&self) -> &'static str {
        match self {
            AddressKind::Fct => "FCT addresses",
            AddressKind::Ec => "EC addresses",
        }
    }
}

/// Entries added to and removed from an address list.
#[derive(Serialize, Debug, Clone, Default, PartialEq)]
pub struct AddressChange {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub added: Option<Vec<Value>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub removed: Option<Vec<Value>>,
}

fn difference(from: &[Value], without: &[Value]) -> Vec<Value> {
    let keys: HashSet<String> = without.iter().map(json_key).collect();
    from.iter()
        .filter(|entry| !keys.contains(&json_key(entry)))
        .cloned()
        .collect()
}

/// Computes the change between two versions of a list, or `None` if the
/// lists hold the same entries.
pub fn diff(old: &[Value], new: &[Value]) -> Option<AddressChange> {
    let added = difference(new, old);
    let removed = difference(old, new);
    if added.is_empty() && removed.is_empty() {
        return None;
    }

    Some(AddressChange {
        added: (!added.is_empty()).then_some(added),
        removed: (!removed.is_empty()).then_some(removed),
    })
}

/// The wallet's public FCT and EC address lists.
#[derive(Debug, Default)]
pub struct AddressBook {
    fct: RwLock<Vec<Value>>,
    ec: RwLock<Vec<Value>>,
}

impl AddressBook {
    pub fn new() -> Self {
        Self::default()
    }

    fn list(&self, kind: AddressKind) -> &RwLock<Vec<Value>> {
        match kind {
            AddressKind::Fct => &self.fct,
            AddressKind::Ec => &self.ec,
        }
    }

    pub fn addresses(&self, kind: AddressKind) -> Vec<Value> {
        self.list(kind)
            .read()
            .map(|list| list.clone())
            .unwrap_or_default()
    }

    /// Replaces a list and returns what changed.
    pub fn replace(&self, kind: AddressKind, addresses: Vec<Value>) -> Option<AddressChange> {
        let mut list = match self.list(kind).write() {
            Ok(list) => list,
            Err(poisoned) => poisoned.into_inner(),
        };
        let change = diff(&list, &addresses);
        *list = addresses;
        change
    }
}
