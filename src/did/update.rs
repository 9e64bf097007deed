// src/did/update.rs
//! Computes the minimal add/revoke delta between two states of a DID.
//!
//! Each category (public keys, authentication keys, services) is diffed on
//! its own. Additions are written in document form; revocations are written
//! as bare aliases.

use super::document::{authentication_entries, key_entry, service_entry};
use crate::models::did::{AddSection, RevokeSection, UpdateEntryDocument};
use crate::models::key::{KeyModel, ServiceModel};

/// Items of `current` that are not in `original`.
fn added<'a, T: PartialEq>(original: &[T], current: &'a [T]) -> Vec<&'a T> {
    current.iter().filter(|item| !original.contains(item)).collect()
}

/// Items of `original` that are not in `current`.
fn removed<'a, T: PartialEq>(original: &'a [T], current: &[T]) -> Vec<&'a T> {
    original.iter().filter(|item| !current.contains(item)).collect()
}

fn non_empty<T>(items: Vec<T>) -> Option<Vec<T>> {
    if items.is_empty() {
        None
    } else {
        Some(items)
    }
}

/// Original and current snapshots of everything a DID update can touch.
#[derive(Debug, Clone, Copy)]
pub struct Snapshots<'a> {
    pub original_public_keys: &'a [KeyModel],
    pub current_public_keys: &'a [KeyModel],
    pub original_authentication_keys: &'a [KeyModel],
    pub current_authentication_keys: &'a [KeyModel],
    pub original_services: &'a [ServiceModel],
    pub current_services: &'a [ServiceModel],
}

/// Builds the update entry document for the given snapshots.
///
/// Returns an empty document (both sections absent) when nothing changed.
pub fn build_update_entry(did: &str, snapshots: Snapshots<'_>) -> UpdateEntryDocument {
    let Snapshots {
        original_public_keys,
        current_public_keys,
        original_authentication_keys,
        current_authentication_keys,
        original_services,
        current_services,
    } = snapshots;

    let new_public_keys = added(original_public_keys, current_public_keys);
    let new_authentication_keys: Vec<KeyModel> =
        added(original_authentication_keys, current_authentication_keys)
            .into_iter()
            .cloned()
            .collect();
    let new_services = added(original_services, current_services);

    let add = AddSection {
        public_key: non_empty(
            new_public_keys
                .into_iter()
                .map(|key| key_entry(did, key))
                .collect(),
        ),
        authentication: non_empty(authentication_entries(
            did,
            &new_authentication_keys,
            current_public_keys,
        )),
        service: non_empty(
            new_services
                .into_iter()
                .map(|service| service_entry(did, service))
                .collect(),
        ),
    };

    let aliases = |keys: Vec<&KeyModel>| non_empty(keys.into_iter().map(|k| k.alias.clone()).collect());
    let revoke = RevokeSection {
        public_key: aliases(removed(original_public_keys, current_public_keys)),
        authentication: aliases(removed(
            original_authentication_keys,
            current_authentication_keys,
        )),
        service: non_empty(
            removed(original_services, current_services)
                .into_iter()
                .map(|s| s.alias.clone())
                .collect(),
        ),
    };

    let has_add = add.public_key.is_some() || add.authentication.is_some() || add.service.is_some();
    let has_revoke =
        revoke.public_key.is_some() || revoke.authentication.is_some() || revoke.service.is_some();

    UpdateEntryDocument {
        add: has_add.then_some(add),
        revoke: has_revoke.then_some(revoke),
    }
}
