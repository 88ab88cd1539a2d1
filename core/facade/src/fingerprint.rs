//! Content fingerprints for vault facades.
//!
//! Two facades with the same groups, entries and fields in the same order
//! produce the same fingerprint. Any difference in content or order yields a
//! different one.

use base64::{engine::general_purpose::URL_SAFE_NO_PAD, Engine as _};
use blake2::digest::consts::U32;
use blake2::{Blake2b, Digest};
use std::fmt;

use crate::model::{Entry, Field, Group, VaultFacade};

/// Length of a fingerprint in bytes (256-bit).
pub const FINGERPRINT_LENGTH: usize = 32;

/// Digest of a vault's content.
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub struct Fingerprint([u8; FINGERPRINT_LENGTH]);

impl Fingerprint {
    /// Create a fingerprint from raw bytes.
    pub fn from_bytes(bytes: [u8; FINGERPRINT_LENGTH]) -> Self {
        Self(bytes)
    }

    /// Get the digest bytes.
    pub fn as_bytes(&self) -> &[u8; FINGERPRINT_LENGTH] {
        &self.0
    }
}

impl fmt::Display for Fingerprint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", URL_SAFE_NO_PAD.encode(self.0))
    }
}

impl fmt::Debug for Fingerprint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Fingerprint({})", self)
    }
}

/// Computes fingerprints of whole vaults.
///
/// # Contract
/// - Deterministic: the same facade always hashes to the same value
/// - Structurally equal facades hash equally
pub trait Fingerprinter {
    fn fingerprint(&self, vault: &VaultFacade) -> Fingerprint;
}

/// Blake2b-256 over a length-prefixed encoding of the facade.
#[derive(Debug, Clone, Copy, Default)]
pub struct Blake2Fingerprinter;

type Hasher = Blake2b<U32>;

fn update_str(hasher: &mut Hasher, value: &str) {
    hasher.update((value.len() as u64).to_le_bytes());
    hasher.update(value.as_bytes());
}

fn update_group(hasher: &mut Hasher, group: &Group) {
    hasher.update(b"G");
    update_str(hasher, group.id.as_str());
    update_str(hasher, &group.title);
    match &group.parent_id {
        Some(parent) => {
            hasher.update([1u8]);
            update_str(hasher, parent.as_str());
        }
        None => hasher.update([0u8]),
    }
}

fn update_field(hasher: &mut Hasher, field: &Field) {
    hasher.update(b"F");
    update_str(hasher, field.id.as_str());
    update_str(hasher, &field.name);
    update_str(hasher, &field.property_name);
    update_str(hasher, &field.value);
    update_str(hasher, field.value_type.as_str());
}

fn update_entry(hasher: &mut Hasher, entry: &Entry) {
    hasher.update(b"E");
    update_str(hasher, entry.id.as_str());
    update_str(hasher, entry.parent_id.as_str());
    update_str(hasher, entry.entry_type.as_str());
    hasher.update((entry.fields.len() as u64).to_le_bytes());
    for field in &entry.fields {
        update_field(hasher, field);
    }
}

impl Fingerprinter for Blake2Fingerprinter {
    fn fingerprint(&self, vault: &VaultFacade) -> Fingerprint {
        let mut hasher = Hasher::new();
        hasher.update(b"vaultedit-facade-v1");

        hasher.update((vault.groups.len() as u64).to_le_bytes());
        for group in &vault.groups {
            update_group(&mut hasher, group);
        }

        hasher.update((vault.entries.len() as u64).to_le_bytes());
        for entry in &vault.entries {
            update_entry(&mut hasher, entry);
        }

        let mut digest = [0u8; FINGERPRINT_LENGTH];
        digest.copy_from_slice(&hasher.finalize());
        Fingerprint(digest)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{EntryType, FieldValueType};
    use proptest::prelude::*;
    use vaultedit_common::{EntryId, GroupId};

    fn facade() -> VaultFacade {
        VaultFacade {
            groups: vec![
                Group {
                    id: GroupId::from("a"),
                    title: "A".to_string(),
                    parent_id: None,
                },
                Group {
                    id: GroupId::from("b"),
                    title: "B".to_string(),
                    parent_id: None,
                },
            ],
            entries: vec![Entry {
                id: EntryId::from("e1"),
                parent_id: GroupId::from("a"),
                entry_type: EntryType::Login,
                fields: vec![Field::new("password", "secret", FieldValueType::Password)],
            }],
        }
    }

    #[test]
    fn test_fingerprint_deterministic() {
        let base = facade();
        let a = Blake2Fingerprinter.fingerprint(&base);
        let b = Blake2Fingerprinter.fingerprint(&base.clone());
        assert_eq!(a, b);
    }

    #[test]
    fn test_fingerprint_detects_value_change() {
        let base = facade();
        let mut changed = base.clone();
        changed.entries[0].fields[0].value = "other".to_string();
        assert_ne!(
            Blake2Fingerprinter.fingerprint(&base),
            Blake2Fingerprinter.fingerprint(&changed)
        );
    }

    #[test]
    fn test_fingerprint_is_order_sensitive() {
        let base = facade();
        let mut reordered = base.clone();
        reordered.groups.reverse();
        assert_ne!(
            Blake2Fingerprinter.fingerprint(&base),
            Blake2Fingerprinter.fingerprint(&reordered)
        );
    }

    #[test]
    fn test_length_prefix_prevents_ambiguity() {
        let mut left = facade();
        let mut right = left.clone();
        left.groups[0].title = "ab".to_string();
        left.groups[1].title = "c".to_string();
        right.groups[0].title = "a".to_string();
        right.groups[1].title = "bc".to_string();
        assert_ne!(
            Blake2Fingerprinter.fingerprint(&left),
            Blake2Fingerprinter.fingerprint(&right)
        );
    }

    #[test]
    fn test_display_is_base64() {
        let fp = Fingerprint::from_bytes([0u8; FINGERPRINT_LENGTH]);
        assert_eq!(fp.to_string().len(), 43);
    }

    proptest! {
        #[test]
        fn prop_title_change_changes_fingerprint(a in "[a-z]{0,12}", b in "[a-z]{0,12}") {
            prop_assume!(a != b);
            let base = facade();
            let mut left = base.clone();
            let mut right = base;
            left.groups[0].title = a;
            right.groups[0].title = b;
            prop_assert_ne!(
                Blake2Fingerprinter.fingerprint(&left),
                Blake2Fingerprinter.fingerprint(&right)
            );
        }
    }
}
