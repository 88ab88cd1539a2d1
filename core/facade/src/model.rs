//! Groups, entries and fields of a decrypted vault.
//!
//! A [`VaultFacade`] is a flat, ordered representation of the vault tree:
//! groups reference their parent by ID and entries reference the group they
//! live in. Order matters: it is preserved through edits and is part of the
//! vault's fingerprint.

use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet};
use std::fmt;
use zeroize::Zeroize;

use vaultedit_common::{EntryId, Error, FieldId, GroupId, Result};

/// Property name of the field holding an entry's title.
pub const TITLE_PROPERTY: &str = "title";

/// How a field's value should be interpreted.
///
/// The core treats every value opaquely; the tag is carried for consumers.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FieldValueType {
    #[default]
    #[serde(rename = "default", alias = "text")]
    Text,
    Note,
    Password,
    Otp,
}

impl FieldValueType {
    /// Stable tag used when hashing.
    pub fn as_str(&self) -> &'static str {
        match self {
            FieldValueType::Text => "default",
            FieldValueType::Note => "note",
            FieldValueType::Password => "password",
            FieldValueType::Otp => "otp",
        }
    }
}

/// Kind of entry, which decides the default field set.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EntryType {
    #[default]
    Login,
    Website,
    SshKey,
    CreditCard,
    Note,
}

impl EntryType {
    /// Stable tag used when hashing.
    pub fn as_str(&self) -> &'static str {
        match self {
            EntryType::Login => "login",
            EntryType::Website => "website",
            EntryType::SshKey => "ssh_key",
            EntryType::CreditCard => "credit_card",
            EntryType::Note => "note",
        }
    }

    /// Default `(property, value type)` pairs for a fresh entry of this type.
    pub fn default_fields(&self) -> &'static [(&'static str, FieldValueType)] {
        use FieldValueType::{Note, Password, Text};
        match self {
            EntryType::Login => &[
                (TITLE_PROPERTY, Text),
                ("username", Text),
                ("password", Password),
            ],
            EntryType::Website => &[
                (TITLE_PROPERTY, Text),
                ("username", Text),
                ("password", Password),
                ("url", Text),
            ],
            EntryType::SshKey => &[
                (TITLE_PROPERTY, Text),
                ("publicKey", Text),
                ("privateKey", Password),
            ],
            EntryType::CreditCard => &[
                (TITLE_PROPERTY, Text),
                ("username", Text),
                ("cardNumber", Password),
                ("expiry", Text),
                ("cvv", Password),
            ],
            EntryType::Note => &[(TITLE_PROPERTY, Text), ("note", Note)],
        }
    }
}

/// A single named value inside an entry.
///
/// The value is zeroized on drop and redacted from `Debug` output.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Field {
    /// Field identifier, unique within its entry. Minted on load if absent.
    #[serde(default = "FieldId::generate")]
    pub id: FieldId,
    /// Display name.
    pub name: String,
    /// Property key the value is stored under.
    pub property_name: String,
    /// Opaque value.
    pub value: String,
    /// Interpretation tag.
    #[serde(default)]
    pub value_type: FieldValueType,
}

impl Field {
    /// Create a field with a random ID whose display name equals its property key.
    pub fn new(
        property: impl Into<String>,
        value: impl Into<String>,
        value_type: FieldValueType,
    ) -> Self {
        Self::with_id(FieldId::generate(), property, value, value_type)
    }

    /// Create a field with the given ID.
    pub fn with_id(
        id: FieldId,
        property: impl Into<String>,
        value: impl Into<String>,
        value_type: FieldValueType,
    ) -> Self {
        let property = property.into();
        Self {
            id,
            name: property.clone(),
            property_name: property,
            value: value.into(),
            value_type,
        }
    }

    /// Replace the value, wiping the previous one first.
    pub fn set_value(&mut self, value: impl Into<String>) {
        self.value.zeroize();
        self.value = value.into();
    }
}

impl Drop for Field {
    fn drop(&mut self) {
        self.value.zeroize();
    }
}

impl fmt::Debug for Field {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Field")
            .field("id", &self.id)
            .field("name", &self.name)
            .field("property_name", &self.property_name)
            .field("value", &format_args!("[REDACTED; {} bytes]", self.value.len()))
            .field("value_type", &self.value_type)
            .finish()
    }
}

/// A group in the vault tree.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Group {
    pub id: GroupId,
    pub title: String,
    /// Parent group, `None` for root groups.
    #[serde(rename = "parentID")]
    pub parent_id: Option<GroupId>,
}

/// A credential entry, always parented by a group.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Entry {
    pub id: EntryId,
    #[serde(rename = "parentID")]
    pub parent_id: GroupId,
    #[serde(rename = "type", default)]
    pub entry_type: EntryType,
    pub fields: Vec<Field>,
}

impl Entry {
    /// Value of the title field, or an empty string.
    pub fn title(&self) -> &str {
        self.property(TITLE_PROPERTY).unwrap_or("")
    }

    /// Value of the first field stored under `property`.
    pub fn property(&self, property: &str) -> Option<&str> {
        self.fields
            .iter()
            .find(|field| field.property_name == property)
            .map(|field| field.value.as_str())
    }

    /// Get a field by ID.
    pub fn field(&self, id: &FieldId) -> Option<&Field> {
        self.fields.iter().find(|field| &field.id == id)
    }

    /// Get a mutable field by ID.
    pub fn field_mut(&mut self, id: &FieldId) -> Option<&mut Field> {
        self.fields.iter_mut().find(|field| &field.id == id)
    }
}

/// Complete in-memory snapshot of a vault: ordered groups and entries.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct VaultFacade {
    pub groups: Vec<Group>,
    pub entries: Vec<Entry>,
}

impl VaultFacade {
    /// Create an empty facade.
    pub fn new() -> Self {
        Self::default()
    }

    /// Get a group by ID.
    pub fn group(&self, id: &GroupId) -> Option<&Group> {
        self.groups.iter().find(|group| &group.id == id)
    }

    /// Get a mutable group by ID.
    pub fn group_mut(&mut self, id: &GroupId) -> Option<&mut Group> {
        self.groups.iter_mut().find(|group| &group.id == id)
    }

    /// Get an entry by ID.
    pub fn entry(&self, id: &EntryId) -> Option<&Entry> {
        self.entries.iter().find(|entry| &entry.id == id)
    }

    /// Get a mutable entry by ID.
    pub fn entry_mut(&mut self, id: &EntryId) -> Option<&mut Entry> {
        self.entries.iter_mut().find(|entry| &entry.id == id)
    }

    /// Check whether any group or entry uses `id`.
    pub fn contains_id(&self, id: &str) -> bool {
        self.groups.iter().any(|group| group.id.as_str() == id)
            || self.entries.iter().any(|entry| entry.id.as_str() == id)
    }

    /// Groups without a parent, in order.
    pub fn root_groups(&self) -> impl Iterator<Item = &Group> {
        self.groups.iter().filter(|group| group.parent_id.is_none())
    }

    /// Direct child groups of `parent`, in order.
    pub fn child_groups<'a>(&'a self, parent: &'a GroupId) -> impl Iterator<Item = &'a Group> {
        self.groups
            .iter()
            .filter(move |group| group.parent_id.as_ref() == Some(parent))
    }

    /// Entries directly inside `group`, in order.
    pub fn entries_in<'a>(&'a self, group: &'a GroupId) -> impl Iterator<Item = &'a Entry> {
        self.entries
            .iter()
            .filter(move |entry| &entry.parent_id == group)
    }

    /// IDs of `root` and every group below it.
    ///
    /// Returns an empty set if `root` is unknown.
    pub fn subtree_group_ids(&self, root: &GroupId) -> HashSet<GroupId> {
        let mut subtree = HashSet::new();
        if self.group(root).is_none() {
            return subtree;
        }

        let mut children: HashMap<&GroupId, Vec<&GroupId>> = HashMap::new();
        for group in &self.groups {
            if let Some(parent) = &group.parent_id {
                children.entry(parent).or_default().push(&group.id);
            }
        }

        let mut pending = vec![root];
        while let Some(current) = pending.pop() {
            if !subtree.insert(current.clone()) {
                continue;
            }
            if let Some(kids) = children.get(current) {
                pending.extend(kids.iter().copied());
            }
        }
        subtree
    }

    /// Check whether `ancestor` appears on the parent chain of `group`,
    /// counting `group` itself.
    pub fn is_within(&self, group: &GroupId, ancestor: &GroupId) -> bool {
        let mut current = Some(group);
        // The chain is bounded by the group count even if the data is cyclic.
        for _ in 0..=self.groups.len() {
            match current {
                Some(id) if id == ancestor => return true,
                Some(id) => current = self.group(id).and_then(|g| g.parent_id.as_ref()),
                None => return false,
            }
        }
        false
    }

    /// Verify the structural invariants of the tree.
    ///
    /// # Errors
    /// - Duplicate group or entry IDs (the two share one namespace)
    /// - A group parented by itself, by an unknown group, or inside a cycle
    /// - An entry parented by an unknown group
    /// - No root group
    pub fn validate(&self) -> Result<()> {
        let mut seen = HashSet::new();
        let ids = self
            .groups
            .iter()
            .map(|g| g.id.as_str())
            .chain(self.entries.iter().map(|e| e.id.as_str()));
        for id in ids {
            if !seen.insert(id) {
                return Err(Error::InvalidInput(format!("Duplicate ID '{}'", id)));
            }
        }

        for group in &self.groups {
            let Some(parent) = &group.parent_id else {
                continue;
            };
            if self.group(parent).is_none() {
                return Err(Error::InvalidInput(format!(
                    "Group '{}' references unknown parent '{}'",
                    group.id, parent
                )));
            }
            if self.is_within(parent, &group.id) {
                return Err(Error::InvalidInput(format!(
                    "Group '{}' is its own ancestor",
                    group.id
                )));
            }
        }

        for entry in &self.entries {
            if self.group(&entry.parent_id).is_none() {
                return Err(Error::InvalidInput(format!(
                    "Entry '{}' references unknown group '{}'",
                    entry.id, entry.parent_id
                )));
            }
        }

        if self.root_groups().next().is_none() {
            return Err(Error::InvalidInput("Vault has no root group".to_string()));
        }

        Ok(())
    }

    /// Serialize facade to JSON.
    pub fn to_json(&self) -> Result<String> {
        serde_json::to_string_pretty(self).map_err(|e| Error::Serialization(e.to_string()))
    }

    /// Deserialize facade from JSON.
    pub fn from_json(json: &str) -> Result<Self> {
        serde_json::from_str(json).map_err(|e| Error::Serialization(e.to_string()))
    }
}
