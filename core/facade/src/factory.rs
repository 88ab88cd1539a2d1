//! Construction of new groups and entries.
//!
//! The editor never invents groups or entries itself; it asks a
//! [`FacadeFactory`] for them so that identifier assignment stays in one place.

use std::cell::Cell;

use vaultedit_common::{EntryId, FieldId, GroupId};

use crate::model::{Entry, EntryType, Field, FieldValueType, Group};

/// Produces new groups, entries and fields with fresh identifiers.
///
/// # Contract
/// - Every returned group, entry or field carries an ID not handed out before
/// - New entries carry the default field set of their type
pub trait FacadeFactory {
    /// Create a new, untitled group under `parent_id` (or at the root).
    fn create_group(&self, parent_id: Option<&GroupId>) -> Group;

    /// Create a new entry of `entry_type` inside `parent_id`.
    fn create_entry(&self, entry_type: EntryType, parent_id: &GroupId) -> Entry;

    /// Create an empty field stored under `property`.
    fn create_field(&self, property: &str, value_type: FieldValueType) -> Field;
}

fn default_fields<F: FacadeFactory + ?Sized>(factory: &F, entry_type: EntryType) -> Vec<Field> {
    entry_type
        .default_fields()
        .iter()
        .map(|(property, value_type)| factory.create_field(property, *value_type))
        .collect()
}

/// Factory assigning random UUIDs.
#[derive(Debug, Clone, Copy, Default)]
pub struct UuidFactory;

impl FacadeFactory for UuidFactory {
    fn create_group(&self, parent_id: Option<&GroupId>) -> Group {
        Group {
            id: GroupId::generate(),
            title: String::new(),
            parent_id: parent_id.cloned(),
        }
    }

    fn create_entry(&self, entry_type: EntryType, parent_id: &GroupId) -> Entry {
        Entry {
            id: EntryId::generate(),
            parent_id: parent_id.clone(),
            entry_type,
            fields: default_fields(self, entry_type),
        }
    }

    fn create_field(&self, property: &str, value_type: FieldValueType) -> Field {
        Field::new(property, "", value_type)
    }
}

/// Factory assigning predictable, counter-based IDs (`g1`, `e2`, `f3`, ...).
///
/// Useful for reproducible fixtures. IDs are unique per factory instance only.
#[derive(Debug, Default)]
pub struct SequentialFactory {
    prefix: String,
    counter: Cell<u64>,
}

impl SequentialFactory {
    /// Create a factory whose IDs start with `prefix`.
    pub fn new(prefix: impl Into<String>) -> Self {
        Self {
            prefix: prefix.into(),
            counter: Cell::new(0),
        }
    }

    fn next(&self, kind: &str) -> String {
        let n = self.counter.get() + 1;
        self.counter.set(n);
        format!("{}{}{}", self.prefix, kind, n)
    }
}

impl FacadeFactory for SequentialFactory {
    fn create_group(&self, parent_id: Option<&GroupId>) -> Group {
        Group {
            id: GroupId::from(self.next("g").as_str()),
            title: String::new(),
            parent_id: parent_id.cloned(),
        }
    }

    fn create_entry(&self, entry_type: EntryType, parent_id: &GroupId) -> Entry {
        Entry {
            id: EntryId::from(self.next("e").as_str()),
            parent_id: parent_id.clone(),
            entry_type,
            fields: default_fields(self, entry_type),
        }
    }

    fn create_field(&self, property: &str, value_type: FieldValueType) -> Field {
        Field::with_id(FieldId::from(self.next("f").as_str()), property, "", value_type)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::TITLE_PROPERTY;

    #[test]
    fn test_uuid_factory_group() {
        let parent = GroupId::from("root");
        let group = UuidFactory.create_group(Some(&parent));
        assert_eq!(group.parent_id, Some(parent));
        assert!(group.title.is_empty());
        assert_ne!(UuidFactory.create_group(None).id, group.id);
    }

    #[test]
    fn test_entry_gets_default_fields() {
        let parent = GroupId::from("root");
        let entry = UuidFactory.create_entry(EntryType::Note, &parent);
        assert_eq!(entry.parent_id, parent);
        assert_eq!(entry.fields.len(), 2);
        assert_eq!(entry.fields[0].property_name, TITLE_PROPERTY);
        assert_eq!(entry.fields[1].value_type, FieldValueType::Note);
    }

    #[test]
    fn test_sequential_ids_never_repeat() {
        let factory = SequentialFactory::new("t-");
        let parent = GroupId::from("root");
        let g = factory.create_group(None);
        let e = factory.create_entry(EntryType::Login, &parent);
        assert_eq!(g.id.as_str(), "t-g1");
        assert_eq!(e.id.as_str(), "t-e2");
        assert_eq!(e.fields[0].id.as_str(), "t-f3");
        assert_eq!(factory.create_field("url", FieldValueType::Text).id.as_str(), "t-f6");
    }

    #[test]
    fn test_sequential_factories_agree() {
        let parent = GroupId::from("root");
        let a = SequentialFactory::new("").create_entry(EntryType::Website, &parent);
        let b = SequentialFactory::new("").create_entry(EntryType::Website, &parent);
        assert_eq!(a, b);
    }
}
