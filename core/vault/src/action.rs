//! User-facing actions dispatched to a [`VaultSession`](crate::VaultSession).
//!
//! Actions serialize as JSON objects tagged by `"type"`, so scripted sessions
//! can be replayed from a file.

use serde::{Deserialize, Serialize};

use vaultedit_common::{EntryId, FieldId, GroupId};
use vaultedit_facade::{EntryType, FieldValueType};

use crate::filter::SortMode;

/// Every action a session understands.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "kebab-case")]
pub enum Action {
    // Selection and view state
    SelectGroup {
        group_id: GroupId,
    },
    SelectEntry {
        entry_id: EntryId,
    },
    ExpandGroup {
        group_id: GroupId,
    },
    CollapseGroup {
        group_id: GroupId,
    },

    // Tree structure
    CreateGroup {
        #[serde(default)]
        parent_id: Option<GroupId>,
        title: String,
    },
    RenameGroup {
        group_id: GroupId,
        title: String,
    },
    MoveGroup {
        group_id: GroupId,
        #[serde(default)]
        parent_id: Option<GroupId>,
    },
    MoveEntry {
        entry_id: EntryId,
        parent_id: GroupId,
    },
    DeleteEntry {
        entry_id: EntryId,
    },
    BatchDelete {
        #[serde(default)]
        group_ids: Vec<GroupId>,
        #[serde(default)]
        entry_ids: Vec<EntryId>,
    },
    UpdateFieldInPlace {
        entry_id: EntryId,
        field_id: FieldId,
        value: String,
    },

    // Draft editing
    AddEntry {
        #[serde(default)]
        entry_type: EntryType,
    },
    Edit,
    SaveEdit,
    CancelEdit,
    AddField,
    UpdateField {
        field_id: FieldId,
        value: String,
    },
    RenameField {
        field_id: FieldId,
        property: String,
    },
    SetFieldValueType {
        field_id: FieldId,
        value_type: FieldValueType,
    },
    RemoveField {
        field_id: FieldId,
    },

    // Filters
    GroupFilterTerm {
        term: String,
    },
    GroupSortMode {
        sort_mode: SortMode,
    },
    EntriesFilterTerm {
        term: String,
    },
    EntriesSortMode {
        sort_mode: SortMode,
    },
}

impl Action {
    /// Parse a JSON array of actions.
    pub fn parse_script(json: &str) -> vaultedit_common::Result<Vec<Action>> {
        Ok(serde_json::from_str(json)?)
    }
}
