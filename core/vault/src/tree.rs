//! Authoritative tree of groups and entries.
//!
//! The tree owns a private copy of the vault facade and applies structural
//! commands to it. Every command either applies completely or leaves the tree
//! untouched: all checks run before the first write.

use std::collections::HashSet;
use tracing::{debug, info, warn};

use vaultedit_common::{EntryId, Error, FieldId, GroupId, Result};
use vaultedit_facade::{Entry, FacadeFactory, Group, VaultFacade};

use crate::editing::EntryDraft;

/// Structural commands accepted by the [`VaultTree`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TreeAction {
    CreateGroup {
        group: Group,
    },
    RenameGroup {
        group_id: GroupId,
        title: String,
    },
    /// Reparent a group; `None` moves it to the root.
    MoveGroup {
        group_id: GroupId,
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
        group_ids: Vec<GroupId>,
        entry_ids: Vec<EntryId>,
    },
    SaveEntry {
        draft: EntryDraft,
    },
    SetEntryField {
        entry_id: EntryId,
        field_id: FieldId,
        value: String,
    },
}

impl TreeAction {
    /// Short name for logging.
    pub fn name(&self) -> &'static str {
        match self {
            TreeAction::CreateGroup { .. } => "create-group",
            TreeAction::RenameGroup { .. } => "rename-group",
            TreeAction::MoveGroup { .. } => "move-group",
            TreeAction::MoveEntry { .. } => "move-entry",
            TreeAction::DeleteEntry { .. } => "delete-entry",
            TreeAction::BatchDelete { .. } => "batch-delete",
            TreeAction::SaveEntry { .. } => "save-entry",
            TreeAction::SetEntryField { .. } => "set-entry-field",
        }
    }
}

/// Mutable vault tree.
#[derive(Debug, Clone)]
pub struct VaultTree {
    facade: VaultFacade,
}

impl VaultTree {
    /// Create a tree from a deep copy of `snapshot`.
    ///
    /// # Errors
    /// - The snapshot violates a structural invariant (see [`VaultFacade::validate`])
    pub fn from_snapshot(snapshot: &VaultFacade) -> Result<Self> {
        snapshot.validate()?;
        Ok(Self {
            facade: snapshot.clone(),
        })
    }

    /// Current content.
    pub fn facade(&self) -> &VaultFacade {
        &self.facade
    }

    /// Consume the tree, returning its content.
    pub fn into_facade(self) -> VaultFacade {
        self.facade
    }

    /// Apply a command. Returns `true` if it was applied.
    ///
    /// Commands naming unknown items, or that would break a tree invariant,
    /// are ignored.
    pub fn apply(&mut self, action: TreeAction) -> bool {
        let name = action.name();
        match self.try_apply(action) {
            Ok(()) => {
                info!(action = name, "Vault tree updated");
                true
            }
            Err(err @ Error::Conflict(_)) => {
                warn!(action = name, error = %err, "Rejected structural change");
                false
            }
            Err(err) => {
                debug!(action = name, error = %err, "Tree command ignored");
                false
            }
        }
    }

    fn try_apply(&mut self, action: TreeAction) -> Result<()> {
        match action {
            TreeAction::CreateGroup { group } => self.try_create_group(group),
            TreeAction::RenameGroup { group_id, title } => {
                self.group_mut(&group_id)?.title = title;
                Ok(())
            }
            TreeAction::MoveGroup {
                group_id,
                parent_id,
            } => self.try_move_group(&group_id, parent_id),
            TreeAction::MoveEntry {
                entry_id,
                parent_id,
            } => {
                self.require_group(&parent_id)?;
                self.entry_mut(&entry_id)?.parent_id = parent_id;
                Ok(())
            }
            TreeAction::DeleteEntry { entry_id } => {
                let index = self.entry_index(&entry_id)?;
                self.facade.entries.remove(index);
                Ok(())
            }
            TreeAction::BatchDelete {
                group_ids,
                entry_ids,
            } => self.try_batch_delete(&group_ids, &entry_ids),
            TreeAction::SaveEntry { draft } => self.try_save_entry(draft),
            TreeAction::SetEntryField {
                entry_id,
                field_id,
                value,
            } => {
                let entry = self.entry_mut(&entry_id)?;
                let field = entry.field_mut(&field_id).ok_or_else(|| {
                    Error::NotFound(format!("Field '{}' not found in '{}'", field_id, entry_id))
                })?;
                field.set_value(value);
                Ok(())
            }
        }
    }

    /// Create a group through `factory` and insert it.
    ///
    /// Returns the new group's ID, or `None` if `parent_id` is unknown.
    pub fn create_group(
        &mut self,
        factory: &dyn FacadeFactory,
        parent_id: Option<&GroupId>,
        title: impl Into<String>,
    ) -> Option<GroupId> {
        let mut group = factory.create_group(parent_id);
        group.title = title.into();
        let id = group.id.clone();
        self.apply(TreeAction::CreateGroup { group }).then_some(id)
    }

    /// Rename a group.
    pub fn rename_group(&mut self, group_id: &GroupId, title: impl Into<String>) -> bool {
        self.apply(TreeAction::RenameGroup {
            group_id: group_id.clone(),
            title: title.into(),
        })
    }

    /// Reparent a group. Moves into the group's own subtree are rejected.
    pub fn move_group(&mut self, group_id: &GroupId, parent_id: Option<&GroupId>) -> bool {
        self.apply(TreeAction::MoveGroup {
            group_id: group_id.clone(),
            parent_id: parent_id.cloned(),
        })
    }

    /// Move an entry into another group.
    pub fn move_entry(&mut self, entry_id: &EntryId, parent_id: &GroupId) -> bool {
        self.apply(TreeAction::MoveEntry {
            entry_id: entry_id.clone(),
            parent_id: parent_id.clone(),
        })
    }

    /// Remove one entry.
    pub fn delete_entry(&mut self, entry_id: &EntryId) -> bool {
        self.apply(TreeAction::DeleteEntry {
            entry_id: entry_id.clone(),
        })
    }

    /// Remove entries and groups; groups take their whole subtree with them.
    pub fn batch_delete(&mut self, group_ids: &[GroupId], entry_ids: &[EntryId]) -> bool {
        self.apply(TreeAction::BatchDelete {
            group_ids: group_ids.to_vec(),
            entry_ids: entry_ids.to_vec(),
        })
    }

    /// Commit a draft: insert it if new, otherwise replace the entry in place.
    pub fn save_entry(&mut self, draft: EntryDraft) -> bool {
        self.apply(TreeAction::SaveEntry { draft })
    }

    /// Set a committed entry's field value directly.
    pub fn set_entry_field(
        &mut self,
        entry_id: &EntryId,
        field_id: &FieldId,
        value: impl Into<String>,
    ) -> bool {
        self.apply(TreeAction::SetEntryField {
            entry_id: entry_id.clone(),
            field_id: field_id.clone(),
            value: value.into(),
        })
    }

    fn try_create_group(&mut self, group: Group) -> Result<()> {
        if self.facade.contains_id(group.id.as_str()) {
            return Err(Error::AlreadyExists(format!("ID '{}' already in use", group.id)));
        }
        if let Some(parent) = &group.parent_id {
            self.require_group(parent)?;
        }
        debug!(group_id = %group.id, "Creating group");
        self.facade.groups.push(group);
        Ok(())
    }

    fn try_move_group(&mut self, group_id: &GroupId, parent_id: Option<GroupId>) -> Result<()> {
        self.require_group(group_id)?;
        if let Some(parent) = &parent_id {
            self.require_group(parent)?;
            if self.facade.is_within(parent, group_id) {
                return Err(Error::Conflict(format!(
                    "Cannot move group '{}' into its own subtree '{}'",
                    group_id, parent
                )));
            }
        }
        self.group_mut(group_id)?.parent_id = parent_id;
        Ok(())
    }

    fn try_batch_delete(&mut self, group_ids: &[GroupId], entry_ids: &[EntryId]) -> Result<()> {
        let mut doomed_groups: HashSet<GroupId> = HashSet::new();
        for group_id in group_ids {
            doomed_groups.extend(self.facade.subtree_group_ids(group_id));
        }

        let named_entries: HashSet<&EntryId> = entry_ids.iter().collect();
        let doomed_entries = self
            .facade
            .entries
            .iter()
            .filter(|e| named_entries.contains(&e.id) || doomed_groups.contains(&e.parent_id))
            .count();

        if doomed_groups.is_empty() && doomed_entries == 0 {
            return Err(Error::NotFound("Nothing to delete".to_string()));
        }

        let survives_root = self
            .facade
            .root_groups()
            .any(|group| !doomed_groups.contains(&group.id));
        if !survives_root {
            return Err(Error::Conflict(
                "Deletion would remove every root group".to_string(),
            ));
        }

        debug!(
            groups = doomed_groups.len(),
            entries = doomed_entries,
            "Deleting items"
        );
        self.facade
            .entries
            .retain(|e| !named_entries.contains(&e.id) && !doomed_groups.contains(&e.parent_id));
        self.facade
            .groups
            .retain(|group| !doomed_groups.contains(&group.id));
        Ok(())
    }

    fn try_save_entry(&mut self, draft: EntryDraft) -> Result<()> {
        let entry = draft.entry;
        self.require_group(&entry.parent_id)?;

        if draft.is_new {
            if self.facade.contains_id(entry.id.as_str()) {
                return Err(Error::AlreadyExists(format!("ID '{}' already in use", entry.id)));
            }
            debug!(entry_id = %entry.id, "Inserting entry");
            self.facade.entries.push(entry);
        } else {
            let index = self.entry_index(&entry.id)?;
            debug!(entry_id = %entry.id, "Replacing entry");
            self.facade.entries[index] = entry;
        }
        Ok(())
    }

    fn require_group(&self, group_id: &GroupId) -> Result<()> {
        self.facade
            .group(group_id)
            .map(|_| ())
            .ok_or_else(|| Error::NotFound(format!("Group '{}' not found", group_id)))
    }

    fn group_mut(&mut self, group_id: &GroupId) -> Result<&mut Group> {
        self.facade
            .group_mut(group_id)
            .ok_or_else(|| Error::NotFound(format!("Group '{}' not found", group_id)))
    }

    fn entry_index(&self, entry_id: &EntryId) -> Result<usize> {
        self.facade
            .entries
            .iter()
            .position(|entry| &entry.id == entry_id)
            .ok_or_else(|| Error::NotFound(format!("Entry '{}' not found", entry_id)))
    }

    fn entry_mut(&mut self, entry_id: &EntryId) -> Result<&mut Entry> {
        self.facade
            .entry_mut(entry_id)
            .ok_or_else(|| Error::NotFound(format!("Entry '{}' not found", entry_id)))
    }
}
