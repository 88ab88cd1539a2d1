//! Staged editing of a single entry.
//!
//! The buffer holds at most one draft. A draft is a private copy of an entry:
//! edits to it never reach the vault tree until the session saves it.

use serde::{Deserialize, Serialize};
use tracing::debug;

use vaultedit_common::{Error, FieldId, Result};
use vaultedit_facade::{Entry, Field, FieldValueType};

/// An entry under edit.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EntryDraft {
    /// Working copy of the entry.
    pub entry: Entry,
    /// `true` if saving inserts a new entry, `false` if it replaces one.
    pub is_new: bool,
}

impl EntryDraft {
    /// Draft for an entry that does not exist in the tree yet.
    pub fn new_entry(entry: Entry) -> Self {
        Self {
            entry,
            is_new: true,
        }
    }

    /// Draft revising an existing entry.
    pub fn revision(entry: &Entry) -> Self {
        Self {
            entry: entry.clone(),
            is_new: false,
        }
    }
}

/// Partial update of a draft field. Absent members are left untouched.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldUpdate {
    /// New value.
    pub value: Option<String>,
    /// New property key; also becomes the display name.
    pub property: Option<String>,
}

/// Commands accepted by the [`EditingBuffer`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EditAction {
    SetEntry(EntryDraft),
    AddField(Field),
    UpdateField {
        field_id: FieldId,
        update: FieldUpdate,
    },
    SetFieldValueType {
        field_id: FieldId,
        value_type: FieldValueType,
    },
    RemoveField {
        field_id: FieldId,
    },
    StopEditing,
}

/// State of the editing buffer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EditingState {
    /// No draft.
    Idle,
    /// A draft is open.
    Editing,
}

/// Single-slot store for the entry currently being edited.
#[derive(Debug, Clone, Default)]
pub struct EditingBuffer {
    draft: Option<EntryDraft>,
}

impl EditingBuffer {
    /// Create an idle buffer.
    pub fn new() -> Self {
        Self::default()
    }

    /// Current state.
    pub fn state(&self) -> EditingState {
        match self.draft {
            Some(_) => EditingState::Editing,
            None => EditingState::Idle,
        }
    }

    /// Check if a draft is open.
    pub fn is_editing(&self) -> bool {
        self.draft.is_some()
    }

    /// The open draft, if any.
    pub fn draft(&self) -> Option<&EntryDraft> {
        self.draft.as_ref()
    }

    /// Apply a command. Returns `true` if the buffer changed.
    ///
    /// Field commands while idle, or naming an unknown field, are no-ops.
    pub fn apply(&mut self, action: EditAction) -> bool {
        match self.try_apply(action) {
            Ok(()) => true,
            Err(err) => {
                debug!(error = %err, "Editing command ignored");
                false
            }
        }
    }

    fn try_apply(&mut self, action: EditAction) -> Result<()> {
        match action {
            EditAction::SetEntry(draft) => {
                debug!(entry_id = %draft.entry.id, is_new = draft.is_new, "Editing started");
                self.draft = Some(draft);
                Ok(())
            }
            EditAction::AddField(field) => {
                self.draft_mut()?.entry.fields.push(field);
                Ok(())
            }
            EditAction::UpdateField { field_id, update } => {
                let field = self.field_mut(&field_id)?;
                if let Some(value) = update.value {
                    field.set_value(value);
                }
                if let Some(property) = update.property {
                    field.name = property.clone();
                    field.property_name = property;
                }
                Ok(())
            }
            EditAction::SetFieldValueType {
                field_id,
                value_type,
            } => {
                self.field_mut(&field_id)?.value_type = value_type;
                Ok(())
            }
            EditAction::RemoveField { field_id } => {
                let fields = &mut self.draft_mut()?.entry.fields;
                let index = fields
                    .iter()
                    .position(|field| field.id == field_id)
                    .ok_or_else(|| Error::NotFound(format!("Field '{}' not found", field_id)))?;
                fields.remove(index);
                Ok(())
            }
            EditAction::StopEditing => {
                self.draft_mut()?;
                self.draft = None;
                debug!("Editing stopped");
                Ok(())
            }
        }
    }

    /// Open a draft, replacing any previous one.
    pub fn set_entry(&mut self, draft: EntryDraft) {
        self.apply(EditAction::SetEntry(draft));
    }

    /// Append a field to the draft and return its ID.
    pub fn add_field(&mut self, field: Field) -> Option<FieldId> {
        let field_id = field.id.clone();
        self.apply(EditAction::AddField(field)).then_some(field_id)
    }

    /// Update a draft field's value and/or property.
    pub fn update_field(&mut self, field_id: &FieldId, update: FieldUpdate) -> bool {
        self.apply(EditAction::UpdateField {
            field_id: field_id.clone(),
            update,
        })
    }

    /// Change how a draft field's value is interpreted.
    pub fn set_field_value_type(&mut self, field_id: &FieldId, value_type: FieldValueType) -> bool {
        self.apply(EditAction::SetFieldValueType {
            field_id: field_id.clone(),
            value_type,
        })
    }

    /// Remove a field from the draft.
    pub fn remove_field(&mut self, field_id: &FieldId) -> bool {
        self.apply(EditAction::RemoveField {
            field_id: field_id.clone(),
        })
    }

    /// Discard the draft, returning it.
    pub fn stop_editing(&mut self) -> Option<EntryDraft> {
        let draft = self.draft.take();
        if draft.is_some() {
            debug!("Editing stopped");
        }
        draft
    }

    fn draft_mut(&mut self) -> Result<&mut EntryDraft> {
        self.draft
            .as_mut()
            .ok_or_else(|| Error::NotPermitted("No entry is being edited".to_string()))
    }

    fn field_mut(&mut self, field_id: &FieldId) -> Result<&mut Field> {
        self.draft_mut()?
            .entry
            .field_mut(field_id)
            .ok_or_else(|| Error::NotFound(format!("Field '{}' not found", field_id)))
    }
}
