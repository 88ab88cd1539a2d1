//! Vault editing session.
//!
//! A session composes the vault tree, the editing buffer and the two filter
//! stores, tracks what is selected, and tells the owner when the vault has
//! really changed. The source snapshot handed in at construction is kept
//! untouched and serves as the baseline: an update is only emitted when the
//! tree's content differs from it.

use tracing::{debug, info};

use vaultedit_common::{EntryId, FieldId, GroupId, Result};
use vaultedit_facade::{
    Blake2Fingerprinter, Entry, EntryType, FacadeFactory, FieldValueType, Fingerprint,
    Fingerprinter, Group, UuidFactory, VaultFacade,
};

use crate::action::Action;
use crate::compare::FingerprintComparator;
use crate::config::SessionConfig;
use crate::editing::{EditingBuffer, EntryDraft, FieldUpdate};
use crate::filter::{FilterState, FilterStore, SortMode};
use crate::tree::VaultTree;

/// Receives the full vault whenever it diverges from the source snapshot.
pub type UpdateCallback = Box<dyn FnMut(&VaultFacade)>;

/// External collaborators a session relies on.
pub struct Collaborators {
    /// Mints new groups and entries.
    pub factory: Box<dyn FacadeFactory>,
    /// Hashes vault content for change detection.
    pub fingerprinter: Box<dyn Fingerprinter>,
}

impl Default for Collaborators {
    fn default() -> Self {
        Self {
            factory: Box::new(UuidFactory),
            fingerprinter: Box::new(Blake2Fingerprinter),
        }
    }
}

/// What the user currently has selected.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Selection {
    pub group_id: Option<GroupId>,
    pub entry_id: Option<EntryId>,
}

/// Editing session over one vault snapshot.
pub struct VaultSession {
    /// Snapshot supplied by the owner. Never mutated.
    source: VaultFacade,
    tree: VaultTree,
    editing: EditingBuffer,
    group_filter: FilterStore,
    entries_filter: FilterStore,
    selection: Selection,
    expanded_groups: Vec<GroupId>,
    comparator: FingerprintComparator,
    factory: Box<dyn FacadeFactory>,
    on_update: UpdateCallback,
    /// Fingerprint at the previous evaluation; `None` before the first one.
    last_seen: Option<Fingerprint>,
}

impl VaultSession {
    /// Open a session with default configuration and collaborators.
    ///
    /// # Errors
    /// - The snapshot violates a structural invariant
    pub fn new(source: VaultFacade, on_update: impl FnMut(&VaultFacade) + 'static) -> Result<Self> {
        Self::with_config(
            source,
            SessionConfig::default(),
            Collaborators::default(),
            on_update,
        )
    }

    /// Open a session.
    ///
    /// # Postconditions
    /// - The tree holds a deep copy of `source`
    /// - The first group is selected, no entry is selected
    /// - `on_update` has not been called
    ///
    /// # Errors
    /// - The snapshot violates a structural invariant (duplicate IDs, dangling
    ///   parents, cycles, no root group)
    pub fn with_config(
        source: VaultFacade,
        config: SessionConfig,
        collaborators: Collaborators,
        on_update: impl FnMut(&VaultFacade) + 'static,
    ) -> Result<Self> {
        let tree = VaultTree::from_snapshot(&source)?;

        let selection = Selection {
            group_id: tree.facade().groups.first().map(|group| group.id.clone()),
            entry_id: None,
        };
        let expanded_groups = if config.expand_root_groups {
            tree.facade().root_groups().map(|group| group.id.clone()).collect()
        } else {
            Vec::new()
        };

        let mut session = Self {
            source,
            tree,
            editing: EditingBuffer::new(),
            group_filter: FilterStore::with_sort_mode(config.group_sort),
            entries_filter: FilterStore::with_sort_mode(config.entry_sort),
            selection,
            expanded_groups,
            comparator: FingerprintComparator::new(collaborators.fingerprinter),
            factory: collaborators.factory,
            on_update: Box::new(on_update),
            last_seen: None,
        };
        session.evaluate();

        info!(
            groups = session.source.groups.len(),
            entries = session.source.entries.len(),
            "Vault session opened"
        );
        Ok(session)
    }

    /// The source snapshot.
    pub fn source(&self) -> &VaultFacade {
        &self.source
    }

    /// The current vault.
    pub fn vault(&self) -> &VaultFacade {
        self.tree.facade()
    }

    /// Consume the session, returning the current vault.
    pub fn into_vault(self) -> VaultFacade {
        self.tree.into_facade()
    }

    /// Current selection.
    pub fn selection(&self) -> &Selection {
        &self.selection
    }

    /// The selected group's ID.
    pub fn selected_group_id(&self) -> Option<&GroupId> {
        self.selection.group_id.as_ref()
    }

    /// The selected entry's ID.
    pub fn selected_entry_id(&self) -> Option<&EntryId> {
        self.selection.entry_id.as_ref()
    }

    /// The selected entry.
    pub fn selected_entry(&self) -> Option<&Entry> {
        self.selection
            .entry_id
            .as_ref()
            .and_then(|id| self.vault().entry(id))
    }

    /// Entries directly inside the selected group, in vault order.
    pub fn current_entries(&self) -> Vec<&Entry> {
        match &self.selection.group_id {
            Some(group_id) => self.vault().entries_in(group_id).collect(),
            None => Vec::new(),
        }
    }

    /// The draft under edit.
    pub fn editing_entry(&self) -> Option<&EntryDraft> {
        self.editing.draft()
    }

    /// Check if a draft is open.
    pub fn is_editing(&self) -> bool {
        self.editing.is_editing()
    }

    /// IDs of expanded groups, in expansion order.
    pub fn expanded_groups(&self) -> &[GroupId] {
        &self.expanded_groups
    }

    /// Filter configuration of the group list.
    pub fn group_filter(&self) -> &FilterState {
        self.group_filter.state()
    }

    /// Filter configuration of the entry list.
    pub fn entries_filter(&self) -> &FilterState {
        self.entries_filter.state()
    }

    /// Groups passing the group filter, sorted by its sort mode.
    pub fn visible_groups(&self) -> Vec<&Group> {
        self.group_filter
            .state()
            .apply(&self.vault().groups, |group| group.title.as_str())
    }

    /// Entries of the selected group passing the entry filter, sorted.
    pub fn visible_entries(&self) -> Vec<&Entry> {
        self.entries_filter
            .state()
            .apply(self.current_entries(), |entry| entry.title())
    }

    /// Fingerprint of the current vault.
    pub fn fingerprint(&self) -> Fingerprint {
        self.comparator.fingerprint(self.vault())
    }

    /// Route an action to the matching operation.
    pub fn dispatch(&mut self, action: Action) {
        match action {
            Action::SelectGroup { group_id } => self.select_group(&group_id),
            Action::SelectEntry { entry_id } => self.select_entry(&entry_id),
            Action::ExpandGroup { group_id } => self.expand_group(&group_id),
            Action::CollapseGroup { group_id } => self.collapse_group(&group_id),
            Action::CreateGroup { parent_id, title } => {
                self.create_group(parent_id.as_ref(), title);
            }
            Action::RenameGroup { group_id, title } => {
                self.rename_group(&group_id, title);
            }
            Action::MoveGroup {
                group_id,
                parent_id,
            } => {
                self.move_group(&group_id, parent_id.as_ref());
            }
            Action::MoveEntry {
                entry_id,
                parent_id,
            } => {
                self.move_entry_to_group(&entry_id, &parent_id);
            }
            Action::DeleteEntry { entry_id } => {
                self.delete_entry(&entry_id);
            }
            Action::BatchDelete {
                group_ids,
                entry_ids,
            } => {
                self.batch_delete_items(&group_ids, &entry_ids);
            }
            Action::UpdateFieldInPlace {
                entry_id,
                field_id,
                value,
            } => {
                self.update_field_in_place(&entry_id, &field_id, value);
            }
            Action::AddEntry { entry_type } => self.add_entry(entry_type),
            Action::Edit => self.edit(),
            Action::SaveEdit => {
                self.save_edit();
            }
            Action::CancelEdit => self.cancel_edit(),
            Action::AddField => {
                self.add_field();
            }
            Action::UpdateField { field_id, value } => {
                self.update_field(&field_id, value);
            }
            Action::RenameField { field_id, property } => {
                self.rename_field(&field_id, property);
            }
            Action::SetFieldValueType {
                field_id,
                value_type,
            } => {
                self.set_field_value_type(&field_id, value_type);
            }
            Action::RemoveField { field_id } => {
                self.remove_field(&field_id);
            }
            Action::GroupFilterTerm { term } => {
                self.set_group_filter_term(term);
            }
            Action::GroupSortMode { sort_mode } => {
                self.set_group_sort_mode(sort_mode);
            }
            Action::EntriesFilterTerm { term } => {
                self.set_entries_filter_term(term);
            }
            Action::EntriesSortMode { sort_mode } => {
                self.set_entries_sort_mode(sort_mode);
            }
        }
    }

    /// Select a group and clear the entry selection.
    pub fn select_group(&mut self, group_id: &GroupId) {
        if self.vault().group(group_id).is_none() {
            debug!(group_id = %group_id, "Ignoring selection of unknown group");
            return;
        }
        self.selection.group_id = Some(group_id.clone());
        self.selection.entry_id = None;
    }

    /// Select an entry. Ignored while a draft is open.
    pub fn select_entry(&mut self, entry_id: &EntryId) {
        if self.editing.is_editing() {
            debug!(entry_id = %entry_id, "Ignoring entry selection while editing");
            return;
        }
        if self.vault().entry(entry_id).is_none() {
            debug!(entry_id = %entry_id, "Ignoring selection of unknown entry");
            return;
        }
        self.selection.entry_id = Some(entry_id.clone());
    }

    /// Mark a group as expanded.
    pub fn expand_group(&mut self, group_id: &GroupId) {
        if self.vault().group(group_id).is_some() && !self.expanded_groups.contains(group_id) {
            self.expanded_groups.push(group_id.clone());
        }
    }

    /// Mark a group as collapsed.
    pub fn collapse_group(&mut self, group_id: &GroupId) {
        self.expanded_groups.retain(|id| id != group_id);
    }

    /// Create a group. Returns its ID if it was inserted.
    pub fn create_group(
        &mut self,
        parent_id: Option<&GroupId>,
        title: impl Into<String>,
    ) -> Option<GroupId> {
        let created = self.tree.create_group(self.factory.as_ref(), parent_id, title);
        self.commit(created.is_some());
        created
    }

    /// Rename a group.
    pub fn rename_group(&mut self, group_id: &GroupId, title: impl Into<String>) -> bool {
        let applied = self.tree.rename_group(group_id, title);
        self.commit(applied)
    }

    /// Reparent a group; `None` moves it to the root.
    pub fn move_group(&mut self, group_id: &GroupId, parent_id: Option<&GroupId>) -> bool {
        let applied = self.tree.move_group(group_id, parent_id);
        self.commit(applied)
    }

    /// Move an entry to another group, discarding its draft if it is under edit.
    pub fn move_entry_to_group(&mut self, entry_id: &EntryId, parent_id: &GroupId) -> bool {
        let applied = self.tree.move_entry(entry_id, parent_id);
        if self.draft_targets(entry_id) {
            self.editing.stop_editing();
        }
        self.commit(applied)
    }

    /// Delete an entry and stop any editing.
    pub fn delete_entry(&mut self, entry_id: &EntryId) -> bool {
        let applied = self.tree.delete_entry(entry_id);
        self.editing.stop_editing();
        self.commit(applied)
    }

    /// Delete entries and groups (with their subtrees) in one step.
    pub fn batch_delete_items(&mut self, group_ids: &[GroupId], entry_ids: &[EntryId]) -> bool {
        let applied = self.tree.batch_delete(group_ids, entry_ids);
        self.commit(applied)
    }

    /// Set a committed entry's field value without going through a draft.
    pub fn update_field_in_place(
        &mut self,
        entry_id: &EntryId,
        field_id: &FieldId,
        value: impl Into<String>,
    ) -> bool {
        let applied = self.tree.set_entry_field(entry_id, field_id, value);
        self.commit(applied)
    }

    /// Start a draft for a new entry in the selected group.
    pub fn add_entry(&mut self, entry_type: EntryType) {
        let Some(parent_id) = self.selection.group_id.clone() else {
            debug!("Ignoring new entry without a selected group");
            return;
        };
        let entry = self.factory.create_entry(entry_type, &parent_id);
        self.editing.set_entry(EntryDraft::new_entry(entry));
        self.selection.entry_id = None;
    }

    /// Start a draft revising the selected entry.
    pub fn edit(&mut self) {
        let Some(draft) = self.selected_entry().map(EntryDraft::revision) else {
            return;
        };
        self.editing.set_entry(draft);
        self.selection.entry_id = None;
    }

    /// Commit the draft to the tree and select the saved entry.
    ///
    /// The buffer is idle afterwards even if the tree rejected the draft.
    pub fn save_edit(&mut self) -> bool {
        let Some(draft) = self.editing.stop_editing() else {
            return false;
        };
        let entry_id = draft.entry.id.clone();
        let applied = self.tree.save_entry(draft);
        if applied {
            // New entries are selected too, not only revised ones.
            self.selection.entry_id = Some(entry_id);
        }
        self.commit(applied)
    }

    /// Discard the draft, re-selecting the entry it revised.
    pub fn cancel_edit(&mut self) {
        let Some(draft) = self.editing.stop_editing() else {
            return;
        };
        if !draft.is_new && self.vault().entry(&draft.entry.id).is_some() {
            self.selection.entry_id = Some(draft.entry.id.clone());
        }
    }

    /// Append a blank field, minted by the factory, to the draft.
    pub fn add_field(&mut self) -> Option<FieldId> {
        if !self.editing.is_editing() {
            return None;
        }
        let field = self.factory.create_field("", FieldValueType::Text);
        self.editing.add_field(field)
    }

    /// Set a draft field's value.
    pub fn update_field(&mut self, field_id: &FieldId, value: impl Into<String>) -> bool {
        self.editing.update_field(
            field_id,
            FieldUpdate {
                value: Some(value.into()),
                property: None,
            },
        )
    }

    /// Rename a draft field.
    pub fn rename_field(&mut self, field_id: &FieldId, property: impl Into<String>) -> bool {
        self.editing.update_field(
            field_id,
            FieldUpdate {
                value: None,
                property: Some(property.into()),
            },
        )
    }

    /// Change how a draft field's value is interpreted.
    pub fn set_field_value_type(&mut self, field_id: &FieldId, value_type: FieldValueType) -> bool {
        self.editing.set_field_value_type(field_id, value_type)
    }

    /// Remove a draft field.
    pub fn remove_field(&mut self, field_id: &FieldId) -> bool {
        self.editing.remove_field(field_id)
    }

    pub fn set_group_filter_term(&mut self, term: impl Into<String>) -> bool {
        self.group_filter.set_term(term)
    }

    pub fn set_group_sort_mode(&mut self, sort_mode: SortMode) -> bool {
        self.group_filter.set_sort_mode(sort_mode)
    }

    pub fn set_entries_filter_term(&mut self, term: impl Into<String>) -> bool {
        self.entries_filter.set_term(term)
    }

    pub fn set_entries_sort_mode(&mut self, sort_mode: SortMode) -> bool {
        self.entries_filter.set_sort_mode(sort_mode)
    }

    fn draft_targets(&self, entry_id: &EntryId) -> bool {
        self.editing
            .draft()
            .is_some_and(|draft| &draft.entry.id == entry_id)
    }

    /// Follow up an applied tree command: repair view state, then evaluate.
    ///
    /// Returns whether the command was applied.
    fn commit(&mut self, applied: bool) -> bool {
        if applied {
            self.reconcile();
            self.evaluate();
        }
        applied
    }

    /// Drop view state that points at items no longer in the tree.
    fn reconcile(&mut self) {
        let vault = self.tree.facade();

        let group_gone = self
            .selection
            .group_id
            .as_ref()
            .is_some_and(|id| vault.group(id).is_none());
        if group_gone {
            self.selection.group_id = vault.groups.first().map(|group| group.id.clone());
            self.selection.entry_id = None;
        }

        let entry_gone = self
            .selection
            .entry_id
            .as_ref()
            .is_some_and(|id| vault.entry(id).is_none());
        if entry_gone {
            self.selection.entry_id = None;
        }

        self.expanded_groups.retain(|id| vault.group(id).is_some());

        let orphaned_draft = self.editing.draft().is_some_and(|draft| {
            vault.group(&draft.entry.parent_id).is_none()
                || (!draft.is_new && vault.entry(&draft.entry.id).is_none())
        });
        if orphaned_draft {
            debug!("Discarding draft whose target was removed");
            self.editing.stop_editing();
        }
    }

    /// Decide whether the owner must be told about the current tree.
    ///
    /// The first evaluation only records a baseline. Later evaluations notify
    /// when the content changed since the previous evaluation and differs
    /// from the source snapshot. Returns `true` if the callback ran.
    fn evaluate(&mut self) -> bool {
        let current = self.comparator.fingerprint(self.tree.facade());
        let Some(previous) = self.last_seen.replace(current) else {
            debug!(fingerprint = %current, "Initial evaluation, update suppressed");
            return false;
        };

        if previous == current {
            debug!("Vault content unchanged since last evaluation");
            return false;
        }
        if self.comparator.unchanged(&self.source, self.tree.facade()) {
            debug!("Vault matches source snapshot, update suppressed");
            return false;
        }

        info!(fingerprint = %current, "Vault changed, emitting update");
        (self.on_update)(self.tree.facade());
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::{Cell, RefCell};
    use std::rc::Rc;
    use vaultedit_facade::{Field, SequentialFactory};

    fn group(id: &str, title: &str, parent: Option<&str>) -> Group {
        Group {
            id: GroupId::from(id),
            title: title.to_string(),
            parent_id: parent.map(GroupId::from),
        }
    }

    fn entry(id: &str, parent: &str, title: &str) -> Entry {
        Entry {
            id: EntryId::from(id),
            parent_id: GroupId::from(parent),
            entry_type: EntryType::Login,
            fields: vec![
                Field::new("title", title, FieldValueType::Text),
                Field::new("password", "secret", FieldValueType::Password),
            ],
        }
    }

    fn snapshot() -> VaultFacade {
        VaultFacade {
            groups: vec![
                group("general", "General", None),
                group("notes", "Notes", None),
                group("meetings", "Meetings", Some("notes")),
            ],
            entries: vec![
                entry("wifi", "general", "Home wi-fi"),
                entry("social", "general", "Social website"),
                entry("gate", "general", "Gate lock combination"),
                entry("minutes", "notes", "Meeting notes"),
            ],
        }
    }

    type Updates = Rc<RefCell<Vec<VaultFacade>>>;

    fn session() -> (VaultSession, Updates) {
        let updates: Updates = Rc::new(RefCell::new(Vec::new()));
        let sink = updates.clone();
        let collaborators = Collaborators {
            factory: Box::new(SequentialFactory::new("new-")),
            fingerprinter: Box::new(Blake2Fingerprinter),
        };
        let session = VaultSession::with_config(
            snapshot(),
            SessionConfig::default(),
            collaborators,
            move |vault: &VaultFacade| sink.borrow_mut().push(vault.clone()),
        )
        .unwrap();
        (session, updates)
    }

    fn id(s: &str) -> EntryId {
        EntryId::from(s)
    }

    fn gid(s: &str) -> GroupId {
        GroupId::from(s)
    }

    #[test]
    fn test_initial_state() {
        let (session, updates) = session();
        assert_eq!(session.selected_group_id(), Some(&gid("general")));
        assert!(session.selected_entry_id().is_none());
        assert!(!session.is_editing());
        assert_eq!(session.current_entries().len(), 3);
        assert!(updates.borrow().is_empty());
    }

    #[test]
    fn test_invalid_snapshot_rejected() {
        let mut broken = snapshot();
        broken.entries.push(entry("wifi", "general", "dup"));
        assert!(VaultSession::new(broken, |_| {}).is_err());
    }

    struct ChangingFingerprinter(Cell<u8>);

    impl Fingerprinter for ChangingFingerprinter {
        fn fingerprint(&self, _vault: &VaultFacade) -> Fingerprint {
            let n = self.0.get().wrapping_add(1);
            self.0.set(n);
            Fingerprint::from_bytes([n; 32])
        }
    }

    #[test]
    fn test_initialization_never_notifies() {
        let calls = Rc::new(Cell::new(0));
        let counter = calls.clone();
        let collaborators = Collaborators {
            factory: Box::new(UuidFactory),
            fingerprinter: Box::new(ChangingFingerprinter(Cell::new(0))),
        };
        let _session = VaultSession::with_config(
            snapshot(),
            SessionConfig::default(),
            collaborators,
            move |_: &VaultFacade| counter.set(counter.get() + 1),
        )
        .unwrap();
        assert_eq!(calls.get(), 0);
    }

    #[test]
    fn test_reverted_move_does_not_notify() {
        let (mut session, updates) = session();
        let source_fp = session.fingerprint();

        assert!(session.move_entry_to_group(&id("wifi"), &gid("notes")));
        assert_eq!(updates.borrow().len(), 1);

        assert!(session.move_entry_to_group(&id("wifi"), &gid("general")));
        assert_eq!(updates.borrow().len(), 1);
        assert_eq!(session.fingerprint(), source_fp);
    }

    #[test]
    fn test_update_carries_full_tree() {
        let (mut session, updates) = session();
        session.rename_group(&gid("notes"), "Journal");
        let updates = updates.borrow();
        assert_eq!(updates.len(), 1);
        assert_eq!(&updates[0], session.vault());
        assert_eq!(updates[0].group(&gid("notes")).unwrap().title, "Journal");
    }

    #[test]
    fn test_noop_actions_do_not_notify() {
        let (mut session, updates) = session();
        assert!(!session.rename_group(&gid("ghost"), "X"));
        assert!(!session.move_group(&gid("notes"), Some(&gid("meetings"))));
        assert!(!session.delete_entry(&id("ghost")));

        session.rename_group(&gid("notes"), "Journal");
        session.rename_group(&gid("notes"), "Journal");
        assert_eq!(updates.borrow().len(), 1);
        assert_eq!(session.source().group(&gid("notes")).unwrap().title, "Notes");
    }

    #[test]
    fn test_selecting_group_clears_entry() {
        let (mut session, _) = session();
        session.select_entry(&id("wifi"));
        assert_eq!(session.selected_entry().unwrap().title(), "Home wi-fi");

        session.select_group(&gid("notes"));
        assert!(session.selected_entry_id().is_none());
        assert_eq!(session.current_entries().len(), 1);
    }

    #[test]
    fn test_unknown_selection_ignored() {
        let (mut session, _) = session();
        session.select_group(&gid("ghost"));
        assert_eq!(session.selected_group_id(), Some(&gid("general")));
        session.select_entry(&id("ghost"));
        assert!(session.selected_entry_id().is_none());
    }

    #[test]
    fn test_new_entry_round_trip() {
        let (mut session, updates) = session();
        assert!(session.add_field().is_none());
        session.add_entry(EntryType::Login);
        assert!(session.is_editing());
        assert!(session.editing_entry().unwrap().is_new);

        let field_id = session.add_field().unwrap();
        assert_eq!(field_id.as_str(), "new-f5");
        session.rename_field(&field_id, "url");
        session.update_field(&field_id, "https://example.com");
        assert!(updates.borrow().is_empty());

        assert!(session.save_edit());
        assert!(!session.is_editing());

        let saved = session.selected_entry().unwrap();
        assert_eq!(saved.parent_id, gid("general"));
        assert_eq!(saved.property("url"), Some("https://example.com"));
        assert_eq!(updates.borrow().len(), 1);
    }

    #[test]
    fn test_draft_isolated_until_saved() {
        let (mut session, updates) = session();
        session.select_entry(&id("wifi"));
        session.edit();
        assert!(session.selected_entry_id().is_none());

        let field_id = session.editing_entry().unwrap().entry.fields[1].id.clone();
        session.update_field(&field_id, "changed");
        session.set_field_value_type(&field_id, FieldValueType::Otp);
        assert_eq!(session.vault().entry(&id("wifi")).unwrap().fields[1].value, "secret");
        assert!(updates.borrow().is_empty());

        assert!(session.save_edit());
        let committed = session.vault().entry(&id("wifi")).unwrap();
        assert_eq!(committed.fields[1].value, "changed");
        assert_eq!(committed.fields[1].value_type, FieldValueType::Otp);
        assert_eq!(session.vault().entries[0].id, id("wifi"));
        assert_eq!(session.selected_entry_id(), Some(&id("wifi")));
    }

    #[test]
    fn test_cancel_edit_restores_selection() {
        let (mut session, updates) = session();
        session.select_entry(&id("social"));
        session.edit();
        let field_id = session.editing_entry().unwrap().entry.fields[0].id.clone();
        session.remove_field(&field_id);

        session.cancel_edit();
        assert!(!session.is_editing());
        assert_eq!(session.selected_entry_id(), Some(&id("social")));
        assert_eq!(session.vault().entry(&id("social")).unwrap().fields.len(), 2);
        assert!(updates.borrow().is_empty());
    }

    #[test]
    fn test_select_entry_rejected_while_editing() {
        let (mut session, _) = session();
        session.add_entry(EntryType::Note);
        session.select_entry(&id("wifi"));
        assert!(session.selected_entry_id().is_none());
    }

    #[test]
    fn test_moving_edited_entry_discards_draft() {
        let (mut session, _) = session();
        session.select_entry(&id("gate"));
        session.edit();
        session.move_entry_to_group(&id("gate"), &gid("meetings"));
        assert!(!session.is_editing());
    }

    #[test]
    fn test_moving_other_entry_keeps_draft() {
        let (mut session, _) = session();
        session.select_entry(&id("gate"));
        session.edit();
        session.move_entry_to_group(&id("wifi"), &gid("meetings"));
        assert!(session.is_editing());
    }

    #[test]
    fn test_delete_entry_stops_editing() {
        let (mut session, updates) = session();
        session.add_entry(EntryType::Login);
        assert!(session.delete_entry(&id("gate")));
        assert!(!session.is_editing());
        assert_eq!(updates.borrow().len(), 1);
    }

    #[test]
    fn test_batch_delete_repairs_selection() {
        let (mut session, updates) = session();
        session.select_group(&gid("meetings"));
        session.expand_group(&gid("notes"));
        session.expand_group(&gid("meetings"));

        assert!(session.batch_delete_items(&[gid("notes")], &[id("wifi")]));

        assert_eq!(session.selected_group_id(), Some(&gid("general")));
        assert_eq!(session.expanded_groups(), &[] as &[GroupId]);
        let vault = session.vault();
        assert_eq!(vault.groups.len(), 1);
        assert_eq!(vault.entries.len(), 2);
        assert_eq!(updates.borrow().len(), 1);
    }

    #[test]
    fn test_batch_delete_discards_orphaned_draft() {
        let (mut session, _) = session();
        session.select_group(&gid("meetings"));
        session.add_entry(EntryType::Login);
        session.batch_delete_items(&[gid("notes")], &[]);
        assert!(!session.is_editing());
    }

    #[test]
    fn test_update_field_in_place() {
        let (mut session, updates) = session();
        let field_id = session.vault().entries[0].fields[1].id.clone();
        assert!(session.update_field_in_place(&id("wifi"), &field_id, "x8v@mId01"));
        assert_eq!(session.vault().entries[0].fields[1].value, "x8v@mId01");
        assert_eq!(updates.borrow().len(), 1);
    }

    #[test]
    fn test_create_group_under_selected() {
        let (mut session, updates) = session();
        let created = session.create_group(Some(&gid("notes")), "Personal").unwrap();
        assert_eq!(
            session.vault().group(&created).unwrap().parent_id,
            Some(gid("notes"))
        );
        assert!(session.create_group(Some(&gid("ghost")), "Lost").is_none());
        assert_eq!(updates.borrow().len(), 1);
    }

    #[test]
    fn test_expand_and_collapse() {
        let (mut session, _) = session();
        session.expand_group(&gid("notes"));
        session.expand_group(&gid("notes"));
        session.expand_group(&gid("ghost"));
        assert_eq!(session.expanded_groups(), &[gid("notes")]);
        session.collapse_group(&gid("notes"));
        assert!(session.expanded_groups().is_empty());
    }

    #[test]
    fn test_filters_are_independent() {
        let (mut session, _) = session();
        session.set_group_filter_term("note");
        session.set_entries_sort_mode(SortMode::TitleDesc);

        assert_eq!(session.group_filter().term, "note");
        assert_eq!(session.entries_filter().term, "");
        assert_eq!(session.group_filter().sort_mode, SortMode::TitleAsc);

        let groups: Vec<&str> = session
            .visible_groups()
            .into_iter()
            .map(|g| g.title.as_str())
            .collect();
        assert_eq!(groups, vec!["Notes"]);

        let entries: Vec<&str> = session
            .visible_entries()
            .into_iter()
            .map(|e| e.title())
            .collect();
        assert_eq!(entries, vec!["Social website", "Home wi-fi", "Gate lock combination"]);
    }

    #[test]
    fn test_config_applies() {
        let config = SessionConfig {
            group_sort: SortMode::TitleDesc,
            entry_sort: SortMode::TitleAsc,
            expand_root_groups: true,
        };
        let session =
            VaultSession::with_config(snapshot(), config, Collaborators::default(), |_| {})
                .unwrap();
        assert_eq!(session.expanded_groups(), &[gid("general"), gid("notes")]);
        assert_eq!(session.group_filter().sort_mode, SortMode::TitleDesc);
    }

    #[test]
    fn test_dispatch_script() {
        let (mut session, updates) = session();
        let script = r#"[
            {"type": "select-entry", "entry_id": "wifi"},
            {"type": "edit"},
            {"type": "cancel-edit"},
            {"type": "move-entry", "entry_id": "wifi", "parent_id": "notes"},
            {"type": "move-entry", "entry_id": "wifi", "parent_id": "general"},
            {"type": "create-group", "parent_id": "notes", "title": "Personal"}
        ]"#;
        for action in Action::parse_script(script).unwrap() {
            session.dispatch(action);
        }
        assert_eq!(session.selected_entry_id(), Some(&id("wifi")));
        assert_eq!(updates.borrow().len(), 2);
        assert_eq!(session.vault().groups.len(), 4);
    }
}
