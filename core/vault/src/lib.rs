//! Editing state core for the vault editor.
//!
//! This module provides:
//! - The vault tree store with structural edits (create, rename, move, delete)
//! - A single-slot editing buffer for entry drafts
//! - Filter stores for the group and entry lists
//! - Fingerprint-based change detection
//! - The session controller tying them together
//!
//! # Architecture
//! A [`VaultSession`] owns one instance of every store. The owner hands it a
//! decrypted snapshot and a callback; the session calls back with the full
//! vault only when an edit leaves it different from that snapshot.

pub mod action;
pub mod compare;
pub mod config;
pub mod editing;
pub mod filter;
pub mod session;
pub mod tree;

pub use action::Action;
pub use compare::FingerprintComparator;
pub use config::SessionConfig;
pub use editing::{EditAction, EditingBuffer, EditingState, EntryDraft, FieldUpdate};
pub use filter::{FilterAction, FilterState, FilterStore, SortMode};
pub use session::{Collaborators, Selection, UpdateCallback, VaultSession};
pub use tree::{TreeAction, VaultTree};
