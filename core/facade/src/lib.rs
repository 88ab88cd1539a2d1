//! Vault facade model for the vault editor.
//!
//! This module provides:
//! - The in-memory representation of groups, entries and fields
//! - The factory contract used to mint new groups and entries
//! - Deterministic content fingerprints over a whole vault
//!
//! # Security
//! - Field values are zeroized when dropped
//! - Field values never appear in `Debug` output

pub mod factory;
pub mod fingerprint;
pub mod model;

pub use factory::{FacadeFactory, SequentialFactory, UuidFactory};
pub use fingerprint::{Blake2Fingerprinter, Fingerprint, Fingerprinter};
pub use model::{Entry, EntryType, Field, FieldValueType, Group, VaultFacade};
