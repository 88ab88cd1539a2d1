//! Change detection between vault snapshots.

use vaultedit_facade::{Blake2Fingerprinter, Fingerprint, Fingerprinter, VaultFacade};

/// Decides whether two vaults have the same content by comparing fingerprints.
pub struct FingerprintComparator {
    fingerprinter: Box<dyn Fingerprinter>,
}

impl FingerprintComparator {
    /// Create a comparator over the given fingerprint function.
    pub fn new(fingerprinter: Box<dyn Fingerprinter>) -> Self {
        Self { fingerprinter }
    }

    /// Fingerprint of a single vault.
    pub fn fingerprint(&self, vault: &VaultFacade) -> Fingerprint {
        self.fingerprinter.fingerprint(vault)
    }

    /// `true` if both vaults hash identically.
    pub fn unchanged(&self, a: &VaultFacade, b: &VaultFacade) -> bool {
        self.fingerprint(a) == self.fingerprint(b)
    }
}

impl Default for FingerprintComparator {
    fn default() -> Self {
        Self::new(Box::new(Blake2Fingerprinter))
    }
}
