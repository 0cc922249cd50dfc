//! The store capability consumed by key searches.
//!
//! [`KeyStore`] is deliberately small: build a reference to a root key, then
//! fetch everything below it. [`Kdb`](crate::Kdb) is the production
//! implementation; tests substitute their own.

use crate::key::KeySet;

/// Anything that can list key names in a stable iteration order.
pub trait KeyNames {
    fn key_names(&self) -> Vec<String>;
}

impl KeyNames for KeySet {
    fn key_names(&self) -> Vec<String> {
        KeySet::key_names(self)
    }
}

impl KeyNames for Vec<String> {
    fn key_names(&self) -> Vec<String> {
        self.clone()
    }
}

/// Read access to a hierarchical key store.
pub trait KeyStore {
    /// Handle naming the root of a fetch.
    type Reference;
    /// Result of a fetch.
    type Keys: KeyNames;
    type Error: std::error::Error + Send + Sync + 'static;

    /// Build a reference to the key at `path`.
    fn make_key_reference(&self, path: &str) -> Result<Self::Reference, Self::Error>;

    /// Fetch every key below or same as `root`.
    fn fetch_key_set(&self, root: &Self::Reference) -> Result<Self::Keys, Self::Error>;
}
