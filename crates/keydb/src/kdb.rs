use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::backend::{Backend, BackendConfig, MemoryBackend};
use crate::key::{Key, KeySet};
use crate::name::{KeyName, Namespace};
use crate::store::KeyStore;
use crate::trie::MountTrie;
use crate::KeyDbError;

/// One entry of a mount table.
///
/// ```yaml
/// mountpoint: "user:/sw/app"
/// backend: yaml
/// path: "/etc/app.yaml"
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct MountSpec {
    pub mountpoint: String,
    #[serde(flatten)]
    pub backend: BackendConfig,
}

/// Handle to a key database: a default in-memory backend plus mounted
/// backends routed by a [`MountTrie`].
///
/// Every key name has exactly one owner: the backend at the deepest mountpoint
/// above it, or the default backend when no mountpoint covers it. Fetching a
/// parent asks the default backend, the backends mounted above the parent and
/// every backend mounted below it, and keeps from each only the keys it owns.
pub struct Kdb {
    default_backend: MemoryBackend,
    mounts: MountTrie<Box<dyn Backend>>,
}

impl Default for Kdb {
    fn default() -> Self {
        Self::new()
    }
}

impl Kdb {
    pub fn new() -> Self {
        Self {
            default_backend: MemoryBackend::new(),
            mounts: MountTrie::new(),
        }
    }

    /// Build a handle from a mount table.
    pub fn from_mounts(specs: &[MountSpec]) -> Result<Self, KeyDbError> {
        let mut kdb = Self::new();
        for spec in specs {
            let mountpoint = KeyName::parse(&spec.mountpoint)?;
            let backend = spec.backend.build(&mountpoint)?;
            kdb.mount_at(mountpoint, backend)?;
        }
        Ok(kdb)
    }

    /// Mount `backend` at `mountpoint`.
    pub fn mount(&mut self, mountpoint: &str, backend: Box<dyn Backend>) -> Result<(), KeyDbError> {
        self.mount_at(KeyName::parse(mountpoint)?, backend)
    }

    fn mount_at(&mut self, mountpoint: KeyName, backend: Box<dyn Backend>) -> Result<(), KeyDbError> {
        if self.mounts.contains(&mountpoint) {
            return Err(KeyDbError::MountConflict(mountpoint.to_string()));
        }
        debug!(mountpoint = %mountpoint, backend = backend.name(), "kdb_mount");
        self.mounts.insert(&mountpoint, backend);
        Ok(())
    }

    /// Remove the backend at `mountpoint`; `false` if nothing was mounted there.
    pub fn unmount(&mut self, mountpoint: &str) -> Result<bool, KeyDbError> {
        let mountpoint = KeyName::parse(mountpoint)?;
        Ok(self.mounts.remove(&mountpoint).is_some())
    }

    pub fn mount_count(&self) -> usize {
        self.mounts.len()
    }

    pub fn mountpoints(&self) -> Vec<String> {
        self.mounts
            .mounted_below(&KeyName::root(Namespace::Cascading))
            .into_iter()
            .map(|(mountpoint, _)| mountpoint.to_string())
            .collect()
    }

    /// Backend for keys outside every mountpoint.
    pub fn default_backend(&self) -> &MemoryBackend {
        &self.default_backend
    }

    /// Every key below or same as `parent`.
    pub fn get(&self, parent: &KeyName) -> Result<KeySet, KeyDbError> {
        let mut ks = self.owned_keys(None, &self.default_backend, parent)?;

        for (mountpoint, backend) in self.responsible_mounts(parent) {
            let keys = self.owned_keys(Some(&mountpoint), backend, parent)?;
            debug!(
                mountpoint = %mountpoint,
                backend = backend.name(),
                keys = keys.len(),
                "kdb_backend_get"
            );
            ks.merge(keys);
        }

        Ok(ks)
    }

    /// Mounts that can own keys below or same as `parent`: the deepest mount
    /// above it (in each namespace, for a cascading parent) and every mount
    /// below it.
    fn responsible_mounts(&self, parent: &KeyName) -> Vec<(KeyName, &dyn Backend)> {
        let above: Vec<KeyName> = if parent.namespace() == Namespace::Cascading {
            self.mounts
                .namespaces()
                .map(|ns| parent.with_namespace(ns))
                .collect()
        } else {
            vec![parent.clone()]
        };

        let mut found = Vec::new();
        for name in &above {
            if let Some((mountpoint, backend)) = self.mounts.owner(name) {
                // mounts at or below the parent are listed next
                if !mountpoint.is_below_or_same(parent) {
                    found.push((mountpoint, &**backend));
                }
            }
        }
        for (mountpoint, backend) in self.mounts.mounted_below(parent) {
            found.push((mountpoint, &**backend));
        }
        found
    }

    /// Keys of `backend` below `parent` whose owning mountpoint is `mountpoint`
    /// (`None` for the default backend).
    fn owned_keys(
        &self,
        mountpoint: Option<&KeyName>,
        backend: &dyn Backend,
        parent: &KeyName,
    ) -> Result<KeySet, KeyDbError> {
        Ok(backend
            .get(parent)?
            .into_iter()
            .filter(|key| {
                let owner = self.mounts.owner(key.name()).map(|(owner, _)| owner);
                owner.as_ref() == mountpoint
            })
            .collect())
    }
}

impl KeyStore for Kdb {
    type Reference = Key;
    type Keys = KeySet;
    type Error = KeyDbError;

    fn make_key_reference(&self, path: &str) -> Result<Key, KeyDbError> {
        Ok(Key::new(KeyName::parse(path)?))
    }

    fn fetch_key_set(&self, root: &Key) -> Result<KeySet, KeyDbError> {
        self.get(root.name())
    }
}
