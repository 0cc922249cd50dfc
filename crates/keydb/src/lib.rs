//! # Configuration key database (`keydb`)
//!
//! A hierarchical key-value store for configuration. Keys are addressed by
//! [`KeyName`]s such as `user:/sw/app/port` or the cascading `/sw/app/port`,
//! collected into ordered [`KeySet`]s and served by [`Backend`]s mounted into a
//! [`Kdb`] handle.
//!
//! ## Core types
//!
//! - [`KeyName`] / [`Namespace`]: parsing, canonicalization, hierarchy checks.
//! - [`Key`] / [`KeySet`]: keys with values and metadata, ordered by name.
//! - [`Backend`]: storage behind a mountpoint ([`MemoryBackend`], [`YamlBackend`]).
//! - [`MountTrie`]: routes names to the deepest matching mountpoint.
//! - [`Kdb`]: the handle that merges backends for a fetch.
//! - [`KeyStore`]: the read capability other crates program against.
//!
//! ## Example
//!
//! ```
//! use keydb::{BackendConfig, Kdb, KeyStore, MountSpec};
//!
//! let mut keys = std::collections::BTreeMap::new();
//! keys.insert("version".to_string(), "1.0".to_string());
//!
//! let kdb = Kdb::from_mounts(&[MountSpec {
//!     mountpoint: "system:/info".into(),
//!     backend: BackendConfig::Memory { keys },
//! }])
//! .unwrap();
//!
//! let root = kdb.make_key_reference("/").unwrap();
//! let ks = kdb.fetch_key_set(&root).unwrap();
//! assert_eq!(ks.key_names(), ["system:/info/version"]);
//! ```

mod backend;
mod error;
mod kdb;
mod key;
mod name;
mod store;
mod trie;

pub use crate::backend::{array_index, parse_yaml, Backend, BackendConfig, MemoryBackend, YamlBackend};
pub use crate::error::KeyDbError;
pub use crate::kdb::{Kdb, MountSpec};
pub use crate::key::{Key, KeySet};
pub use crate::name::{KeyName, Namespace};
pub use crate::store::{KeyNames, KeyStore};
pub use crate::trie::MountTrie;
