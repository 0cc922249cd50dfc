//! Workspace umbrella crate for keyfind.
//!
//! This crate stitches the key database ([`keydb`]) and the key search
//! ([`search`]) together behind a single YAML configuration, so callers can
//! open a configured handle and search it with one API entry point.
//!
//! ```
//! use keyfind::{find_keys, KeyfindConfig};
//!
//! let config = KeyfindConfig::from_yaml(
//!     r#"
//! version: "1.0"
//! mounts:
//!   - mountpoint: "user:/sw/app"
//!     backend: memory
//!     keys:
//!       port: "8080"
//!       host: "localhost"
//! "#,
//! )
//! .unwrap();
//!
//! let kdb = config.open_kdb().unwrap();
//! assert_eq!(find_keys("port$", "/", &kdb).unwrap(), ["user:/sw/app/port"]);
//! ```

pub mod config;

pub use config::{ConfigLoadError, KeyfindConfig, SearchYamlConfig, DEFAULT_SIZE_LIMIT};

pub use keydb::{
    Backend, BackendConfig, Kdb, Key, KeyDbError, KeyName, KeyNames, KeySet, KeyStore,
    MemoryBackend, MountSpec, MountTrie, Namespace, YamlBackend,
};
pub use search::{filter_key_names, find_keys, KeyPattern, KeySearch, SearchError, SearchResult};

/// Root every HTTP and CLI search starts from unless told otherwise.
pub const ROOT_PATH: &str = "/";

