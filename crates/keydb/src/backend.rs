use std::collections::BTreeMap;
use std::fs;
use std::io::ErrorKind;
use std::path::PathBuf;
use std::sync::RwLock;

use serde::{Deserialize, Serialize};
use serde_yaml::Value;
use tracing::debug;

use crate::key::{Key, KeySet};
use crate::name::KeyName;
use crate::KeyDbError;

/// Storage behind a mountpoint.
///
/// Implementations return their keys below or same as `parent`, named with
/// absolute key names.
pub trait Backend: Send + Sync {
    /// Short backend kind used in logs (`memory`, `yaml`).
    fn name(&self) -> &str;

    fn get(&self, parent: &KeyName) -> Result<KeySet, KeyDbError>;
}

/// Configuration for selecting and building a backend.
///
/// ```
/// use keydb::{BackendConfig, KeyName};
///
/// let mountpoint = KeyName::parse("system:/info").unwrap();
/// let backend = BackendConfig::memory().build(&mountpoint).unwrap();
/// assert_eq!(backend.name(), "memory");
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(tag = "backend", rename_all = "snake_case")]
pub enum BackendConfig {
    /// Keys held in memory; `keys` are relative to the mountpoint.
    Memory {
        #[serde(default)]
        keys: BTreeMap<String, String>,
    },
    /// A YAML document read from `path` on every fetch.
    Yaml { path: PathBuf },
}

impl BackendConfig {
    pub fn memory() -> Self {
        BackendConfig::Memory {
            keys: BTreeMap::new(),
        }
    }

    pub fn yaml<P: Into<PathBuf>>(path: P) -> Self {
        BackendConfig::Yaml { path: path.into() }
    }

    /// Build the backend for `mountpoint`.
    pub fn build(&self, mountpoint: &KeyName) -> Result<Box<dyn Backend>, KeyDbError> {
        match self {
            BackendConfig::Memory { keys } => {
                let backend = MemoryBackend::new();
                for (relative, value) in keys {
                    let name = mountpoint.join(relative);
                    if !name.is_below_or_same(mountpoint) {
                        return Err(KeyDbError::InvalidName {
                            name: relative.clone(),
                            reason: format!("leaves the mountpoint {mountpoint}"),
                        });
                    }
                    backend.insert(Key::new(name).with_value(value.clone()))?;
                }
                Ok(Box::new(backend))
            }
            BackendConfig::Yaml { path } => {
                Ok(Box::new(YamlBackend::new(mountpoint.clone(), path.clone())))
            }
        }
    }
}

/// An in-memory backend using a `RwLock` around a [`KeySet`].
#[derive(Debug, Default)]
pub struct MemoryBackend {
    keys: RwLock<KeySet>,
}

impl MemoryBackend {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_keys(keys: KeySet) -> Self {
        Self {
            keys: RwLock::new(keys),
        }
    }

    /// Insert or replace a key.
    pub fn insert(&self, key: Key) -> Result<(), KeyDbError> {
        self.keys
            .write()
            .map_err(|_| KeyDbError::backend("poisoned lock"))?
            .append(key);
        Ok(())
    }
}

impl Backend for MemoryBackend {
    fn name(&self) -> &str {
        "memory"
    }

    fn get(&self, parent: &KeyName) -> Result<KeySet, KeyDbError> {
        let guard = self
            .keys
            .read()
            .map_err(|_| KeyDbError::backend("poisoned lock"))?;
        Ok(guard.cut(parent))
    }
}

/// Backend reading a YAML document into keys below its mountpoint.
///
/// Mapping keys become name segments, scalars become values and sequence
/// items become array elements (`#0`, `#1`, ..., `#_10`). The key holding a
/// sequence carries the `array` meta with the last element index. A missing
/// file reads as an empty key set.
#[derive(Debug)]
pub struct YamlBackend {
    mountpoint: KeyName,
    path: PathBuf,
}

impl YamlBackend {
    pub fn new(mountpoint: KeyName, path: PathBuf) -> Self {
        Self { mountpoint, path }
    }

    pub fn path(&self) -> &PathBuf {
        &self.path
    }

    fn read(&self) -> Result<KeySet, KeyDbError> {
        let content = match fs::read_to_string(&self.path) {
            Ok(content) => content,
            Err(err) if err.kind() == ErrorKind::NotFound => {
                debug!(path = %self.path.display(), "yaml_backend_missing_file");
                return Ok(KeySet::new());
            }
            Err(err) => {
                return Err(KeyDbError::Backend(format!(
                    "failed to read {}: {err}",
                    self.path.display()
                )))
            }
        };
        parse_yaml(&content, &self.mountpoint).map_err(|err| {
            let msg = match err {
                KeyDbError::Backend(msg) => msg,
                other => other.to_string(),
            };
            KeyDbError::Backend(format!("failed to parse {}: {msg}", self.path.display()))
        })
    }
}

impl Backend for YamlBackend {
    fn name(&self) -> &str {
        "yaml"
    }

    fn get(&self, parent: &KeyName) -> Result<KeySet, KeyDbError> {
        Ok(self.read()?.cut(parent))
    }
}

/// Convert a YAML document into keys below `mountpoint`.
///
/// Every mapping key is one literal name segment; keys that are empty, `.`,
/// `..` or contain `/` are refused.
pub fn parse_yaml(content: &str, mountpoint: &KeyName) -> Result<KeySet, KeyDbError> {
    let mut ks = KeySet::new();
    if content.trim().is_empty() {
        return Ok(ks);
    }
    let document: Value = serde_yaml::from_str(content).map_err(KeyDbError::backend)?;
    append_node(&document, mountpoint.clone(), &mut ks)?;
    Ok(ks)
}

fn append_node(node: &Value, name: KeyName, ks: &mut KeySet) -> Result<(), KeyDbError> {
    match node {
        Value::Null => {
            ks.append(Key::new(name));
        }
        Value::Bool(b) => {
            ks.append(Key::new(name).with_value(b.to_string()));
        }
        Value::Number(n) => {
            ks.append(Key::new(name).with_value(n.to_string()));
        }
        Value::String(s) => {
            ks.append(Key::new(name).with_value(s.clone()));
        }
        Value::Sequence(items) => {
            let last = items
                .len()
                .checked_sub(1)
                .map(array_index)
                .unwrap_or_default();
            ks.append(Key::new(name.clone()).with_meta("array", last));
            for (i, item) in items.iter().enumerate() {
                append_node(item, name.child(&array_index(i))?, ks)?;
            }
        }
        Value::Mapping(map) => {
            if map.is_empty() {
                ks.append(Key::new(name.clone()));
            }
            for (segment, child) in map {
                let segment = match segment {
                    Value::String(s) => s.clone(),
                    Value::Bool(b) => b.to_string(),
                    Value::Number(n) => n.to_string(),
                    other => {
                        return Err(KeyDbError::Backend(format!(
                            "unsupported mapping key below {name}: {other:?}"
                        )))
                    }
                };
                append_node(child, name.child(&segment)?, ks)?;
            }
        }
        Value::Tagged(tagged) => append_node(&tagged.value, name, ks)?,
    }
    Ok(())
}

/// Array element segment: `#` plus one `_` per extra digit (`#9`, `#_10`, `#__100`).
pub fn array_index(index: usize) -> String {
    let digits = index.to_string();
    format!("#{}{}", "_".repeat(digits.len() - 1), digits)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    fn name(s: &str) -> KeyName {
        KeyName::parse(s).unwrap()
    }

    #[test]
    fn array_indices_sort_numerically() {
        assert_eq!(array_index(0), "#0");
        assert_eq!(array_index(9), "#9");
        assert_eq!(array_index(10), "#_10");
        assert_eq!(array_index(123), "#__123");

        let mut segments: Vec<String> = [2, 10, 1, 100].into_iter().map(array_index).collect();
        segments.sort();
        assert_eq!(segments, ["#1", "#2", "#_10", "#__100"]);
    }

    #[test]
    fn yaml_document_maps_to_keys() {
        let yaml = r#"
server:
  port: 8080
  debug: false
  hosts:
    - alpha
    - beta
empty:
"#;
        let ks = parse_yaml(yaml, &name("user:/sw/app")).unwrap();
        assert_eq!(
            ks.key_names(),
            [
                "user:/sw/app/empty",
                "user:/sw/app/server/debug",
                "user:/sw/app/server/hosts",
                "user:/sw/app/server/hosts/#0",
                "user:/sw/app/server/hosts/#1",
                "user:/sw/app/server/port",
            ]
        );

        let port = ks.lookup(&name("user:/sw/app/server/port")).unwrap();
        assert_eq!(port.value(), Some("8080"));
        let hosts = ks.lookup(&name("user:/sw/app/server/hosts")).unwrap();
        assert_eq!(hosts.meta("array"), Some("#1"));
        let empty = ks.lookup(&name("user:/sw/app/empty")).unwrap();
        assert_eq!(empty.value(), None);
    }

    #[test]
    fn scalar_document_sets_mountpoint_value() {
        let ks = parse_yaml("hello", &name("system:/greeting")).unwrap();
        assert_eq!(ks.key_names(), ["system:/greeting"]);
        assert_eq!(ks.iter().next().and_then(Key::value), Some("hello"));
    }

    #[test]
    fn yaml_backend_reads_file_and_cuts() {
        let mut file = NamedTempFile::new().unwrap();
        writeln!(file, "a: 1\nb:\n  c: 2").unwrap();

        let backend = YamlBackend::new(name("user:/cfg"), file.path().to_path_buf());
        let all = backend.get(&name("/")).unwrap();
        assert_eq!(all.key_names(), ["user:/cfg/a", "user:/cfg/b/c"]);

        let below_b = backend.get(&name("user:/cfg/b")).unwrap();
        assert_eq!(below_b.key_names(), ["user:/cfg/b/c"]);
    }

    #[test]
    fn yaml_backend_missing_file_is_empty() {
        let dir = tempfile::tempdir().unwrap();
        let backend = YamlBackend::new(name("user:/cfg"), dir.path().join("absent.yaml"));
        assert!(backend.get(&name("/")).unwrap().is_empty());
    }

    #[test]
    fn yaml_backend_reports_parse_errors() {
        let mut file = NamedTempFile::new().unwrap();
        writeln!(file, "a: [unclosed").unwrap();

        let backend = YamlBackend::new(name("user:/cfg"), file.path().to_path_buf());
        assert!(matches!(
            backend.get(&name("/")),
            Err(KeyDbError::Backend(_))
        ));
    }

    #[test]
    fn empty_mapping_is_a_key_without_value() {
        let ks = parse_yaml("section: {}\nnext: 1\n", &name("user:/cfg")).unwrap();
        assert_eq!(ks.key_names(), ["user:/cfg/next", "user:/cfg/section"]);
        assert_eq!(ks.lookup(&name("user:/cfg/section")).unwrap().value(), None);

        let root = parse_yaml("{}", &name("user:/cfg")).unwrap();
        assert_eq!(root.key_names(), ["user:/cfg"]);
    }

    #[test]
    fn yaml_keys_are_single_segments() {
        for yaml in [
            "\"../../etc/passwd\": x\n",
            "\"a/b\": y\n",
            "outer:\n  \"..\": z\n",
            "\".\": w\n",
        ] {
            assert!(
                matches!(
                    parse_yaml(yaml, &name("user:/cfg")),
                    Err(KeyDbError::InvalidName { .. })
                ),
                "{yaml:?} should be rejected"
            );
        }

        let ks = parse_yaml("\"a:b\": 1\n\"#x\": 2\n", &name("user:/cfg")).unwrap();
        assert_eq!(ks.key_names(), ["user:/cfg/#x", "user:/cfg/a:b"]);
    }

    #[test]
    fn yaml_backend_reports_bad_segments_as_backend_errors() {
        let mut file = NamedTempFile::new().unwrap();
        writeln!(file, "\"../escape\": 1").unwrap();

        let backend = YamlBackend::new(name("user:/cfg"), file.path().to_path_buf());
        let err = backend.get(&name("/")).unwrap_err();
        assert!(matches!(&err, KeyDbError::Backend(msg) if msg.contains("../escape")), "{err}");
    }

    #[test]
    fn memory_config_stays_below_mountpoint() {
        let mut keys = BTreeMap::new();
        keys.insert("../etc/passwd".to_string(), "x".to_string());
        let err = BackendConfig::Memory { keys }
            .build(&name("system:/info"))
            .err()
            .unwrap();
        assert!(matches!(err, KeyDbError::InvalidName { .. }));
    }

    #[test]
    fn memory_config_builds_relative_keys() {
        let mut keys = BTreeMap::new();
        keys.insert("version".to_string(), "1.0".to_string());
        keys.insert("build/date".to_string(), "2024-01-01".to_string());
        let backend = BackendConfig::Memory { keys }
            .build(&name("system:/info"))
            .unwrap();

        let ks = backend.get(&name("system:/")).unwrap();
        assert_eq!(ks.key_names(), ["system:/info/build/date", "system:/info/version"]);
    }
}
