use std::collections::BTreeMap;

use crate::name::KeyName;

/// A single configuration key: name, optional value and metadata.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Key {
    name: KeyName,
    value: Option<String>,
    meta: BTreeMap<String, String>,
}

impl Key {
    pub fn new(name: KeyName) -> Self {
        Self {
            name,
            value: None,
            meta: BTreeMap::new(),
        }
    }

    pub fn with_value(mut self, value: impl Into<String>) -> Self {
        self.value = Some(value.into());
        self
    }

    pub fn with_meta(mut self, meta: impl Into<String>, value: impl Into<String>) -> Self {
        self.meta.insert(meta.into(), value.into());
        self
    }

    pub fn name(&self) -> &KeyName {
        &self.name
    }

    pub fn value(&self) -> Option<&str> {
        self.value.as_deref()
    }

    pub fn meta(&self, meta: &str) -> Option<&str> {
        self.meta.get(meta).map(String::as_str)
    }

    pub fn set_meta(&mut self, meta: impl Into<String>, value: impl Into<String>) {
        self.meta.insert(meta.into(), value.into());
    }
}

/// An ordered set of keys, unique by name.
///
/// Iteration follows [`KeyName`] ordering, which is the order callers see from
/// [`KeySet::key_names`].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct KeySet {
    keys: BTreeMap<KeyName, Key>,
}

impl KeySet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a key, replacing any key with the same name.
    pub fn append(&mut self, key: Key) -> Option<Key> {
        self.keys.insert(key.name.clone(), key)
    }

    pub fn lookup(&self, name: &KeyName) -> Option<&Key> {
        self.keys.get(name)
    }

    pub fn lookup_mut(&mut self, name: &KeyName) -> Option<&mut Key> {
        self.keys.get_mut(name)
    }

    pub fn len(&self) -> usize {
        self.keys.len()
    }

    pub fn is_empty(&self) -> bool {
        self.keys.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Key> {
        self.keys.values()
    }

    /// Canonical names of all keys, in set order.
    pub fn key_names(&self) -> Vec<String> {
        self.keys.keys().map(ToString::to_string).collect()
    }

    /// Keys below or same as `parent`.
    pub fn cut(&self, parent: &KeyName) -> KeySet {
        let keys = self
            .keys
            .iter()
            .filter(|(name, _)| name.is_below_or_same(parent))
            .map(|(name, key)| (name.clone(), key.clone()))
            .collect();
        KeySet { keys }
    }

    /// Append every key of `other`; keys from `other` win on name clashes.
    pub fn merge(&mut self, other: KeySet) {
        self.keys.extend(other.keys);
    }
}

impl FromIterator<Key> for KeySet {
    fn from_iter<I: IntoIterator<Item = Key>>(iter: I) -> Self {
        let mut ks = KeySet::new();
        for key in iter {
            ks.append(key);
        }
        ks
    }
}

impl IntoIterator for KeySet {
    type Item = Key;
    type IntoIter = std::collections::btree_map::IntoValues<KeyName, Key>;

    fn into_iter(self) -> Self::IntoIter {
        self.keys.into_values()
    }
}
