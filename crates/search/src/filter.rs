use std::time::Instant;

use keydb::{KeyNames, KeyStore};
use tracing::{error, info, warn, Level};

use crate::error::{SearchError, SearchResult};
use crate::pattern::KeyPattern;

/// Keep the names `pattern` matches, preserving their order.
pub fn filter_key_names<I>(pattern: &KeyPattern, names: I) -> Vec<String>
where
    I: IntoIterator<Item = String>,
{
    names
        .into_iter()
        .filter(|name| pattern.is_match(name))
        .collect()
}

/// Find the key names below `root_path` that match `raw_pattern`.
///
/// The pattern is compiled before the store is touched, so an invalid pattern
/// never causes a fetch. Results keep the store's iteration order; an empty
/// result is a success.
///
/// ```
/// use search::find_keys;
/// use keydb::{Kdb, Key, KeyName};
///
/// let kdb = Kdb::new();
/// for name in ["user:/sw/app/port", "system:/version"] {
///     kdb.default_backend()
///         .insert(Key::new(KeyName::parse(name).unwrap()))
///         .unwrap();
/// }
///
/// assert_eq!(find_keys("app", "/", &kdb).unwrap(), ["user:/sw/app/port"]);
/// assert!(find_keys("(", "/", &kdb).is_err());
/// ```
pub fn find_keys<S>(raw_pattern: &str, root_path: &str, store: &S) -> SearchResult<Vec<String>>
where
    S: KeyStore + ?Sized,
{
    KeySearch::default().find(raw_pattern, root_path, store)
}

/// Reusable search options.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct KeySearch {
    size_limit: Option<usize>,
}

impl KeySearch {
    pub fn new() -> Self {
        Self::default()
    }

    /// Cap the compiled pattern size in bytes.
    pub fn with_size_limit(mut self, size_limit: usize) -> Self {
        self.size_limit = Some(size_limit);
        self
    }

    pub fn size_limit(&self) -> Option<usize> {
        self.size_limit
    }

    pub fn compile(&self, raw_pattern: &str) -> SearchResult<KeyPattern> {
        match self.size_limit {
            Some(limit) => KeyPattern::compile_with_limit(raw_pattern, limit),
            None => KeyPattern::compile(raw_pattern),
        }
    }

    /// See [`find_keys`].
    pub fn find<S>(&self, raw_pattern: &str, root_path: &str, store: &S) -> SearchResult<Vec<String>>
    where
        S: KeyStore + ?Sized,
    {
        let start = Instant::now();
        let span = tracing::span!(
            Level::INFO,
            "search.find_keys",
            pattern = %raw_pattern,
            root = %root_path
        );
        let _guard = span.enter();

        match self.find_inner(raw_pattern, root_path, store) {
            Ok((matches, total)) => {
                info!(
                    matches = matches.len(),
                    total,
                    elapsed_micros = start.elapsed().as_micros() as u64,
                    "find_keys_success"
                );
                Ok(matches)
            }
            Err(err) => {
                let elapsed_micros = start.elapsed().as_micros() as u64;
                match &err {
                    SearchError::ReferenceConstructionFailed { .. } => {
                        error!(error = %err, elapsed_micros, "find_keys_failure")
                    }
                    _ => warn!(error = %err, elapsed_micros, "find_keys_failure"),
                }
                Err(err)
            }
        }
    }

    fn find_inner<S>(
        &self,
        raw_pattern: &str,
        root_path: &str,
        store: &S,
    ) -> SearchResult<(Vec<String>, usize)>
    where
        S: KeyStore + ?Sized,
    {
        let pattern = self.compile(raw_pattern)?;

        let root = store.make_key_reference(root_path).map_err(|source| {
            SearchError::ReferenceConstructionFailed {
                path: root_path.to_string(),
                source: Box::new(source),
            }
        })?;

        let keys = store
            .fetch_key_set(&root)
            .map_err(|source| SearchError::StoreFetchFailed {
                root: root_path.to_string(),
                source: Box::new(source),
            })?;

        let names = keys.key_names();
        let total = names.len();
        Ok((filter_key_names(&pattern, names), total))
    }
}
