use regex::{Regex, RegexBuilder};

use crate::error::{SearchError, SearchResult};

/// A compiled key-name pattern.
///
/// Patterns use the `regex` crate syntax and match anywhere in a key name
/// unless anchored with `^` / `$`. Matching is case-sensitive; the raw input is
/// used verbatim (no trimming, no escaping).
#[derive(Debug, Clone)]
pub struct KeyPattern {
    regex: Regex,
}

impl KeyPattern {
    pub fn compile(raw: &str) -> SearchResult<Self> {
        Regex::new(raw)
            .map(|regex| Self { regex })
            .map_err(|source| invalid(raw, source))
    }

    /// Compile with an upper bound (bytes) on the compiled program, so that
    /// untrusted input cannot build an oversized automaton.
    pub fn compile_with_limit(raw: &str, size_limit: usize) -> SearchResult<Self> {
        RegexBuilder::new(raw)
            .size_limit(size_limit)
            .build()
            .map(|regex| Self { regex })
            .map_err(|source| invalid(raw, source))
    }

    pub fn is_match(&self, key_name: &str) -> bool {
        self.regex.is_match(key_name)
    }

    pub fn as_str(&self) -> &str {
        self.regex.as_str()
    }
}

fn invalid(raw: &str, source: regex::Error) -> SearchError {
    SearchError::InvalidPattern {
        pattern: raw.to_string(),
        source,
    }
}
