//! Hierarchical key names.
//!
//! A key name is a namespace plus a list of path segments. The textual form is
//! `<namespace>:/<seg>/<seg>` (e.g. `user:/sw/app/port`) or, for cascading
//! names that cover every namespace, just `/<seg>/<seg>`.
//!
//! Parsing canonicalizes the path: repeated slashes collapse, a trailing slash
//! is dropped, `.` segments vanish and `..` pops the previous segment (never
//! above the namespace root).

use std::fmt;
use std::str::FromStr;

use crate::KeyDbError;

/// Key namespaces, declared in sort order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Namespace {
    /// `/...`, resolved against every namespace.
    Cascading,
    Spec,
    Proc,
    Dir,
    User,
    System,
    Default,
}

impl Namespace {
    /// Textual prefix in front of `:/`; empty for cascading names.
    pub fn prefix(&self) -> &'static str {
        match self {
            Namespace::Cascading => "",
            Namespace::Spec => "spec",
            Namespace::Proc => "proc",
            Namespace::Dir => "dir",
            Namespace::User => "user",
            Namespace::System => "system",
            Namespace::Default => "default",
        }
    }

    fn from_prefix(prefix: &str) -> Option<Self> {
        match prefix {
            "spec" => Some(Namespace::Spec),
            "proc" => Some(Namespace::Proc),
            "dir" => Some(Namespace::Dir),
            "user" => Some(Namespace::User),
            "system" => Some(Namespace::System),
            "default" => Some(Namespace::Default),
            _ => None,
        }
    }

    /// Whether a parent in this namespace covers names in `other`.
    pub fn covers(&self, other: Namespace) -> bool {
        *self == Namespace::Cascading || *self == other
    }
}

impl fmt::Display for Namespace {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Namespace::Cascading => write!(f, "cascading"),
            other => write!(f, "{}", other.prefix()),
        }
    }
}

/// A canonical hierarchical key name.
///
/// Ordering compares the namespace first and then the segments one by one, so
/// every key sorts directly after its parent and before any sibling whose
/// name merely shares a textual prefix (`/a/b` < `/a-b`).
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct KeyName {
    namespace: Namespace,
    segments: Vec<String>,
}

impl KeyName {
    /// Parse and canonicalize a textual key name.
    pub fn parse(name: &str) -> Result<Self, KeyDbError> {
        if name.is_empty() {
            return Err(KeyDbError::invalid_name(name, "name is empty"));
        }

        let (namespace, path) = if name.starts_with('/') {
            (Namespace::Cascading, name)
        } else {
            let Some((prefix, rest)) = name.split_once(':') else {
                return Err(KeyDbError::invalid_name(
                    name,
                    "name must start with '/' or a namespace",
                ));
            };
            if prefix.contains('/') {
                return Err(KeyDbError::invalid_name(
                    name,
                    "name must start with '/' or a namespace",
                ));
            }
            let Some(namespace) = Namespace::from_prefix(prefix) else {
                return Err(KeyDbError::invalid_name(
                    name,
                    format!("unknown namespace '{prefix}'"),
                ));
            };
            if !rest.starts_with('/') {
                return Err(KeyDbError::invalid_name(
                    name,
                    "namespace must be followed by '/'",
                ));
            }
            (namespace, rest)
        };

        let mut key = Self::root(namespace);
        key.push_path(path);
        Ok(key)
    }

    /// The root name (`/` or `<ns>:/`) of a namespace.
    pub fn root(namespace: Namespace) -> Self {
        Self {
            namespace,
            segments: Vec::new(),
        }
    }

    pub fn namespace(&self) -> Namespace {
        self.namespace
    }

    pub fn segments(&self) -> &[String] {
        &self.segments
    }

    /// Last segment, `None` for a namespace root.
    pub fn base_name(&self) -> Option<&str> {
        self.segments.last().map(String::as_str)
    }

    pub fn is_root(&self) -> bool {
        self.segments.is_empty()
    }

    /// Append a relative path (`a/b`, `../c`) and return the new name.
    pub fn join(&self, relative: &str) -> Self {
        let mut joined = self.clone();
        joined.push_path(relative);
        joined
    }

    /// Append exactly one segment taken literally.
    ///
    /// Unlike [`join`](Self::join), `/`, `.` and `..` are not path operators
    /// here: a segment that is empty, `.`, `..` or contains `/` is rejected.
    pub fn child(&self, segment: &str) -> Result<Self, KeyDbError> {
        if segment.is_empty() || segment == "." || segment == ".." || segment.contains('/') {
            return Err(KeyDbError::invalid_name(
                &self.to_string(),
                format!("'{segment}' is not a single key name segment"),
            ));
        }
        let mut child = self.clone();
        child.segments.push(segment.to_string());
        Ok(child)
    }

    /// Build from segments that are already canonical.
    pub(crate) fn from_segments(namespace: Namespace, segments: Vec<String>) -> Self {
        Self {
            namespace,
            segments,
        }
    }

    /// Same segments, different namespace.
    pub fn with_namespace(&self, namespace: Namespace) -> Self {
        Self {
            namespace,
            segments: self.segments.clone(),
        }
    }

    /// Parent name, `None` for a namespace root.
    pub fn parent(&self) -> Option<Self> {
        if self.is_root() {
            return None;
        }
        let mut parent = self.clone();
        parent.segments.pop();
        Some(parent)
    }

    pub fn is_below_or_same(&self, parent: &KeyName) -> bool {
        parent.namespace.covers(self.namespace) && self.segments.starts_with(&parent.segments)
    }

    pub fn is_below(&self, parent: &KeyName) -> bool {
        self.segments.len() > parent.segments.len() && self.is_below_or_same(parent)
    }

    fn push_path(&mut self, path: &str) {
        for part in path.split('/') {
            match part {
                "" | "." => {}
                ".." => {
                    self.segments.pop();
                }
                segment => self.segments.push(segment.to_string()),
            }
        }
    }
}

impl fmt::Display for KeyName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.namespace != Namespace::Cascading {
            write!(f, "{}:", self.namespace.prefix())?;
        }
        write!(f, "/{}", self.segments.join("/"))
    }
}

impl FromStr for KeyName {
    type Err = KeyDbError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        KeyName::parse(s)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn name(s: &str) -> KeyName {
        KeyName::parse(s).unwrap()
    }

    #[test]
    fn parses_cascading_and_namespaced_names() {
        let cascading = name("/sw/app");
        assert_eq!(cascading.namespace(), Namespace::Cascading);
        assert_eq!(cascading.segments(), ["sw", "app"]);

        let user = name("user:/sw/app");
        assert_eq!(user.namespace(), Namespace::User);
        assert_eq!(user.to_string(), "user:/sw/app");
    }

    #[test]
    fn canonicalizes_paths() {
        assert_eq!(name("//sw///app/").to_string(), "/sw/app");
        assert_eq!(name("/sw/./app/../lib").to_string(), "/sw/lib");
        assert_eq!(name("system:/../..").to_string(), "system:/");
        assert_eq!(name("/").to_string(), "/");
        assert!(name("user:/").is_root());
    }

    #[test]
    fn rejects_invalid_names() {
        for bad in ["", "sw/app", "nope:/x", "user:x", "a/b:/c"] {
            assert!(
                matches!(KeyName::parse(bad), Err(KeyDbError::InvalidName { .. })),
                "{bad:?} should be rejected"
            );
        }
    }

    #[test]
    fn cascading_names_may_contain_colons() {
        let key = name("/a:/b");
        assert_eq!(key.namespace(), Namespace::Cascading);
        assert_eq!(key.segments(), ["a:", "b"]);
    }

    #[test]
    fn hierarchy_checks() {
        let parent = name("user:/sw");
        assert!(name("user:/sw/app").is_below(&parent));
        assert!(name("user:/sw").is_below_or_same(&parent));
        assert!(!name("user:/sw").is_below(&parent));
        assert!(!name("system:/sw/app").is_below(&parent));
        assert!(!name("user:/swap").is_below(&parent));

        // a cascading parent covers every namespace
        assert!(name("system:/sw/app").is_below(&name("/sw")));
        assert!(name("dir:/x").is_below(&name("/")));
    }

    #[test]
    fn orders_by_namespace_then_segments() {
        let mut names = vec![
            name("system:/a"),
            name("/a-b"),
            name("user:/a"),
            name("/a/b"),
            name("/a"),
        ];
        names.sort();
        let rendered: Vec<String> = names.iter().map(ToString::to_string).collect();
        assert_eq!(rendered, ["/a", "/a/b", "/a-b", "user:/a", "system:/a"]);
    }

    #[test]
    fn join_and_parent() {
        let base = name("user:/sw");
        assert_eq!(base.join("app/port").to_string(), "user:/sw/app/port");
        assert_eq!(base.join("../etc").to_string(), "user:/etc");
        assert_eq!(base.parent().unwrap().to_string(), "user:/");
        assert!(name("user:/").parent().is_none());
        assert_eq!(base.base_name(), Some("sw"));
    }

    #[test]
    fn child_takes_one_literal_segment() {
        let base = name("user:/cfg");
        assert_eq!(base.child("port").unwrap().to_string(), "user:/cfg/port");
        assert_eq!(base.child("#_10").unwrap().segments(), ["cfg", "#_10"]);

        for bad in ["", ".", "..", "a/b", "../../etc"] {
            assert!(
                matches!(base.child(bad), Err(KeyDbError::InvalidName { .. })),
                "{bad:?} should be rejected"
            );
        }
    }
}
