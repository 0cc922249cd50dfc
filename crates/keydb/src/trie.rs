//! Mountpoint routing.
//!
//! [`MountTrie`] maps mountpoints to values (usually backends). Each namespace
//! owns a segment trie; a lookup walks the trie of the name's own namespace and
//! returns the deepest mountpoint the name lives under. A cascading parent
//! sees the mountpoints of every namespace.

use std::collections::BTreeMap;

use crate::name::{KeyName, Namespace};

#[derive(Debug)]
struct Node<T> {
    value: Option<T>,
    children: BTreeMap<String, Node<T>>,
}

impl<T> Node<T> {
    fn new() -> Self {
        Self {
            value: None,
            children: BTreeMap::new(),
        }
    }

    fn is_vacant(&self) -> bool {
        self.value.is_none() && self.children.is_empty()
    }

    /// Deepest value on the path of `segments`, with its depth.
    fn deepest(&self, segments: &[String]) -> Option<(usize, &T)> {
        let mut best = self.value.as_ref().map(|v| (0, v));
        let mut node = self;
        for (depth, segment) in segments.iter().enumerate() {
            let Some(child) = node.children.get(segment) else {
                break;
            };
            node = child;
            if let Some(v) = node.value.as_ref() {
                best = Some((depth + 1, v));
            }
        }
        best
    }

    fn descend(&self, segments: &[String]) -> Option<&Node<T>> {
        let mut node = self;
        for segment in segments {
            node = node.children.get(segment)?;
        }
        Some(node)
    }

    fn collect<'a>(
        &'a self,
        namespace: Namespace,
        path: &mut Vec<String>,
        out: &mut Vec<(KeyName, &'a T)>,
    ) {
        if let Some(v) = self.value.as_ref() {
            out.push((KeyName::from_segments(namespace, path.clone()), v));
        }
        for (segment, child) in &self.children {
            path.push(segment.clone());
            child.collect(namespace, path, out);
            path.pop();
        }
    }

    fn remove(&mut self, segments: &[String]) -> Option<T> {
        let Some((first, rest)) = segments.split_first() else {
            return self.value.take();
        };
        let child = self.children.get_mut(first)?;
        let removed = child.remove(rest);
        if child.is_vacant() {
            self.children.remove(first);
        }
        removed
    }

    fn count(&self) -> usize {
        usize::from(self.value.is_some()) + self.children.values().map(Node::count).sum::<usize>()
    }
}

/// Segment trie from mountpoints to values.
#[derive(Debug)]
pub struct MountTrie<T> {
    roots: BTreeMap<Namespace, Node<T>>,
}

impl<T> Default for MountTrie<T> {
    fn default() -> Self {
        Self {
            roots: BTreeMap::new(),
        }
    }
}

impl<T> MountTrie<T> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Mount `value` at `mountpoint`, returning the value it replaced.
    pub fn insert(&mut self, mountpoint: &KeyName, value: T) -> Option<T> {
        let mut node = self
            .roots
            .entry(mountpoint.namespace())
            .or_insert_with(Node::new);
        for segment in mountpoint.segments() {
            node = node
                .children
                .entry(segment.clone())
                .or_insert_with(Node::new);
        }
        node.value.replace(value)
    }

    pub fn remove(&mut self, mountpoint: &KeyName) -> Option<T> {
        let namespace = mountpoint.namespace();
        let root = self.roots.get_mut(&namespace)?;
        let removed = root.remove(mountpoint.segments());
        if root.is_vacant() {
            self.roots.remove(&namespace);
        }
        removed
    }

    pub fn contains(&self, mountpoint: &KeyName) -> bool {
        self.roots
            .get(&mountpoint.namespace())
            .and_then(|root| root.descend(mountpoint.segments()))
            .is_some_and(|node| node.value.is_some())
    }

    /// Value of the deepest mountpoint in `name`'s namespace that `name` is
    /// below or same as.
    pub fn lookup(&self, name: &KeyName) -> Option<&T> {
        self.owner(name).map(|(_, value)| value)
    }

    /// Like [`lookup`](Self::lookup), together with the owning mountpoint.
    pub fn owner(&self, name: &KeyName) -> Option<(KeyName, &T)> {
        let root = self.roots.get(&name.namespace())?;
        let (depth, value) = root.deepest(name.segments())?;
        let mountpoint = KeyName::from_segments(name.namespace(), name.segments()[..depth].to_vec());
        Some((mountpoint, value))
    }

    /// Namespaces with at least one mountpoint, in namespace order.
    pub fn namespaces(&self) -> impl Iterator<Item = Namespace> + '_ {
        self.roots.keys().copied()
    }

    /// Every mountpoint below or same as `name`, in mountpoint order.
    pub fn mounted_below(&self, name: &KeyName) -> Vec<(KeyName, &T)> {
        let mut out = Vec::new();
        for (ns, root) in &self.roots {
            if !name.namespace().covers(*ns) {
                continue;
            }
            if let Some(node) = root.descend(name.segments()) {
                let mut path = name.segments().to_vec();
                node.collect(*ns, &mut path, &mut out);
            }
        }
        out
    }

    pub fn len(&self) -> usize {
        self.roots.values().map(Node::count).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.roots.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn name(s: &str) -> KeyName {
        KeyName::parse(s).unwrap()
    }

    fn sample() -> MountTrie<&'static str> {
        let mut trie = MountTrie::new();
        trie.insert(&name("user:/"), "user-root");
        trie.insert(&name("user:/sw/app"), "app");
        trie.insert(&name("user:/sw/app/plugins"), "plugins");
        trie.insert(&name("/sw/shared"), "shared");
        trie.insert(&name("system:/info"), "info");
        trie
    }

    #[test]
    fn lookup_returns_deepest_mount() {
        let trie = sample();
        assert_eq!(trie.lookup(&name("user:/sw/app/port")), Some(&"app"));
        assert_eq!(trie.lookup(&name("user:/sw/app/plugins/x")), Some(&"plugins"));
        assert_eq!(trie.lookup(&name("user:/sw/application")), Some(&"user-root"));
        assert_eq!(trie.lookup(&name("user:/sw/app")), Some(&"app"));
        assert_eq!(trie.lookup(&name("system:/other")), None);
    }

    #[test]
    fn lookup_stays_within_namespace() {
        let trie = sample();
        assert_eq!(trie.lookup(&name("/sw/shared/x")), Some(&"shared"));
        assert_eq!(trie.lookup(&name("system:/sw/shared/x")), None);
        assert_eq!(trie.lookup(&name("user:/sw/shared/x")), Some(&"user-root"));
        assert_eq!(trie.lookup(&name("/sw/app")), None);
    }

    #[test]
    fn owner_names_the_mountpoint() {
        let trie = sample();
        let (mountpoint, value) = trie.owner(&name("user:/sw/app/port")).unwrap();
        assert_eq!(mountpoint.to_string(), "user:/sw/app");
        assert_eq!(*value, "app");

        let (mountpoint, _) = trie.owner(&name("user:/sw/other")).unwrap();
        assert_eq!(mountpoint.to_string(), "user:/");
        assert!(trie.owner(&name("dir:/x")).is_none());

        let namespaces: Vec<Namespace> = trie.namespaces().collect();
        assert_eq!(namespaces, [Namespace::Cascading, Namespace::User, Namespace::System]);
    }

    #[test]
    fn mounted_below_lists_subtree_in_order() {
        let trie = sample();

        let all: Vec<String> = trie
            .mounted_below(&name("/"))
            .into_iter()
            .map(|(mp, _)| mp.to_string())
            .collect();
        assert_eq!(
            all,
            [
                "/sw/shared",
                "user:/",
                "user:/sw/app",
                "user:/sw/app/plugins",
                "system:/info"
            ]
        );

        let user_sw: Vec<&str> = trie
            .mounted_below(&name("user:/sw"))
            .into_iter()
            .map(|(_, v)| *v)
            .collect();
        assert_eq!(user_sw, ["app", "plugins"]);

        let cascading_sw: Vec<&str> = trie
            .mounted_below(&name("/sw"))
            .into_iter()
            .map(|(_, v)| *v)
            .collect();
        assert_eq!(cascading_sw, ["shared", "app", "plugins"]);
    }

    #[test]
    fn insert_replace_and_remove() {
        let mut trie = sample();
        assert_eq!(trie.len(), 5);
        assert_eq!(trie.insert(&name("system:/info"), "info2"), Some("info"));
        assert_eq!(trie.len(), 5);

        assert_eq!(trie.remove(&name("user:/sw/app")), Some("app"));
        assert!(!trie.contains(&name("user:/sw/app")));
        assert!(trie.contains(&name("user:/sw/app/plugins")));
        assert_eq!(trie.lookup(&name("user:/sw/app/port")), Some(&"user-root"));

        assert_eq!(trie.remove(&name("system:/info")), Some("info2"));
        assert_eq!(trie.remove(&name("system:/info")), None);
        assert_eq!(trie.len(), 3);
        assert!(!trie.is_empty());
    }
}
