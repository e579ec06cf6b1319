use std::collections::BTreeSet;

use serde::Serialize;

/// Unique non-empty node names, always iterated in sorted order so that dispatches over the same
/// nodes are reproducible.
#[derive(Default, Debug, Clone, PartialEq, Eq, Serialize)]
pub struct NodeSet {
    nodes: BTreeSet<String>,
}

impl NodeSet {
    pub fn new() -> Self {
        Default::default()
    }

    /// Returns false if the node is empty or already present.
    pub fn insert(&mut self, node: &str) -> bool {
        if node.is_empty() {
            return false;
        }
        self.nodes.insert(node.to_string())
    }

    pub fn contains(&self, node: &str) -> bool {
        self.nodes.contains(node)
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.nodes.iter().map(String::as_str)
    }
}

impl<'a> FromIterator<&'a str> for NodeSet {
    fn from_iter<I: IntoIterator<Item = &'a str>>(iter: I) -> Self {
        let mut node_set = NodeSet::new();
        for node in iter {
            node_set.insert(node);
        }
        node_set
    }
}
