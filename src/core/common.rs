//! Metadata shared by all kubernetes objects kept in the cluster state.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

pub const DEFAULT_NAMESPACE: &str = "default";

fn default_namespace() -> String {
    DEFAULT_NAMESPACE.to_string()
}

#[derive(Debug, Deserialize, Serialize, PartialEq, Clone)]
pub struct ObjectMeta {
    pub name: String,
    #[serde(default = "default_namespace")]
    pub namespace: String,
    // Sorted map keeps serialized state files stable between runs.
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub labels: BTreeMap<String, String>,
}

impl Default for ObjectMeta {
    fn default() -> Self {
        Self {
            name: Default::default(),
            namespace: default_namespace(),
            labels: Default::default(),
        }
    }
}

impl ObjectMeta {
    pub fn new(name: &str, namespace: &str) -> Self {
        Self {
            name: name.to_string(),
            namespace: namespace.to_string(),
            labels: Default::default(),
        }
    }

    pub fn with_labels<'a>(mut self, labels: impl IntoIterator<Item = (&'a str, &'a str)>) -> Self {
        self.labels.extend(
            labels
                .into_iter()
                .map(|(k, v)| (k.to_string(), v.to_string())),
        );
        self
    }

    /// Key under which the object is stored: `<namespace>/<name>`.
    pub fn storage_key(&self) -> String {
        storage_key(&self.namespace, &self.name)
    }
}

pub fn storage_key(namespace: &str, name: &str) -> String {
    format!("{}/{}", namespace, name)
}
