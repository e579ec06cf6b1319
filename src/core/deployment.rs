//! Type definitions for deployment objects and the label selector they use to own pods.

use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::core::common::ObjectMeta;

/// Equality-based selector. Deployments do not enumerate their pods, the selector is the only
/// link between them.
#[derive(Default, Debug, Deserialize, Serialize, Clone, PartialEq)]
pub struct LabelSelector {
    #[serde(default)]
    pub match_labels: BTreeMap<String, String>,
}

impl LabelSelector {
    pub fn new<'a>(labels: impl IntoIterator<Item = (&'a str, &'a str)>) -> Self {
        Self {
            match_labels: labels
                .into_iter()
                .map(|(k, v)| (k.to_string(), v.to_string()))
                .collect(),
        }
    }

    /// Empty selector matches no object: a deployment with a missing selector owns no pods.
    pub fn matches(&self, labels: &BTreeMap<String, String>) -> bool {
        !self.is_empty()
            && self
                .match_labels
                .iter()
                .all(|(key, value)| labels.get(key) == Some(value))
    }

    pub fn is_empty(&self) -> bool {
        self.match_labels.is_empty()
    }
}

impl fmt::Display for LabelSelector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let formatted: Vec<String> = self
            .match_labels
            .iter()
            .map(|(key, value)| format!("{}={}", key, value))
            .collect();
        write!(f, "{}", formatted.join(","))
    }
}

#[derive(Default, Debug, Deserialize, Serialize, Clone, PartialEq)]
pub struct DeploymentSpec {
    #[serde(default)]
    pub replicas: u32,
    #[serde(default)]
    pub selector: LabelSelector,
}

#[derive(Debug, Deserialize, Serialize, Clone, PartialEq)]
pub struct Deployment {
    pub metadata: ObjectMeta,
    #[serde(default)]
    pub spec: DeploymentSpec,
}

impl Deployment {
    pub fn new(name: &str, namespace: &str, replicas: u32, selector: LabelSelector) -> Self {
        Self {
            metadata: ObjectMeta::new(name, namespace),
            spec: DeploymentSpec { replicas, selector },
        }
    }

    pub fn selector(&self) -> &LabelSelector {
        &self.spec.selector
    }
}
