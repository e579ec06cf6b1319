//! Type definition for Pod primitive in k8s cluster, limited to what the inspector reads.

use serde::{Deserialize, Serialize};

use crate::core::common::ObjectMeta;

#[derive(Default, Debug, Deserialize, Serialize, Clone, PartialEq)]
pub enum PodPhase {
    // Pod is accepted by the cluster but not yet bound to a node.
    #[default]
    Pending,
    // Pod is bound to a node and at least one container is still running.
    Running,
    // All containers in the pod have terminated successfully.
    Succeeded,
    // All containers in the pod have terminated and at least one of them in failure.
    Failed,
    Unknown,
}

#[derive(Default, Debug, Deserialize, Serialize, PartialEq, Clone)]
pub struct PodStatus {
    #[serde(default)]
    pub phase: PodPhase,
    // Empty while the pod is not scheduled yet.
    #[serde(default)]
    pub assigned_node: String,
}

#[derive(Debug, Deserialize, Serialize, PartialEq, Clone)]
pub struct Pod {
    pub metadata: ObjectMeta,
    #[serde(default)]
    pub status: PodStatus,
}

impl Pod {
    pub fn new(name: &str, namespace: &str, assigned_node: &str) -> Self {
        let phase = if assigned_node.is_empty() {
            PodPhase::Pending
        } else {
            PodPhase::Running
        };
        Self {
            metadata: ObjectMeta::new(name, namespace),
            status: PodStatus {
                phase,
                assigned_node: assigned_node.to_string(),
            },
        }
    }

    pub fn with_labels<'a>(mut self, labels: impl IntoIterator<Item = (&'a str, &'a str)>) -> Self {
        self.metadata = self.metadata.with_labels(labels);
        self
    }

    pub fn name(&self) -> &str {
        &self.metadata.name
    }

    /// Name of the node the pod is bound to, None while it is pending.
    pub fn assigned_node(&self) -> Option<&str> {
        if self.status.assigned_node.is_empty() {
            None
        } else {
            Some(&self.status.assigned_node)
        }
    }
}
