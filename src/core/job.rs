//! Type definition for one-shot jobs pinned to a single node.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::core::common::ObjectMeta;
use crate::core::toleration::Toleration;

/// Well-known node label holding the node's hostname, used to pin a job to one node.
pub const HOSTNAME_LABEL: &str = "kubernetes.io/hostname";
/// Label put on job pods so that they can be found by the job instance name.
pub const JOB_NAME_LABEL: &str = "job-name";
pub const JOB_CONTAINER_NAME: &str = "job-container";

#[derive(Debug, Deserialize, Serialize, Clone, PartialEq)]
pub enum RestartPolicy {
    Never,
    OnFailure,
}

#[derive(Debug, Deserialize, Serialize, Clone, PartialEq)]
pub struct Container {
    pub name: String,
    pub image: String,
    pub command: Vec<String>,
}

#[derive(Debug, Deserialize, Serialize, Clone, PartialEq)]
pub struct PodTemplateSpec {
    #[serde(default)]
    pub labels: BTreeMap<String, String>,
    pub restart_policy: RestartPolicy,
    pub node_selector: BTreeMap<String, String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub tolerations: Vec<Toleration>,
    pub containers: Vec<Container>,
}

#[derive(Debug, Deserialize, Serialize, Clone, PartialEq)]
pub struct JobSpec {
    pub metadata: ObjectMeta,
    // Finished jobs are garbage collected after this many seconds.
    pub ttl_seconds_after_finished: u32,
    pub template: PodTemplateSpec,
}

impl JobSpec {
    /// Builds a job which runs `command` in `image` exactly on `node`.
    pub fn for_node(
        instance_name: &str,
        namespace: &str,
        node: &str,
        image: &str,
        command: Vec<String>,
        tolerations: Vec<Toleration>,
        ttl_seconds_after_finished: u32,
    ) -> Self {
        Self {
            metadata: ObjectMeta::new(instance_name, namespace),
            ttl_seconds_after_finished,
            template: PodTemplateSpec {
                labels: BTreeMap::from([(
                    JOB_NAME_LABEL.to_string(),
                    instance_name.to_string(),
                )]),
                restart_policy: RestartPolicy::Never,
                node_selector: BTreeMap::from([(HOSTNAME_LABEL.to_string(), node.to_string())]),
                tolerations,
                containers: vec![Container {
                    name: JOB_CONTAINER_NAME.to_string(),
                    image: image.to_string(),
                    command,
                }],
            },
        }
    }

    pub fn instance_name(&self) -> &str {
        &self.metadata.name
    }

    /// Node the job is pinned to through its hostname selector.
    pub fn target_node(&self) -> Option<&str> {
        self.template
            .node_selector
            .get(HOSTNAME_LABEL)
            .map(String::as_str)
    }
}

/// Node names are usually DNS names, dots are not allowed in job names.
pub fn sanitize_node_name(node: &str) -> String {
    node.replace('.', "-")
}

/// Deterministic job name for the node at position `index` of a dispatch, so repeated runs
/// against the same nodes produce the same names.
pub fn instance_name(base_name: &str, node: &str, index: usize) -> String {
    format!("{}-{}-{}", base_name, sanitize_node_name(node), index)
}

/// Splits a comma-separated command line argument, trimming every part.
pub fn parse_command_list(command: &str) -> Vec<String> {
    if command.trim().is_empty() {
        return vec![];
    }
    command
        .split(',')
        .map(|part| part.trim().to_string())
        .collect()
}
