//! Implementation of persistent storage for saving all information about kubernetes objects.
//! In k8s etcd plays this role, here it is a simple in-memory key-value storage which can be
//! loaded from and saved to a YAML cluster state file.

use std::cell::RefCell;
use std::collections::HashMap;
use std::path::Path;
use std::rc::Rc;

use log::{debug, warn};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::core::common::storage_key;
use crate::core::deployment::{Deployment, LabelSelector};
use crate::core::interface::{ClusterError, ClusterReader, ClusterWriter};
use crate::core::job::JobSpec;
use crate::core::pod::Pod;

/// Maximum length of a DNS-1123 label, which job names must be.
pub const MAX_OBJECT_NAME_LENGTH: usize = 63;

#[derive(Debug, Error)]
pub enum StorageError {
    #[error("failed to access cluster state file: {0}")]
    Io(#[from] std::io::Error),

    #[error("failed to parse cluster state: {0}")]
    Yaml(#[from] serde_yaml::Error),
}

/// Serialized form of the storage.
#[derive(Default, Debug, Deserialize, Serialize, PartialEq)]
pub struct ClusterState {
    #[serde(default)]
    pub deployments: Vec<Deployment>,
    #[serde(default)]
    pub pods: Vec<Pod>,
    #[serde(default)]
    pub jobs: Vec<JobSpec>,
}

#[derive(Default)]
pub struct StorageData {
    // All maps are keyed by `<namespace>/<name>`.
    pub deployments: HashMap<String, Deployment>,
    pub pods: HashMap<String, Pod>,
    pub jobs: HashMap<String, JobSpec>,
}

#[derive(Default, Clone)]
pub struct PersistentStorage {
    storage_data: Rc<RefCell<StorageData>>,
}

impl PersistentStorage {
    pub fn new() -> Self {
        Default::default()
    }

    pub fn from_state(state: ClusterState) -> Self {
        let storage = Self::new();
        for deployment in state.deployments {
            storage.add_deployment(deployment);
        }
        for pod in state.pods {
            storage.add_pod(pod);
        }
        {
            let mut data = storage.storage_data.borrow_mut();
            for job in state.jobs {
                data.jobs.insert(job.metadata.storage_key(), job);
            }
        }
        storage
    }

    pub fn from_yaml_str(state_yaml: &str) -> Result<Self, StorageError> {
        let state = serde_yaml::from_str::<ClusterState>(state_yaml)?;
        Ok(Self::from_state(state))
    }

    pub fn load(path: &Path) -> Result<Self, StorageError> {
        let state_yaml = std::fs::read_to_string(path)?;
        let storage = Self::from_yaml_str(&state_yaml)?;
        debug!(
            "Loaded cluster state from {:?}: {} deployments, {} pods, {} jobs",
            path,
            storage.deployment_count(),
            storage.pod_count(),
            storage.job_count()
        );
        Ok(storage)
    }

    /// Snapshot of all stored objects, every list sorted by namespace and name.
    pub fn to_state(&self) -> ClusterState {
        let data = self.storage_data.borrow();
        ClusterState {
            deployments: sorted_values(&data.deployments),
            pods: sorted_values(&data.pods),
            jobs: sorted_values(&data.jobs),
        }
    }

    pub fn save(&self, path: &Path) -> Result<(), StorageError> {
        let state_yaml = serde_yaml::to_string(&self.to_state())?;
        std::fs::write(path, state_yaml)?;
        Ok(())
    }

    pub fn add_deployment(&self, deployment: Deployment) {
        let key = deployment.metadata.storage_key();
        let replaced = self
            .storage_data
            .borrow_mut()
            .deployments
            .insert(key.clone(), deployment);
        if replaced.is_some() {
            warn!("Deployment {:?} was stored twice, keeping the last one", key);
        }
    }

    pub fn add_pod(&self, pod: Pod) {
        let key = pod.metadata.storage_key();
        let replaced = self.storage_data.borrow_mut().pods.insert(key.clone(), pod);
        if replaced.is_some() {
            warn!("Pod {:?} was stored twice, keeping the last one", key);
        }
    }

    pub fn get_job(&self, name: &str, namespace: &str) -> Option<JobSpec> {
        self.storage_data
            .borrow()
            .jobs
            .get(&storage_key(namespace, name))
            .cloned()
    }

    pub fn deployment_count(&self) -> usize {
        self.storage_data.borrow().deployments.len()
    }

    pub fn pod_count(&self) -> usize {
        self.storage_data.borrow().pods.len()
    }

    pub fn job_count(&self) -> usize {
        self.storage_data.borrow().jobs.len()
    }
}

fn sorted_values<T: Clone>(objects: &HashMap<String, T>) -> Vec<T> {
    let mut keys: Vec<&String> = objects.keys().collect();
    keys.sort();
    keys.into_iter().map(|key| objects[key].clone()).collect()
}

/// Checks that name is a DNS-1123 label: lowercase alphanumerics and '-', starting and ending
/// with an alphanumeric character, at most 63 characters long.
pub fn is_dns1123_label(name: &str) -> bool {
    let bytes = name.as_bytes();
    if bytes.is_empty() || bytes.len() > MAX_OBJECT_NAME_LENGTH {
        return false;
    }
    let is_alphanumeric = |c: &u8| c.is_ascii_lowercase() || c.is_ascii_digit();
    is_alphanumeric(&bytes[0])
        && is_alphanumeric(&bytes[bytes.len() - 1])
        && bytes.iter().all(|c| is_alphanumeric(c) || *c == b'-')
}

impl ClusterReader for PersistentStorage {
    fn get_deployment(&self, name: &str, namespace: &str) -> Result<Deployment, ClusterError> {
        self.storage_data
            .borrow()
            .deployments
            .get(&storage_key(namespace, name))
            .cloned()
            .ok_or_else(|| ClusterError::NotFound {
                kind: "deployment",
                name: name.to_string(),
                namespace: namespace.to_string(),
            })
    }

    fn list_pods(
        &self,
        namespace: &str,
        selector: &LabelSelector,
    ) -> Result<Vec<Pod>, ClusterError> {
        let mut pods: Vec<Pod> = self
            .storage_data
            .borrow()
            .pods
            .values()
            .filter(|pod| pod.metadata.namespace == namespace)
            .filter(|pod| selector.matches(&pod.metadata.labels))
            .cloned()
            .collect();
        pods.sort_by(|lhs, rhs| lhs.metadata.name.cmp(&rhs.metadata.name));
        Ok(pods)
    }
}

impl ClusterWriter for PersistentStorage {
    fn create_job(&self, namespace: &str, job: &JobSpec) -> Result<(), ClusterError> {
        let name = job.instance_name();
        if !is_dns1123_label(name) {
            return Err(ClusterError::Invalid(format!(
                "job name {:?} must be a lowercase DNS-1123 label of at most {} characters",
                name, MAX_OBJECT_NAME_LENGTH
            )));
        }

        let key = storage_key(namespace, name);
        let mut data = self.storage_data.borrow_mut();
        if data.jobs.contains_key(&key) {
            return Err(ClusterError::AlreadyExists {
                kind: "job",
                name: name.to_string(),
                namespace: namespace.to_string(),
            });
        }

        let mut job = job.clone();
        job.metadata.namespace = namespace.to_string();
        data.jobs.insert(key, job);
        debug!("Stored job {:?} in namespace {:?}", name, namespace);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::is_dns1123_label;

    #[test]
    fn test_dns1123_label() {
        assert!(is_dns1123_label("diag-node1-0"));
        assert!(is_dns1123_label("a"));
        assert!(!is_dns1123_label(""));
        assert!(!is_dns1123_label("Diag-node1-0"));
        assert!(!is_dns1123_label("diag_node1-0"));
        assert!(!is_dns1123_label("-diag"));
        assert!(!is_dns1123_label("diag-"));
        assert!(!is_dns1123_label("node1.example.com"));
        assert!(is_dns1123_label(&"a".repeat(63)));
        assert!(!is_dns1123_label(&"a".repeat(64)));
    }
}
