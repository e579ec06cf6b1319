use std::cell::RefCell;
use std::collections::HashSet;

use crate::core::deployment::{Deployment, LabelSelector};
use crate::core::interface::{ClusterError, ClusterReader, ClusterWriter};
use crate::core::job::JobSpec;
use crate::core::persistent_storage::PersistentStorage;
use crate::core::pod::Pod;

/// Writer which remembers submitted jobs and refuses jobs pinned to unreachable nodes.
#[derive(Default)]
pub struct RecordingWriter {
    pub unreachable_nodes: HashSet<String>,
    pub submitted: RefCell<Vec<JobSpec>>,
}

impl RecordingWriter {
    pub fn new() -> Self {
        Default::default()
    }

    pub fn with_unreachable_nodes(nodes: &[&str]) -> Self {
        Self {
            unreachable_nodes: nodes.iter().map(|node| node.to_string()).collect(),
            submitted: Default::default(),
        }
    }

    pub fn submitted_names(&self) -> Vec<String> {
        self.submitted
            .borrow()
            .iter()
            .map(|job| job.metadata.name.clone())
            .collect()
    }
}

impl ClusterWriter for RecordingWriter {
    fn create_job(&self, _namespace: &str, job: &JobSpec) -> Result<(), ClusterError> {
        self.submitted.borrow_mut().push(job.clone());
        match job.target_node() {
            Some(node) if self.unreachable_nodes.contains(node) => Err(ClusterError::Unavailable(
                format!("node {} is unreachable", node),
            )),
            _ => Ok(()),
        }
    }
}

/// Reader which finds deployments but fails to list any pods.
pub struct BrokenPodListReader {
    pub deployment: Deployment,
}

impl ClusterReader for BrokenPodListReader {
    fn get_deployment(&self, name: &str, namespace: &str) -> Result<Deployment, ClusterError> {
        let mut deployment = self.deployment.clone();
        deployment.metadata.name = name.to_string();
        deployment.metadata.namespace = namespace.to_string();
        Ok(deployment)
    }

    fn list_pods(
        &self,
        _namespace: &str,
        _selector: &LabelSelector,
    ) -> Result<Vec<Pod>, ClusterError> {
        Err(ClusterError::Unavailable("connection refused".to_string()))
    }
}

pub const DEFAULT_TEST_CLUSTER_STATE: &str = r#"
deployments:
- metadata:
    name: web
    namespace: default
  spec:
    replicas: 4
    selector:
      match_labels:
        app: web
- metadata:
    name: idle
    namespace: default
  spec:
    replicas: 0
    selector:
      match_labels:
        app: idle
pods:
- metadata:
    name: web-1
    labels:
      app: web
  status:
    phase: Running
    assigned_node: node2.example.com
- metadata:
    name: web-2
    labels:
      app: web
  status:
    phase: Running
    assigned_node: node1.example.com
- metadata:
    name: web-3
    labels:
      app: web
  status:
    phase: Running
    assigned_node: node2.example.com
- metadata:
    name: web-4
    labels:
      app: web
  status:
    phase: Pending
- metadata:
    name: web-other-namespace
    namespace: staging
    labels:
      app: web
  status:
    assigned_node: node9
- metadata:
    name: db-1
    labels:
      app: db
  status:
    phase: Running
    assigned_node: node3
"#;

pub fn default_test_storage() -> PersistentStorage {
    PersistentStorage::from_yaml_str(DEFAULT_TEST_CLUSTER_STATE).unwrap()
}
