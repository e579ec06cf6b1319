use thiserror::Error;

use crate::core::deployment::{Deployment, LabelSelector};
use crate::core::job::JobSpec;
use crate::core::pod::Pod;

#[derive(Debug, Error, Clone, PartialEq)]
pub enum ClusterError {
    #[error("{kind} {name:?} not found in namespace {namespace:?}")]
    NotFound {
        kind: &'static str,
        name: String,
        namespace: String,
    },

    #[error("{kind} {name:?} already exists in namespace {namespace:?}")]
    AlreadyExists {
        kind: &'static str,
        name: String,
        namespace: String,
    },

    #[error("invalid object: {0}")]
    Invalid(String),

    #[error("cluster is unavailable: {0}")]
    Unavailable(String),
}

// Read access to cluster objects which the inspector needs to find nodes of a deployment.
pub trait ClusterReader {
    // Returns ClusterError::NotFound if there is no such deployment.
    fn get_deployment(&self, name: &str, namespace: &str) -> Result<Deployment, ClusterError>;

    fn list_pods(&self, namespace: &str, selector: &LabelSelector)
        -> Result<Vec<Pod>, ClusterError>;
}

// Write access used to submit dispatched jobs. One call is one submission attempt, retries are
// up to the caller.
pub trait ClusterWriter {
    fn create_job(&self, namespace: &str, job: &JobSpec) -> Result<(), ClusterError>;
}
