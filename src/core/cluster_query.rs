//! Resolves a deployment to its pods and to the nodes running them.
//!
//! Deployments do not list their pods, so lookup takes two reads: the deployment for its
//! selector and then pods matching the selector. A selector matching nothing gives an empty pod
//! list, which means nothing is scheduled yet rather than an error.

use std::rc::Rc;

use log::debug;
use thiserror::Error;

use crate::core::interface::{ClusterError, ClusterReader};
use crate::core::node_set::NodeSet;
use crate::core::pod::Pod;

#[derive(Debug, Error, PartialEq)]
pub enum QueryError {
    #[error("deployment {name:?} not found in namespace {namespace:?}")]
    DeploymentNotFound { name: String, namespace: String },

    #[error("failed to list pods of deployment {name:?}: {cause}")]
    ListFailed { name: String, cause: ClusterError },
}

pub struct ClusterQueryService {
    reader: Rc<dyn ClusterReader>,
}

impl ClusterQueryService {
    pub fn new(reader: Rc<dyn ClusterReader>) -> Self {
        Self { reader }
    }

    pub fn pods_for_deployment(&self, name: &str, namespace: &str) -> Result<Vec<Pod>, QueryError> {
        let deployment = self
            .reader
            .get_deployment(name, namespace)
            .map_err(|err| match err {
                ClusterError::NotFound { .. } => QueryError::DeploymentNotFound {
                    name: name.to_string(),
                    namespace: namespace.to_string(),
                },
                cause => QueryError::ListFailed {
                    name: name.to_string(),
                    cause,
                },
            })?;

        let selector = deployment.selector();
        debug!(
            "Listing pods of deployment {:?} in namespace {:?} with selector {:?}",
            name,
            namespace,
            selector.to_string()
        );
        let pods = self
            .reader
            .list_pods(namespace, selector)
            .map_err(|cause| QueryError::ListFailed {
                name: name.to_string(),
                cause,
            })?;
        debug!("Found {} pods of deployment {:?}", pods.len(), name);
        Ok(pods)
    }

    /// Distinct nodes the pods are bound to, pending pods are skipped.
    pub fn nodes_for_pods(pods: &[Pod]) -> NodeSet {
        pods.iter().filter_map(Pod::assigned_node).collect()
    }

    pub fn nodes_for_deployment(&self, name: &str, namespace: &str) -> Result<NodeSet, QueryError> {
        let pods = self.pods_for_deployment(name, namespace)?;
        Ok(Self::nodes_for_pods(&pods))
    }
}
