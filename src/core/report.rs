//! Result of dispatching jobs to a set of nodes.

use std::fmt;

use serde::Serialize;

use crate::core::interface::ClusterError;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub enum FailureCause {
    // The cluster refused to create the job.
    Rejected(String),
    // Dispatch was stopped before the node was reached.
    Cancelled,
}

impl From<ClusterError> for FailureCause {
    fn from(err: ClusterError) -> Self {
        FailureCause::Rejected(err.to_string())
    }
}

impl fmt::Display for FailureCause {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FailureCause::Rejected(reason) => write!(f, "{}", reason),
            FailureCause::Cancelled => write!(f, "dispatch cancelled before reaching the node"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NodeFailure {
    pub node: String,
    pub cause: FailureCause,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum DispatchOutcome {
    // No nodes were given, nothing to do.
    NothingRequested,
    Complete,
    Partial,
    // Every requested node failed.
    Failed,
}

#[derive(Default, Debug, Clone, PartialEq, Serialize)]
pub struct DispatchReport {
    requested: usize,
    created: Vec<String>,
    failures: Vec<NodeFailure>,
}

impl DispatchReport {
    pub(crate) fn new(requested: usize) -> Self {
        Self {
            requested,
            created: Vec::with_capacity(requested),
            failures: Default::default(),
        }
    }

    pub(crate) fn record_created(&mut self, instance_name: String) {
        self.created.push(instance_name);
    }

    pub(crate) fn record_failure(&mut self, node: &str, cause: FailureCause) {
        self.failures.push(NodeFailure {
            node: node.to_string(),
            cause,
        });
    }

    pub fn requested(&self) -> usize {
        self.requested
    }

    /// Names of created jobs in submission order.
    pub fn created(&self) -> &[String] {
        &self.created
    }

    pub fn failures(&self) -> &[NodeFailure] {
        &self.failures
    }

    pub fn is_empty(&self) -> bool {
        self.requested == 0
    }

    pub fn outcome(&self) -> DispatchOutcome {
        if self.requested == 0 {
            DispatchOutcome::NothingRequested
        } else if self.failures.is_empty() {
            DispatchOutcome::Complete
        } else if self.created.is_empty() {
            DispatchOutcome::Failed
        } else {
            DispatchOutcome::Partial
        }
    }
}
