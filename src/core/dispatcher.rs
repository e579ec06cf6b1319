//! Fan-out of one-shot jobs to nodes.
//!
//! Every node gets its own job pinned by hostname selector. Submissions are independent: a node
//! which fails to get its job is recorded in the report and the remaining nodes are still
//! processed. Nodes are processed sequentially in sorted order, which also defines ordinal
//! suffixes of job names.

use std::rc::Rc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use log::{info, warn};
use serde::Deserialize;

use crate::core::interface::ClusterWriter;
use crate::core::job::{instance_name, JobSpec};
use crate::core::node_set::NodeSet;
use crate::core::report::{DispatchReport, FailureCause};
use crate::core::toleration::Toleration;

/// Seconds a finished job is kept before the cluster removes it.
pub const DEFAULT_TTL_SECONDS_AFTER_FINISHED: u32 = 300;

pub fn default_command() -> Vec<String> {
    vec!["echo".to_string(), "Job running on node".to_string()]
}

fn default_ttl_seconds_after_finished() -> u32 {
    DEFAULT_TTL_SECONDS_AFTER_FINISHED
}

#[derive(Debug, Clone, Deserialize, PartialEq)]
pub struct DispatcherConfig {
    /// Used for jobs which are dispatched without a command.
    #[serde(default = "default_command")]
    pub default_command: Vec<String>,
    #[serde(default = "default_ttl_seconds_after_finished")]
    pub ttl_seconds_after_finished: u32,
}

impl Default for DispatcherConfig {
    fn default() -> Self {
        Self {
            default_command: default_command(),
            ttl_seconds_after_finished: DEFAULT_TTL_SECONDS_AFTER_FINISHED,
        }
    }
}

pub trait DispatchCallbacks {
    /// Runs before submitting a job to the node at `index`, returns false if the dispatch must
    /// be stopped.
    fn on_step(&mut self, _node: &str, _index: usize) -> bool {
        true
    }

    fn on_job_created(&mut self, _instance_name: &str, _node: &str) {}

    fn on_job_failed(&mut self, _node: &str, _cause: &FailureCause) {}
}

pub struct NoopCallbacks;

impl DispatchCallbacks for NoopCallbacks {}

/// Flag which can be raised from another thread, e.g. a signal handler, to stop a dispatch
/// between two submissions.
#[derive(Default, Clone)]
pub struct StopFlag {
    stopped: Arc<AtomicBool>,
}

impl StopFlag {
    pub fn new() -> Self {
        Default::default()
    }

    pub fn stop(&self) {
        self.stopped.store(true, Ordering::SeqCst);
    }

    pub fn is_stopped(&self) -> bool {
        self.stopped.load(Ordering::SeqCst)
    }
}

impl DispatchCallbacks for StopFlag {
    fn on_step(&mut self, _node: &str, _index: usize) -> bool {
        !self.is_stopped()
    }
}

pub struct JobDispatcher {
    writer: Rc<dyn ClusterWriter>,
    config: DispatcherConfig,
}

impl JobDispatcher {
    pub fn new(writer: Rc<dyn ClusterWriter>, config: DispatcherConfig) -> Self {
        Self { writer, config }
    }

    pub fn dispatch(
        &self,
        base_name: &str,
        nodes: &NodeSet,
        namespace: &str,
        image: &str,
        command: Option<Vec<String>>,
        tolerations: &[Toleration],
    ) -> DispatchReport {
        self.dispatch_with_callbacks(
            base_name,
            nodes,
            namespace,
            image,
            command,
            tolerations,
            &mut NoopCallbacks,
        )
    }

    #[allow(clippy::too_many_arguments)]
    pub fn dispatch_with_callbacks(
        &self,
        base_name: &str,
        nodes: &NodeSet,
        namespace: &str,
        image: &str,
        command: Option<Vec<String>>,
        tolerations: &[Toleration],
        callbacks: &mut dyn DispatchCallbacks,
    ) -> DispatchReport {
        let command = match command {
            Some(command) if !command.is_empty() => command,
            _ => self.config.default_command.clone(),
        };

        let mut report = DispatchReport::new(nodes.len());
        let mut stopped = false;

        for (index, node) in nodes.iter().enumerate() {
            if !stopped && !callbacks.on_step(node, index) {
                warn!(
                    "Dispatch of {:?} stopped, {} nodes left without a job",
                    base_name,
                    nodes.len() - index
                );
                stopped = true;
            }
            if stopped {
                report.record_failure(node, FailureCause::Cancelled);
                continue;
            }

            let job = JobSpec::for_node(
                &instance_name(base_name, node, index),
                namespace,
                node,
                image,
                command.clone(),
                tolerations.to_vec(),
                self.config.ttl_seconds_after_finished,
            );

            match self.writer.create_job(namespace, &job) {
                Ok(()) => {
                    info!(
                        "Created job {:?} on node {:?} in namespace {:?}",
                        job.instance_name(),
                        node,
                        namespace
                    );
                    callbacks.on_job_created(job.instance_name(), node);
                    report.record_created(job.metadata.name);
                }
                Err(err) => {
                    warn!("Failed to create job on node {:?}: {}", node, err);
                    let cause = FailureCause::from(err);
                    callbacks.on_job_failed(node, &cause);
                    report.record_failure(node, cause);
                }
            }
        }

        report
    }
}
