//! Decisions the `run-job` command takes once the dispatch report is printed.

use std::path::Path;
use std::process::ExitCode;

use log::{info, warn};

use crate::core::persistent_storage::{PersistentStorage, StorageError};
use crate::core::report::{DispatchOutcome, DispatchReport};

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RunJobVerdict {
    // Created jobs have to be written back to the cluster state file.
    pub save_cluster_state: bool,
    // False only when every requested node failed.
    pub success: bool,
}

impl RunJobVerdict {
    pub fn exit_code(&self) -> ExitCode {
        if self.success {
            ExitCode::SUCCESS
        } else {
            ExitCode::FAILURE
        }
    }
}

pub fn run_job_verdict(report: &DispatchReport, dry_run: bool) -> RunJobVerdict {
    RunJobVerdict {
        save_cluster_state: !dry_run && !report.created().is_empty(),
        success: report.outcome() != DispatchOutcome::Failed,
    }
}

/// Saves the cluster state if the verdict asks for it and returns the verdict.
pub fn finish_run_job(
    storage: &PersistentStorage,
    cluster_state: &Path,
    report: &DispatchReport,
    dry_run: bool,
) -> Result<RunJobVerdict, StorageError> {
    let verdict = run_job_verdict(report, dry_run);
    if dry_run {
        info!("Dry run, cluster state file is left untouched");
    } else if verdict.save_cluster_state {
        storage.save(cluster_state)?;
    }
    if !verdict.success {
        warn!("Jobs were not created on any of {} nodes", report.requested());
    }
    Ok(verdict)
}
