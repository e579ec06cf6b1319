use std::rc::Rc;

use kubernetriks_inspector::commands::{finish_run_job, run_job_verdict, RunJobVerdict};
use kubernetriks_inspector::core::dispatcher::{DispatcherConfig, JobDispatcher};
use kubernetriks_inspector::core::node_set::NodeSet;
use kubernetriks_inspector::core::persistent_storage::PersistentStorage;
use kubernetriks_inspector::core::report::DispatchReport;
use kubernetriks_inspector::test_util::helpers::{
    default_test_storage, RecordingWriter, DEFAULT_TEST_CLUSTER_STATE,
};

fn dispatch_with_unreachable(unreachable: &[&str]) -> DispatchReport {
    let writer = RecordingWriter::with_unreachable_nodes(unreachable);
    let dispatcher = JobDispatcher::new(Rc::new(writer), DispatcherConfig::default());
    let nodes: NodeSet = ["node1", "node2"].into_iter().collect();
    dispatcher.dispatch("diag", &nodes, "default", "busybox", None, &[])
}

#[test]
fn test_exit_fails_only_when_every_node_failed() {
    let complete = dispatch_with_unreachable(&[]);
    let partial = dispatch_with_unreachable(&["node2"]);
    let failed = dispatch_with_unreachable(&["node1", "node2"]);

    assert!(run_job_verdict(&complete, false).success);
    assert!(run_job_verdict(&partial, false).success);
    assert!(!run_job_verdict(&failed, false).success);
    assert!(!run_job_verdict(&failed, true).success);
    assert!(run_job_verdict(&DispatchReport::default(), false).success);
}

#[test]
fn test_state_is_saved_only_when_jobs_were_created() {
    assert_eq!(
        RunJobVerdict {
            save_cluster_state: true,
            success: true,
        },
        run_job_verdict(&dispatch_with_unreachable(&["node2"]), false)
    );
    assert_eq!(
        RunJobVerdict {
            save_cluster_state: false,
            success: false,
        },
        run_job_verdict(&dispatch_with_unreachable(&["node1", "node2"]), false)
    );
    assert!(!run_job_verdict(&dispatch_with_unreachable(&[]), true).save_cluster_state);
}

fn dispatch_to_storage(storage: &PersistentStorage) -> DispatchReport {
    let dispatcher = JobDispatcher::new(Rc::new(storage.clone()), DispatcherConfig::default());
    let nodes: NodeSet = ["node1", "node2"].into_iter().collect();
    dispatcher.dispatch("diag", &nodes, "default", "busybox", None, &[])
}

#[test]
fn test_dry_run_leaves_state_file_untouched() {
    let state_file = tempfile::NamedTempFile::new().unwrap();
    std::fs::write(state_file.path(), DEFAULT_TEST_CLUSTER_STATE).unwrap();

    let storage = PersistentStorage::load(state_file.path()).unwrap();
    let report = dispatch_to_storage(&storage);
    assert_eq!(2, report.created().len());

    let verdict = finish_run_job(&storage, state_file.path(), &report, true).unwrap();
    assert!(verdict.success);
    assert_eq!(
        DEFAULT_TEST_CLUSTER_STATE,
        std::fs::read_to_string(state_file.path()).unwrap()
    );
}

#[test]
fn test_created_jobs_are_saved() {
    let state_file = tempfile::NamedTempFile::new().unwrap();
    let storage = default_test_storage();
    let report = dispatch_to_storage(&storage);

    let verdict = finish_run_job(&storage, state_file.path(), &report, false).unwrap();
    assert!(verdict.save_cluster_state);

    let loaded = PersistentStorage::load(state_file.path()).unwrap();
    assert_eq!(2, loaded.job_count());
    assert!(loaded.get_job("diag-node2-1", "default").is_some());
}
