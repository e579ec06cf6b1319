mod helpers;

use std::rc::Rc;

use kubernetriks_inspector::core::cluster_query::ClusterQueryService;
use kubernetriks_inspector::core::deployment::LabelSelector;
use kubernetriks_inspector::core::dispatcher::{DispatcherConfig, JobDispatcher};
use kubernetriks_inspector::core::interface::{ClusterError, ClusterReader, ClusterWriter};
use kubernetriks_inspector::core::job::JobSpec;
use kubernetriks_inspector::core::node_set::NodeSet;
use kubernetriks_inspector::core::persistent_storage::PersistentStorage;
use kubernetriks_inspector::core::report::DispatchOutcome;
use kubernetriks_inspector::core::toleration_parser::parse;
use kubernetriks_inspector::test_util::helpers::default_test_storage;

use helpers::check_report_accounts_for_every_node;

fn make_job(name: &str, namespace: &str) -> JobSpec {
    JobSpec::for_node(name, namespace, "node1", "busybox", vec![], vec![], 300)
}

#[test]
fn test_load_cluster_state() {
    let storage = default_test_storage();
    assert_eq!(2, storage.deployment_count());
    assert_eq!(6, storage.pod_count());
    assert_eq!(0, storage.job_count());

    let deployment = storage.get_deployment("web", "default").unwrap();
    assert_eq!(4, deployment.spec.replicas);
    assert_eq!("app=web", deployment.selector().to_string());
}

#[test]
fn test_list_pods_in_namespace() {
    let storage = default_test_storage();
    let staging_pods = storage
        .list_pods("staging", &LabelSelector::new([("app", "web")]))
        .unwrap();
    assert_eq!(1, staging_pods.len());
    assert_eq!("web-other-namespace", staging_pods[0].name());

    let db_pods = storage
        .list_pods("default", &LabelSelector::new([("app", "db")]))
        .unwrap();
    assert_eq!(1, db_pods.len());
    assert_eq!("db-1", db_pods[0].name());

    // Selector without labels selects nothing.
    assert!(storage
        .list_pods("default", &LabelSelector::default())
        .unwrap()
        .is_empty());
}

#[test]
fn test_create_job_rejects_duplicates() {
    let storage = PersistentStorage::new();
    storage.create_job("ops", &make_job("diag-node1-0", "ops")).unwrap();
    assert_eq!(
        ClusterError::AlreadyExists {
            kind: "job",
            name: "diag-node1-0".to_string(),
            namespace: "ops".to_string(),
        },
        storage
            .create_job("ops", &make_job("diag-node1-0", "ops"))
            .unwrap_err()
    );
    // Same name in another namespace is a different job.
    storage
        .create_job("default", &make_job("diag-node1-0", "default"))
        .unwrap();
    assert_eq!(2, storage.job_count());
}

#[test]
fn test_create_job_rejects_invalid_names() {
    let storage = PersistentStorage::new();
    for name in ["Diag-node1-0", "diag_node1-0", "diag-node1.example.com-0", ""] {
        assert!(matches!(
            storage.create_job("default", &make_job(name, "default")),
            Err(ClusterError::Invalid(_))
        ));
    }
    assert_eq!(0, storage.job_count());
}

#[test]
fn test_create_job_uses_requested_namespace() {
    let storage = PersistentStorage::new();
    storage
        .create_job("ops", &make_job("diag-node1-0", "default"))
        .unwrap();
    assert!(storage.get_job("diag-node1-0", "default").is_none());
    assert_eq!(
        "ops",
        storage
            .get_job("diag-node1-0", "ops")
            .unwrap()
            .metadata
            .namespace
    );
}

#[test]
fn test_deployment_to_jobs_end_to_end() {
    let storage = default_test_storage();
    let query = ClusterQueryService::new(Rc::new(storage.clone()));
    let dispatcher = JobDispatcher::new(Rc::new(storage.clone()), DispatcherConfig::default());

    let nodes = query.nodes_for_deployment("web", "default").unwrap();
    let tolerations = parse("role=myrole:NoSchedule").unwrap();
    let report = dispatcher.dispatch("diag", &nodes, "ops", "busybox", None, &tolerations);

    assert_eq!(DispatchOutcome::Complete, report.outcome());
    assert_eq!(
        vec!["diag-node1-example-com-0", "diag-node2-example-com-1"],
        report.created()
    );
    let job = storage.get_job("diag-node2-example-com-1", "ops").unwrap();
    assert_eq!(Some("node2.example.com"), job.target_node());
    assert_eq!(tolerations, job.template.tolerations);

    // Dispatching again over the same nodes collides with the jobs created above.
    let repeated = dispatcher.dispatch("diag", &nodes, "ops", "busybox", None, &tolerations);
    assert_eq!(DispatchOutcome::Failed, repeated.outcome());
    for failure in repeated.failures() {
        assert!(failure.cause.to_string().contains("already exists"));
    }
    check_report_accounts_for_every_node(&repeated);
    assert_eq!(2, storage.job_count());
}

#[test]
fn test_invalid_job_name_fails_only_its_node() {
    let storage = PersistentStorage::new();
    let dispatcher = JobDispatcher::new(Rc::new(storage.clone()), DispatcherConfig::default());
    let nodes: NodeSet = ["node1", "Node_2", "node3"].into_iter().collect();

    let report = dispatcher.dispatch("diag", &nodes, "default", "busybox", None, &[]);

    // Sorted order puts "Node_2" first.
    assert_eq!(DispatchOutcome::Partial, report.outcome());
    assert_eq!(vec!["diag-node1-1", "diag-node3-2"], report.created());
    assert_eq!("Node_2", report.failures()[0].node);
    check_report_accounts_for_every_node(&report);
}

#[test]
fn test_save_and_load_cluster_state() {
    let state_file = tempfile::NamedTempFile::new().unwrap();
    let storage = default_test_storage();
    storage
        .create_job("default", &make_job("diag-node1-0", "default"))
        .unwrap();
    storage.save(state_file.path()).unwrap();

    let loaded = PersistentStorage::load(state_file.path()).unwrap();
    assert_eq!(storage.to_state(), loaded.to_state());
    assert_eq!(
        storage.get_job("diag-node1-0", "default"),
        loaded.get_job("diag-node1-0", "default")
    );
}

#[test]
fn test_load_malformed_state() {
    assert!(PersistentStorage::from_yaml_str("pods: 42").is_err());
}
