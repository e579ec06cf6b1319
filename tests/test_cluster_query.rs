use std::rc::Rc;

use kubernetriks_inspector::core::cluster_query::{ClusterQueryService, QueryError};
use kubernetriks_inspector::core::deployment::{Deployment, LabelSelector};
use kubernetriks_inspector::core::interface::ClusterError;
use kubernetriks_inspector::core::persistent_storage::PersistentStorage;
use kubernetriks_inspector::core::pod::Pod;

use kubernetriks_inspector::test_util::helpers::{default_test_storage, BrokenPodListReader};

fn pod_names(pods: &[Pod]) -> Vec<&str> {
    pods.iter().map(|pod| pod.name()).collect()
}

#[test]
fn test_pods_for_deployment_use_selector_and_namespace() {
    let query = ClusterQueryService::new(Rc::new(default_test_storage()));
    let pods = query.pods_for_deployment("web", "default").unwrap();
    assert_eq!(vec!["web-1", "web-2", "web-3", "web-4"], pod_names(&pods));
}

#[test]
fn test_deployment_without_pods_is_not_an_error() {
    let query = ClusterQueryService::new(Rc::new(default_test_storage()));
    assert!(query.pods_for_deployment("idle", "default").unwrap().is_empty());
    assert!(query.nodes_for_deployment("idle", "default").unwrap().is_empty());
}

#[test]
fn test_deployment_without_selector_owns_no_pods() {
    let storage = PersistentStorage::from_yaml_str(
        r#"
deployments:
- metadata:
    name: web
pods:
- metadata:
    name: db-1
    labels:
      app: db
  status:
    phase: Running
    assigned_node: db-node
"#,
    )
    .unwrap();
    let query = ClusterQueryService::new(Rc::new(storage));
    assert!(query.pods_for_deployment("web", "default").unwrap().is_empty());
    assert!(query.nodes_for_deployment("web", "default").unwrap().is_empty());
}

#[test]
fn test_deployment_not_found() {
    let query = ClusterQueryService::new(Rc::new(default_test_storage()));
    assert_eq!(
        QueryError::DeploymentNotFound {
            name: "missing".to_string(),
            namespace: "default".to_string(),
        },
        query.pods_for_deployment("missing", "default").unwrap_err()
    );
    // Deployment exists only in namespace "default".
    assert!(matches!(
        query.pods_for_deployment("web", "staging"),
        Err(QueryError::DeploymentNotFound { .. })
    ));
}

#[test]
fn test_list_failure() {
    let reader = BrokenPodListReader {
        deployment: Deployment::new("web", "default", 2, LabelSelector::new([("app", "web")])),
    };
    let query = ClusterQueryService::new(Rc::new(reader));
    assert_eq!(
        QueryError::ListFailed {
            name: "web".to_string(),
            cause: ClusterError::Unavailable("connection refused".to_string()),
        },
        query.pods_for_deployment("web", "default").unwrap_err()
    );
}

#[test]
fn test_nodes_for_deployment_skip_pending_pods_and_duplicates() {
    let query = ClusterQueryService::new(Rc::new(default_test_storage()));
    let nodes = query.nodes_for_deployment("web", "default").unwrap();
    assert_eq!(
        vec!["node1.example.com", "node2.example.com"],
        nodes.iter().collect::<Vec<&str>>()
    );
}

#[test]
fn test_nodes_for_pods() {
    let cases: Vec<(Vec<Pod>, Vec<&str>)> = vec![
        (vec![], vec![]),
        (
            vec![Pod::new("pod1", "default", ""), Pod::new("pod2", "default", "")],
            vec![],
        ),
        (
            vec![
                Pod::new("pod1", "default", "node1"),
                Pod::new("pod2", "default", "node2"),
                Pod::new("pod3", "default", "node3"),
            ],
            vec!["node1", "node2", "node3"],
        ),
        (
            vec![
                Pod::new("pod1", "default", "node1"),
                Pod::new("pod2", "default", "node1"),
                Pod::new("pod3", "default", "node2"),
            ],
            vec!["node1", "node2"],
        ),
        (
            vec![
                Pod::new("pod1", "default", "node2"),
                Pod::new("pod2", "default", ""),
                Pod::new("pod3", "default", "node1"),
            ],
            vec!["node1", "node2"],
        ),
    ];

    for (pods, expected) in cases {
        let nodes = ClusterQueryService::nodes_for_pods(&pods);
        assert_eq!(expected, nodes.iter().collect::<Vec<&str>>());
        assert!(!nodes.contains(""));
    }
}
