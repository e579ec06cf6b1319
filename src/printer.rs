use std::io::Write;

use prettytable::{row, Table};
use serde::{Deserialize, Serialize};

use crate::core::node_set::NodeSet;
use crate::core::pod::Pod;
use crate::core::report::{DispatchOutcome, DispatchReport};

#[derive(Debug, Default, Clone, Copy, Deserialize, PartialEq, clap::ValueEnum)]
pub enum OutputFormat {
    #[default]
    PrettyTable,
    JSON,
}

#[derive(Serialize)]
struct PodJSON<'a> {
    name: &'a str,
    node: Option<&'a str>,
}

#[derive(Serialize)]
struct DeploymentPodsJSON<'a> {
    deployment: &'a str,
    namespace: &'a str,
    pods: Vec<PodJSON<'a>>,
    nodes: &'a NodeSet,
}

pub fn print_deployment_pods(
    out: &mut dyn Write,
    deployment: &str,
    namespace: &str,
    pods: &[Pod],
    nodes: &NodeSet,
    format: OutputFormat,
) -> std::io::Result<()> {
    match format {
        OutputFormat::PrettyTable => {
            print_deployment_pods_as_pretty_table(out, deployment, namespace, pods, nodes)
        }
        OutputFormat::JSON => {
            let pods_json = DeploymentPodsJSON {
                deployment,
                namespace,
                pods: pods
                    .iter()
                    .map(|pod| PodJSON {
                        name: pod.name(),
                        node: pod.assigned_node(),
                    })
                    .collect(),
                nodes,
            };
            write_json(out, &pods_json)
        }
    }
}

fn print_deployment_pods_as_pretty_table(
    out: &mut dyn Write,
    deployment: &str,
    namespace: &str,
    pods: &[Pod],
    nodes: &NodeSet,
) -> std::io::Result<()> {
    writeln!(
        out,
        "Pods from deployment '{}' in namespace '{}':",
        deployment, namespace
    )?;
    let mut pods_table = Table::new();
    pods_table.add_row(row!["Pod Name", "Node"]);
    for pod in pods {
        pods_table.add_row(row![pod.name(), pod.assigned_node().unwrap_or("Pending")]);
    }
    pods_table.print(out)?;

    writeln!(
        out,
        "Unique nodes running pods from deployment '{}':",
        deployment
    )?;
    for node in nodes.iter() {
        writeln!(out, "  - {}", node)?;
    }
    Ok(())
}

pub fn print_dispatch_report(
    out: &mut dyn Write,
    report: &DispatchReport,
    format: OutputFormat,
) -> std::io::Result<()> {
    match format {
        OutputFormat::PrettyTable => print_dispatch_report_as_pretty_table(out, report),
        OutputFormat::JSON => write_json(out, report),
    }
}

fn print_dispatch_report_as_pretty_table(
    out: &mut dyn Write,
    report: &DispatchReport,
) -> std::io::Result<()> {
    if !report.created().is_empty() {
        let mut created_table = Table::new();
        created_table.add_row(row!["Created job"]);
        for job in report.created() {
            created_table.add_row(row![job]);
        }
        created_table.print(out)?;
    }

    if !report.failures().is_empty() {
        let mut failures_table = Table::new();
        failures_table.add_row(row!["Node", "Failure"]);
        for failure in report.failures() {
            failures_table.add_row(row![failure.node, failure.cause]);
        }
        failures_table.print(out)?;
    }

    match report.outcome() {
        DispatchOutcome::NothingRequested => writeln!(out, "No nodes to run jobs on"),
        DispatchOutcome::Complete => writeln!(
            out,
            "Successfully created {} jobs",
            report.created().len()
        ),
        DispatchOutcome::Partial => writeln!(
            out,
            "Created {} of {} jobs, {} nodes failed",
            report.created().len(),
            report.requested(),
            report.failures().len()
        ),
        DispatchOutcome::Failed => writeln!(out, "No jobs were created"),
    }
}

fn write_json<T: Serialize>(out: &mut dyn Write, value: &T) -> std::io::Result<()> {
    let serialized_json = serde_json::to_string_pretty(value)?;
    writeln!(out, "{}", serialized_json)
}
