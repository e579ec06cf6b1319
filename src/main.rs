use std::env;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use std::rc::Rc;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use file_rotate::compression::Compression;
use file_rotate::suffix::AppendCount;
use file_rotate::{ContentLimit, FileRotate};
use log::info;

use kubernetriks_inspector::commands::finish_run_job;
use kubernetriks_inspector::config::InspectorConfig;
use kubernetriks_inspector::core::cluster_query::{ClusterQueryService, QueryError};
use kubernetriks_inspector::core::dispatcher::JobDispatcher;
use kubernetriks_inspector::core::job::parse_command_list;
use kubernetriks_inspector::core::persistent_storage::PersistentStorage;
use kubernetriks_inspector::core::toleration_parser;
use kubernetriks_inspector::printer::{print_deployment_pods, print_dispatch_report, OutputFormat};

const LOG_FILE_MAX_BYTES: usize = 10 * 1024 * 1024;
const LOG_FILES_KEPT: usize = 5;

#[derive(Parser)]
#[clap(
    about = "Inspects deployments and runs jobs on the nodes where their pods are running"
)]
struct Args {
    /// YAML file with the cluster state: deployments, pods and jobs
    #[clap(long)]
    cluster_state: PathBuf,
    #[clap(long)]
    config_file: Option<PathBuf>,
    /// Namespace of the deployment
    #[clap(short, long, global = true)]
    namespace: Option<String>,
    #[clap(short, long, value_enum, global = true)]
    output: Option<OutputFormat>,
    #[clap(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// List pods and nodes of a deployment
    List { deployment: String },
    /// Run a job on every node where pods of a deployment are running
    RunJob(RunJobArgs),
}

#[derive(clap::Args)]
struct RunJobArgs {
    deployment: String,
    job_name: String,
    /// Namespace for jobs, defaults to the deployment namespace
    #[clap(short, long)]
    job_namespace: Option<String>,
    /// Container image for the job
    #[clap(short, long)]
    image: Option<String>,
    /// Command to run in the job (comma-separated)
    #[clap(short, long)]
    command: Option<String>,
    /// Tolerations for job pods: `key[=value]:Effect,...` or a JSON array
    #[clap(short, long, default_value = "")]
    tolerations: String,
    /// Do not save created jobs to the cluster state file
    #[clap(long)]
    dry_run: bool,
}

fn init_logging(logs_filepath: Option<&str>) {
    // log level INFO by default
    let mut env_logger_builder = env_logger::builder();
    if env::var("RUST_LOG").is_err() {
        env_logger_builder.filter_level(log::LevelFilter::Info);
    }
    if let Some(logs_filepath) = logs_filepath {
        let log_file = FileRotate::new(
            logs_filepath,
            AppendCount::new(LOG_FILES_KEPT),
            ContentLimit::BytesSurpassed(LOG_FILE_MAX_BYTES),
            Compression::None,
            #[cfg(unix)]
            None,
        );
        env_logger_builder.target(env_logger::Target::Pipe(Box::new(log_file)));
    }
    env_logger_builder.init();
}

fn load_config(config_file: Option<&Path>) -> Result<InspectorConfig> {
    match config_file {
        Some(path) => InspectorConfig::load(path)
            .with_context(|| format!("failed to load config from {:?}", path)),
        None => Ok(Default::default()),
    }
}

fn list(
    storage: PersistentStorage,
    deployment: &str,
    namespace: &str,
    format: OutputFormat,
) -> Result<ExitCode> {
    let query = ClusterQueryService::new(Rc::new(storage));
    let pods = match query.pods_for_deployment(deployment, namespace) {
        Ok(pods) => pods,
        Err(err @ QueryError::DeploymentNotFound { .. }) => {
            println!("Nothing to list: {}", err);
            return Ok(ExitCode::SUCCESS);
        }
        Err(err) => return Err(err.into()),
    };
    if pods.is_empty() {
        println!(
            "No pods found for deployment {} in namespace {}",
            deployment, namespace
        );
        return Ok(ExitCode::SUCCESS);
    }

    let nodes = ClusterQueryService::nodes_for_pods(&pods);
    let mut stdout = std::io::stdout().lock();
    print_deployment_pods(&mut stdout, deployment, namespace, &pods, &nodes, format)?;
    stdout.flush()?;
    Ok(ExitCode::SUCCESS)
}

fn run_job(
    storage: PersistentStorage,
    cluster_state: &Path,
    config: &InspectorConfig,
    namespace: &str,
    args: RunJobArgs,
    format: OutputFormat,
) -> Result<ExitCode> {
    let tolerations = toleration_parser::parse(&args.tolerations)?;
    let deployment = args.deployment.as_str();
    let job_namespace = args
        .job_namespace
        .as_deref()
        .unwrap_or_else(|| config.job_namespace_for(namespace));
    let image = args.image.as_deref().unwrap_or(&config.image);
    let command = args.command.as_deref().map(parse_command_list);

    let query = ClusterQueryService::new(Rc::new(storage.clone()));
    let nodes = match query.nodes_for_deployment(deployment, namespace) {
        Ok(nodes) => nodes,
        Err(err @ QueryError::DeploymentNotFound { .. }) => {
            println!("Nothing to run: {}", err);
            return Ok(ExitCode::SUCCESS);
        }
        Err(err) => return Err(err.into()),
    };
    if nodes.is_empty() {
        println!(
            "No nodes found with running pods of deployment {} in namespace {}",
            deployment, namespace
        );
        return Ok(ExitCode::SUCCESS);
    }

    info!(
        "Creating jobs on {} nodes in namespace {:?}",
        nodes.len(),
        job_namespace
    );
    let dispatcher = JobDispatcher::new(Rc::new(storage.clone()), config.dispatcher.clone());
    let report = dispatcher.dispatch(
        &args.job_name,
        &nodes,
        job_namespace,
        image,
        command,
        &tolerations,
    );

    let mut stdout = std::io::stdout().lock();
    print_dispatch_report(&mut stdout, &report, format)?;
    stdout.flush()?;

    let verdict = finish_run_job(&storage, cluster_state, &report, args.dry_run)
        .with_context(|| format!("failed to save cluster state to {:?}", cluster_state))?;
    Ok(verdict.exit_code())
}

fn run(args: Args) -> Result<ExitCode> {
    let config = load_config(args.config_file.as_deref())?;
    init_logging(config.logs_filepath.as_deref());

    info!(
        "Path to cluster state file: {:?}",
        args.cluster_state
            .canonicalize()
            .unwrap_or_else(|_| args.cluster_state.clone())
    );
    let storage = PersistentStorage::load(&args.cluster_state)
        .with_context(|| format!("failed to load cluster state from {:?}", args.cluster_state))?;

    let namespace = args.namespace.unwrap_or_else(|| config.namespace.clone());
    let format = args.output.unwrap_or(config.output_format);

    match args.command {
        Command::List { deployment } => list(storage, &deployment, &namespace, format),
        Command::RunJob(run_job_args) => run_job(
            storage,
            &args.cluster_state,
            &config,
            &namespace,
            run_job_args,
            format,
        ),
    }
}

fn main() -> ExitCode {
    let args = Args::parse();
    match run(args) {
        Ok(exit_code) => exit_code,
        Err(err) => {
            eprintln!("Error: {:#}", err);
            ExitCode::FAILURE
        }
    }
}
