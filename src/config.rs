//! Config fields definitions for kubernetriks inspector

use std::path::Path;

use serde::Deserialize;
use thiserror::Error;

use crate::core::common::DEFAULT_NAMESPACE;
use crate::core::dispatcher::DispatcherConfig;
use crate::printer::OutputFormat;

pub const DEFAULT_JOB_IMAGE: &str = "busybox";

fn default_namespace() -> String {
    DEFAULT_NAMESPACE.to_string()
}

fn default_image() -> String {
    DEFAULT_JOB_IMAGE.to_string()
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("could not read config file: {0}")]
    Io(#[from] std::io::Error),

    #[error("could not parse config file: {0}")]
    Yaml(#[from] serde_yaml::Error),
}

#[derive(Debug, Deserialize, PartialEq)]
pub struct InspectorConfig {
    /// Namespace of inspected deployments when not given on the command line.
    #[serde(default = "default_namespace")]
    pub namespace: String,
    /// Namespace for dispatched jobs. If not set jobs go to the deployment namespace.
    pub job_namespace: Option<String>,
    #[serde(default = "default_image")]
    pub image: String,
    /// If not set default output of logs is stderr
    pub logs_filepath: Option<String>,
    #[serde(default)]
    pub output_format: OutputFormat,
    #[serde(default)]
    pub dispatcher: DispatcherConfig,
}

impl Default for InspectorConfig {
    fn default() -> Self {
        Self {
            namespace: default_namespace(),
            job_namespace: None,
            image: default_image(),
            logs_filepath: None,
            output_format: Default::default(),
            dispatcher: Default::default(),
        }
    }
}

impl InspectorConfig {
    pub fn from_yaml_str(config_yaml: &str) -> Result<Self, ConfigError> {
        // An empty document deserializes to unit, not to an empty mapping.
        if config_yaml.trim().is_empty() {
            return Ok(Default::default());
        }
        Ok(serde_yaml::from_str::<InspectorConfig>(config_yaml)?)
    }

    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let config_yaml = std::fs::read_to_string(path)?;
        Self::from_yaml_str(&config_yaml)
    }

    /// Namespace for jobs dispatched next to pods of a deployment in `deployment_namespace`.
    pub fn job_namespace_for<'a>(&'a self, deployment_namespace: &'a str) -> &'a str {
        match &self.job_namespace {
            Some(namespace) if !namespace.is_empty() => namespace,
            _ => deployment_namespace,
        }
    }
}
