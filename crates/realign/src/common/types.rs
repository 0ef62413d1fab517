// Copyright © Aptos Foundation
// SPDX-License-Identifier: Apache-2.0

use crate::common::utils::{dir_default_to_current, to_common_result};
use async_trait::async_trait;
use clap::Parser;
use realign_config::{AlignmentConfig, PersistableConfig};
use serde::Serialize;
use std::{path::PathBuf, time::Instant};
use thiserror::Error;

/// A common result to be returned to users
pub type CliResult = Result<String, String>;

/// A common result to remove need for typing `Result<T, CliError>`
pub type CliTypedResult<T> = Result<T, CliError>;

/// CLI Errors for reporting through telemetry and outputs
#[derive(Debug, Error)]
pub enum CliError {
    #[error("Unable to load config: {0}")]
    ConfigLoadError(#[from] realign_config::Error),
    #[error("Alignment failed: {0}")]
    AlignmentError(#[from] realign_alignment::Error),
    #[error("Manipulation failed: {0}")]
    ManipulationError(#[from] realign_manipulation::Error),
    #[error("Unable to read manipulation model: {0}")]
    ModelError(#[from] realign_model::Error),
    #[error("Unexpected error: {0}")]
    UnexpectedError(String),
}

impl CliError {
    pub fn to_str(&self) -> &'static str {
        match self {
            CliError::ConfigLoadError(_) => "ConfigLoadError",
            CliError::AlignmentError(_) => "AlignmentError",
            CliError::ManipulationError(_) => "ManipulationError",
            CliError::ModelError(_) => "ModelError",
            CliError::UnexpectedError(_) => "UnexpectedError",
        }
    }
}

/// Options for selecting the build to work on
#[derive(Debug, Default, Parser)]
pub struct RootOptions {
    /// Root directory of the build
    ///
    /// Defaults to the current directory
    #[clap(long, value_parser)]
    pub root: Option<PathBuf>,
}

impl RootOptions {
    pub fn root_dir(&self) -> CliTypedResult<PathBuf> {
        dir_default_to_current(self.root.clone())
    }
}

/// Options for configuring the alignment
#[derive(Debug, Default, Parser)]
pub struct ConfigOptions {
    /// YAML configuration file
    #[clap(long, value_parser)]
    pub config: Option<PathBuf>,

    /// Configuration property given as `key=value`, applied on top of the configuration file
    ///
    /// e.g. `-D versionIncrementalSuffix=temporary-redhat` or
    /// `-D dependencyOverride.org.slf4j:slf4j-api@*=1.7.30`
    #[clap(short = 'D', value_parser = parse_property)]
    pub properties: Vec<(String, String)>,
}

impl ConfigOptions {
    pub fn load(&self) -> CliTypedResult<AlignmentConfig> {
        let mut config = match &self.config {
            Some(path) => AlignmentConfig::load_config(path)?,
            None => AlignmentConfig::default(),
        };
        config.apply_properties(
            self.properties
                .iter()
                .map(|(key, value)| (key.as_str(), value.as_str())),
        )?;
        Ok(config)
    }
}

fn parse_property(property: &str) -> Result<(String, String), String> {
    property
        .split_once('=')
        .map(|(key, value)| (key.trim().to_string(), value.to_string()))
        .filter(|(key, _)| !key.is_empty())
        .ok_or_else(|| format!("Property '{}' must be given as key=value", property))
}

/// A common trait for all CLI commands to have consistent outputs
#[async_trait]
pub trait CliCommand<T: Serialize + Send>: Sized + Send {
    /// Returns a name for logging purposes
    fn command_name(&self) -> &'static str;

    /// Executes the command, returning a command specific type
    async fn execute(self) -> CliTypedResult<T>;

    /// Executes the command, and serializes it to the common JSON output type
    async fn execute_serialized(self) -> CliResult {
        let command_name = self.command_name();
        let start_time = Instant::now();
        to_common_result(command_name, start_time, self.execute().await).await
    }
}
