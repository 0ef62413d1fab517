// Copyright © Aptos Foundation
// SPDX-License-Identifier: Apache-2.0

use crate::common::types::{CliError, CliResult, CliTypedResult};
use serde::Serialize;
use std::{env, path::PathBuf, time::Instant};
use tracing::{debug, warn};
use tracing_subscriber::EnvFilter;

/// Environment variable holding the log filter, e.g. `REALIGN_LOG=realign_alignment=debug`
pub const LOG_ENV: &str = "REALIGN_LOG";

/// Logs to stderr, keeping stdout for the JSON output
pub fn start_logger() -> anyhow::Result<()> {
    let filter = EnvFilter::try_from_env(LOG_ENV).or_else(|_| EnvFilter::try_new("warn"))?;
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .try_init()
        .map_err(anyhow::Error::msg)
}

/// A result wrapper for displaying either a correct execution result or an error.
///
/// The purpose of this is to have a pretty easy to recognize JSON output format e.g.
///
/// {
///   "Result":{
///     "project":"org.acme:root:1.0.1-redhat-00001"
///   }
/// }
///
/// {
///   "Error":"Failed to run command"
/// }
///
#[derive(Debug, Serialize)]
enum ResultWrapper<T> {
    Result(T),
    Error(String),
}

impl<T> From<CliTypedResult<T>> for ResultWrapper<T> {
    fn from(result: CliTypedResult<T>) -> Self {
        match result {
            Ok(inner) => ResultWrapper::Result(inner),
            Err(inner) => ResultWrapper::Error(inner.to_string()),
        }
    }
}

/// For pretty printing outputs in JSON
pub async fn to_common_result<T: Serialize>(
    command: &str,
    start_time: Instant,
    result: CliTypedResult<T>,
) -> CliResult {
    let latency = start_time.elapsed();
    match &result {
        Ok(_) => debug!(command, latency_ms = latency.as_millis() as u64, "Command succeeded"),
        Err(err) => warn!(
            command,
            error = err.to_str(),
            latency_ms = latency.as_millis() as u64,
            "Command failed"
        ),
    }

    let is_err = result.is_err();
    let result = ResultWrapper::<T>::from(result);
    let string = serde_json::to_string_pretty(&result)
        .map_err(|err| format!("Unable to serialize output of {}: {}", command, err))?;
    if is_err {
        Err(string)
    } else {
        Ok(string)
    }
}

pub fn current_dir() -> CliTypedResult<PathBuf> {
    env::current_dir().map_err(|err| {
        CliError::UnexpectedError(format!("Failed to get current directory {}", err))
    })
}

pub fn dir_default_to_current(maybe_dir: Option<PathBuf>) -> CliTypedResult<PathBuf> {
    if let Some(dir) = maybe_dir {
        Ok(dir)
    } else {
        current_dir()
    }
}
