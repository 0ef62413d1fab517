// Copyright © Aptos Foundation
// SPDX-License-Identifier: Apache-2.0

use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
    #[error("ManipulationModel '{0}' does not exist")]
    ModuleNotFound(String),
    #[error("Supplied child name cannot be empty")]
    EmptyModuleName,
    #[error("Module path '{0}' must start with ':'")]
    InvalidModulePath(String),
    #[error("Module '{parent}' already has a child named '{child}'")]
    DuplicateChild { parent: String, child: String },
    #[error("Error accessing {0}: {1}")]
    IO(String, #[source] std::io::Error),
    #[error("Error (de)serializing {0}: {1}")]
    Json(String, #[source] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, Error>;
