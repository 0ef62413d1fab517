// Copyright © Aptos Foundation
// SPDX-License-Identifier: Apache-2.0

use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
    #[error("Error accessing {0}: {1}")]
    IO(String, #[source] std::io::Error),
    #[error("Error (de)serializing {0}: {1}")]
    Yaml(String, #[source] serde_yaml::Error),
    #[error("Unknown configuration property '{0}'")]
    UnknownProperty(String),
    #[error("Invalid value '{value}' for configuration property '{key}'")]
    InvalidValue { key: String, value: String },
    #[error("Config is missing expected value: {0}")]
    Missing(&'static str),
    #[error(transparent)]
    Types(#[from] realign_types::Error),
    #[error(transparent)]
    Rewriter(#[from] realign_rewriter::Error),
}

pub type Result<T> = std::result::Result<T, Error>;
