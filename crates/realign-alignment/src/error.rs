// Copyright © Aptos Foundation
// SPDX-License-Identifier: Apache-2.0

use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
    #[error("Translation map has not been initialised")]
    TranslationMapNotInitialised,
    #[error("Alignment service failed: {0}")]
    Service(String),
    #[error("Project has no root module (path ':')")]
    MissingRootModule,
    #[error("Module '{0}' is declared more than once")]
    DuplicateModule(String),
    #[error("Module '{name}' does not match the last segment of its path '{path}'")]
    ModuleNameMismatch { path: String, name: String },
    #[error("Unable to locate a suitable original version")]
    NoProjectVersion,
    #[error("Empty groupId but unable to determine a suitable replacement from any child modules.")]
    NoGroupCandidate,
    #[error("Error accessing {0}: {1}")]
    IO(String, #[source] std::io::Error),
    #[error("Error (de)serializing {0}: {1}")]
    Json(String, #[source] serde_json::Error),
    #[error(transparent)]
    Config(#[from] realign_config::Error),
    #[error(transparent)]
    Model(#[from] realign_model::Error),
    #[error(transparent)]
    Rewriter(#[from] realign_rewriter::Error),
    #[error(transparent)]
    Types(#[from] realign_types::Error),
}

pub type Result<T> = std::result::Result<T, Error>;
