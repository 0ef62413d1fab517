// Copyright © Aptos Foundation
// SPDX-License-Identifier: Apache-2.0

use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
    #[error("No support for removing plugin {0}")]
    UnsupportedPlugin(String),
    #[error("Unable to locate configuration block {keyword} of plugin {plugin} to remove within {file}")]
    MalformedBuildScript {
        file: String,
        plugin: String,
        keyword: String,
    },
    #[error("Error accessing {0}: {1}")]
    IO(String, #[source] std::io::Error),
    #[error("Error walking {0}: {1}")]
    Walk(String, #[source] walkdir::Error),
    #[error(transparent)]
    Types(#[from] realign_types::Error),
}

pub type Result<T> = std::result::Result<T, Error>;
