// Copyright © Aptos Foundation
// SPDX-License-Identifier: Apache-2.0

use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
    #[error("Invalid coordinate '{0}': {1}")]
    InvalidCoordinate(String, &'static str),
    #[error("Property '{0}' is not a properly formatted override key: {1}")]
    InvalidOverrideKey(String, &'static str),
    #[error("Unknown version selector syntax for '{0}'")]
    UnknownVersionSelector(String),
}

pub type Result<T> = std::result::Result<T, Error>;
