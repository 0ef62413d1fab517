// Copyright © Aptos Foundation
// SPDX-License-Identifier: Apache-2.0

use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
    #[error("No manipulation model found under {0}; run an alignment first")]
    MissingModel(String),
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
