// Copyright © Aptos Foundation
// SPDX-License-Identifier: Apache-2.0

#![forbid(unsafe_code)]

mod alignment_config;
mod error;
mod persistable_config;

pub use alignment_config::{AlignmentConfig, DEPENDENCY_OVERRIDE_PREFIX, REPORT_JSON_OUTPUT_FILE};
pub use error::{Error, Result};
pub use persistable_config::PersistableConfig;
