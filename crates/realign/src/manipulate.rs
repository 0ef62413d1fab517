// Copyright © Aptos Foundation
// SPDX-License-Identifier: Apache-2.0

use crate::common::types::{CliCommand, CliTypedResult, ConfigOptions, RootOptions};
use async_trait::async_trait;
use clap::Parser;
use realign_manipulation::{ManipulationSummary, Manipulator};

/// Apply a recorded alignment to the files of a build
///
/// Rewrites the lock files of every module with its aligned dependency versions, and
/// removes the plugins listed in `pluginRemoval` from the build scripts.
#[derive(Debug, Parser)]
pub struct ManipulateTool {
    #[clap(flatten)]
    pub root_options: RootOptions,

    #[clap(flatten)]
    pub config_options: ConfigOptions,
}

#[async_trait]
impl CliCommand<ManipulationSummary> for ManipulateTool {
    fn command_name(&self) -> &'static str {
        "Manipulate"
    }

    async fn execute(self) -> CliTypedResult<ManipulationSummary> {
        let manipulator =
            Manipulator::new(self.root_options.root_dir()?, self.config_options.load()?)?;
        Ok(manipulator.run()?)
    }
}
