// Copyright © Aptos Foundation
// SPDX-License-Identifier: Apache-2.0

use crate::common::types::{CliCommand, CliTypedResult, RootOptions};
use async_trait::async_trait;
use clap::Parser;
use realign_model::{read_manipulation_model, ManipulationModel};

/// Show the recorded alignment of a build
#[derive(Debug, Parser)]
pub struct ShowModel {
    #[clap(flatten)]
    pub root_options: RootOptions,

    /// Module to show, by name or by path such as `:services:api`
    ///
    /// Defaults to the whole build
    #[clap(long)]
    pub module: Option<String>,
}

#[async_trait]
impl CliCommand<ManipulationModel> for ShowModel {
    fn command_name(&self) -> &'static str {
        "Show"
    }

    async fn execute(self) -> CliTypedResult<ManipulationModel> {
        let model = read_manipulation_model(&self.root_options.root_dir()?)?;
        match &self.module {
            Some(module) => Ok(model.find_corresponding_child(module)?.clone()),
            None => Ok(model),
        }
    }
}
