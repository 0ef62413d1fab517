// Copyright © Aptos Foundation
// SPDX-License-Identifier: Apache-2.0

#![forbid(unsafe_code)]

pub mod align;
pub mod common;
pub mod manipulate;
pub mod show;

use crate::common::types::{CliCommand, CliResult};
use clap::Parser;

/// Command line tool for aligning the dependencies of a build
#[derive(Debug, Parser)]
#[clap(name = "realign", author, version, propagate_version = true)]
pub enum Tool {
    Align(align::AlignTool),
    Manipulate(manipulate::ManipulateTool),
    Show(show::ShowModel),
}

impl Tool {
    pub async fn execute(self) -> CliResult {
        match self {
            Tool::Align(tool) => tool.execute_serialized().await,
            Tool::Manipulate(tool) => tool.execute_serialized().await,
            Tool::Show(tool) => tool.execute_serialized().await,
        }
    }
}
