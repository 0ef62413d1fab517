// Copyright © Aptos Foundation
// SPDX-License-Identifier: Apache-2.0

use crate::common::types::{CliCommand, CliTypedResult, ConfigOptions, RootOptions};
use async_trait::async_trait;
use clap::Parser;
use realign_alignment::{AlignmentSession, ProjectDescriptor, StaticAlignmentService};
use serde::Serialize;
use std::path::PathBuf;
use tracing::info;

/// Align the dependencies of a build
///
/// Sends the coordinates of every module and dependency of the build to the alignment
/// oracle, records the answer in `manipulation.json` at the root of the build and writes
/// the configured alignment reports below `build/`.
#[derive(Debug, Parser)]
pub struct AlignTool {
    /// JSON file listing the modules of the build with their declared dependencies
    #[clap(long, value_parser)]
    pub project: PathBuf,

    /// JSON file of translations answering the alignment request
    ///
    /// An array of `{"groupId", "artifactId", "version", "alignedVersion"}` entries
    #[clap(long, value_parser)]
    pub translations: PathBuf,

    #[clap(flatten)]
    pub root_options: RootOptions,

    #[clap(flatten)]
    pub config_options: ConfigOptions,
}

#[derive(Clone, Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AlignmentSummary {
    pub project: String,
    pub model_file: PathBuf,
    pub aligned_dependencies: usize,
    pub report_files: Vec<PathBuf>,
}

#[async_trait]
impl CliCommand<AlignmentSummary> for AlignTool {
    fn command_name(&self) -> &'static str {
        "Align"
    }

    async fn execute(self) -> CliTypedResult<AlignmentSummary> {
        let root_dir = self.root_options.root_dir()?;
        let config = self.config_options.load()?;
        let project = ProjectDescriptor::load(&self.project)?;
        let service = StaticAlignmentService::from_file(&self.translations)?;
        info!(
            root = %root_dir.display(),
            modules = project.modules.len(),
            translations = service.len(),
            "Aligning build"
        );

        let mut session = AlignmentSession::new(root_dir, config)?;
        let outcome = session.align(&project, service).await?;
        Ok(AlignmentSummary {
            project: outcome.model.to_string(),
            model_file: outcome.model_file,
            aligned_dependencies: outcome.model.all_aligned_dependencies().len(),
            report_files: outcome.report_files,
        })
    }
}
