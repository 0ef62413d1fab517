// Copyright © Aptos Foundation
// SPDX-License-Identifier: Apache-2.0

use crate::{
    configuration::OverrideDependenciesAction,
    error::{Error, Result},
    resolver::AlignedDependencyResolver,
};
use realign_config::AlignmentConfig;
use realign_model::{module_dir, read_manipulation_model_if_exists, ManipulationModel};
use realign_rewriter::LockFileRewriter;
use realign_types::{Ga, OverrideKey};
use serde::Serialize;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

/// The files a manipulation run changed.
#[derive(Clone, Debug, Default, Eq, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ManipulationSummary {
    pub project: String,
    pub lock_files: Vec<PathBuf>,
    pub build_scripts: Vec<PathBuf>,
}

/// Applies the alignment recorded under a build root to the files of that build.
#[derive(Debug)]
pub struct Manipulator {
    root_dir: PathBuf,
    config: AlignmentConfig,
    overrides: Vec<(OverrideKey, String)>,
}

impl Manipulator {
    pub fn new(root_dir: impl Into<PathBuf>, config: AlignmentConfig) -> Result<Self> {
        config.validate()?;
        let overrides = config.dependency_overrides()?;
        Ok(Self {
            root_dir: root_dir.into(),
            config,
            overrides,
        })
    }

    pub fn root_dir(&self) -> &Path {
        &self.root_dir
    }

    pub fn model(&self) -> Result<ManipulationModel> {
        read_manipulation_model_if_exists(&self.root_dir)?
            .ok_or_else(|| Error::MissingModel(self.root_dir.display().to_string()))
    }

    /// The resolver for the module at `path`, honouring the configured overrides.
    pub fn resolver<'a>(
        &self,
        model: &'a ManipulationModel,
        path: &str,
    ) -> Result<AlignedDependencyResolver<'a>> {
        let module = model.find_by_path(path)?;
        let identity = if module.group().is_empty() {
            Ga::new(model.group(), module.name())
        } else {
            module.ga()
        };
        Ok(AlignedDependencyResolver::for_identity(
            module,
            &identity,
            &self.overrides,
        ))
    }

    pub fn override_action<'a>(
        &self,
        model: &'a ManipulationModel,
        path: &str,
    ) -> Result<OverrideDependenciesAction<'a>> {
        self.resolver(model, path).map(OverrideDependenciesAction::new)
    }

    /// Rewrites the lock files of every module and removes the configured plugins from the
    /// build scripts of the tree.
    pub fn run(&self) -> Result<ManipulationSummary> {
        let model = self.model()?;
        let mut summary = ManipulationSummary {
            project: model.to_string(),
            ..ManipulationSummary::default()
        };

        for (path, module) in model.modules() {
            let rewriter = LockFileRewriter::new(module.aligned_dependencies())?;
            if rewriter.is_empty() {
                debug!(module = %path, "No aligned dependencies to lock");
                continue;
            }
            let updated = rewriter.update_module(&module_dir(&self.root_dir, &path))?;
            if !updated.is_empty() {
                info!(module = %path, files = updated.len(), "Updated lock files");
            }
            summary.lock_files.extend(updated);
        }

        let remover = self.config.plugin_remover()?;
        if !remover.is_empty() {
            summary.build_scripts = remover.remove_from_tree(&self.root_dir)?;
            info!(
                plugins = ?self.config.plugin_removal,
                scripts = summary.build_scripts.len(),
                "Removed plugins from build scripts"
            );
        }
        Ok(summary)
    }
}
