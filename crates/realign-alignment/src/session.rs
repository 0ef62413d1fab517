// Copyright © Aptos Foundation
// SPDX-License-Identifier: Apache-2.0

use crate::{
    customizer::{
        CustomizerPipeline, DependencyOverrideCustomizer, ResponseCustomizer,
        UpdateProjectVersionCustomizer,
    },
    error::{Error, Result},
    project::{DeclaredDependency, ModuleDescriptor, ProjectDescriptor},
    project_version::strip_snapshot,
    report::AlignmentReport,
    response::AlignmentResponse,
    service::{AlignmentRequest, AlignmentService, WithCustomizersAlignmentService},
};
use indexmap::IndexMap;
use realign_config::AlignmentConfig;
use realign_model::{
    module_dir, write_manipulation_model, ManipulationModel, ManipulationModelCache,
};
use realign_rewriter::read_lock_file_gavs;
use realign_types::{is_dynamic, Ga, Gav};
use std::{
    collections::{BTreeSet, HashSet},
    path::{Path, PathBuf},
};
use tracing::{debug, info, warn};

/// A dependency of one module as it is sent to the oracle.
#[derive(Clone, Debug)]
struct ModuleDependency {
    /// Key of the replacement in the model: the coordinate as declared, or as resolved for
    /// dependencies declared without a version.
    key: String,
    /// The concrete coordinate asked about.
    effective: Gav,
    dynamic: bool,
}

struct ScannedModule<'a> {
    descriptor: &'a ModuleDescriptor,
    dependencies: IndexMap<String, ModuleDependency>,
}

/// The result of one alignment.
#[derive(Clone, Debug)]
pub struct AlignmentOutcome {
    pub model: ManipulationModel,
    pub model_file: PathBuf,
    pub report: AlignmentReport,
    pub report_files: Vec<PathBuf>,
}

/// Aligns one build: scans its modules, asks the oracle once, and records the decisions in
/// the build's `manipulation.json`.
///
/// Modules are processed one after another; a session is not meant to be shared between
/// threads.
pub struct AlignmentSession {
    root_dir: PathBuf,
    config: AlignmentConfig,
    cache: ManipulationModelCache,
}

impl AlignmentSession {
    pub fn new(root_dir: impl Into<PathBuf>, config: AlignmentConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self {
            root_dir: root_dir.into(),
            config,
            cache: ManipulationModelCache::new(),
        })
    }

    pub fn root_dir(&self) -> &Path {
        &self.root_dir
    }

    pub fn config(&self) -> &AlignmentConfig {
        &self.config
    }

    pub fn cache(&self) -> &ManipulationModelCache {
        &self.cache
    }

    pub async fn align<S: AlignmentService>(
        &mut self,
        project: &ProjectDescriptor,
        service: S,
    ) -> Result<AlignmentOutcome> {
        project.validate()?;
        let root = project.root().ok_or(Error::MissingRootModule)?;
        let existing = self.cache.get_or_load(&self.root_dir)?.cloned();

        let mut scanned = Vec::with_capacity(project.modules.len());
        for module in &project.modules {
            let existing_module = existing
                .as_ref()
                .and_then(|model| model.find_by_path(&module.path).ok());
            scanned.push(ScannedModule {
                descriptor: module,
                dependencies: self.scan_dependencies(module, existing_module)?,
            });
        }

        let request = self.request(&scanned);
        let module_identities: Vec<(String, Ga)> = project
            .modules
            .iter()
            .map(|module| {
                let group = if module.group.is_empty() {
                    &root.group
                } else {
                    &module.group
                };
                (module.path.clone(), Ga::new(group.clone(), module.name.clone()))
            })
            .collect();
        let module_versions: Vec<(String, String)> = project
            .modules
            .iter()
            .map(|module| (module.path.clone(), module.version.clone()))
            .collect();
        let customizers: Vec<Box<dyn ResponseCustomizer>> = vec![
            Box::new(DependencyOverrideCustomizer::from_config(&self.config, module_identities)?),
            Box::new(UpdateProjectVersionCustomizer::new(
                &self.config,
                module_versions,
                existing.as_ref().map(|model| model.version().to_string()),
            )),
        ];
        let customizers = CustomizerPipeline::new(customizers);

        info!(
            modules = scanned.len(),
            dependencies = request.dependencies.len(),
            "Completed scanning; requesting alignment"
        );
        let response = WithCustomizersAlignmentService::new(service, customizers)
            .align(&request)
            .await?;

        let original_version = project
            .modules
            .iter()
            .map(|module| module.version.as_str())
            .find(|version| !version.is_empty())
            .ok_or(Error::NoProjectVersion)?;

        let mut non_aligned = IndexMap::new();
        let root_module = scanned
            .iter()
            .find(|module| module.descriptor.is_root())
            .ok_or(Error::MissingRootModule)?;
        let mut model = self.module_model(root_module, &response, &mut non_aligned)?;
        model.set_original_version(Some(original_version.to_string()));
        for module in scanned.iter().filter(|module| !module.descriptor.is_root()) {
            let mut node = self.module_model(module, &response, &mut non_aligned)?;
            if node.group().is_empty() {
                // Inherited group, matching the identity overrides were keyed on.
                node.set_group(root_module.descriptor.group.clone());
            }
            if node.version() != module.descriptor.version && module.descriptor.version != original_version
            {
                node.set_original_version(Some(module.descriptor.version.clone()));
            }
            let parent = module.descriptor.parent_path().unwrap_or(realign_model::ROOT_PATH);
            model.insert_at_path(parent, node, self.config.duplicate_child_policy)?;
        }

        if model.group().is_empty() {
            let group = common_group(&model)?;
            warn!(group = %group, "Root module has no group; using common prefix of child modules");
            model.set_group(group);
        }

        let model_file = write_manipulation_model(&self.root_dir, &model)?;
        info!(file = %model_file.display(), "Wrote manipulation model");
        self.cache.insert(&self.root_dir, model.clone());

        if !self.config.report_non_aligned {
            non_aligned.clear();
        }
        let report = AlignmentReport::new(&model, &non_aligned);
        info!("Alignment report:\n{}", report);
        let report_files = report.write(
            &self.root_dir,
            &self.config.report_txt_output_file,
            &self.config.report_json_output_file,
        )?;

        Ok(AlignmentOutcome {
            model,
            model_file,
            report,
            report_files,
        })
    }

    /// Works out the concrete coordinate of every dependency of `module`.
    fn scan_dependencies(
        &self,
        module: &ModuleDescriptor,
        existing: Option<&ManipulationModel>,
    ) -> Result<IndexMap<String, ModuleDependency>> {
        let locked = read_lock_file_gavs(&module_dir(&self.root_dir, &module.path))?;
        let mut dependencies = IndexMap::new();
        for declared in &module.dependencies {
            let Some(mut dependency) = self.scan_dependency(module, declared, &locked)? else {
                continue;
            };

            // Only fully versioned keys are reused.
            let previous = existing
                .filter(|_| !declared.version.is_empty())
                .and_then(|model| model.aligned_dependencies().get(&dependency.key));
            if let Some(previous) = previous {
                if previous.version() != dependency.effective.version() {
                    info!(
                        module = %module.path,
                        dependency = %dependency.effective,
                        previous = %previous,
                        "Using existing model to update dependency"
                    );
                    dependency.effective = previous.clone();
                }
            }
            dependencies.insert(dependency.key.clone(), dependency);
        }
        Ok(dependencies)
    }

    fn scan_dependency(
        &self,
        module: &ModuleDescriptor,
        declared: &DeclaredDependency,
        locked: &BTreeSet<Gav>,
    ) -> Result<Option<ModuleDependency>> {
        let ga = declared.ga();
        if declared.version.is_empty() {
            // Managed versions are looked up by the version the build resolves them to.
            return Ok(match &declared.resolved_version {
                Some(resolved) => Some(ModuleDependency {
                    key: ga.with_version(resolved.clone()).to_string(),
                    effective: ga.with_version(resolved.clone()),
                    dynamic: false,
                }),
                None => {
                    warn!(module = %module.path, dependency = %ga, "Dependency has no version; skipping");
                    None
                },
            });
        }

        let key = declared.gav().to_string();
        if !is_dynamic(&declared.version)? {
            return Ok(Some(ModuleDependency {
                key,
                effective: declared.gav(),
                dynamic: false,
            }));
        }

        let resolved = declared.resolved_version.clone().or_else(|| {
            locked
                .iter()
                .find(|gav| gav.ga() == ga)
                .map(|gav| gav.version().to_string())
        });
        Ok(match resolved {
            Some(version) => {
                debug!(module = %module.path, dependency = %key, version = %version, "Pinned dynamic dependency");
                Some(ModuleDependency {
                    key,
                    effective: ga.with_version(version),
                    dynamic: true,
                })
            },
            None => {
                warn!(
                    module = %module.path,
                    dependency = %key,
                    "Unable to resolve dynamic dependency; skipping"
                );
                None
            },
        })
    }

    fn request(&self, modules: &[ScannedModule<'_>]) -> AlignmentRequest {
        let mut project = vec![];
        for ScannedModule { descriptor, .. } in modules {
            if descriptor.group.is_empty() || descriptor.version.is_empty() {
                warn!(
                    module = %descriptor.path,
                    "Project '{}:{}:{}' is not fully defined; skipping",
                    descriptor.group,
                    descriptor.name,
                    descriptor.version
                );
                continue;
            }
            let version = if self.config.version_suffix_snapshot {
                descriptor.version.as_str()
            } else {
                strip_snapshot(&descriptor.version)
            };
            project.push(Gav::new(descriptor.group.clone(), descriptor.name.clone(), version));
        }

        let mut seen = HashSet::new();
        let dependencies = modules
            .iter()
            .flat_map(|module| module.dependencies.values())
            .filter(|dependency| seen.insert(dependency.effective.clone()))
            .map(|dependency| dependency.effective.clone())
            .collect();
        AlignmentRequest::new(project, dependencies)
    }

    /// The model node of one module, without children.
    fn module_model(
        &self,
        module: &ScannedModule<'_>,
        response: &AlignmentResponse,
        non_aligned: &mut IndexMap<String, Vec<Gav>>,
    ) -> Result<ManipulationModel> {
        let descriptor = module.descriptor;
        let mut node = ManipulationModel::new(
            descriptor.group.clone(),
            descriptor.name.clone(),
            descriptor.version.clone(),
        );
        if self.config.version_modification {
            if let Some(version) = response.project_version_of(&descriptor.path) {
                debug!(module = %descriptor.path, from = %descriptor.version, to = version, "Updating module version");
                node.set_version(version);
            }
        }

        for dependency in module.dependencies.values() {
            if dependency.dynamic {
                node.add_aligned_dependency(dependency.key.clone(), dependency.effective.clone());
            }
        }
        for dependency in module.dependencies.values() {
            match response.get_aligned_version_of_gav(&descriptor.path, &dependency.effective)? {
                Some(version) if !version.is_empty() => {
                    debug!(
                        module = %descriptor.path,
                        dependency = %dependency.effective,
                        version = %version,
                        "Found replacement version"
                    );
                    node.add_aligned_dependency(
                        dependency.key.clone(),
                        dependency.effective.with_version(version),
                    );
                },
                Some(_) => {
                    debug!(module = %descriptor.path, dependency = %dependency.effective, "Dependency excluded from alignment");
                },
                None => non_aligned
                    .entry(descriptor.path.clone())
                    .or_insert_with(Vec::new)
                    .push(dependency.effective.clone()),
            }
        }
        Ok(node)
    }
}

/// The common prefix of the groups of the root's direct children, without a trailing `.`.
fn common_group(model: &ManipulationModel) -> Result<String> {
    let mut candidates: Vec<&str> = vec![];
    for group in model.children().map(ManipulationModel::group) {
        if !group.trim().is_empty() && !candidates.contains(&group) {
            candidates.push(group);
        }
    }
    debug!(?candidates, "Looking for a common group");

    let Some((first, rest)) = candidates.split_first() else {
        return Err(Error::NoGroupCandidate);
    };
    let mut prefix = *first;
    for candidate in rest {
        let common = prefix
            .char_indices()
            .zip(candidate.chars())
            .find(|((_, left), right)| left != right)
            .map_or(prefix.len().min(candidate.len()), |((index, _), _)| index);
        prefix = &prefix[..common];
    }

    let prefix = prefix.trim_end_matches('.');
    if prefix.is_empty() {
        return Err(Error::NoGroupCandidate);
    }
    Ok(prefix.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use claims::{assert_matches, assert_ok_eq};
    use realign_model::DuplicatePolicy;

    fn with_children(groups: &[&str]) -> ManipulationModel {
        let mut model = ManipulationModel::new("", "root", "1.0");
        for (index, group) in groups.iter().enumerate() {
            model
                .add_child(
                    ManipulationModel::new(*group, format!("child{}", index), "1.0"),
                    DuplicatePolicy::Error,
                )
                .unwrap();
        }
        model
    }

    #[test]
    fn common_group_of_children() {
        assert_ok_eq!(
            common_group(&with_children(&["org.acme.api", "org.acme.web", ""])),
            "org.acme".to_string()
        );
        assert_ok_eq!(
            common_group(&with_children(&["org.acme", "org.acme"])),
            "org.acme".to_string()
        );
        assert_ok_eq!(
            common_group(&with_children(&["org.acme", "org.acme.web"])),
            "org.acme".to_string()
        );
        assert_matches!(
            common_group(&with_children(&["org.acme", "com.acme"])),
            Err(Error::NoGroupCandidate)
        );
        assert_matches!(common_group(&with_children(&[])), Err(Error::NoGroupCandidate));
    }
}
