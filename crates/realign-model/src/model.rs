// Copyright © Aptos Foundation
// SPDX-License-Identifier: Apache-2.0

use crate::error::{Error, Result};
use indexmap::IndexMap;
use realign_types::{Ga, Gav};
use serde::{Deserialize, Deserializer, Serialize};
use std::{
    collections::BTreeMap,
    fmt::{self, Display},
    path::{Path, PathBuf},
};
use tracing::{debug, warn};

/// The path of the root module.
pub const ROOT_PATH: &str = ":";
const PATH_SEPARATOR: char = ':';

/// What to do when a child is added under a name its parent already uses.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum DuplicatePolicy {
    /// Replace the earlier child, keeping its position among its siblings.
    #[default]
    LastWriteWins,
    /// Refuse the insertion.
    Error,
}

/// One module of the build and, recursively, its sub-modules.
///
/// `aligned_dependencies` only holds the replacements of this module, keyed by the
/// canonical `group:artifact:version` string of the dependency as originally declared.
/// Children are keyed by module name and kept in insertion order.
#[derive(Clone, Debug, Default, Eq, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ManipulationModel {
    #[serde(default, deserialize_with = "null_as_default")]
    group: String,
    #[serde(default, deserialize_with = "null_as_default")]
    name: String,
    #[serde(default, deserialize_with = "null_as_default")]
    version: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    original_version: Option<String>,
    #[serde(default, deserialize_with = "null_as_default")]
    aligned_dependencies: BTreeMap<String, Gav>,
    #[serde(default, deserialize_with = "null_as_default")]
    children: IndexMap<String, ManipulationModel>,
}

fn null_as_default<'de, D, T>(deserializer: D) -> std::result::Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

impl ManipulationModel {
    pub fn new(
        group: impl Into<String>,
        name: impl Into<String>,
        version: impl Into<String>,
    ) -> Self {
        Self {
            group: group.into(),
            name: name.into(),
            version: version.into(),
            ..Self::default()
        }
    }

    pub fn group(&self) -> &str {
        &self.group
    }

    pub fn set_group(&mut self, group: impl Into<String>) {
        self.group = group.into();
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn version(&self) -> &str {
        &self.version
    }

    pub fn set_version(&mut self, version: impl Into<String>) {
        self.version = version.into();
    }

    /// The module version before alignment changed it, if it did.
    pub fn original_version(&self) -> Option<&str> {
        self.original_version.as_deref()
    }

    pub fn set_original_version(&mut self, original_version: Option<String>) {
        self.original_version = original_version;
    }

    /// The `group:name` identity used to match this module against override keys.
    pub fn ga(&self) -> Ga {
        Ga::new(self.group.clone(), self.name.clone())
    }

    /// Replacements decided for this module only.
    pub fn aligned_dependencies(&self) -> &BTreeMap<String, Gav> {
        &self.aligned_dependencies
    }

    /// Records `aligned` as the replacement of the dependency originally declared as
    /// `original`, returning any replacement it supersedes.
    pub fn add_aligned_dependency(&mut self, original: impl Into<String>, aligned: Gav) -> Option<Gav> {
        self.aligned_dependencies.insert(original.into(), aligned)
    }

    pub fn children(&self) -> impl Iterator<Item = &ManipulationModel> {
        self.children.values()
    }

    pub fn child(&self, name: &str) -> Option<&ManipulationModel> {
        self.children.get(name)
    }

    pub fn add_child(&mut self, child: ManipulationModel, policy: DuplicatePolicy) -> Result<()> {
        if self.children.contains_key(&child.name) {
            match policy {
                DuplicatePolicy::Error => {
                    return Err(Error::DuplicateChild {
                        parent: self.name.clone(),
                        child: child.name,
                    });
                },
                DuplicatePolicy::LastWriteWins => {
                    warn!(
                        parent = %self.name,
                        child = %child.name,
                        "Replacing existing child module with the same name"
                    );
                },
            }
        }
        self.children.insert(child.name.clone(), child);
        Ok(())
    }

    /// Adds `child` below the module found at `parent` (a name or a path, see
    /// [`Self::find_corresponding_child`]).
    pub fn insert_at_path(
        &mut self,
        parent: &str,
        child: ManipulationModel,
        policy: DuplicatePolicy,
    ) -> Result<()> {
        self.find_corresponding_child_mut(parent)?
            .add_child(child, policy)
    }

    /// Resolves either a simple module name or a `:`-prefixed module path.
    pub fn find_corresponding_child(&self, name_or_path: &str) -> Result<&ManipulationModel> {
        let chain = self.resolve(name_or_path)?;
        self.walk(&chain)
    }

    pub fn find_corresponding_child_mut(
        &mut self,
        name_or_path: &str,
    ) -> Result<&mut ManipulationModel> {
        let chain = self.resolve(name_or_path)?;
        self.walk_mut(&chain)
    }

    /// Returns this module if it carries `name`, otherwise its direct child of that name.
    pub fn find_by_name(&self, name: &str) -> Result<&ManipulationModel> {
        if name.contains(PATH_SEPARATOR) {
            return Err(Error::ModuleNotFound(name.to_string()));
        }
        self.find_corresponding_child(name)
    }

    /// Resolves a path such as `:`, `:api` or `:services:api` relative to this module. Every
    /// segment names a direct child of the module reached so far.
    pub fn find_by_path(&self, path: &str) -> Result<&ManipulationModel> {
        if !path.starts_with(PATH_SEPARATOR) {
            return Err(Error::InvalidModulePath(path.to_string()));
        }
        self.find_corresponding_child(path)
    }

    /// Union of the replacements of every module in this subtree. Modules are visited depth
    /// first in insertion order and a later module overwrites an earlier one recording the
    /// same original coordinate.
    pub fn all_aligned_dependencies(&self) -> BTreeMap<String, Gav> {
        let mut result = BTreeMap::new();
        self.collect_aligned_dependencies(&mut result);
        result
    }

    fn collect_aligned_dependencies(&self, result: &mut BTreeMap<String, Gav>) {
        result.extend(
            self.aligned_dependencies
                .iter()
                .map(|(key, gav)| (key.clone(), gav.clone())),
        );
        for child in self.children.values() {
            child.collect_aligned_dependencies(result);
        }
    }

    /// Every module of the subtree with its path relative to this one, parents before
    /// children.
    pub fn modules(&self) -> Vec<(String, &ManipulationModel)> {
        let mut modules = vec![(ROOT_PATH.to_string(), self)];
        self.collect_modules("", &mut modules);
        modules
    }

    fn collect_modules<'a>(&'a self, prefix: &str, modules: &mut Vec<(String, &'a ManipulationModel)>) {
        for (name, child) in &self.children {
            let path = format!("{}{}{}", prefix, PATH_SEPARATOR, name);
            modules.push((path.clone(), child));
            child.collect_modules(&path, modules);
        }
    }

    /// Turns a name or path into the chain of child names leading to the module it denotes.
    fn resolve(&self, name_or_path: &str) -> Result<Vec<String>> {
        if name_or_path.is_empty() {
            return Err(Error::EmptyModuleName);
        }

        if !name_or_path.contains(PATH_SEPARATOR) {
            return Ok(self.step(name_or_path)?.into_iter().collect());
        }

        let segments = name_or_path
            .strip_prefix(PATH_SEPARATOR)
            .ok_or_else(|| Error::InvalidModulePath(name_or_path.to_string()))?;
        let mut chain = Vec::new();
        if segments.is_empty() {
            return Ok(chain);
        }

        let mut current = self;
        for segment in segments.split(PATH_SEPARATOR) {
            if segment.is_empty() {
                return Err(Error::InvalidModulePath(name_or_path.to_string()));
            }
            current = current
                .children
                .get(segment)
                .ok_or_else(|| Error::ModuleNotFound(segment.to_string()))?;
            chain.push(segment.to_string());
        }
        Ok(chain)
    }

    /// `None` when `name` designates this module, `Some(name)` for a direct child.
    fn step(&self, name: &str) -> Result<Option<String>> {
        if self.name == name {
            if self.children.contains_key(name) {
                warn!(
                    module = %self.name,
                    children = ?self.children.keys().collect::<Vec<_>>(),
                    "Child module has the same name as the current module, resolving to the current module"
                );
            }
            return Ok(None);
        }

        debug!(
            name,
            children = ?self.children.keys().collect::<Vec<_>>(),
            "Looking up child module"
        );
        if self.children.contains_key(name) {
            Ok(Some(name.to_string()))
        } else {
            Err(Error::ModuleNotFound(name.to_string()))
        }
    }

    fn walk(&self, chain: &[String]) -> Result<&ManipulationModel> {
        let mut current = self;
        for name in chain {
            current = current
                .children
                .get(name)
                .ok_or_else(|| Error::ModuleNotFound(name.clone()))?;
        }
        Ok(current)
    }

    fn walk_mut(&mut self, chain: &[String]) -> Result<&mut ManipulationModel> {
        let mut current = self;
        for name in chain {
            current = current
                .children
                .get_mut(name)
                .ok_or_else(|| Error::ModuleNotFound(name.clone()))?;
        }
        Ok(current)
    }
}

impl Display for ManipulationModel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}:{}", self.group, self.name, self.version)
    }
}

/// The directory of the module at `path`, assuming the conventional layout where every
/// sub-module lives in a directory named after it below its parent.
pub fn module_dir(root_dir: &Path, path: &str) -> PathBuf {
    path.split(PATH_SEPARATOR)
        .filter(|segment| !segment.is_empty())
        .fold(root_dir.to_path_buf(), |dir, segment| dir.join(segment))
}
