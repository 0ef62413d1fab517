// Copyright © Aptos Foundation
// SPDX-License-Identifier: Apache-2.0

//! The description of a build handed to an alignment session: its modules and the
//! dependencies each of them declares.

use crate::error::{Error, Result};
use realign_model::ROOT_PATH;
use realign_types::{Ga, Gav};
use serde::{Deserialize, Serialize};
use std::{collections::HashSet, fs, path::Path};

/// A dependency as written in a build script, with the version the build tool resolved it
/// to when that is known.
#[derive(Clone, Debug, Eq, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DeclaredDependency {
    pub group_id: String,
    pub artifact_id: String,
    /// May be empty for managed dependencies, or a dynamic selector such as `1.+`.
    #[serde(default)]
    pub version: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub resolved_version: Option<String>,
}

impl DeclaredDependency {
    pub fn new(
        group_id: impl Into<String>,
        artifact_id: impl Into<String>,
        version: impl Into<String>,
    ) -> Self {
        Self {
            group_id: group_id.into(),
            artifact_id: artifact_id.into(),
            version: version.into(),
            resolved_version: None,
        }
    }

    pub fn resolved_to(mut self, version: impl Into<String>) -> Self {
        self.resolved_version = Some(version.into());
        self
    }

    pub fn ga(&self) -> Ga {
        Ga::new(self.group_id.clone(), self.artifact_id.clone())
    }

    pub fn gav(&self) -> Gav {
        Gav::new(
            self.group_id.clone(),
            self.artifact_id.clone(),
            self.version.clone(),
        )
    }
}

#[derive(Clone, Debug, Eq, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ModuleDescriptor {
    /// `:` for the root module, `:a:b` for module `b` nested in module `a`.
    pub path: String,
    pub name: String,
    #[serde(default)]
    pub group: String,
    #[serde(default)]
    pub version: String,
    #[serde(default)]
    pub dependencies: Vec<DeclaredDependency>,
}

impl ModuleDescriptor {
    pub fn new(
        path: impl Into<String>,
        group: impl Into<String>,
        name: impl Into<String>,
        version: impl Into<String>,
    ) -> Self {
        Self {
            path: path.into(),
            name: name.into(),
            group: group.into(),
            version: version.into(),
            dependencies: vec![],
        }
    }

    pub fn with_dependency(mut self, dependency: DeclaredDependency) -> Self {
        self.dependencies.push(dependency);
        self
    }

    pub fn is_root(&self) -> bool {
        self.path == ROOT_PATH
    }

    /// The path of the module containing this one; `None` for the root.
    pub fn parent_path(&self) -> Option<&str> {
        if self.is_root() {
            return None;
        }
        match self.path.rfind(':') {
            Some(0) | None => Some(ROOT_PATH),
            Some(index) => Some(&self.path[..index]),
        }
    }

    pub fn ga(&self) -> Ga {
        Ga::new(self.group.clone(), self.name.clone())
    }
}

/// Every module of a build, parents listed before their children.
#[derive(Clone, Debug, Default, Eq, PartialEq, Serialize, Deserialize)]
pub struct ProjectDescriptor {
    pub modules: Vec<ModuleDescriptor>,
}

impl ProjectDescriptor {
    pub fn new(modules: Vec<ModuleDescriptor>) -> Self {
        Self { modules }
    }

    pub fn load(path: &Path) -> Result<Self> {
        let contents =
            fs::read_to_string(path).map_err(|err| Error::IO(path.display().to_string(), err))?;
        serde_json::from_str(&contents).map_err(|err| Error::Json(path.display().to_string(), err))
    }

    pub fn root(&self) -> Option<&ModuleDescriptor> {
        self.modules.iter().find(|module| module.is_root())
    }

    /// Checks that there is exactly one root, that paths are unique and that every module is
    /// named after the last segment of its path.
    pub fn validate(&self) -> Result<()> {
        if self.root().is_none() {
            return Err(Error::MissingRootModule);
        }
        let mut paths = HashSet::new();
        for module in &self.modules {
            if !paths.insert(module.path.as_str()) {
                return Err(Error::DuplicateModule(module.path.clone()));
            }
            if module.is_root() {
                continue;
            }
            let last_segment = module.path.rsplit(':').next().unwrap_or_default();
            if !module.path.starts_with(':') || last_segment != module.name {
                return Err(Error::ModuleNameMismatch {
                    path: module.path.clone(),
                    name: module.name.clone(),
                });
            }
        }
        Ok(())
    }
}
