// Copyright © Aptos Foundation
// SPDX-License-Identifier: Apache-2.0

use crate::error::{Error, Result};
use indexmap::IndexMap;
use realign_types::{Ga, Gav};
use std::collections::BTreeMap;

/// The answer to an alignment request.
///
/// The translation map is the oracle's global answer. Customizers layer per-module
/// overrides on top of it; modules are identified by their path (`:`, `:api`, ...).
#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct AlignmentResponse {
    translation_map: Option<BTreeMap<Gav, String>>,
    dependency_overrides: IndexMap<String, IndexMap<Ga, String>>,
    project_overrides: IndexMap<String, String>,
    new_project_version: Option<String>,
}

impl AlignmentResponse {
    pub fn new(translation_map: BTreeMap<Gav, String>) -> Self {
        Self {
            translation_map: Some(translation_map),
            ..Self::default()
        }
    }

    /// A response whose translation map was never set.
    pub fn uninitialised() -> Self {
        Self::default()
    }

    pub fn translation_map(&self) -> Result<&BTreeMap<Gav, String>> {
        self.translation_map
            .as_ref()
            .ok_or(Error::TranslationMapNotInitialised)
    }

    pub fn set_translation_map(&mut self, translation_map: BTreeMap<Gav, String>) {
        self.translation_map = Some(translation_map);
    }

    /// Overrides the version of `dependency` within `module`. An empty version excludes the
    /// dependency from alignment in that module.
    pub fn add_dependency_override(
        &mut self,
        module: impl Into<String>,
        dependency: Ga,
        version: impl Into<String>,
    ) {
        self.dependency_overrides
            .entry(module.into())
            .or_default()
            .insert(dependency, version.into());
    }

    pub fn dependency_overrides(&self, module: &str) -> Option<&IndexMap<Ga, String>> {
        self.dependency_overrides.get(module)
    }

    pub fn set_project_override(&mut self, module: impl Into<String>, version: impl Into<String>) {
        self.project_overrides.insert(module.into(), version.into());
    }

    pub fn new_project_version(&self) -> Option<&str> {
        self.new_project_version.as_deref()
    }

    pub fn set_new_project_version(&mut self, version: impl Into<String>) {
        self.new_project_version = Some(version.into());
    }

    /// The version `module` should carry: its own override if any, else the new project
    /// version.
    pub fn project_version_of(&self, module: &str) -> Option<&str> {
        self.project_overrides
            .get(module)
            .map(String::as_str)
            .or(self.new_project_version.as_deref())
    }

    /// The aligned version of `gav` as used by `module`.
    ///
    /// A dependency override of the module matching the `group:artifact` wins regardless of
    /// the requested version; otherwise the translation map decides. `None` means no aligned
    /// version is known; `Some("")` means alignment is disabled for the dependency.
    pub fn get_aligned_version_of_gav(&self, module: &str, gav: &Gav) -> Result<Option<String>> {
        if let Some(overrides) = self.dependency_overrides.get(module) {
            let ga = gav.ga();
            if let Some((_, version)) = overrides.iter().find(|(target, _)| target.matches(&ga)) {
                return Ok(Some(version.clone()));
            }
        }
        Ok(self.translation_map()?.get(gav).cloned())
    }
}
