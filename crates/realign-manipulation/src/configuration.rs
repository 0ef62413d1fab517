// Copyright © Aptos Foundation
// SPDX-License-Identifier: Apache-2.0

//! A build configuration as seen by the manipulation: the dependencies it declares, with
//! optional strict version constraints, and the modules whose version it forces.

use crate::resolver::{
    AlignedDependencyResolver, DependencyResolveDetails, Resolution, ResolvedDependenciesRepository,
};
use realign_types::{Ga, Gav};
use tracing::{debug, info, trace, warn};

#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
pub enum ConfigurationState {
    #[default]
    Unresolved,
    Resolved,
}

/// A dependency on an external module.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct ExternalDependency {
    /// The coordinate as declared; the version may be empty.
    pub requested: Gav,
    /// The version the build supplies for a dependency declared without one.
    pub managed_version: Option<String>,
    /// A `strictly` constraint on the version.
    pub strict_version: Option<String>,
}

impl ExternalDependency {
    pub fn new(requested: Gav) -> Self {
        Self {
            requested,
            managed_version: None,
            strict_version: None,
        }
    }

    pub fn managed_by(mut self, version: impl Into<String>) -> Self {
        self.managed_version = Some(version.into());
        self
    }

    pub fn strictly(mut self, version: impl Into<String>) -> Self {
        self.strict_version = Some(version.into());
        self
    }

    fn resolve_details(&self) -> DependencyResolveDetails {
        match &self.managed_version {
            Some(version) if self.requested.version().is_empty() => {
                DependencyResolveDetails::managed(self.requested.clone(), version.clone())
            },
            _ => DependencyResolveDetails::new(self.requested.clone()),
        }
    }
}

#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct BuildConfiguration {
    name: String,
    state: ConfigurationState,
    forced_modules: Vec<Gav>,
    dependencies: Vec<ExternalDependency>,
}

impl BuildConfiguration {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Self::default()
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn state(&self) -> ConfigurationState {
        self.state
    }

    pub fn mark_resolved(&mut self) {
        self.state = ConfigurationState::Resolved;
    }

    pub fn forced_modules(&self) -> &[Gav] {
        &self.forced_modules
    }

    /// Forces `module`, replacing any version already forced for its `group:artifact`.
    pub fn force(&mut self, module: Gav) {
        let ga = module.ga();
        match self.forced_modules.iter_mut().find(|forced| forced.ga() == ga) {
            Some(forced) => *forced = module,
            None => self.forced_modules.push(module),
        }
    }

    pub fn dependencies(&self) -> &[ExternalDependency] {
        &self.dependencies
    }

    pub fn add_dependency(&mut self, dependency: ExternalDependency) {
        self.dependencies.push(dependency);
    }

    pub fn forced_version(&self, module: &Ga) -> Option<&str> {
        self.forced_modules
            .iter()
            .find(|forced| &forced.ga() == module)
            .map(Gav::version)
    }
}

/// Applies a module's recorded alignment to its build configurations.
pub struct OverrideDependenciesAction<'a> {
    resolver: AlignedDependencyResolver<'a>,
}

impl<'a> OverrideDependenciesAction<'a> {
    pub fn new(resolver: AlignedDependencyResolver<'a>) -> Self {
        Self { resolver }
    }

    pub fn resolver(&self) -> &AlignedDependencyResolver<'a> {
        &self.resolver
    }

    /// Rewrites forced modules and strict constraints of `configuration` to their aligned
    /// versions; every aligned strict constraint is forced as well. Returns how many entries
    /// changed, or `None` if the configuration was already resolved and left alone.
    ///
    /// Rewritten entries no longer match their original coordinate, so applying the action
    /// again only affects constraints added since.
    pub fn apply_constraints(&self, configuration: &mut BuildConfiguration) -> Option<usize> {
        if configuration.state() == ConfigurationState::Resolved {
            warn!(
                configuration = configuration.name(),
                module = self.resolver.module().name(),
                "Configuration is not in unresolved state"
            );
            return None;
        }

        let mut changed = 0;
        for forced in configuration.forced_modules.iter_mut() {
            if let Some(version) = self.replacement(forced) {
                info!(forced = %forced, version = %version, "Replacing force override");
                *forced = forced.with_version(version);
                changed += 1;
            }
        }

        let mut strictly_forced = vec![];
        for dependency in configuration.dependencies.iter_mut() {
            let Some(strict_version) = dependency.strict_version.as_deref() else {
                continue;
            };
            let constrained = dependency.requested.with_version(strict_version);
            debug!(dependency = %constrained, "Found strict version constraint");
            if let Some(version) = self.replacement(&constrained) {
                info!(dependency = %constrained, version = %version, "Replacing strictly with forced version");
                dependency.strict_version = Some(version.clone());
                strictly_forced.push(constrained.with_version(version));
                changed += 1;
            }
        }
        for module in strictly_forced {
            configuration.force(module);
        }

        trace!(
            configuration = configuration.name(),
            forced = ?configuration.forced_modules(),
            "Forced resolution strategy updated"
        );
        Some(changed)
    }

    /// Adds a dependency discovered while the configuration is still mutable, re-applying
    /// the constraint rewriting to cover it.
    pub fn add_dependency(
        &self,
        configuration: &mut BuildConfiguration,
        dependency: ExternalDependency,
    ) -> Option<usize> {
        configuration.add_dependency(dependency);
        self.apply_constraints(configuration)
    }

    /// Resolves every dependency of `configuration`, or returns `None` if it was already
    /// resolved.
    pub fn resolve(
        &self,
        configuration: &BuildConfiguration,
        resolved: &mut ResolvedDependenciesRepository,
    ) -> Option<Vec<(DependencyResolveDetails, Resolution)>> {
        if configuration.state() == ConfigurationState::Resolved {
            warn!(
                configuration = configuration.name(),
                "Configuration is not in unresolved state"
            );
            return None;
        }
        Some(
            configuration
                .dependencies()
                .iter()
                .map(|dependency| {
                    let mut details = dependency.resolve_details();
                    let resolution = self.resolver.resolve(&mut details, resolved);
                    (details, resolution)
                })
                .collect(),
        )
    }

    /// A replacement that actually changes `gav`.
    fn replacement(&self, gav: &Gav) -> Option<String> {
        self.resolver
            .replacement_version(gav)
            .filter(|version| version != gav.version())
    }
}
