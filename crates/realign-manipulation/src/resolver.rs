// Copyright © Aptos Foundation
// SPDX-License-Identifier: Apache-2.0

//! Replacement of dependency versions at the moment the build resolves them.

use realign_model::ManipulationModel;
use realign_types::{applicable_overrides, Ga, Gav, OverrideKey};
use std::collections::BTreeMap;
use tracing::{debug, info, warn};

/// One dependency being resolved: what was requested and what will be used.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct DependencyResolveDetails {
    requested: Gav,
    target: Gav,
    reason: Option<String>,
}

impl DependencyResolveDetails {
    pub fn new(requested: Gav) -> Self {
        Self {
            target: requested.clone(),
            requested,
            reason: None,
        }
    }

    /// A request whose version is supplied by the build at resolution time, e.g. by a
    /// platform or a dependency management plugin. `requested` carries an empty version.
    pub fn managed(requested: Gav, managed_version: impl Into<String>) -> Self {
        Self {
            target: requested.with_version(managed_version),
            requested,
            reason: None,
        }
    }

    pub fn requested(&self) -> &Gav {
        &self.requested
    }

    pub fn target(&self) -> &Gav {
        &self.target
    }

    pub fn reason(&self) -> Option<&str> {
        self.reason.as_deref()
    }

    pub fn use_version(&mut self, version: impl Into<String>, because: impl Into<String>) {
        self.target = self.target.with_version(version);
        self.reason = Some(because.into());
    }
}

/// Versions of dependencies declared without one, as the build resolved them.
#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct ResolvedDependenciesRepository {
    versions: BTreeMap<Ga, String>,
}

impl ResolvedDependenciesRepository {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record(&mut self, dependency: Ga, version: impl Into<String>) {
        self.versions.insert(dependency, version.into());
    }

    pub fn get(&self, dependency: &Ga) -> Option<&str> {
        self.versions.get(dependency).map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.versions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.versions.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&Ga, &str)> {
        self.versions
            .iter()
            .map(|(dependency, version)| (dependency, version.as_str()))
    }
}

/// Where a replacement version came from.
#[derive(Clone, Debug, Eq, PartialEq)]
pub enum Replacement {
    /// A configured override for this module. An empty version excludes the dependency.
    Override(String),
    /// The alignment recorded for exactly the requested coordinate.
    Aligned(Gav),
}

/// The outcome of resolving a single dependency.
#[derive(Clone, Debug, Eq, PartialEq)]
pub enum Resolution {
    Replaced(String),
    Excluded,
    Unchanged,
    /// Neither a requested nor a managed version was available.
    Skipped,
}

/// Decides replacement versions for one module.
///
/// Lookups stop at the first hit: configured overrides naming this module, then overrides
/// for every module, then the module's own aligned dependencies keyed by the exact
/// requested coordinate.
#[derive(Clone, Debug)]
pub struct AlignedDependencyResolver<'a> {
    module: &'a ManipulationModel,
    overrides: Vec<(Ga, String)>,
}

impl<'a> AlignedDependencyResolver<'a> {
    pub fn new(module: &'a ManipulationModel) -> Self {
        Self {
            module,
            overrides: vec![],
        }
    }

    /// A resolver applying those of `overrides` whose module matcher accepts `module`.
    pub fn with_overrides(module: &'a ManipulationModel, overrides: &[(OverrideKey, String)]) -> Self {
        Self::for_identity(module, &module.ga(), overrides)
    }

    /// Like [`Self::with_overrides`], matching module matchers against `identity` instead of
    /// the module's own coordinates.
    pub fn for_identity(
        module: &'a ManipulationModel,
        identity: &Ga,
        overrides: &[(OverrideKey, String)],
    ) -> Self {
        Self {
            module,
            overrides: applicable_overrides(overrides, identity),
        }
    }

    pub fn module(&self) -> &ManipulationModel {
        self.module
    }

    /// The replacement for `requested`, if any.
    pub fn replacement_for(&self, requested: &Gav) -> Option<Replacement> {
        let ga = requested.ga();
        if let Some((_, version)) = self.overrides.iter().find(|(target, _)| target.matches(&ga)) {
            return Some(Replacement::Override(version.clone()));
        }
        self.module
            .aligned_dependencies()
            .get(&requested.to_string())
            .cloned()
            .map(Replacement::Aligned)
    }

    /// The version `requested` must be replaced with, if any. Exclusions yield `None`.
    pub fn replacement_version(&self, requested: &Gav) -> Option<String> {
        match self.replacement_for(requested)? {
            Replacement::Override(version) if version.is_empty() => None,
            Replacement::Override(version) => Some(version),
            Replacement::Aligned(gav) => Some(gav.version().to_string()),
        }
    }

    pub fn resolve(
        &self,
        details: &mut DependencyResolveDetails,
        resolved: &mut ResolvedDependenciesRepository,
    ) -> Resolution {
        let requested = details.requested().clone();
        let lookup = if requested.version().is_empty() {
            if details.target().version().is_empty() {
                warn!(dependency = %requested.ga(), "Ignoring dependency with empty version");
                return Resolution::Skipped;
            }
            resolved.record(requested.ga(), details.target().version());
            details.target().clone()
        } else {
            requested
        };

        let key = lookup.to_string();
        match self.replacement_for(&lookup) {
            Some(Replacement::Override(version)) if version.is_empty() => {
                debug!(dependency = %key, module = %self.module.name(), "Dependency excluded from alignment");
                Resolution::Excluded
            },
            Some(Replacement::Override(version)) => {
                info!(dependency = %key, version = %version, "Overriding dependency with configured version");
                details.use_version(version.clone(), format!("{} is overridden to {}", key, version));
                Resolution::Replaced(version)
            },
            Some(Replacement::Aligned(aligned)) => {
                info!(dependency = %key, aligned = %aligned, "Overriding dependency with new version");
                details.use_version(aligned.version(), format!("{} is aligned to {}", key, aligned));
                Resolution::Replaced(aligned.version().to_string())
            },
            None => {
                debug!(
                    dependency = %key,
                    module = %self.module.name(),
                    "Unable to find a mapping for dependency"
                );
                Resolution::Unchanged
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use claims::{assert_none, assert_some_eq};

    fn module() -> ManipulationModel {
        let mut module = ManipulationModel::new("org.acme", "web", "1.0.0-redhat-00001");
        module.add_aligned_dependency(
            "org.hibernate:hibernate-core:5.3.7.Final",
            Gav::new("org.hibernate", "hibernate-core", "5.3.7.Final-redhat-00001"),
        );
        module.add_aligned_dependency(
            "io.undertow:undertow-core:2.0.15.Final",
            Gav::new("io.undertow", "undertow-core", "2.0.15.Final-redhat-00001"),
        );
        module.add_aligned_dependency(
            "com.google.guava:guava:latest.release",
            Gav::new("com.google.guava", "guava", "28.1-jre-redhat-00002"),
        );
        module
    }

    fn overrides(entries: &[(&str, &str)]) -> Vec<(OverrideKey, String)> {
        entries
            .iter()
            .map(|(key, version)| (OverrideKey::parse(key).unwrap(), version.to_string()))
            .collect()
    }

    #[test]
    fn aligned_dependencies_match_the_exact_coordinate() {
        let module = module();
        let resolver = AlignedDependencyResolver::new(&module);
        let mut resolved = ResolvedDependenciesRepository::new();

        let mut details =
            DependencyResolveDetails::new(Gav::new("org.hibernate", "hibernate-core", "5.3.7.Final"));
        assert_eq!(
            resolver.resolve(&mut details, &mut resolved),
            Resolution::Replaced("5.3.7.Final-redhat-00001".to_string())
        );
        assert_eq!(details.target().version(), "5.3.7.Final-redhat-00001");
        assert_some_eq!(
            details.reason(),
            "org.hibernate:hibernate-core:5.3.7.Final is aligned to org.hibernate:hibernate-core:5.3.7.Final-redhat-00001"
        );

        let mut details =
            DependencyResolveDetails::new(Gav::new("org.hibernate", "hibernate-core", "5.4.0.Final"));
        assert_eq!(resolver.resolve(&mut details, &mut resolved), Resolution::Unchanged);
        assert_eq!(details.target(), details.requested());
        assert_none!(details.reason());

        // Dynamic selectors are recorded under the selector itself.
        let mut details =
            DependencyResolveDetails::new(Gav::new("com.google.guava", "guava", "latest.release"));
        assert_eq!(
            resolver.resolve(&mut details, &mut resolved),
            Resolution::Replaced("28.1-jre-redhat-00002".to_string())
        );
    }

    #[test]
    fn module_overrides_win_over_aligned_dependencies() {
        let module = module();
        let resolver = AlignedDependencyResolver::with_overrides(
            &module,
            &overrides(&[
                ("org.hibernate:hibernate-core@*", "5.3.7.Final-redhat-00009"),
                ("org.hibernate:hibernate-core@org.acme:web", "5.4.0.Final-redhat-00001"),
                ("io.undertow:undertow-core@org.acme:web", ""),
                ("org.slf4j:slf4j-api@org.acme:api", "1.7.30"),
            ]),
        );
        let mut resolved = ResolvedDependenciesRepository::new();

        let mut details =
            DependencyResolveDetails::new(Gav::new("org.hibernate", "hibernate-core", "5.3.7.Final"));
        assert_eq!(
            resolver.resolve(&mut details, &mut resolved),
            Resolution::Replaced("5.4.0.Final-redhat-00001".to_string())
        );

        let mut details =
            DependencyResolveDetails::new(Gav::new("io.undertow", "undertow-core", "2.0.15.Final"));
        assert_eq!(resolver.resolve(&mut details, &mut resolved), Resolution::Excluded);
        assert_eq!(details.target().version(), "2.0.15.Final");

        // Overrides for other modules do not apply.
        assert_none!(resolver.replacement_for(&Gav::new("org.slf4j", "slf4j-api", "1.7.25")));
        assert_none!(resolver.replacement_version(&Gav::new("io.undertow", "undertow-core", "2.0.15.Final")));
    }

    #[test]
    fn managed_versions_are_recorded() {
        let module = module();
        let resolver = AlignedDependencyResolver::new(&module);
        let mut resolved = ResolvedDependenciesRepository::new();

        let mut details = DependencyResolveDetails::managed(
            Gav::new("org.hibernate", "hibernate-core", ""),
            "5.3.7.Final",
        );
        assert_eq!(
            resolver.resolve(&mut details, &mut resolved),
            Resolution::Replaced("5.3.7.Final-redhat-00001".to_string())
        );
        assert_some_eq!(
            resolved.get(&Ga::new("org.hibernate", "hibernate-core")),
            "5.3.7.Final"
        );

        let mut details = DependencyResolveDetails::new(Gav::new("org.example", "managed", ""));
        assert_eq!(resolver.resolve(&mut details, &mut resolved), Resolution::Skipped);
        assert_eq!(resolved.len(), 1);
    }
}
