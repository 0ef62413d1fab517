// Copyright © Aptos Foundation
// SPDX-License-Identifier: Apache-2.0

//! Customizers turn the oracle's global answer into per-module decisions. They run in
//! ascending order; customizers sharing an order run in registration order.

use crate::{
    error::Result,
    project_version::VersionCalculator,
    response::AlignmentResponse,
    service::AlignmentRequest,
};
use realign_config::AlignmentConfig;
use realign_model::ROOT_PATH;
use realign_types::{applicable_overrides, Ga, OverrideKey};
use tracing::{debug, info};

pub trait ResponseCustomizer: Send + Sync {
    fn name(&self) -> &'static str;

    /// Lower orders run first.
    fn order(&self) -> i32 {
        0
    }

    fn customize(&self, response: &mut AlignmentResponse, request: &AlignmentRequest) -> Result<()>;
}

/// Customizers sorted once, at construction.
#[derive(Default)]
pub struct CustomizerPipeline {
    customizers: Vec<Box<dyn ResponseCustomizer>>,
}

impl CustomizerPipeline {
    pub fn new(mut customizers: Vec<Box<dyn ResponseCustomizer>>) -> Self {
        // Stable, so registration order breaks ties.
        customizers.sort_by_key(|customizer| customizer.order());
        Self { customizers }
    }

    pub fn len(&self) -> usize {
        self.customizers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.customizers.is_empty()
    }

    pub fn names(&self) -> Vec<&'static str> {
        self.customizers.iter().map(|c| c.name()).collect()
    }

    pub fn apply(&self, response: &mut AlignmentResponse, request: &AlignmentRequest) -> Result<()> {
        for customizer in &self.customizers {
            debug!(
                customizer = customizer.name(),
                order = customizer.order(),
                "Applying customizer"
            );
            customizer.customize(response, request)?;
        }
        Ok(())
    }
}

/// Applies the configured `group:artifact@module` overrides to every module they match.
pub struct DependencyOverrideCustomizer {
    overrides: Vec<(OverrideKey, String)>,
    /// Module path and `group:name` identity.
    modules: Vec<(String, Ga)>,
}

impl DependencyOverrideCustomizer {
    pub fn new(overrides: Vec<(OverrideKey, String)>, modules: Vec<(String, Ga)>) -> Self {
        Self { overrides, modules }
    }

    pub fn from_config(config: &AlignmentConfig, modules: Vec<(String, Ga)>) -> Result<Self> {
        Ok(Self::new(config.dependency_overrides()?, modules))
    }
}

impl ResponseCustomizer for DependencyOverrideCustomizer {
    fn name(&self) -> &'static str {
        "dependency-override"
    }

    fn customize(&self, response: &mut AlignmentResponse, _request: &AlignmentRequest) -> Result<()> {
        for (path, module) in &self.modules {
            for (target, version) in applicable_overrides(&self.overrides, module) {
                info!(
                    module = %path,
                    dependency = %target,
                    version = %version,
                    "Overriding dependency version"
                );
                response.add_dependency_override(path.clone(), target, version);
            }
        }
        Ok(())
    }
}

/// Decides the new version of the project's modules.
pub struct UpdateProjectVersionCustomizer {
    calculator: VersionCalculator,
    version_modification: bool,
    /// Module path and its current version; the root module comes first.
    modules: Vec<(String, String)>,
    /// Version recorded for the root by an earlier alignment.
    existing_version: Option<String>,
}

impl UpdateProjectVersionCustomizer {
    pub const ORDER: i32 = -10;

    pub fn new(
        config: &AlignmentConfig,
        modules: Vec<(String, String)>,
        existing_version: Option<String>,
    ) -> Self {
        Self {
            calculator: VersionCalculator::new(config),
            version_modification: config.version_modification,
            modules,
            existing_version,
        }
    }

    fn root_version(&self) -> Option<&str> {
        self.modules
            .iter()
            .find(|(path, _)| path == ROOT_PATH)
            .map(|(_, version)| version.as_str())
    }
}

impl ResponseCustomizer for UpdateProjectVersionCustomizer {
    fn name(&self) -> &'static str {
        "update-project-version"
    }

    fn order(&self) -> i32 {
        Self::ORDER
    }

    fn customize(&self, response: &mut AlignmentResponse, request: &AlignmentRequest) -> Result<()> {
        let Some(root_version) = self.root_version() else {
            return Ok(());
        };

        if !self.version_modification {
            debug!(version = root_version, "Project version modification disabled");
            response.set_new_project_version(root_version);
            return Ok(());
        }

        let translation_map = response.translation_map()?;
        let mut candidates: Vec<String> = self.existing_version.iter().cloned().collect();
        candidates.extend(
            request
                .project
                .iter()
                .filter_map(|gav| translation_map.get(gav).cloned()),
        );

        let calculate =
            |version: &str| self.calculator.calculate(version, candidates.iter().map(String::as_str));
        let new_version = calculate(root_version);
        let overrides: Vec<(String, String)> = self
            .modules
            .iter()
            .map(|(path, version)| {
                let module_version = if version == root_version {
                    new_version.clone()
                } else {
                    calculate(version)
                };
                (path.clone(), module_version)
            })
            .collect();

        info!(from = root_version, to = %new_version, "Updating project version");
        response.set_new_project_version(new_version);
        for (path, version) in overrides {
            response.set_project_override(path, version);
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::Error;
    use claims::{assert_matches, assert_none, assert_ok};
    use maplit::btreemap;
    use realign_types::Gav;
    use std::{
        collections::BTreeMap,
        sync::{Arc, Mutex},
    };

    struct Recording {
        name: &'static str,
        order: i32,
        log: Arc<Mutex<Vec<&'static str>>>,
    }

    impl ResponseCustomizer for Recording {
        fn name(&self) -> &'static str {
            self.name
        }

        fn order(&self) -> i32 {
            self.order
        }

        fn customize(&self, _: &mut AlignmentResponse, _: &AlignmentRequest) -> Result<()> {
            self.log.lock().unwrap().push(self.name);
            Ok(())
        }
    }

    #[test]
    fn pipeline_orders_by_priority_then_registration() {
        let log = Arc::new(Mutex::new(vec![]));
        let recording = |name, order| -> Box<dyn ResponseCustomizer> {
            Box::new(Recording {
                name,
                order,
                log: log.clone(),
            })
        };
        let pipeline = CustomizerPipeline::new(vec![
            recording("b", 0),
            recording("a", 5),
            recording("c", -10),
            recording("d", 0),
        ]);
        assert_eq!(pipeline.names(), vec!["c", "b", "d", "a"]);

        let mut response = AlignmentResponse::new(BTreeMap::new());
        assert_ok!(pipeline.apply(&mut response, &AlignmentRequest::default()));
        assert_eq!(*log.lock().unwrap(), vec!["c", "b", "d", "a"]);
    }

    #[test]
    fn dependency_overrides_follow_module_matchers() {
        let customizer = DependencyOverrideCustomizer::new(
            vec![
                (assert_ok!(OverrideKey::parse("org.slf4j:slf4j-api@*")), "1.7.30".to_string()),
                (
                    assert_ok!(OverrideKey::parse("io.undertow:undertow-core@org.acme:web")),
                    String::new(),
                ),
            ],
            vec![
                (":".to_string(), Ga::new("org.acme", "root")),
                (":web".to_string(), Ga::new("org.acme", "web")),
            ],
        );
        let mut response = AlignmentResponse::new(BTreeMap::new());
        assert_ok!(customizer.customize(&mut response, &AlignmentRequest::default()));

        let undertow = Gav::new("io.undertow", "undertow-core", "2.0.15.Final");
        let slf4j = Gav::new("org.slf4j", "slf4j-api", "1.7.25");
        assert_eq!(response.dependency_overrides(":").map(|o| o.len()), Some(1));
        assert_none!(assert_ok!(response.get_aligned_version_of_gav(":", &undertow)));
        assert_eq!(
            assert_ok!(response.get_aligned_version_of_gav(":web", &undertow)),
            Some(String::new())
        );
        assert_eq!(
            assert_ok!(response.get_aligned_version_of_gav(":web", &slf4j)),
            Some("1.7.30".to_string())
        );
    }

    #[test]
    fn module_overrides_win_over_wildcard_module_overrides() {
        let customizer = DependencyOverrideCustomizer::new(
            vec![
                (assert_ok!(OverrideKey::parse("org.hibernate:*@*")), String::new()),
                (
                    assert_ok!(OverrideKey::parse("org.hibernate:hibernate-core@org.acme:web")),
                    "5.4.0.Final".to_string(),
                ),
            ],
            vec![
                (":".to_string(), Ga::new("org.acme", "root")),
                (":web".to_string(), Ga::new("org.acme", "web")),
            ],
        );
        let mut response = AlignmentResponse::new(BTreeMap::new());
        assert_ok!(customizer.customize(&mut response, &AlignmentRequest::default()));

        let hibernate = Gav::new("org.hibernate", "hibernate-core", "5.3.7.Final");
        assert_eq!(
            assert_ok!(response.get_aligned_version_of_gav(":web", &hibernate)),
            Some("5.4.0.Final".to_string())
        );
        assert_eq!(
            assert_ok!(response.get_aligned_version_of_gav(":", &hibernate)),
            Some(String::new())
        );
    }

    fn project_customizer(config: &AlignmentConfig) -> UpdateProjectVersionCustomizer {
        UpdateProjectVersionCustomizer::new(
            config,
            vec![
                (":".to_string(), "1.0.0".to_string()),
                (":api".to_string(), "1.0.0".to_string()),
                (":legacy".to_string(), "0.9.0".to_string()),
            ],
            Some("1.0.0-redhat-00002".to_string()),
        )
    }

    #[test]
    fn project_version_moves_past_known_increments() {
        let config = AlignmentConfig::default();
        let request = AlignmentRequest::new(vec![Gav::new("org.acme", "root", "1.0.0")], vec![]);
        let mut response = AlignmentResponse::new(btreemap! {
            Gav::new("org.acme", "root", "1.0.0") => "1.0.0-redhat-00004".to_string(),
        });
        assert_ok!(project_customizer(&config).customize(&mut response, &request));

        assert_eq!(response.new_project_version(), Some("1.0.0-redhat-00005"));
        assert_eq!(response.project_version_of(":api"), Some("1.0.0-redhat-00005"));
        assert_eq!(response.project_version_of(":legacy"), Some("0.9.0-redhat-00001"));
    }

    #[test]
    fn project_version_without_modification_or_translation_map() {
        let mut config = AlignmentConfig::default();
        let request = AlignmentRequest::default();

        let mut response = AlignmentResponse::uninitialised();
        assert_matches!(
            project_customizer(&config).customize(&mut response, &request),
            Err(Error::TranslationMapNotInitialised)
        );

        config.version_modification = false;
        let mut response = AlignmentResponse::uninitialised();
        assert_ok!(project_customizer(&config).customize(&mut response, &request));
        assert_eq!(response.new_project_version(), Some("1.0.0"));
        assert_eq!(response.project_version_of(":legacy"), Some("1.0.0"));
    }

    #[test]
    fn project_customizer_runs_before_overrides() {
        let config = AlignmentConfig::default();
        let customizers: Vec<Box<dyn ResponseCustomizer>> = vec![
            Box::new(DependencyOverrideCustomizer::new(vec![], vec![])),
            Box::new(project_customizer(&config)),
        ];
        let pipeline = CustomizerPipeline::new(customizers);
        assert_eq!(pipeline.names(), vec![
            "update-project-version",
            "dependency-override"
        ]);
    }
}
