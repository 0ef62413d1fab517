// Copyright © Aptos Foundation
// SPDX-License-Identifier: Apache-2.0

use claims::{assert_matches, assert_ok};
use pretty_assertions::assert_eq;
use realign_config::AlignmentConfig;
use realign_manipulation::{
    BuildConfiguration, Error, ExternalDependency, Manipulator, Resolution,
    ResolvedDependenciesRepository,
};
use realign_model::{write_manipulation_model, DuplicatePolicy, ManipulationModel};
use realign_types::{Ga, Gav};
use std::{fs, path::Path};
use tempfile::TempDir;

const ROOT_LOCK_FILE: &str = "\
# This is a Gradle generated file for dependency locking.
com.google.guava:guava:28.1-jre=compileClasspath,runtimeClasspath
junit:junit:4.12=testCompileClasspath
org.hibernate:hibernate-core:5.3.7.Final=runtimeClasspath
empty=annotationProcessor
";

const API_LOCK_FILE: &str = "\
io.undertow:undertow-core:2.0.15.Final=compileClasspath
org.hibernate:hibernate-core:5.3.7.Final=compileClasspath
";

const BUILD_SCRIPT: &str = "\
plugins {
    id 'java'
    id 'signing'
}

signing {
    sign publishing.publications // { unbalanced in a comment
}

dependencies {
    implementation 'org.hibernate:hibernate-core:5.3.7.Final'
}
";

fn model() -> ManipulationModel {
    let mut root = ManipulationModel::new("org.acme", "root", "1.0.1-redhat-00001");
    root.add_aligned_dependency(
        "org.hibernate:hibernate-core:5.3.7.Final",
        Gav::new("org.hibernate", "hibernate-core", "5.3.7.Final-redhat-00001"),
    );
    root.add_aligned_dependency(
        "com.google.guava:guava:latest.release",
        Gav::new("com.google.guava", "guava", "28.1-jre-redhat-00002"),
    );

    let mut api = ManipulationModel::new("org.acme", "api", "1.0.1-redhat-00001");
    api.add_aligned_dependency(
        "org.hibernate:hibernate-core:5.3.7.Final",
        Gav::new("org.hibernate", "hibernate-core", "5.3.7.Final-redhat-00001"),
    );
    assert_ok!(root.add_child(api, DuplicatePolicy::LastWriteWins));

    // Nothing aligned, nothing locked.
    let web = ManipulationModel::new("org.acme", "web", "1.0.1-redhat-00001");
    assert_ok!(root.add_child(web, DuplicatePolicy::LastWriteWins));
    root
}

fn write(path: &Path, contents: &str) {
    fs::create_dir_all(path.parent().unwrap()).unwrap();
    fs::write(path, contents).unwrap();
}

fn build() -> TempDir {
    let dir = TempDir::new().unwrap();
    assert_ok!(write_manipulation_model(dir.path(), &model()));
    write(&dir.path().join("gradle.lockfile"), ROOT_LOCK_FILE);
    write(
        &dir.path().join("api/gradle/dependency-locks/compileClasspath.lockfile"),
        API_LOCK_FILE,
    );
    write(&dir.path().join("build.gradle"), BUILD_SCRIPT);
    write(&dir.path().join("api/build.gradle"), "apply plugin: 'java'\n");
    dir
}

#[test]
fn rewrites_lock_files_and_build_scripts() {
    let dir = build();
    let mut config = AlignmentConfig::default();
    config.plugin_removal.insert("signing".to_string());
    let manipulator = assert_ok!(Manipulator::new(dir.path(), config));

    let summary = assert_ok!(manipulator.run());
    assert_eq!(summary.project, "org.acme:root:1.0.1-redhat-00001");
    assert_eq!(summary.lock_files, vec![
        dir.path().join("gradle.lockfile"),
        dir.path().join("api/gradle/dependency-locks/compileClasspath.lockfile"),
    ]);
    assert_eq!(summary.build_scripts, vec![dir.path().join("build.gradle")]);

    assert_eq!(
        fs::read_to_string(dir.path().join("gradle.lockfile")).unwrap(),
        "\
# This is a Gradle generated file for dependency locking.
com.google.guava:guava:28.1-jre-redhat-00002=compileClasspath,runtimeClasspath
junit:junit:4.12=testCompileClasspath
org.hibernate:hibernate-core:5.3.7.Final-redhat-00001=runtimeClasspath
empty=annotationProcessor
"
    );
    assert_eq!(
        fs::read_to_string(dir.path().join("api/gradle/dependency-locks/compileClasspath.lockfile"))
            .unwrap(),
        "\
io.undertow:undertow-core:2.0.15.Final=compileClasspath
org.hibernate:hibernate-core:5.3.7.Final-redhat-00001=compileClasspath
"
    );

    let script = fs::read_to_string(dir.path().join("build.gradle")).unwrap();
    assert!(!script.contains("signing"));
    assert!(script.contains("id 'java'"));
    assert!(script.contains("implementation 'org.hibernate:hibernate-core:5.3.7.Final'"));
    assert_eq!(
        fs::read_to_string(dir.path().join("api/build.gradle")).unwrap(),
        "apply plugin: 'java'\n"
    );

    // Scripts no longer mention the plugin.
    let summary = assert_ok!(manipulator.run());
    assert!(summary.build_scripts.is_empty());
}

#[test]
fn build_without_model_is_rejected() {
    let dir = TempDir::new().unwrap();
    let manipulator = assert_ok!(Manipulator::new(dir.path(), AlignmentConfig::default()));
    assert_matches!(manipulator.run(), Err(Error::MissingModel(_)));
}

#[test]
fn configurations_follow_the_recorded_alignment() {
    let dir = build();
    let mut config = AlignmentConfig::default();
    config.dependency_override.insert(
        "io.undertow:undertow-core@org.acme:api".to_string(),
        "2.0.20.Final".to_string(),
    );
    let manipulator = assert_ok!(Manipulator::new(dir.path(), config));
    let model = assert_ok!(manipulator.model());
    let action = assert_ok!(manipulator.override_action(&model, ":api"));

    let mut configuration = BuildConfiguration::new("compileClasspath");
    configuration.force(Gav::new("org.hibernate", "hibernate-core", "5.3.7.Final"));
    configuration.add_dependency(ExternalDependency::new(Gav::new(
        "org.hibernate",
        "hibernate-core",
        "5.3.7.Final",
    )));
    assert_eq!(action.apply_constraints(&mut configuration), Some(1));

    assert_eq!(
        action.add_dependency(
            &mut configuration,
            ExternalDependency::new(Gav::new("io.undertow", "undertow-core", "2.0.15.Final"))
                .strictly("2.0.15.Final"),
        ),
        Some(1)
    );
    assert_eq!(configuration.forced_modules(), &[
        Gav::new("org.hibernate", "hibernate-core", "5.3.7.Final-redhat-00001"),
        Gav::new("io.undertow", "undertow-core", "2.0.20.Final"),
    ]);

    let mut resolved = ResolvedDependenciesRepository::new();
    let resolutions: Vec<_> = action
        .resolve(&configuration, &mut resolved)
        .unwrap()
        .into_iter()
        .map(|(_, resolution)| resolution)
        .collect();
    assert_eq!(resolutions, vec![
        Resolution::Replaced("5.3.7.Final-redhat-00001".to_string()),
        Resolution::Replaced("2.0.20.Final".to_string()),
    ]);
    assert!(resolved.is_empty());

    configuration.mark_resolved();
    assert_eq!(
        action.add_dependency(
            &mut configuration,
            ExternalDependency::new(Gav::new("org.slf4j", "slf4j-api", "1.7.25")),
        ),
        None
    );
    assert_eq!(configuration.forced_version(&Ga::new("org.slf4j", "slf4j-api")), None);
}
