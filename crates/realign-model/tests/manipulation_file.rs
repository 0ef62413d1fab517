// Copyright © Aptos Foundation
// SPDX-License-Identifier: Apache-2.0

use claims::{assert_matches, assert_none, assert_ok, assert_some};
use maplit::btreeset;
use pretty_assertions::assert_eq;
use realign_model::{
    read_manipulation_model, read_manipulation_model_if_exists, write_manipulation_model,
    DuplicatePolicy, Error, ManipulationModel, ManipulationModelCache, MANIPULATION_FILE_NAME,
};
use realign_types::Gav;
use std::{collections::BTreeSet, fs};
use tempfile::TempDir;

fn sample_model() -> ManipulationModel {
    let mut root = ManipulationModel::new("org.acme", "root", "1.0.0.redhat-00001");
    root.set_original_version(Some("1.0.0".to_string()));
    root.add_aligned_dependency(
        "org.jboss.resteasy:resteasy-jaxrs:3.6.3.Final",
        Gav::new("org.jboss.resteasy", "resteasy-jaxrs", "3.6.3.Final-redhat-000001"),
    );

    let mut child1 = ManipulationModel::new("org.acme", "child1", "1.0.0.redhat-00001");
    child1.add_aligned_dependency(
        "org.hibernate:hibernate-core:5.3.7.Final",
        Gav::new("org.hibernate", "hibernate-core", "5.3.7.Final-redhat-000001"),
    );
    let mut child11 = ManipulationModel::new("org.acme", "child11", "1.0.0.redhat-00001");
    child11.add_aligned_dependency(
        "io.undertow:undertow-core:2.0.15.Final",
        Gav::new("io.undertow", "undertow-core", "2.0.15.Final-redhat-000001"),
    );
    child11.add_aligned_dependency(
        "org.mockito:mockito-core:2.27.0",
        Gav::new("org.mockito", "mockito-core", "2.27.0-redhat-000001"),
    );
    child1.add_child(child11, DuplicatePolicy::Error).unwrap();
    root.add_child(child1, DuplicatePolicy::Error).unwrap();
    root.add_child(
        ManipulationModel::new("org.acme", "child2", "1.0.0.redhat-00001"),
        DuplicatePolicy::Error,
    )
    .unwrap();
    root
}

#[test]
fn all_aligned_dependencies_spans_every_depth() {
    let keys: BTreeSet<_> = sample_model().all_aligned_dependencies().into_keys().collect();
    assert_eq!(keys, btreeset! {
        "org.jboss.resteasy:resteasy-jaxrs:3.6.3.Final".to_string(),
        "org.hibernate:hibernate-core:5.3.7.Final".to_string(),
        "io.undertow:undertow-core:2.0.15.Final".to_string(),
        "org.mockito:mockito-core:2.27.0".to_string(),
    });
}

#[test]
fn model_file_round_trip() {
    let dir = TempDir::new().unwrap();
    let model = sample_model();

    let path = assert_ok!(write_manipulation_model(dir.path(), &model));
    assert_eq!(path, dir.path().join(MANIPULATION_FILE_NAME));

    let read = assert_ok!(read_manipulation_model(dir.path()));
    assert_eq!(read, model);
    assert_eq!(
        read.find_by_path(":child1:child11")
            .unwrap()
            .aligned_dependencies()
            .len(),
        2
    );
}

#[test]
fn model_file_uses_stable_field_names() {
    let dir = TempDir::new().unwrap();
    let mut model = ManipulationModel::new("g", "root", "2");
    model.add_aligned_dependency("g:a:1", Gav::new("g", "a", "1.redhat-00001"));
    write_manipulation_model(dir.path(), &model).unwrap();

    let json: serde_json::Value =
        serde_json::from_str(&fs::read_to_string(dir.path().join(MANIPULATION_FILE_NAME)).unwrap())
            .unwrap();
    let fields: Vec<_> = json.as_object().unwrap().keys().cloned().collect();
    assert_eq!(fields, vec![
        "group",
        "name",
        "version",
        "alignedDependencies",
        "children"
    ]);
    assert_eq!(
        json["alignedDependencies"]["g:a:1"],
        serde_json::json!({"groupId": "g", "artifactId": "a", "version": "1.redhat-00001"})
    );
}

#[test]
fn minimal_model_file_reads_with_empty_maps() {
    let dir = TempDir::new().unwrap();
    fs::write(
        dir.path().join(MANIPULATION_FILE_NAME),
        r#"{"group": "g", "name": "root", "version": "1", "children": {"api": {"name": "api"}}}"#,
    )
    .unwrap();

    let model = assert_ok!(read_manipulation_model(dir.path()));
    assert!(model.aligned_dependencies().is_empty());
    let api = assert_ok!(model.find_by_name("api"));
    assert_eq!(api.group(), "");
    assert!(api.aligned_dependencies().is_empty());
    assert_eq!(api.children().count(), 0);
}

#[test]
fn missing_and_corrupt_model_files() {
    let dir = TempDir::new().unwrap();
    assert_none!(assert_ok!(read_manipulation_model_if_exists(dir.path())));
    assert_matches!(read_manipulation_model(dir.path()), Err(Error::IO(..)));

    fs::write(dir.path().join(MANIPULATION_FILE_NAME), "{ not json").unwrap();
    assert_matches!(read_manipulation_model(dir.path()), Err(Error::Json(..)));
}

#[test]
fn cache_reads_each_root_once() {
    let dir = TempDir::new().unwrap();
    let mut cache = ManipulationModelCache::new();
    assert_none!(assert_ok!(cache.get_or_load(dir.path())));

    // Absence is remembered until the entry is invalidated.
    write_manipulation_model(dir.path(), &sample_model()).unwrap();
    assert_none!(assert_ok!(cache.get_or_load(dir.path())));

    cache.invalidate(dir.path());
    let model = assert_some!(assert_ok!(cache.get_or_load(dir.path())));
    assert_eq!(model.name(), "root");
    assert_eq!(cache.len(), 1);

    cache.insert(dir.path(), ManipulationModel::new("g", "other", "1"));
    let model = assert_some!(assert_ok!(cache.get_or_load(dir.path())));
    assert_eq!(model.name(), "other");
}
