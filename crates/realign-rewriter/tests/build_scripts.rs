// Copyright © Aptos Foundation
// SPDX-License-Identifier: Apache-2.0

use claims::{assert_matches, assert_ok};
use pretty_assertions::assert_eq;
use realign_rewriter::{Error, PluginRemover};
use std::fs;
use tempfile::TempDir;

const SETTINGS: &str = r#"plugins {
    `gradle-enterprise`
    id("com.github.burrunan.s3-build-cache")
}

rootProject.name = "pgjdbc"

include(
    "bom",
    "postgresql"
)

val isCiServer = System.getenv().containsKey("CI")

if (isCiServer) {
    gradleEnterprise {
        buildScan {
            termsOfServiceUrl = "https://gradle.com/terms-of-service"
            termsOfServiceAgree = "yes"
            tag("CI")
        }
    }
}
buildCache {
    local {
        // Local caching may produce inconsistent results { while files change
        enabled = false
    }
    remote(com.github.burrunan.s3cache.AwsS3BuildCache) {
        region = 'eu-west-1'
        push = isCiServer
    }
} if (true) { }
"#;

#[test]
fn removes_enterprise_block_and_declaration() {
    let dir = TempDir::new().unwrap();
    let settings = dir.path().join("settings.gradle.kts");
    fs::write(&settings, SETTINGS).unwrap();

    let remover = assert_ok!(PluginRemover::new(["gradle-enterprise"]));
    let updated = assert_ok!(remover.remove_from_tree(dir.path()));
    assert_eq!(updated, vec![settings.clone()]);

    let contents = fs::read_to_string(&settings).unwrap();
    assert!(!contents.contains("gradle-enterprise"));
    assert!(!contents.contains("gradleEnterprise"));
    assert!(contents.contains("if (isCiServer) {\n    \n}\nbuildCache {"));
    assert!(contents.contains("id(\"com.github.burrunan.s3-build-cache\")"));
}

#[test]
fn removes_several_plugins() {
    let dir = TempDir::new().unwrap();
    let settings = dir.path().join("settings.gradle.kts");
    fs::write(&settings, SETTINGS).unwrap();

    let remover = assert_ok!(PluginRemover::new([
        "com.github.burrunan.s3-build-cache",
        "gradle-enterprise",
    ]));
    assert_ok!(remover.remove_from_tree(dir.path()));

    let expected = r#"plugins {
}

rootProject.name = "pgjdbc"

include(
    "bom",
    "postgresql"
)

val isCiServer = System.getenv().containsKey("CI")

if (isCiServer) {
"#
    .to_string()
        + "    \n}\n if (true) { }\n";
    let contents = fs::read_to_string(&settings).unwrap();
    assert_eq!(contents, expected);
    assert_eq!(contents.matches('{').count(), contents.matches('}').count());
}

#[test]
fn walks_modules_and_skips_output_directories() {
    let dir = TempDir::new().unwrap();
    let root_build = dir.path().join("build.gradle");
    let module_build = dir.path().join("core").join("build.gradle");
    let generated = dir.path().join("build").join("tmp").join("build.gradle");
    let untouched = dir.path().join("core").join("build.gradle.kts");
    for path in [&root_build, &module_build, &generated, &untouched] {
        fs::create_dir_all(path.parent().unwrap()).unwrap();
    }

    let script = "plugins {\n    id 'signing'\n}\nsigning {\n    sign configurations.archives\n}\n";
    fs::write(&root_build, script).unwrap();
    fs::write(&module_build, script).unwrap();
    fs::write(&generated, script).unwrap();
    fs::write(&untouched, "plugins {\n    id(\"java\")\n}\n").unwrap();

    let remover = assert_ok!(PluginRemover::new(["signing"]));
    let updated = assert_ok!(remover.remove_from_tree(dir.path()));
    assert_eq!(updated, vec![root_build.clone(), module_build.clone()]);

    assert_eq!(fs::read_to_string(&root_build).unwrap(), "plugins {\n}\n\n");
    assert_eq!(fs::read_to_string(&generated).unwrap(), script);
    assert_eq!(
        fs::read_to_string(&untouched).unwrap(),
        "plugins {\n    id(\"java\")\n}\n"
    );
}

#[test]
fn malformed_script_reports_the_file() {
    let dir = TempDir::new().unwrap();
    let build = dir.path().join("build.gradle");
    fs::write(&build, "dependencyUpdates {\n    revision = 'release'\n").unwrap();

    let remover = assert_ok!(PluginRemover::new(["com.github.ben-manes.versions"]));
    let err = remover.remove_from_tree(dir.path()).unwrap_err();
    assert_matches!(err, Error::MalformedBuildScript { ref file, .. } if file.ends_with("build.gradle"));
    assert_eq!(
        fs::read_to_string(&build).unwrap(),
        "dependencyUpdates {\n    revision = 'release'\n"
    );
}

#[test]
fn identifiers_extending_the_keyword_are_kept() {
    let dir = TempDir::new().unwrap();
    let settings = dir.path().join("settings.gradle.kts");
    fs::write(
        &settings,
        r#"val gradleEnterpriseUrl = "https://ge.example.org"
buildCache {
    remote(HttpBuildCache::class) { url = uri(gradleEnterpriseUrl) }
}
gradleEnterprise {
    server = gradleEnterpriseUrl
}
"#,
    )
    .unwrap();

    let remover = assert_ok!(PluginRemover::new(["gradle-enterprise"]));
    assert_eq!(assert_ok!(remover.remove_from_tree(dir.path())), vec![settings.clone()]);
    assert_eq!(
        fs::read_to_string(&settings).unwrap(),
        r#"val gradleEnterpriseUrl = "https://ge.example.org"
buildCache {
    remote(HttpBuildCache::class) { url = uri(gradleEnterpriseUrl) }
}

"#
    );
}
