// Copyright © Aptos Foundation
// SPDX-License-Identifier: Apache-2.0

use crate::error::{Error, Result};
use indexmap::IndexMap;
use realign_model::ManipulationModel;
use realign_types::Gav;
use serde::{Deserialize, Serialize};
use std::{
    collections::BTreeMap,
    fmt::{self, Display, Write as _},
    fs,
    path::{Path, PathBuf},
};
use tracing::info;

/// Reports are written to this directory below the build root.
pub const REPORT_DIR: &str = "build";

const MODULE_SEPARATOR: &str = "-------------------";

/// A module coordinate after alignment, with the coordinate it had before.
#[derive(Clone, Debug, Eq, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReportGav {
    pub group_id: String,
    pub artifact_id: String,
    pub version: String,
    #[serde(rename = "originalGAV")]
    pub original_gav: String,
}

impl ReportGav {
    /// Modules without a group of their own report the root's.
    fn of(model: &ManipulationModel, root: &ManipulationModel) -> Self {
        let group = if model.group().is_empty() {
            root.group()
        } else {
            model.group()
        };
        let original_version = model
            .original_version()
            .or(root.original_version())
            .unwrap_or(model.version());
        Self {
            group_id: group.to_string(),
            artifact_id: model.name().to_string(),
            version: model.version().to_string(),
            original_gav: format!("{}:{}:{}", group, model.name(), original_version),
        }
    }

    fn original_version(&self) -> &str {
        self.original_gav
            .rsplit(':')
            .next()
            .unwrap_or_default()
    }
}

#[derive(Clone, Debug, Eq, PartialEq, Serialize, Deserialize)]
pub struct ModuleReport {
    #[serde(skip)]
    pub path: String,
    pub gav: ReportGav,
    pub dependencies: BTreeMap<String, Gav>,
    #[serde(skip)]
    pub non_aligned: Vec<Gav>,
}

/// What an alignment changed, module by module.
#[derive(Clone, Debug, Eq, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AlignmentReport {
    pub execution_root: ReportGav,
    pub modules: Vec<ModuleReport>,
}

impl AlignmentReport {
    /// `non_aligned` holds, per module path, the dependencies the oracle had no version for;
    /// they only appear in the text report.
    pub fn new(model: &ManipulationModel, non_aligned: &IndexMap<String, Vec<Gav>>) -> Self {
        let modules = model
            .modules()
            .into_iter()
            .map(|(path, module)| ModuleReport {
                gav: ReportGav::of(module, model),
                dependencies: module.aligned_dependencies().clone(),
                non_aligned: non_aligned.get(&path).cloned().unwrap_or_default(),
                path,
            })
            .collect();
        Self {
            execution_root: ReportGav::of(model, model),
            modules,
        }
    }

    pub fn to_text(&self) -> String {
        self.to_string()
    }

    pub fn to_json(&self) -> Result<String> {
        let mut json = serde_json::to_string_pretty(self)
            .map_err(|err| Error::Json("alignment report".to_string(), err))?;
        json.push('\n');
        Ok(json)
    }

    /// Writes the text and JSON reports below `<root_dir>/build`; an empty file name skips
    /// that report. Returns the files written.
    pub fn write(&self, root_dir: &Path, txt_file: &str, json_file: &str) -> Result<Vec<PathBuf>> {
        let mut outputs = vec![];
        if !txt_file.is_empty() {
            outputs.push((txt_file, self.to_text()));
        }
        if !json_file.is_empty() {
            outputs.push((json_file, self.to_json()?));
        }
        if outputs.is_empty() {
            return Ok(vec![]);
        }

        let report_dir = root_dir.join(REPORT_DIR);
        fs::create_dir_all(&report_dir)
            .map_err(|err| Error::IO(report_dir.display().to_string(), err))?;
        let mut written = vec![];
        for (file_name, contents) in outputs {
            let path = report_dir.join(file_name);
            fs::write(&path, contents).map_err(|err| Error::IO(path.display().to_string(), err))?;
            info!(report = %path.display(), "Wrote alignment report");
            written.push(path);
        }
        Ok(written)
    }

    /// The text report of a single module.
    fn write_module(out: &mut String, module: &ModuleReport) -> fmt::Result {
        writeln!(
            out,
            "{} project {}:{} (path: {})",
            MODULE_SEPARATOR, module.gav.group_id, module.gav.artifact_id, module.path
        )?;
        if module.gav.original_version() != module.gav.version {
            writeln!(
                out,
                "\tProject version : {} --> {}",
                module.gav.original_version(),
                module.gav.version
            )?;
        }
        writeln!(out)?;
        if module.dependencies.is_empty() && module.non_aligned.is_empty() {
            return Ok(());
        }
        for (original, aligned) in &module.dependencies {
            writeln!(out, "\tDependencies : {} --> {}", original, aligned)?;
        }
        for dependency in &module.non_aligned {
            writeln!(out, "\tNon-Aligned Dependencies : {}", dependency)?;
        }
        writeln!(out)
    }
}

impl Display for AlignmentReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut out = String::new();
        for module in &self.modules {
            Self::write_module(&mut out, module)?;
        }
        f.write_str(&out)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use claims::assert_ok;
    use indexmap::indexmap;
    use pretty_assertions::assert_eq;
    use realign_model::DuplicatePolicy;
    use tempfile::TempDir;

    fn aligned_model() -> ManipulationModel {
        let mut root = ManipulationModel::new("org.acme.gradle", "root", "1.0.1.redhat-00002");
        root.set_original_version(Some("1.0.1".to_string()));
        root.add_aligned_dependency(
            "org.hibernate:hibernate-core:5.3.7.Final",
            Gav::new("org.hibernate", "hibernate-core", "5.3.7.Final-redhat-00001"),
        );
        root.add_child(
            ManipulationModel::new("", "api", "1.0.1.redhat-00002"),
            DuplicatePolicy::Error,
        )
        .unwrap();
        root.add_child(
            ManipulationModel::new("org.acme.gradle", "docs", "1.0.1"),
            DuplicatePolicy::Error,
        )
        .unwrap();
        root
    }

    #[test]
    fn text_report() {
        let non_aligned = indexmap! {
            ":".to_string() => vec![Gav::new("junit", "junit", "4.12")],
        };
        let report = AlignmentReport::new(&aligned_model(), &non_aligned);
        assert_eq!(
            report.to_text(),
            "------------------- project org.acme.gradle:root (path: :)\n\
             \tProject version : 1.0.1 --> 1.0.1.redhat-00002\n\
             \n\
             \tDependencies : org.hibernate:hibernate-core:5.3.7.Final --> org.hibernate:hibernate-core:5.3.7.Final-redhat-00001\n\
             \tNon-Aligned Dependencies : junit:junit:4.12\n\
             \n\
             ------------------- project org.acme.gradle:api (path: :api)\n\
             \tProject version : 1.0.1 --> 1.0.1.redhat-00002\n\
             \n\
             ------------------- project org.acme.gradle:docs (path: :docs)\n\
             \n"
        );
    }

    #[test]
    fn json_report() {
        let report = AlignmentReport::new(&aligned_model(), &IndexMap::new());
        let json: serde_json::Value = serde_json::from_str(&assert_ok!(report.to_json())).unwrap();
        assert_eq!(json["executionRoot"]["originalGAV"], "org.acme.gradle:root:1.0.1");
        assert_eq!(json["executionRoot"]["version"], "1.0.1.redhat-00002");
        assert_eq!(json["modules"].as_array().map(Vec::len), Some(3));
        assert_eq!(json["modules"][1]["gav"]["groupId"], "org.acme.gradle");
        assert_eq!(
            json["modules"][0]["dependencies"]["org.hibernate:hibernate-core:5.3.7.Final"]["version"],
            "5.3.7.Final-redhat-00001"
        );
        assert!(json["modules"][0].get("path").is_none());
    }

    #[test]
    fn writes_configured_reports_only() {
        let dir = TempDir::new().unwrap();
        let report = AlignmentReport::new(&aligned_model(), &IndexMap::new());

        assert!(assert_ok!(report.write(dir.path(), "", "")).is_empty());
        assert!(!dir.path().join("build").exists());

        let written = assert_ok!(report.write(dir.path(), "", "alignmentReport.json"));
        assert_eq!(written, vec![dir.path().join("build/alignmentReport.json")]);
        assert!(!dir.path().join("build/alignmentReport.txt").exists());
    }
}
