// Copyright © Aptos Foundation
// SPDX-License-Identifier: Apache-2.0

use crate::error::{Error, Result};
use realign_model::DuplicatePolicy;
use realign_rewriter::PluginRemover;
use realign_types::OverrideKey;
use serde::{Deserialize, Serialize};
use std::{
    collections::{BTreeMap, BTreeSet},
    str::FromStr,
};
use tracing::debug;

/// Properties starting with this prefix declare a dependency override; the remainder of
/// the property name is a `group:artifact@moduleSpec` override key.
pub const DEPENDENCY_OVERRIDE_PREFIX: &str = "dependencyOverride.";

pub const REPORT_JSON_OUTPUT_FILE: &str = "alignmentReport.json";

const DEFAULT_INCREMENTAL_SUFFIX: &str = "redhat";
const DEFAULT_INCREMENTAL_SUFFIX_PADDING: usize = 5;

/// Settings of an alignment and of the manipulation that applies it.
///
/// Loaded from YAML, then optionally overlaid with `key=value` properties.
#[derive(Clone, Debug, Deserialize, PartialEq, Eq, Serialize)]
#[serde(default, deny_unknown_fields, rename_all = "camelCase")]
pub struct AlignmentConfig {
    /// Override key to replacement version. An empty version excludes the dependency from
    /// alignment in the matching modules.
    pub dependency_override: BTreeMap<String, String>,
    /// Whether the project version is changed at all.
    pub version_modification: bool,
    /// Forces the new project version.
    pub version_override: Option<String>,
    /// Static suffix appended to the project version instead of an incremental one.
    pub version_suffix: Option<String>,
    pub version_incremental_suffix: String,
    /// Width to which the increment of an incremental suffix is zero padded.
    pub version_incremental_suffix_padding: usize,
    /// Keeps `-SNAPSHOT` on the project version rather than stripping it.
    pub version_suffix_snapshot: bool,
    /// Plugin ids to strip from build scripts.
    pub plugin_removal: BTreeSet<String>,
    pub duplicate_child_policy: DuplicatePolicy,
    /// Lists dependencies the oracle had no aligned version for in the reports.
    pub report_non_aligned: bool,
    /// Text report file name under the root build directory; empty disables it.
    pub report_txt_output_file: String,
    /// JSON report file name under the root build directory; empty disables it.
    pub report_json_output_file: String,
}

impl Default for AlignmentConfig {
    fn default() -> Self {
        Self {
            dependency_override: BTreeMap::new(),
            version_modification: true,
            version_override: None,
            version_suffix: None,
            version_incremental_suffix: DEFAULT_INCREMENTAL_SUFFIX.to_string(),
            version_incremental_suffix_padding: DEFAULT_INCREMENTAL_SUFFIX_PADDING,
            version_suffix_snapshot: false,
            plugin_removal: BTreeSet::new(),
            duplicate_child_policy: DuplicatePolicy::default(),
            report_non_aligned: false,
            report_txt_output_file: String::new(),
            report_json_output_file: REPORT_JSON_OUTPUT_FILE.to_string(),
        }
    }
}

impl AlignmentConfig {
    /// Overlays a single `key=value` property, using the same names as the YAML document.
    pub fn apply_property(&mut self, key: &str, value: &str) -> Result<()> {
        debug!(key, value, "Applying configuration property");

        if let Some(override_key) = key.strip_prefix(DEPENDENCY_OVERRIDE_PREFIX) {
            OverrideKey::parse(override_key)?;
            self.dependency_override
                .insert(override_key.to_string(), value.to_string());
            return Ok(());
        }

        match key {
            "versionModification" => self.version_modification = parse_value(key, value)?,
            "versionOverride" => self.version_override = non_empty(value),
            "versionSuffix" => self.version_suffix = non_empty(value),
            "versionIncrementalSuffix" => self.version_incremental_suffix = value.to_string(),
            "versionIncrementalSuffixPadding" => {
                self.version_incremental_suffix_padding = parse_value(key, value)?
            },
            "versionSuffixSnapshot" => self.version_suffix_snapshot = parse_value(key, value)?,
            "pluginRemoval" => {
                self.plugin_removal = value
                    .split(',')
                    .map(str::trim)
                    .filter(|plugin| !plugin.is_empty())
                    .map(str::to_string)
                    .collect()
            },
            "duplicateChildPolicy" => {
                self.duplicate_child_policy = match value {
                    "lastWriteWins" => DuplicatePolicy::LastWriteWins,
                    "error" => DuplicatePolicy::Error,
                    _ => return Err(invalid_value(key, value)),
                }
            },
            "reportNonAligned" => self.report_non_aligned = parse_value(key, value)?,
            "reportTxtOutputFile" => self.report_txt_output_file = value.to_string(),
            "reportJsonOutputFile" => self.report_json_output_file = value.to_string(),
            _ => return Err(Error::UnknownProperty(key.to_string())),
        }
        Ok(())
    }

    pub fn apply_properties<'a, I>(&mut self, properties: I) -> Result<()>
    where
        I: IntoIterator<Item = (&'a str, &'a str)>,
    {
        for (key, value) in properties {
            self.apply_property(key, value)?;
        }
        Ok(())
    }

    /// The configured dependency overrides, parsed, in key order.
    pub fn dependency_overrides(&self) -> Result<Vec<(OverrideKey, String)>> {
        self.dependency_override
            .iter()
            .map(|(key, version)| Ok((OverrideKey::parse(key)?, version.clone())))
            .collect()
    }

    pub fn plugin_remover(&self) -> Result<PluginRemover> {
        Ok(PluginRemover::new(&self.plugin_removal)?)
    }

    /// Fails fast on anything that would only be detected midway through a run.
    pub fn validate(&self) -> Result<()> {
        self.dependency_overrides()?;
        self.plugin_remover()?;
        if self.version_modification
            && self.version_override.is_none()
            && self.version_suffix.is_none()
            && self.version_incremental_suffix.is_empty()
        {
            return Err(Error::Missing("versionIncrementalSuffix"));
        }
        Ok(())
    }
}

fn parse_value<T: FromStr>(key: &str, value: &str) -> Result<T> {
    value.trim().parse().map_err(|_| invalid_value(key, value))
}

fn invalid_value(key: &str, value: &str) -> Error {
    Error::InvalidValue {
        key: key.to_string(),
        value: value.to_string(),
    }
}

fn non_empty(value: &str) -> Option<String> {
    (!value.is_empty()).then(|| value.to_string())
}
