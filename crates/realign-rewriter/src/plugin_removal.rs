// Copyright © Aptos Foundation
// SPDX-License-Identifier: Apache-2.0

//! Removal of build plugins from Groovy and Kotlin build scripts.
//!
//! A plugin is removed in two steps: its configuration block (`gradleEnterprise { ... }`) is
//! cut out using a bracket counting scanner that ignores `//` comments, then every line
//! mentioning the plugin id is dropped. The scripts are never parsed.

use crate::error::{Error, Result};
use regex::Regex;
use std::{
    fs,
    path::{Path, PathBuf},
};
use tracing::{debug, info, trace};
use walkdir::{DirEntry, WalkDir};

/// Plugins that can be removed, with the keyword that opens their configuration block.
pub const SUPPORTED_PLUGINS: &[(&str, &str)] = &[
    ("com.github.ben-manes.versions", "dependencyUpdates"),
    ("com.github.burrunan.s3-build-cache", "buildCache"),
    ("gradle-enterprise", "gradleEnterprise"),
    ("signing", "signing"),
];

/// Script files examined in every directory of the build.
pub const BUILD_FILES: &[&str] = &[
    "build.gradle",
    "settings.gradle",
    "build.gradle.kts",
    "settings.gradle.kts",
];

/// Directories holding build output rather than sources.
const SKIPPED_DIRS: &[&str] = &["build", ".gradle", ".git"];

/// The configuration block keyword of a supported plugin.
pub fn configuration_block(plugin: &str) -> Option<&'static str> {
    SUPPORTED_PLUGINS
        .iter()
        .find(|(id, _)| *id == plugin)
        .map(|(_, keyword)| *keyword)
}

#[derive(Debug)]
struct PluginRemoval {
    plugin: String,
    keyword: &'static str,
    keyword_pattern: Regex,
}

/// Removes a configured set of plugins from build scripts.
#[derive(Debug)]
pub struct PluginRemover {
    removals: Vec<PluginRemoval>,
}

impl PluginRemover {
    /// Fails on the first plugin without known configuration block.
    pub fn new<I, S>(plugins: I) -> Result<Self>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let removals = plugins
            .into_iter()
            .map(|plugin| {
                let plugin = plugin.as_ref();
                let keyword = configuration_block(plugin)
                    .ok_or_else(|| Error::UnsupportedPlugin(plugin.to_string()))?;
                let keyword_pattern = Regex::new(&format!(r"(?:^|\s)({})\b", regex::escape(keyword)))
                    .map_err(|_| Error::UnsupportedPlugin(plugin.to_string()))?;
                Ok(PluginRemoval {
                    plugin: plugin.to_string(),
                    keyword,
                    keyword_pattern,
                })
            })
            .collect::<Result<Vec<_>>>()?;
        Ok(Self { removals })
    }

    pub fn is_empty(&self) -> bool {
        self.removals.is_empty()
    }

    /// Removes every configured plugin from `contents`. Returns `None` when nothing was
    /// removed. `file` is only used to report malformed scripts.
    pub fn remove_from_contents(&self, file: &str, contents: &str) -> Result<Option<String>> {
        let mut current = contents.to_string();
        let mut modified = false;

        for removal in &self.removals {
            debug!(
                plugin = %removal.plugin,
                keyword = removal.keyword,
                file,
                "Looking to remove plugin with its configuration block"
            );
            let mut removed = false;
            if let Some(updated) = removal.remove_block(file, &current)? {
                current = updated;
                removed = true;
            }
            if let Some(updated) = removal.remove_declarations(&current) {
                current = updated;
                removed = true;
            }
            modified |= removed;
            if removed {
                info!(plugin = %removal.plugin, file, "Removed instances of plugin");
            } else {
                trace!(plugin = %removal.plugin, file, "Plugin not found");
            }
        }

        Ok(modified.then_some(current))
    }

    /// Rewrites `path` in place when a plugin was removed from it.
    pub fn remove_from_file(&self, path: &Path) -> Result<bool> {
        let file = path.display().to_string();
        let contents = fs::read_to_string(path).map_err(|e| Error::IO(file.clone(), e))?;
        match self.remove_from_contents(&file, &contents)? {
            Some(updated) => {
                fs::write(path, updated).map_err(|e| Error::IO(file, e))?;
                Ok(true)
            },
            None => Ok(false),
        }
    }

    /// Processes every build script below `root_dir`, returning the scripts that changed.
    pub fn remove_from_tree(&self, root_dir: &Path) -> Result<Vec<PathBuf>> {
        let mut updated = Vec::new();
        if self.is_empty() {
            return Ok(updated);
        }

        let walker = WalkDir::new(root_dir)
            .sort_by_file_name()
            .into_iter()
            .filter_entry(|entry| entry.depth() == 0 || !is_skipped_dir(entry));
        for entry in walker {
            let entry = entry.map_err(|e| Error::Walk(root_dir.display().to_string(), e))?;
            if !entry.file_type().is_file() || !is_build_file(&entry) {
                continue;
            }
            if self.remove_from_file(entry.path())? {
                updated.push(entry.into_path());
            }
        }
        Ok(updated)
    }
}

fn is_skipped_dir(entry: &DirEntry) -> bool {
    entry.file_type().is_dir()
        && entry
            .file_name()
            .to_str()
            .is_some_and(|name| SKIPPED_DIRS.contains(&name))
}

fn is_build_file(entry: &DirEntry) -> bool {
    entry
        .file_name()
        .to_str()
        .is_some_and(|name| BUILD_FILES.contains(&name))
}

impl PluginRemoval {
    /// Cuts the first configuration block of the plugin, from its keyword through the
    /// matching closing bracket.
    fn remove_block(&self, file: &str, contents: &str) -> Result<Option<String>> {
        let Some(keyword) = self
            .keyword_pattern
            .captures(contents)
            .and_then(|captures| captures.get(1))
        else {
            return Ok(None);
        };

        let start = keyword.start();
        let end = block_end(contents.as_bytes(), keyword.end()).ok_or_else(|| {
            Error::MalformedBuildScript {
                file: file.to_string(),
                plugin: self.plugin.clone(),
                keyword: self.keyword.to_string(),
            }
        })?;
        debug!(
            plugin = %self.plugin,
            block = &contents[start..=end],
            "Removing plugin configuration block"
        );

        let mut updated = String::with_capacity(contents.len());
        updated.push_str(&contents[..start]);
        updated.push_str(&contents[end + 1..]);
        Ok(Some(updated))
    }

    /// Drops every line mentioning the plugin id, re-joining the survivors with the line
    /// terminator the script uses.
    fn remove_declarations(&self, contents: &str) -> Option<String> {
        if !contents.contains(self.plugin.as_str()) {
            return None;
        }

        let eol = detect_eol(contents);
        let kept: Vec<&str> = contents
            .lines()
            .filter(|line| !line.contains(self.plugin.as_str()))
            .collect();
        let mut updated = kept.join(eol);
        if !kept.is_empty() && contents.ends_with('\n') {
            updated.push_str(eol);
        }
        Some(updated)
    }
}

fn detect_eol(contents: &str) -> &'static str {
    if contents.contains("\r\n") {
        "\r\n"
    } else {
        "\n"
    }
}

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
enum ScanState {
    Normal,
    InLineComment,
}

/// Index of the bracket closing the block whose opening bracket is the first `{` at or
/// after `from`, or `None` when the brackets never balance.
fn block_end(text: &[u8], from: usize) -> Option<usize> {
    let mut index = from;
    while index < text.len() && text[index] != b'{' {
        index += 1;
    }
    if index >= text.len() {
        return None;
    }

    let mut depth = 1usize;
    let mut state = ScanState::Normal;
    index += 1;
    while index < text.len() {
        let current = text[index];
        match state {
            ScanState::InLineComment => {
                if current == b'\n' {
                    state = ScanState::Normal;
                }
            },
            ScanState::Normal => match current {
                b'/' if index + 1 < text.len() && text[index + 1] == b'/' => {
                    state = ScanState::InLineComment;
                    index += 1;
                },
                b'{' => depth += 1,
                b'}' => {
                    depth -= 1;
                    if depth == 0 {
                        return Some(index);
                    }
                },
                _ => {},
            },
        }
        index += 1;
    }
    None
}
