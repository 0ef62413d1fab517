// Copyright © Aptos Foundation
// SPDX-License-Identifier: Apache-2.0

//! Dependency lock files: one `group:artifact:version=scope,scope` entry per line, with
//! `#` comment lines.
//!
//! A module keeps its locks either in a single `gradle.lockfile` next to its build script or
//! in one `*.lockfile` per configuration under `gradle/dependency-locks`.

use crate::error::{Error, Result};
use realign_types::{is_dynamic, Gav};
use regex::Regex;
use std::{
    collections::{BTreeMap, BTreeSet},
    fs,
    path::{Path, PathBuf},
};
use tracing::{debug, info};

pub const LOCK_FILE_NAME: &str = "gradle.lockfile";
pub const LOCKS_DIR: &str = "gradle/dependency-locks";
pub const LOCK_FILE_EXTENSION: &str = "lockfile";

const COMMENT_PREFIX: char = '#';
const SCOPES_SEPARATOR: char = '=';

/// Lock files of the module rooted at `module_dir`, in a stable order. A module without a
/// locks directory simply has none there.
pub fn find_lock_files(module_dir: &Path) -> Result<Vec<PathBuf>> {
    let mut lock_files = Vec::new();

    let single = module_dir.join(LOCK_FILE_NAME);
    if single.is_file() {
        lock_files.push(single);
    }

    let locks_dir = module_dir.join(LOCKS_DIR);
    if !locks_dir.exists() {
        return Ok(lock_files);
    }
    let entries =
        fs::read_dir(&locks_dir).map_err(|e| Error::IO(locks_dir.display().to_string(), e))?;
    let mut per_configuration = Vec::new();
    for entry in entries {
        let path = entry
            .map_err(|e| Error::IO(locks_dir.display().to_string(), e))?
            .path();
        if path.is_file()
            && path.extension().and_then(|ext| ext.to_str()) == Some(LOCK_FILE_EXTENSION)
        {
            per_configuration.push(path);
        }
    }
    per_configuration.sort();
    lock_files.extend(per_configuration);
    Ok(lock_files)
}

/// The coordinate locked by one lock-file line, ignoring comments and lines that do not
/// carry a full `group:artifact:version`.
pub fn parse_lock_line(line: &str) -> Option<Gav> {
    if line.starts_with(COMMENT_PREFIX) {
        return None;
    }
    let coordinate = line
        .trim_end()
        .split(SCOPES_SEPARATOR)
        .next()
        .unwrap_or_default();
    let mut parts = coordinate.split(':');
    match (parts.next(), parts.next(), parts.next()) {
        (Some(group), Some(artifact), Some(version))
            if !group.is_empty() && !artifact.is_empty() && !version.is_empty() =>
        {
            Some(Gav::new(group, artifact, version))
        },
        _ => None,
    }
}

/// Every coordinate locked by any lock file of the module at `module_dir`.
pub fn read_lock_file_gavs(module_dir: &Path) -> Result<BTreeSet<Gav>> {
    let mut gavs = BTreeSet::new();
    for lock_file in find_lock_files(module_dir)? {
        let contents = fs::read_to_string(&lock_file)
            .map_err(|e| Error::IO(lock_file.display().to_string(), e))?;
        gavs.extend(contents.lines().filter_map(parse_lock_line));
    }
    Ok(gavs)
}

/***************************************************************************************************
 * Rewriting
 *
 **************************************************************************************************/
#[derive(Debug)]
enum Matcher {
    /// Matches the literal key as the whole coordinate of a line.
    Exact { pattern: Regex, replacement: String },
    /// Matches any locked version of the key's `group:artifact`.
    Dynamic { pattern: Regex, prefix: String, version: String },
}

impl Matcher {
    fn new(key: &str, replacement: &Gav) -> Result<Self> {
        let original = Gav::parse(key)?;
        if is_dynamic(original.version())? {
            let prefix = format!("{}:{}:", original.group(), original.artifact());
            let pattern = Regex::new(&format!(
                r"^{}[^{}]+(?P<scopes>{}.*)?$",
                regex::escape(&prefix),
                SCOPES_SEPARATOR,
                SCOPES_SEPARATOR
            ))
            .map_err(|_| realign_types::Error::InvalidCoordinate(key.to_string(), "not matchable"))?;
            Ok(Self::Dynamic {
                pattern,
                prefix,
                version: replacement.version().to_string(),
            })
        } else {
            let pattern = Regex::new(&format!(
                r"^{}(?P<scopes>{}.*)?$",
                regex::escape(key),
                SCOPES_SEPARATOR
            ))
            .map_err(|_| realign_types::Error::InvalidCoordinate(key.to_string(), "not matchable"))?;
            Ok(Self::Exact {
                pattern,
                replacement: replacement.to_string(),
            })
        }
    }

    fn is_dynamic(&self) -> bool {
        matches!(self, Self::Dynamic { .. })
    }

    fn apply(&self, line: &str) -> Option<String> {
        let (pattern, head) = match self {
            Self::Exact {
                pattern,
                replacement,
            } => (pattern, replacement.clone()),
            Self::Dynamic {
                pattern,
                prefix,
                version,
            } => (pattern, format!("{}{}", prefix, version)),
        };
        let captures = pattern.captures(line)?;
        let scopes = captures.name("scopes").map_or("", |scopes| scopes.as_str());
        Some(format!("{}{}", head, scopes))
    }
}

/// Substitutes aligned coordinates into lock files.
///
/// Replacements are keyed by the canonical string of the originally declared coordinate.
/// A key with a fixed version only matches a line locking exactly that coordinate, and the
/// whole coordinate is replaced. A key with a dynamic version matches every line locking
/// the same `group:artifact`, whatever version was locked, and only the version changes.
/// Two dynamic keys sharing a `group:artifact` therefore compete for the same lines: the
/// first one in key order wins. Exact keys are always tried before dynamic ones.
#[derive(Debug)]
pub struct LockFileRewriter {
    matchers: Vec<Matcher>,
}

impl LockFileRewriter {
    pub fn new(replacements: &BTreeMap<String, Gav>) -> Result<Self> {
        let mut matchers = replacements
            .iter()
            .map(|(key, replacement)| Matcher::new(key, replacement))
            .collect::<Result<Vec<_>>>()?;
        // Stable, so key order is kept within each kind.
        matchers.sort_by_key(Matcher::is_dynamic);
        Ok(Self { matchers })
    }

    pub fn is_empty(&self) -> bool {
        self.matchers.is_empty()
    }

    /// Rewrites `contents`, returning `None` when no line matched. Line terminators,
    /// comments and unmatched lines are kept byte for byte.
    pub fn rewrite(&self, contents: &str) -> Option<String> {
        let mut modified = false;
        let mut result = String::with_capacity(contents.len());

        for raw_line in contents.split_inclusive('\n') {
            let line = raw_line.trim_end_matches(['\n', '\r']);
            let terminator = &raw_line[line.len()..];

            if line.starts_with(COMMENT_PREFIX) {
                result.push_str(raw_line);
                continue;
            }
            match self.matchers.iter().find_map(|matcher| matcher.apply(line)) {
                Some(rewritten) => {
                    debug!(from = line, to = %rewritten, "Rewriting lock file entry");
                    modified = true;
                    result.push_str(&rewritten);
                    result.push_str(terminator);
                },
                None => result.push_str(raw_line),
            }
        }

        modified.then_some(result)
    }

    /// Rewrites one lock file in place, returning whether it changed.
    pub fn rewrite_file(&self, path: &Path) -> Result<bool> {
        let contents =
            fs::read_to_string(path).map_err(|e| Error::IO(path.display().to_string(), e))?;
        match self.rewrite(&contents) {
            Some(updated) => {
                fs::write(path, updated).map_err(|e| Error::IO(path.display().to_string(), e))?;
                info!(path = %path.display(), "Updated lock file");
                Ok(true)
            },
            None => Ok(false),
        }
    }

    /// Rewrites every lock file of the module at `module_dir`, returning those that changed.
    pub fn update_module(&self, module_dir: &Path) -> Result<Vec<PathBuf>> {
        if self.is_empty() {
            return Ok(Vec::new());
        }
        let mut updated = Vec::new();
        for lock_file in find_lock_files(module_dir)? {
            if self.rewrite_file(&lock_file)? {
                updated.push(lock_file);
            }
        }
        Ok(updated)
    }
}
