// Copyright © Aptos Foundation
// SPDX-License-Identifier: Apache-2.0

//! Calculation of the new project version.
//!
//! Versions are suffixed with `-<suffix>-<increment>`, e.g. `1.2.3-redhat-00004`, where the
//! increment is one more than the highest increment already in use for the same base
//! version.

use realign_config::AlignmentConfig;
use regex::Regex;
use tracing::debug;

const SNAPSHOT_SUFFIX: &str = "-SNAPSHOT";

/// Strips a trailing `-SNAPSHOT`, ignoring case.
pub fn strip_snapshot(version: &str) -> &str {
    let split = version.len().saturating_sub(SNAPSHOT_SUFFIX.len());
    match version.get(split..) {
        Some(tail) if tail.eq_ignore_ascii_case(SNAPSHOT_SUFFIX) => &version[..split],
        _ => version,
    }
}

/// Splits `version` into the part before an incremental `suffix` and the increment.
fn split_incremental<'a>(version: &'a str, suffix: &str) -> (&'a str, Option<u64>) {
    let pattern = Regex::new(&format!(r"^(?P<base>.*)-{}-(?P<increment>\d+)$", regex::escape(suffix)));
    let captures = pattern.ok().and_then(|pattern| {
        pattern.captures(version).and_then(|captures| {
            let base = captures.name("base")?;
            let increment = captures.name("increment")?.as_str().parse().ok()?;
            Some((base.end(), increment))
        })
    });
    match captures {
        Some((end, increment)) => (&version[..end], Some(increment)),
        None => (version, None),
    }
}

fn with_increment(base: &str, suffix: &str, padding: usize, increment: u64) -> String {
    format!("{}-{}-{:0width$}", base, suffix, increment, width = padding)
}

/// The version following `original` under the incremental `suffix`:
/// `5.0.2.RELEASE` becomes `5.0.2.RELEASE-redhat-00001` and `5.3.7.Final-redhat-00009`
/// becomes `5.3.7.Final-redhat-00010` with a padding of 5.
pub fn next_version(original: &str, suffix: &str, padding: usize) -> String {
    let (base, increment) = split_incremental(original, suffix);
    with_increment(base, suffix, padding, increment.map_or(1, |increment| increment + 1))
}

/// Derives the new project version from the configured versioning rules.
#[derive(Clone, Debug)]
pub struct VersionCalculator {
    version_override: Option<String>,
    version_suffix: Option<String>,
    incremental_suffix: String,
    padding: usize,
    preserve_snapshot: bool,
}

impl VersionCalculator {
    pub fn new(config: &AlignmentConfig) -> Self {
        Self {
            version_override: config.version_override.clone(),
            version_suffix: config.version_suffix.clone(),
            incremental_suffix: config.version_incremental_suffix.clone(),
            padding: config.version_incremental_suffix_padding,
            preserve_snapshot: config.version_suffix_snapshot,
        }
    }

    /// Calculates the version replacing `version`. `candidates` are versions already
    /// produced for this project elsewhere, such as in an earlier alignment or in the
    /// oracle's answer, whose increments must not be reused.
    pub fn calculate<'a, I>(&self, version: &str, candidates: I) -> String
    where
        I: IntoIterator<Item = &'a str>,
    {
        if let Some(version_override) = &self.version_override {
            return version_override.clone();
        }

        let version = if self.preserve_snapshot {
            version
        } else {
            strip_snapshot(version)
        };

        if let Some(suffix) = &self.version_suffix {
            let (base, snapshot) = split_snapshot(version);
            let tail = format!("-{}", suffix);
            if base.ends_with(&tail) {
                return version.to_string();
            }
            return format!("{}{}{}", base, tail, snapshot);
        }

        let (version, snapshot) = split_snapshot(version);
        let (base, current) = split_incremental(version, &self.incremental_suffix);
        let mut highest = current.unwrap_or(0);
        for candidate in candidates {
            let (candidate_base, increment) =
                split_incremental(strip_snapshot(candidate.trim()), &self.incremental_suffix);
            if let Some(increment) = increment {
                if candidate_base == base && increment > highest {
                    debug!(candidate, "Found higher increment among version candidates");
                    highest = increment;
                }
            }
        }
        format!(
            "{}{}",
            with_increment(base, &self.incremental_suffix, self.padding, highest + 1),
            snapshot
        )
    }
}

/// Separates a preserved `-SNAPSHOT` so suffixes go in front of it.
fn split_snapshot(version: &str) -> (&str, &str) {
    let base = strip_snapshot(version);
    (base, &version[base.len()..])
}
