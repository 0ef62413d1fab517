// Copyright © Aptos Foundation
// SPDX-License-Identifier: Apache-2.0

//! Classification of version strings into fixed versions and dynamic selectors.
//!
//! The accepted grammar follows the selector forms understood by Gradle:
//!
//! * ranges: `[1.0,2.0]`, `[1.0,2.0)`, `]1.0,2.0[`, `(,2.0]`, `[1.0,)`
//! * sub-versions: `1.+`, `+`
//! * latest selectors: `latest.release`, `latest.integration`
//!
//! A single-element range `[1.0]` pins exactly that version. Anything that opens or closes
//! like a range but does not fit the range grammar is rejected, as is `latest.` without a
//! status.

use crate::error::{Error, Result};
use once_cell::sync::Lazy;
use regex::Regex;
use std::fmt::{self, Display};

const LATEST_PREFIX: &str = "latest.";
const SUB_VERSION_SUFFIX: char = '+';

static RANGE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^[\[\]\(]\s*(?P<lower>[^,\[\]\(\)\s]*)\s*,\s*(?P<upper>[^,\[\]\(\)\s]*)\s*[\]\[\)]$")
        .unwrap()
});

static SINGLE_VALUE_RANGE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^\[\s*(?P<value>[^,\[\]\(\)\s]+)\s*\]$").unwrap());

/// The kind of selector a version string expresses.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum VersionSelector {
    /// A fixed version, including qualified ones such as `1.0.Final-redhat-00001`.
    Exact,
    Range,
    SubVersion,
    Latest,
}

impl VersionSelector {
    /// Classifies `version`. The empty string is a (degenerate) exact version.
    pub fn parse(version: &str) -> Result<Self> {
        if version.is_empty() {
            return Ok(Self::Exact);
        }

        if looks_like_range(version) {
            if SINGLE_VALUE_RANGE.is_match(version) {
                return Ok(Self::Exact);
            }
            return match RANGE.captures(version) {
                Some(captures)
                    if !captures["lower"].is_empty() || !captures["upper"].is_empty() =>
                {
                    Ok(Self::Range)
                },
                _ => Err(Error::UnknownVersionSelector(version.to_string())),
            };
        }

        if let Some(status) = version.strip_prefix(LATEST_PREFIX) {
            if status.is_empty() {
                return Err(Error::UnknownVersionSelector(version.to_string()));
            }
            return Ok(Self::Latest);
        }

        if version.ends_with(SUB_VERSION_SUFFIX) {
            return Ok(Self::SubVersion);
        }

        Ok(Self::Exact)
    }

    pub fn is_dynamic(self) -> bool {
        self != Self::Exact
    }
}

impl Display for VersionSelector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Exact => "exact",
            Self::Range => "range",
            Self::SubVersion => "sub-version",
            Self::Latest => "latest",
        };
        write!(f, "{}", name)
    }
}

fn looks_like_range(version: &str) -> bool {
    version.starts_with(['[', ']', '('])
        || (version.ends_with([']', '[', ')']) && version.contains(','))
}

/// Returns whether `version` is a dynamic selector rather than a fixed version.
///
/// Unrecognised selector syntax is an error rather than being silently treated as exact.
pub fn is_dynamic(version: &str) -> Result<bool> {
    Ok(VersionSelector::parse(version)?.is_dynamic())
}
