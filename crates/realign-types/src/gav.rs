// Copyright © Aptos Foundation
// SPDX-License-Identifier: Apache-2.0

use crate::error::{Error, Result};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::{
    fmt::{self, Display},
    str::FromStr,
};

/// A coordinate component equal to this matches any value on the other side.
pub const WILDCARD: &str = "*";

/***************************************************************************************************
 * Versionless coordinate
 *
 **************************************************************************************************/
/// A versionless `group:artifact` coordinate, used to match dependencies and modules
/// independently of the version they are declared with.
#[derive(Clone, Debug, Eq, Hash, Ord, PartialEq, PartialOrd)]
pub struct Ga {
    group: String,
    artifact: String,
}

impl Ga {
    pub fn new(group: impl Into<String>, artifact: impl Into<String>) -> Self {
        Self {
            group: group.into(),
            artifact: artifact.into(),
        }
    }

    /// Parses `group:artifact`. Both components must be present and non-empty.
    pub fn parse(s: &str) -> Result<Self> {
        let mut parts = s.split(':');
        match (parts.next(), parts.next(), parts.next()) {
            (Some(group), Some(artifact), None) if !group.is_empty() && !artifact.is_empty() => {
                Ok(Self::new(group, artifact))
            },
            _ => Err(Error::InvalidCoordinate(
                s.to_string(),
                "expected the form 'group:artifact'",
            )),
        }
    }

    pub fn group(&self) -> &str {
        &self.group
    }

    pub fn artifact(&self) -> &str {
        &self.artifact
    }

    /// Exact group and artifact equality, where a `*` component on either side matches
    /// anything.
    pub fn matches(&self, other: &Ga) -> bool {
        component_matches(&self.group, &other.group)
            && component_matches(&self.artifact, &other.artifact)
    }

    pub fn with_version(&self, version: impl Into<String>) -> Gav {
        Gav::new(self.group.clone(), self.artifact.clone(), version)
    }
}

fn component_matches(left: &str, right: &str) -> bool {
    left == WILDCARD || right == WILDCARD || left == right
}

impl Display for Ga {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.group, self.artifact)
    }
}

impl FromStr for Ga {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        Self::parse(s)
    }
}

impl Serialize for Ga {
    fn serialize<S>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        self.to_string().serialize(serializer)
    }
}

impl<'de> Deserialize<'de> for Ga {
    fn deserialize<D>(deserializer: D) -> std::result::Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        Ga::parse(&s).map_err(serde::de::Error::custom)
    }
}

/***************************************************************************************************
 * Versioned coordinate
 *
 **************************************************************************************************/
/// An immutable `group:artifact:version` coordinate. Equality, ordering and the canonical
/// string form are all by exact field match.
#[derive(Clone, Debug, Eq, Hash, Ord, PartialEq, PartialOrd, Serialize, Deserialize)]
pub struct Gav {
    #[serde(rename = "groupId")]
    group: String,
    #[serde(rename = "artifactId")]
    artifact: String,
    version: String,
}

impl Gav {
    pub fn new(
        group: impl Into<String>,
        artifact: impl Into<String>,
        version: impl Into<String>,
    ) -> Self {
        Self {
            group: group.into(),
            artifact: artifact.into(),
            version: version.into(),
        }
    }

    /// Parses `group:artifact:version`. All three components must be non-empty.
    pub fn parse(s: &str) -> Result<Self> {
        let parts: Vec<&str> = s.split(':').collect();
        if parts.len() != 3 {
            return Err(Error::InvalidCoordinate(
                s.to_string(),
                "expected the form 'group:artifact:version'",
            ));
        }
        if parts.iter().any(|part| part.is_empty()) {
            return Err(Error::InvalidCoordinate(
                s.to_string(),
                "group, artifact and version must not be empty",
            ));
        }
        Ok(Self::new(parts[0], parts[1], parts[2]))
    }

    pub fn group(&self) -> &str {
        &self.group
    }

    pub fn artifact(&self) -> &str {
        &self.artifact
    }

    pub fn version(&self) -> &str {
        &self.version
    }

    /// The versionless projection of this coordinate.
    pub fn ga(&self) -> Ga {
        Ga::new(self.group.clone(), self.artifact.clone())
    }

    /// Returns a copy of this coordinate carrying `version` instead.
    pub fn with_version(&self, version: impl Into<String>) -> Gav {
        Gav::new(self.group.clone(), self.artifact.clone(), version)
    }
}

impl Display for Gav {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}:{}", self.group, self.artifact, self.version)
    }
}

impl FromStr for Gav {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        Self::parse(s)
    }
}
