// Copyright © Aptos Foundation
// SPDX-License-Identifier: Apache-2.0

use crate::{
    error::{Error, Result},
    gav::{Ga, WILDCARD},
};
use std::{
    fmt::{self, Display},
    str::FromStr,
};

const MODULE_SEPARATOR: char = '@';

/// Selects the modules an override applies to.
#[derive(Clone, Debug, Eq, Hash, PartialEq)]
pub enum ModuleMatcher {
    /// `*`: every module.
    Any,
    /// A `group:artifact` pattern, compared with [`Ga::matches`].
    Module(Ga),
}

impl ModuleMatcher {
    pub fn parse(spec: &str) -> Result<Self> {
        if spec == WILDCARD {
            return Ok(Self::Any);
        }
        Ga::parse(spec).map(Self::Module)
    }

    pub fn matches(&self, module: &Ga) -> bool {
        match self {
            Self::Any => true,
            Self::Module(pattern) => pattern.matches(module),
        }
    }
}

impl Display for ModuleMatcher {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Any => write!(f, "{}", WILDCARD),
            Self::Module(ga) => write!(f, "{}", ga),
        }
    }
}

/// A parsed `<group>:<artifact>@<moduleSpec>` configuration key: the dependency being
/// overridden and the modules in which the override takes effect.
#[derive(Clone, Debug, Eq, Hash, PartialEq)]
pub struct OverrideKey {
    target: Ga,
    module_matcher: ModuleMatcher,
}

impl OverrideKey {
    pub fn new(target: Ga, module_matcher: ModuleMatcher) -> Self {
        Self {
            target,
            module_matcher,
        }
    }

    pub fn parse(key: &str) -> Result<Self> {
        let invalid = |reason| Error::InvalidOverrideKey(key.to_string(), reason);

        if !key.contains(MODULE_SEPARATOR) {
            return Err(invalid("missing '@' module separator"));
        }
        let parts: Vec<&str> = key.split(MODULE_SEPARATOR).collect();
        if parts.len() != 2 {
            return Err(invalid("expected exactly one '@' module separator"));
        }

        let target = Ga::parse(parts[0])
            .map_err(|_| invalid("dependency must be of the form 'group:artifact'"))?;
        let module_matcher = ModuleMatcher::parse(parts[1])
            .map_err(|_| invalid("module must be '*' or of the form 'group:artifact'"))?;

        Ok(Self::new(target, module_matcher))
    }

    pub fn target(&self) -> &Ga {
        &self.target
    }

    pub fn module_matcher(&self) -> &ModuleMatcher {
        &self.module_matcher
    }

    /// Whether the override applies within `module`.
    pub fn applies_to(&self, module: &Ga) -> bool {
        self.module_matcher.matches(module)
    }
}

/// The overrides taking effect within `module` as `(target, version)` pairs. Overrides naming
/// the module come before overrides for every module, each group in the given order, and
/// only the first override of a target is kept.
pub fn applicable_overrides(overrides: &[(OverrideKey, String)], module: &Ga) -> Vec<(Ga, String)> {
    let (specific, any): (Vec<_>, Vec<_>) = overrides
        .iter()
        .filter(|(key, _)| key.applies_to(module))
        .partition(|(key, _)| matches!(key.module_matcher(), ModuleMatcher::Module(_)));

    let mut applicable: Vec<(Ga, String)> = Vec::with_capacity(specific.len() + any.len());
    for (key, version) in specific.into_iter().chain(any) {
        if !applicable.iter().any(|(target, _)| target == key.target()) {
            applicable.push((key.target().clone(), version.clone()));
        }
    }
    applicable
}

impl Display for OverrideKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}{}", self.target, MODULE_SEPARATOR, self.module_matcher)
    }
}

impl FromStr for OverrideKey {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        Self::parse(s)
    }
}
