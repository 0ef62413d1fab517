// Copyright © Aptos Foundation
// SPDX-License-Identifier: Apache-2.0

//! Leaf types shared by every stage of dependency alignment: `group:artifact:version`
//! coordinates, the version selector classifier and the `group:artifact@module` override
//! keys read from configuration.

#![forbid(unsafe_code)]

pub mod error;
pub mod gav;
pub mod override_key;
pub mod version;

pub use error::{Error, Result};
pub use gav::{Ga, Gav, WILDCARD};
pub use override_key::{applicable_overrides, ModuleMatcher, OverrideKey};
pub use version::{is_dynamic, VersionSelector};
