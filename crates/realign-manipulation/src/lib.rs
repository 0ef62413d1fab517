// Copyright © Aptos Foundation
// SPDX-License-Identifier: Apache-2.0

//! Application of a recorded alignment to a build. Dependency versions are replaced while
//! the build resolves them, forced modules and strict constraints of build configurations
//! are rewritten, and the build's lock files and scripts are updated on disk.

#![forbid(unsafe_code)]

pub mod configuration;
mod error;
mod manipulate;
pub mod resolver;

pub use configuration::{
    BuildConfiguration, ConfigurationState, ExternalDependency, OverrideDependenciesAction,
};
pub use error::{Error, Result};
pub use manipulate::{ManipulationSummary, Manipulator};
pub use resolver::{
    AlignedDependencyResolver, DependencyResolveDetails, Replacement, Resolution,
    ResolvedDependenciesRepository,
};
