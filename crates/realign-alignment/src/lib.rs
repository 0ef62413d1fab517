// Copyright © Aptos Foundation
// SPDX-License-Identifier: Apache-2.0

//! Alignment of a build's dependencies: the request sent to the alignment oracle, the
//! ordered customizers that turn its answer into per-module decisions, and the session that
//! records those decisions in the build's manipulation model.

#![forbid(unsafe_code)]

pub mod customizer;
mod error;
pub mod project;
pub mod project_version;
pub mod report;
mod response;
pub mod service;
mod session;

pub use customizer::{
    CustomizerPipeline, DependencyOverrideCustomizer, ResponseCustomizer,
    UpdateProjectVersionCustomizer,
};
pub use error::{Error, Result};
pub use project::{DeclaredDependency, ModuleDescriptor, ProjectDescriptor};
pub use project_version::{next_version, VersionCalculator};
pub use report::AlignmentReport;
pub use response::AlignmentResponse;
pub use service::{
    AlignmentRequest, AlignmentService, StaticAlignmentService, TranslationEntry,
    WithCustomizersAlignmentService,
};
pub use session::{AlignmentOutcome, AlignmentSession};
