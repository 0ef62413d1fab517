// Copyright © Aptos Foundation
// SPDX-License-Identifier: Apache-2.0

use crate::{
    customizer::CustomizerPipeline,
    error::{Error, Result},
    response::AlignmentResponse,
};
use async_trait::async_trait;
use realign_types::Gav;
use serde::{Deserialize, Serialize};
use std::{collections::BTreeMap, fs, path::Path, sync::Arc};
use tracing::{debug, info};

/// The coordinates a build asks the oracle about.
#[derive(Clone, Debug, Default, Eq, PartialEq, Serialize, Deserialize)]
pub struct AlignmentRequest {
    /// The build's own modules.
    pub project: Vec<Gav>,
    /// Every distinct dependency declared by any module.
    pub dependencies: Vec<Gav>,
}

impl AlignmentRequest {
    pub fn new(project: Vec<Gav>, dependencies: Vec<Gav>) -> Self {
        Self {
            project,
            dependencies,
        }
    }

    /// Project coordinates followed by dependency coordinates.
    pub fn all(&self) -> impl Iterator<Item = &Gav> {
        self.project.iter().chain(self.dependencies.iter())
    }
}

/// The alignment oracle: maps requested coordinates to the versions they must be replaced
/// with. A failure must be reported as an error, never as an empty answer.
#[async_trait]
pub trait AlignmentService: Send + Sync {
    async fn align(&self, request: &AlignmentRequest) -> Result<AlignmentResponse>;
}

#[async_trait]
impl<S: AlignmentService + ?Sized> AlignmentService for Arc<S> {
    async fn align(&self, request: &AlignmentRequest) -> Result<AlignmentResponse> {
        (**self).align(request).await
    }
}

/// One answer of a translation file.
#[derive(Clone, Debug, Eq, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TranslationEntry {
    pub group_id: String,
    pub artifact_id: String,
    pub version: String,
    pub aligned_version: String,
}

/// An oracle answering from a fixed table of translations.
#[derive(Clone, Debug, Default)]
pub struct StaticAlignmentService {
    translations: BTreeMap<Gav, String>,
}

impl StaticAlignmentService {
    pub fn new(translations: BTreeMap<Gav, String>) -> Self {
        Self { translations }
    }

    pub fn from_entries(entries: impl IntoIterator<Item = TranslationEntry>) -> Self {
        Self::new(
            entries
                .into_iter()
                .map(|entry| {
                    (
                        Gav::new(entry.group_id, entry.artifact_id, entry.version),
                        entry.aligned_version,
                    )
                })
                .collect(),
        )
    }

    /// Reads a JSON array of `{groupId, artifactId, version, alignedVersion}` objects.
    pub fn from_file(path: &Path) -> Result<Self> {
        let contents =
            fs::read_to_string(path).map_err(|err| Error::IO(path.display().to_string(), err))?;
        let entries: Vec<TranslationEntry> = serde_json::from_str(&contents)
            .map_err(|err| Error::Json(path.display().to_string(), err))?;
        Ok(Self::from_entries(entries))
    }

    pub fn len(&self) -> usize {
        self.translations.len()
    }

    pub fn is_empty(&self) -> bool {
        self.translations.is_empty()
    }
}

#[async_trait]
impl AlignmentService for StaticAlignmentService {
    async fn align(&self, request: &AlignmentRequest) -> Result<AlignmentResponse> {
        let translation_map: BTreeMap<Gav, String> = request
            .all()
            .filter_map(|gav| {
                self.translations
                    .get(gav)
                    .map(|version| (gav.clone(), version.clone()))
            })
            .collect();
        debug!(
            requested = request.project.len() + request.dependencies.len(),
            answered = translation_map.len(),
            "Answered alignment request from translation table"
        );
        Ok(AlignmentResponse::new(translation_map))
    }
}

/// Runs the delegate oracle and passes its answer through the customizer pipeline.
pub struct WithCustomizersAlignmentService<S> {
    delegate: S,
    customizers: CustomizerPipeline,
}

impl<S: AlignmentService> WithCustomizersAlignmentService<S> {
    pub fn new(delegate: S, customizers: CustomizerPipeline) -> Self {
        Self {
            delegate,
            customizers,
        }
    }
}

#[async_trait]
impl<S: AlignmentService> AlignmentService for WithCustomizersAlignmentService<S> {
    async fn align(&self, request: &AlignmentRequest) -> Result<AlignmentResponse> {
        let mut response = self.delegate.align(request).await?;
        info!(
            customizers = self.customizers.len(),
            "Customizing alignment response"
        );
        self.customizers.apply(&mut response, request)?;
        Ok(response)
    }
}
