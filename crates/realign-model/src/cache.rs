// Copyright © Aptos Foundation
// SPDX-License-Identifier: Apache-2.0

use crate::{error::Result, io::read_manipulation_model_if_exists, model::ManipulationModel};
use std::{
    collections::HashMap,
    path::{Path, PathBuf},
};

/// Parsed model files, keyed by build root directory.
///
/// A cache is owned by a single session and dropped with it, so a model file is parsed at
/// most once per session however many modules consult it.
#[derive(Debug, Default)]
pub struct ManipulationModelCache {
    models: HashMap<PathBuf, Option<ManipulationModel>>,
}

impl ManipulationModelCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// The model persisted under `root_dir`, if any. Absence is cached as well.
    pub fn get_or_load(&mut self, root_dir: &Path) -> Result<Option<&ManipulationModel>> {
        if !self.models.contains_key(root_dir) {
            let model = read_manipulation_model_if_exists(root_dir)?;
            self.models.insert(root_dir.to_path_buf(), model);
        }
        Ok(self.models.get(root_dir).and_then(Option::as_ref))
    }

    /// Replaces the cached model of `root_dir`, typically right after writing it.
    pub fn insert(&mut self, root_dir: &Path, model: ManipulationModel) {
        self.models.insert(root_dir.to_path_buf(), Some(model));
    }

    pub fn invalidate(&mut self, root_dir: &Path) {
        self.models.remove(root_dir);
    }

    pub fn len(&self) -> usize {
        self.models.len()
    }

    pub fn is_empty(&self) -> bool {
        self.models.is_empty()
    }
}
