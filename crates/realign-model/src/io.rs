// Copyright © Aptos Foundation
// SPDX-License-Identifier: Apache-2.0

use crate::{
    error::{Error, Result},
    model::ManipulationModel,
};
use std::{
    fs,
    path::{Path, PathBuf},
};
use tracing::debug;

/// The model file written at the root of the build.
pub const MANIPULATION_FILE_NAME: &str = "manipulation.json";

pub fn manipulation_file(root_dir: &Path) -> PathBuf {
    root_dir.join(MANIPULATION_FILE_NAME)
}

/// Reads the model persisted under `root_dir`.
pub fn read_manipulation_model(root_dir: &Path) -> Result<ManipulationModel> {
    let path = manipulation_file(root_dir);
    let contents =
        fs::read_to_string(&path).map_err(|e| Error::IO(path.display().to_string(), e))?;
    serde_json::from_str(&contents).map_err(|e| Error::Json(path.display().to_string(), e))
}

/// Like [`read_manipulation_model`], but a build without a model file yields `None`.
pub fn read_manipulation_model_if_exists(root_dir: &Path) -> Result<Option<ManipulationModel>> {
    if !manipulation_file(root_dir).is_file() {
        return Ok(None);
    }
    read_manipulation_model(root_dir).map(Some)
}

/// Writes `model` under `root_dir`, replacing any existing model file, and returns the path
/// written.
pub fn write_manipulation_model(root_dir: &Path, model: &ManipulationModel) -> Result<PathBuf> {
    let path = manipulation_file(root_dir);
    let mut contents = serde_json::to_string_pretty(model)
        .map_err(|e| Error::Json(path.display().to_string(), e))?;
    contents.push('\n');
    fs::write(&path, contents).map_err(|e| Error::IO(path.display().to_string(), e))?;
    debug!(path = %path.display(), "Wrote manipulation model");
    Ok(path)
}
