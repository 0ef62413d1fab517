// Copyright © Aptos Foundation
// SPDX-License-Identifier: Apache-2.0

//! The manipulation model: a tree mirroring the module structure of a build, where every
//! node records the dependency replacements decided for that module during alignment.
//! The tree is persisted as `manipulation.json` at the build root and read back when the
//! replacements are applied.

#![forbid(unsafe_code)]

mod cache;
mod error;
mod io;
mod model;

pub use cache::ManipulationModelCache;
pub use error::{Error, Result};
pub use io::{
    manipulation_file, read_manipulation_model, read_manipulation_model_if_exists,
    write_manipulation_model, MANIPULATION_FILE_NAME,
};
pub use model::{module_dir, DuplicatePolicy, ManipulationModel, ROOT_PATH};
