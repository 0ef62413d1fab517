// Copyright © Aptos Foundation
// SPDX-License-Identifier: Apache-2.0

//! Line-oriented rewriting of files the build tool owns: dependency lock files, whose
//! locked versions are replaced by aligned ones, and build scripts, from which unwanted
//! plugins and their configuration blocks are cut out. Neither file kind is parsed; every
//! untouched byte is written back as it was read.

#![forbid(unsafe_code)]

mod error;
pub mod lock_file;
pub mod plugin_removal;

pub use error::{Error, Result};
pub use lock_file::{find_lock_files, read_lock_file_gavs, LockFileRewriter};
pub use plugin_removal::{configuration_block, PluginRemover, BUILD_FILES, SUPPORTED_PLUGINS};
