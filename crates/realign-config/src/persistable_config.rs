// Copyright © Aptos Foundation
// SPDX-License-Identifier: Apache-2.0

use crate::{
    alignment_config::AlignmentConfig,
    error::{Error, Result},
};
use serde::{de::DeserializeOwned, Serialize};
use std::{fs, path::Path};

pub trait PersistableConfig: Serialize + DeserializeOwned {
    /// Load the config from disk at the given path
    fn load_config<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let contents =
            fs::read_to_string(path).map_err(|e| Error::IO(path.display().to_string(), e))?;
        serde_yaml::from_str(&contents).map_err(|e| Error::Yaml(path.display().to_string(), e))
    }

    /// Save the config to disk at the given output path
    fn save_config<P: AsRef<Path>>(&self, output_file: P) -> Result<()> {
        let output_file = output_file.as_ref();
        let serialized = serde_yaml::to_string(&self)
            .map_err(|e| Error::Yaml(output_file.display().to_string(), e))?;
        fs::write(output_file, serialized)
            .map_err(|e| Error::IO(output_file.display().to_string(), e))
    }

    /// Parse the config from the serialized string
    fn parse_serialized_config(serialized_config: &str) -> Result<Self> {
        serde_yaml::from_str(serialized_config).map_err(|e| Error::Yaml("config".to_string(), e))
    }
}

impl PersistableConfig for AlignmentConfig {}
