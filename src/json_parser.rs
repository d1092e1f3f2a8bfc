use crate::error::{MantleError, Result};
use serde::de::DeserializeOwned;
use std::fs;
use std::path::Path;

/// JSON loading for the data files the crate consumes (minerals, seismic
/// tables, tomography sections, scenario configs).
///
/// Nothing is cached; every call reads the source again.
pub struct JsonParser;

impl JsonParser {
    /// Read a JSON file straight into a typed structure
    pub fn from_file<T: DeserializeOwned, P: AsRef<Path>>(file_path: P) -> Result<T> {
        let json_str = Self::read(file_path.as_ref())?;
        Ok(serde_json::from_str(&json_str)?)
    }

    pub fn from_str<T: DeserializeOwned>(json_str: &str) -> Result<T> {
        Ok(serde_json::from_str(json_str)?)
    }

    fn read(path: &Path) -> Result<String> {
        fs::read_to_string(path).map_err(|source| MantleError::Io {
            path: path.to_path_buf(),
            source,
        })
    }
}
