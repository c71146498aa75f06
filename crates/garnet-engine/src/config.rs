//! Translator configuration
//!
//! Options are read from a `garnet.toml` file. Every field has a default, so
//! an empty file (or no file at all) is valid.
//!
//! ```toml
//! lazy_translation_core = true
//! lazy_translation_user = false
//! profile_arguments = true
//! log_dynamic_constant_lookup = false
//! core_load_path = "<core>/"
//! ```

use serde::Deserialize;
use std::path::Path;
use thiserror::Error;

/// Result type for configuration loading
pub type ConfigResult<T> = Result<T, ConfigError>;

/// Configuration loading errors
#[derive(Debug, Error)]
pub enum ConfigError {
    /// The file could not be read
    #[error("Failed to read {path}: {source}")]
    Io {
        /// Path that was read
        path: String,
        /// Underlying I/O error
        source: std::io::Error,
    },

    /// The file is not valid TOML for these options
    #[error("Invalid translator options: {0}")]
    Parse(#[from] toml::de::Error),
}

/// Options controlling the lowering pass
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct TranslatorOptions {
    /// Defer method bodies of core (trusted library) sources until first call
    pub lazy_translation_core: bool,
    /// Defer method bodies of user sources until first call
    pub lazy_translation_user: bool,
    /// Wrap argument reads in profiling nodes
    pub profile_arguments: bool,
    /// Log every constant read that needs dynamic lexical lookup
    pub log_dynamic_constant_lookup: bool,
    /// Source name prefix identifying core library files
    pub core_load_path: String,
}

impl Default for TranslatorOptions {
    fn default() -> Self {
        Self {
            lazy_translation_core: true,
            lazy_translation_user: false,
            profile_arguments: true,
            log_dynamic_constant_lookup: false,
            core_load_path: "<core>/".to_string(),
        }
    }
}

impl TranslatorOptions {
    /// Parse options from TOML text
    pub fn from_toml_str(text: &str) -> ConfigResult<Self> {
        Ok(toml::from_str(text)?)
    }

    /// Load options from a TOML file
    pub fn from_file(path: impl AsRef<Path>) -> ConfigResult<Self> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.display().to_string(),
            source,
        })?;
        Self::from_toml_str(&text)
    }

    /// Whether a source name lies under the core load path
    pub fn is_core_path(&self, source_name: &str) -> bool {
        !self.core_load_path.is_empty() && source_name.starts_with(&self.core_load_path)
    }
}
