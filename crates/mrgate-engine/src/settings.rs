//! Engine settings loaded from TOML
//!
//! ```toml
//! [logging]
//! profile = "production"
//!
//! [features]
//! multiple_approval_rules = false
//! ```
//!
//! Missing sections and keys take their defaults.

use mrgate_core::errors::{MrgateError, Result};
use mrgate_core::features::LicensedFeatures;
use mrgate_core::logging_facility::{self, Profile};
use serde::Deserialize;
use std::path::Path;

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct LoggingSettings {
    pub profile: Profile,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct EngineSettings {
    pub logging: LoggingSettings,
    pub features: LicensedFeatures,
}

impl EngineSettings {
    /// Parse settings from a TOML document
    ///
    /// # Errors
    ///
    /// Returns `MrgateError::InvalidSettings` if the document is not valid
    /// TOML or contains values of the wrong type.
    pub fn from_toml_str(document: &str) -> Result<Self> {
        toml::from_str(document).map_err(|e| MrgateError::InvalidSettings {
            message: e.to_string(),
        })
    }

    /// Read and parse a settings file
    ///
    /// # Errors
    ///
    /// Returns `MrgateError::InvalidSettings` if the file cannot be read or
    /// parsed.
    pub fn load(path: &Path) -> Result<Self> {
        let document =
            std::fs::read_to_string(path).map_err(|e| MrgateError::InvalidSettings {
                message: format!("{}: {}", path.display(), e),
            })?;
        Self::from_toml_str(&document)
    }

    /// Install the global subscriber for the configured profile
    pub fn init_logging(&self) {
        logging_facility::init(self.logging.profile);
    }
}
