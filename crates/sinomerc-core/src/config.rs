//! Host-supplied projection settings.
//!
//! The host decides once whether its tiles are in GCJ-02 and builds a
//! [`crate::mercator::SphericalMercator`] from that decision. Nothing here is
//! global; two projections with different modes can coexist.
use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;

/// Which datum the plane is drawn in.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DatumMode {
    /// Plane coordinates are plain WGS-84; no correction.
    #[default]
    Wgs84,
    /// Plane coordinates are GCJ-02; WGS-84 input is shifted on the way in and
    /// recovered on the way out.
    Gcj02,
}

impl DatumMode {
    pub fn from_flag(use_distorted_datum: bool) -> Self {
        if use_distorted_datum {
            Self::Gcj02
        } else {
            Self::Wgs84
        }
    }

    pub fn is_distorted(self) -> bool {
        self == Self::Gcj02
    }
}

/// Serialized form of the host configuration.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ProjectionConfig {
    /// Apply the GCJ-02 correction in project/unproject.
    #[serde(alias = "use_distorted_datum")]
    pub use_distorted_datum: bool,
}

impl ProjectionConfig {
    pub fn new(use_distorted_datum: bool) -> Self {
        Self { use_distorted_datum }
    }

    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let text = fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_json(&text)
    }

    pub fn datum_mode(&self) -> DatumMode {
        DatumMode::from_flag(self.use_distorted_datum)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_object_defaults_to_wgs84() {
        let cfg = ProjectionConfig::from_json("{}").unwrap();
        assert!(!cfg.use_distorted_datum);
        assert_eq!(cfg.datum_mode(), DatumMode::Wgs84);
    }

    #[test]
    fn camel_and_snake_case_keys_are_accepted() {
        let cfg = ProjectionConfig::from_json(r#"{"useDistortedDatum": true}"#).unwrap();
        assert_eq!(cfg.datum_mode(), DatumMode::Gcj02);
        let cfg = ProjectionConfig::from_json(r#"{"use_distorted_datum": true}"#).unwrap();
        assert!(cfg.use_distorted_datum);
    }

    #[test]
    fn malformed_json_is_a_parse_error() {
        let err = ProjectionConfig::from_json(r#"{"useDistortedDatum": "yes"}"#).unwrap_err();
        assert!(matches!(err, ConfigError::Parse(_)));
        assert!(err.to_string().starts_with("invalid projection config"));
    }

    #[test]
    fn missing_file_is_an_io_error() {
        let err = ProjectionConfig::load("/nonexistent/sinomerc.json").unwrap_err();
        assert!(matches!(err, ConfigError::Io { .. }));
    }

    #[test]
    fn datum_mode_serializes_lowercase() {
        assert_eq!(serde_json::to_string(&DatumMode::Gcj02).unwrap(), r#""gcj02""#);
    }
}
