use std::path::PathBuf;

use thiserror::Error;

/// Failures of the checked datum operations. The unchecked ones never fail.
#[derive(Debug, Error)]
pub enum DatumError {
    #[error("GCJ-02 inverse did not converge after {iterations} iterations (last estimate {lon}, {lat})")]
    DidNotConverge { iterations: u32, lon: f64, lat: f64 },
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid projection config: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("cannot read projection config {}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}
