//! Pipeline configuration.
//!
//! Every field has a default, so an empty JSON object (or no file at all) is
//! a valid configuration pointing at the ACORN-SAT station 087031 series.

use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::domain::PipelineError;
use crate::pipeline::clean::DEFAULT_SENTINEL;

pub const DEFAULT_MIN_URL: &str =
    "http://www.bom.gov.au/climate/change/acorn/sat/data/acorn.sat.minT.087031.daily.txt";
pub const DEFAULT_MAX_URL: &str =
    "http://www.bom.gov.au/climate/change/acorn/sat/data/acorn.sat.maxT.087031.daily.txt";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct PipelineConfig {
    pub min_url: String,
    pub max_url: String,

    /// Directory holding every artifact; created on first write.
    pub artifact_dir: PathBuf,

    /// Reading that marks a missing measurement.
    pub sentinel: f64,

    pub fetch_timeout_secs: u64,

    pub min_column: String,
    pub max_column: String,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            min_url: DEFAULT_MIN_URL.to_string(),
            max_url: DEFAULT_MAX_URL.to_string(),
            artifact_dir: PathBuf::from("artifacts"),
            sentinel: DEFAULT_SENTINEL,
            fetch_timeout_secs: 30,
            min_column: "min_temp".to_string(),
            max_column: "max_temp".to_string(),
        }
    }
}

impl PipelineConfig {
    /// Load a JSON file and validate it.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, PipelineError> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path).map_err(|e| {
            PipelineError::Config(format!("cannot read {}: {e}", path.display()))
        })?;
        let config: Self = serde_json::from_str(&text)
            .map_err(|e| PipelineError::Config(format!("{}: {e}", path.display())))?;
        config.validate()?;
        Ok(config)
    }

    pub fn from_json(text: &str) -> Result<Self, PipelineError> {
        let config: Self =
            serde_json::from_str(text).map_err(|e| PipelineError::Config(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), PipelineError> {
        let fail = |msg: &str| Err(PipelineError::Config(msg.to_string()));

        if self.min_url.trim().is_empty() || self.max_url.trim().is_empty() {
            return fail("min_url and max_url must not be empty");
        }
        if self.fetch_timeout_secs == 0 {
            return fail("fetch_timeout_secs must be positive");
        }
        if !self.sentinel.is_finite() {
            return fail("sentinel must be a finite number");
        }
        for column in [&self.min_column, &self.max_column] {
            if column.is_empty() || column == "date" || column.contains(['\t', '\n', '\r']) {
                return Err(PipelineError::Config(format!(
                    "invalid value column name {column:?}"
                )));
            }
        }
        if self.min_column == self.max_column {
            return fail("min_column and max_column must differ");
        }
        Ok(())
    }

    pub fn fetch_timeout(&self) -> Duration {
        Duration::from_secs(self.fetch_timeout_secs)
    }
}
