use std::fs;
use std::path::Path;

use serde::Deserialize;

use crate::error::{Error, Result};

/// Parameters of one `fit` call.
///
/// Every field is optional when deserialized:
///
/// ```json
/// { "epochs": 5000, "learning_rate": 0.5, "batch_size": 4, "save_history": false }
/// ```
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct FitConfig {
    pub epochs: usize,
    pub learning_rate: f64,
    /// Columns per batch; `None` processes all columns as a single batch.
    pub batch_size: Option<usize>,
    /// Keep a parameter snapshot for every batch.
    pub save_history: bool,
    pub show_progress: bool,
}

impl Default for FitConfig {
    fn default() -> Self {
        Self {
            epochs: 1,
            learning_rate: 0.1,
            batch_size: None,
            save_history: true,
            show_progress: false,
        }
    }
}

impl FitConfig {
    pub fn new(epochs: usize, learning_rate: f64) -> Self {
        Self {
            epochs,
            learning_rate,
            ..Self::default()
        }
    }

    pub fn batch_size(self, batch_size: usize) -> Self {
        Self {
            batch_size: Some(batch_size),
            ..self
        }
    }

    pub fn save_history(self, save_history: bool) -> Self {
        Self {
            save_history,
            ..self
        }
    }

    pub fn show_progress(self, show_progress: bool) -> Self {
        Self {
            show_progress,
            ..self
        }
    }

    pub fn from_json_str(json: &str) -> Result<Self> {
        let config: FitConfig = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let contents = fs::read_to_string(path)?;
        FitConfig::from_json_str(&contents)
    }

    pub fn validate(&self) -> Result<()> {
        if !(self.learning_rate.is_finite() && self.learning_rate > 0.0) {
            return Err(Error::InvalidConfig(format!(
                "learning rate must be positive and finite, got {}",
                self.learning_rate
            )));
        }
        if self.batch_size == Some(0) {
            return Err(Error::EmptyBatch {
                operation: "fit configuration",
            });
        }
        Ok(())
    }
}
