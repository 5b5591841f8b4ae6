use anyhow::{anyhow, Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

use crate::classify::CropRect;

/// Run hours published by the models, in report order
pub const STANDARD_RUN_HOURS: [u32; 4] = [0, 6, 12, 18];

/// One forecast model column of the report
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ModelConfig {
    /// Column header, e.g. "EU"
    pub label: String,
    /// Model code used in the image URL, e.g. "ez"
    pub code: String,
    #[serde(default = "default_run_hours")]
    pub run_hours: Vec<u32>,
}

impl ModelConfig {
    pub fn new(label: &str, code: &str, run_hours: &[u32]) -> Self {
        Self {
            label: label.to_string(),
            code: code.to_string(),
            run_hours: run_hours.to_vec(),
        }
    }

    pub fn publishes_at(&self, run_hour: u32) -> bool {
        self.run_hours.contains(&run_hour)
    }
}

fn default_run_hours() -> Vec<u32> {
    STANDARD_RUN_HOURS.to_vec()
}

fn default_models() -> Vec<ModelConfig> {
    let all: &[u32] = &STANDARD_RUN_HOURS;
    let main_runs: &[u32] = &[0, 12];
    vec![
        ModelConfig::new("4x4", "swisseu", all),
        ModelConfig::new("EZ4", "ezswiss", all),
        ModelConfig::new("HD", "deuhd", all),
        ModelConfig::new("CH", "swissmrf", all),
        ModelConfig::new("EU", "ez", main_runs),
        ModelConfig::new("GB", "gbr", all),
        ModelConfig::new("DE", "deu", all),
        ModelConfig::new("US", "usa", all),
        ModelConfig::new("CA", "can", main_runs),
        ModelConfig::new("AU", "aus", all),
    ]
}

/// Settings for a summary run. Every field falls back to the built-in
/// Kachelmann setup for the Chisinau region when missing from the file.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Page visited first to open a session with the image cache
    pub start_url: String,
    /// Base of the cached model image URLs
    pub image_base_url: String,
    pub user_agent: String,
    pub zoom_region: u32,
    /// Kilometres per pixel at the zoom region
    pub zoom_resolution_km: f64,
    pub crop: CropRect,
    pub param_code: u32,
    pub param_name: String,
    pub location: String,
    pub output_dir: PathBuf,
    pub archive_dir: PathBuf,
    pub models: Vec<ModelConfig>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            start_url: "https://kachelmannwetter.com/de/modellkarten/euro".to_string(),
            image_base_url: "https://img1.kachelmannwetter.com/images/data/cache/model".to_string(),
            user_agent: "Mozilla/5.0 (X11; Ubuntu; Linux x86_64; rv:98.0) Gecko/20100101 Firefox/98.0"
                .to_string(),
            zoom_region: 21747,
            zoom_resolution_km: 0.4,
            crop: CropRect::default(),
            param_code: 63,
            param_name: "24-hr Accumulated Total Precipitation [mm]".to_string(),
            location: "Chisinau".to_string(),
            output_dir: PathBuf::from("."),
            archive_dir: PathBuf::from("./archive"),
            models: default_models(),
        }
    }
}

impl Config {
    /// Load a JSON config file, or the defaults when no path is given
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let config = match path {
            Some(path) => {
                let content = fs::read_to_string(path)
                    .with_context(|| format!("failed to read config file {}", path.display()))?;
                Self::from_json(&content)
                    .with_context(|| format!("invalid config file {}", path.display()))?
            }
            None => Self::default(),
        };
        config.validate()?;
        Ok(config)
    }

    pub fn from_json(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn validate(&self) -> Result<()> {
        if self.models.is_empty() {
            return Err(anyhow!("at least one model must be configured"));
        }
        for (i, model) in self.models.iter().enumerate() {
            if self.models[..i].iter().any(|m| m.label == model.label) {
                return Err(anyhow!("model label {} is configured more than once", model.label));
            }
            if model.run_hours.is_empty() {
                return Err(anyhow!("model {} has no run hours", model.label));
            }
            if let Some(hour) = model
                .run_hours
                .iter()
                .find(|h| !STANDARD_RUN_HOURS.contains(h))
            {
                return Err(anyhow!(
                    "model {} has run hour {}, expected one of {:?}",
                    model.label,
                    hour,
                    STANDARD_RUN_HOURS
                ));
            }
        }
        if self.crop.width == 0 || self.crop.height == 0 {
            return Err(anyhow!("crop rectangle must not be empty"));
        }
        Ok(())
    }

    /// Size of the cropped region on the ground, in km
    pub fn region_size_km(&self) -> (f64, f64) {
        (
            self.crop.width as f64 * self.zoom_resolution_km,
            self.crop.height as f64 * self.zoom_resolution_km,
        )
    }
}
