use chrono::{Duration, NaiveDate, NaiveDateTime};
use log::{info, warn};
use reqwest::Client;

use crate::config::{Config, ModelConfig};
use crate::error::FetchError;

/// One model run and the forecast hour requested from it
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ModelRun {
    pub run_date: NaiveDate,
    pub run_hour: u32,
    pub forecast_hour: u32,
}

impl ModelRun {
    /// Run of the day before `report_date` at `run_hour` UTC, forecasting the
    /// 24 h accumulation valid at 00 UTC on the day after `report_date`.
    pub fn for_report(report_date: NaiveDate, run_hour: u32) -> Self {
        let run_date = report_date - Duration::days(1);
        let run_time = run_date.and_hms_opt(0, 0, 0).unwrap_or_default() + Duration::hours(run_hour as i64);
        let valid_time = valid_time(report_date);
        let forecast_hour = (valid_time - run_time).num_hours().max(0) as u32;

        Self {
            run_date,
            run_hour,
            forecast_hour,
        }
    }

    /// Run identifier as used by the image cache, e.g. `2026101806`
    pub fn run_id(&self) -> String {
        format!("{}{:02}", self.run_date.format("%Y%m%d"), self.run_hour)
    }
}

/// Time at which the summarized forecasts are valid
pub fn valid_time(report_date: NaiveDate) -> NaiveDateTime {
    (report_date + Duration::days(1))
        .and_hms_opt(0, 0, 0)
        .unwrap_or_default()
}

/// Source of forecast map images, one request per model run
#[allow(async_fn_in_trait)]
pub trait Fetcher {
    async fn fetch(&self, model: &ModelConfig, run: &ModelRun) -> Result<Vec<u8>, FetchError>;
}

/// Client for the kachelmannwetter.com model image cache
pub struct KachelmannAPI {
    client: Client,
    start_url: String,
    image_base_url: String,
    zoom_region: u32,
    param_code: u32,
}

impl KachelmannAPI {
    /// Create a new client with a cookie store, so the session opened by
    /// `start_session` is reused for the image requests
    pub fn new(config: &Config) -> Result<Self, FetchError> {
        let client = Client::builder()
            .user_agent(config.user_agent.as_str())
            .cookie_store(true)
            .build()?;

        Ok(Self {
            client,
            start_url: config.start_url.clone(),
            image_base_url: config.image_base_url.trim_end_matches('/').to_string(),
            zoom_region: config.zoom_region,
            param_code: config.param_code,
        })
    }

    /// Visit the model map page so the image cache accepts later requests
    pub async fn start_session(&self) -> Result<(), FetchError> {
        info!("Opening session at {}", self.start_url);
        let response = self.client.get(&self.start_url).send().await?;

        if !response.status().is_success() {
            return Err(FetchError::Status {
                status: response.status(),
                url: self.start_url.clone(),
            });
        }
        Ok(())
    }

    /// Build the complete URL for a model image
    pub fn build_url(&self, model: &ModelConfig, run: &ModelRun) -> String {
        format!(
            "{}/download_model-de-999-1-xz_mod{}_{}_{}_{}_{}.png",
            self.image_base_url,
            model.code,
            run.run_id(),
            run.forecast_hour,
            self.zoom_region,
            self.param_code
        )
    }
}

impl Fetcher for KachelmannAPI {
    async fn fetch(&self, model: &ModelConfig, run: &ModelRun) -> Result<Vec<u8>, FetchError> {
        let url = self.build_url(model, run);
        info!("Fetching image from: {}", url);

        let response = self.client.get(&url).send().await?;
        let status = response.status();
        if !status.is_success() {
            warn!("Image fetch failed with status {}: {}", status, url);
            return Err(FetchError::Status { status, url });
        }

        let bytes = response.bytes().await?;
        info!("Successfully fetched {} bytes from {}", bytes.len(), url);
        Ok(bytes.to_vec())
    }
}
