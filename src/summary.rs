use chrono::NaiveDate;
use log::{error, info, warn};

use crate::classify::classify_image;
use crate::config::Config;
use crate::fetch::{Fetcher, ModelRun};
use crate::legend::ColorLegend;
use crate::report::{CellState, ReportTable};

/// Fetch and classify every configured (model, run hour) one after the
/// other and collect the outcomes. Failures only leave their cell missing.
pub async fn build_report<F: Fetcher>(
    fetcher: &F,
    config: &Config,
    legend: &ColorLegend,
    report_date: NaiveDate,
) -> ReportTable {
    let run_date = ModelRun::for_report(report_date, 0).run_date;
    let mut table = ReportTable::new(run_date, &config.models);

    for model in &config.models {
        let mut run_hours = model.run_hours.clone();
        run_hours.sort_unstable();
        run_hours.dedup();

        for run_hour in run_hours {
            let run = ModelRun::for_report(report_date, run_hour);

            let state = match fetcher.fetch(model, &run).await {
                Ok(bytes) => match classify_image(&bytes, config.crop, legend) {
                    Ok(classification) => {
                        info!(
                            "{} {} +{}h: {}",
                            model.label,
                            run.run_id(),
                            run.forecast_hour,
                            classification.display_value
                        );
                        CellState::Classified(classification)
                    }
                    Err(e) => {
                        warn!("{} {}: {}", model.label, run.run_id(), e);
                        CellState::Unclassifiable
                    }
                },
                Err(e) => {
                    error!("{} {}: {}", model.label, run.run_id(), e);
                    CellState::FetchFailed
                }
            };

            table.record(run_hour, &model.label, state);
        }
    }

    info!(
        "Report for runs of {}: {} cells classified, {} missing",
        run_date,
        table.classified_count(),
        table.missing_count()
    );
    table
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::classify::CropRect;
    use crate::config::ModelConfig;
    use crate::error::FetchError;
    use crate::legend::Rgb;
    use crate::report::MISSING;
    use image::{DynamicImage, ImageOutputFormat, RgbImage};
    use std::cell::RefCell;
    use std::collections::HashMap;
    use std::io::Cursor;

    /// Serves canned images per (model code, run hour) and records requests
    struct StubFetcher {
        images: HashMap<(String, u32), Vec<u8>>,
        requests: RefCell<Vec<(String, u32, u32)>>,
    }

    impl Fetcher for StubFetcher {
        async fn fetch(&self, model: &ModelConfig, run: &ModelRun) -> Result<Vec<u8>, FetchError> {
            self.requests
                .borrow_mut()
                .push((model.code.clone(), run.run_hour, run.forecast_hour));
            self.images
                .get(&(model.code.clone(), run.run_hour))
                .cloned()
                .ok_or_else(|| FetchError::Status {
                    status: reqwest::StatusCode::NOT_FOUND,
                    url: format!("stub://{}/{}", model.code, run.run_id()),
                })
        }
    }

    fn png_of(color: Rgb) -> Vec<u8> {
        let image = RgbImage::from_pixel(4, 4, image::Rgb([color.0, color.1, color.2]));
        let mut bytes = Vec::new();
        DynamicImage::ImageRgb8(image)
            .write_to(&mut Cursor::new(&mut bytes), ImageOutputFormat::Png)
            .unwrap();
        bytes
    }

    fn test_setup() -> (Config, ColorLegend) {
        let legend = ColorLegend::new(
            "test",
            vec![1.0, 5.0],
            vec![Rgb(10, 10, 10), Rgb(20, 20, 20), Rgb(30, 30, 30)],
        )
        .unwrap();
        let config = Config {
            crop: CropRect { x: 0, y: 0, width: 4, height: 4 },
            models: vec![
                ModelConfig::new("DE", "deu", &[18, 0, 6, 12]),
                ModelConfig::new("EU", "ez", &[0, 12]),
            ],
            ..Config::default()
        };
        (config, legend)
    }

    #[tokio::test]
    async fn test_build_report() {
        let (config, legend) = test_setup();
        let mut images = HashMap::new();
        images.insert(("deu".to_string(), 0), png_of(Rgb(20, 20, 20)));
        images.insert(("deu".to_string(), 6), png_of(Rgb(1, 2, 3)));
        images.insert(("deu".to_string(), 12), b"not an image".to_vec());
        images.insert(("ez".to_string(), 12), png_of(Rgb(30, 30, 30)));
        let fetcher = StubFetcher { images, requests: RefCell::new(Vec::new()) };

        let report_date = NaiveDate::from_ymd_opt(2026, 10, 19).unwrap();
        let table = build_report(&fetcher, &config, &legend, report_date).await;

        assert_eq!(table.run_date(), NaiveDate::from_ymd_opt(2026, 10, 18).unwrap());
        assert_eq!(table.cell(6, "DE"), Some(&CellState::Unclassifiable));
        assert_eq!(table.cell(12, "DE"), Some(&CellState::Unclassifiable));
        assert_eq!(table.cell(18, "DE"), Some(&CellState::FetchFailed));
        assert_eq!(table.cell(0, "EU"), Some(&CellState::FetchFailed));
        assert_eq!(table.cell(6, "EU"), Some(&CellState::Unfetched));

        let display = table.display_grid();
        assert_eq!(display[0], ["1..5", MISSING]);
        assert_eq!(display[2], [MISSING, ">5"]);
        assert_eq!(table.value_grid()[2][1], Some(6.0));
        assert_eq!(table.classified_count(), 2);
    }

    #[tokio::test]
    async fn test_requests_follow_configured_order() {
        let (config, legend) = test_setup();
        let fetcher = StubFetcher { images: HashMap::new(), requests: RefCell::new(Vec::new()) };

        let report_date = NaiveDate::from_ymd_opt(2026, 10, 19).unwrap();
        let table = build_report(&fetcher, &config, &legend, report_date).await;

        let requests = fetcher.requests.into_inner();
        assert_eq!(
            requests,
            vec![
                ("deu".to_string(), 0, 48),
                ("deu".to_string(), 6, 42),
                ("deu".to_string(), 12, 36),
                ("deu".to_string(), 18, 30),
                ("ez".to_string(), 0, 48),
                ("ez".to_string(), 12, 36),
            ]
        );
        assert_eq!(table.classified_count(), 0);
        assert!(table.display_grid().iter().flatten().all(|v| v == MISSING));
    }
}
