//! Maximum forecast precipitation around a fixed location, read off the
//! model maps of the kachelmannwetter.com image cache.
//!
//! Each map is cropped to a fixed square, the most intense legend color in
//! the square is looked up in the [`ColorLegend`], and the resulting
//! intervals are gathered in a [`ReportTable`] of model runs that renders as
//! text or as a color-highlighted HTML page.

pub mod classify;
pub mod config;
pub mod error;
pub mod fetch;
pub mod legend;
pub mod render;
pub mod report;
pub mod summary;

pub use classify::{classify_image, Classification, CropRect, DELTA};
pub use config::{Config, ModelConfig};
pub use error::{ClassifyError, FetchError, LegendError};
pub use fetch::{Fetcher, KachelmannAPI, ModelRun};
pub use legend::{kachelmann_precip_24h, ColorLegend, Interval, Rgb};
pub use report::{CellState, ReportTable, MISSING};
pub use summary::build_report;
