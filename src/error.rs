use thiserror::Error;

/// Raised when a color legend is built from inconsistent data
#[derive(Error, Debug, Clone, PartialEq)]
pub enum LegendError {
    #[error("legend '{name}': {colors} colors do not match {bounds} bounds (need one more color than bounds)")]
    LengthMismatch {
        name: String,
        colors: usize,
        bounds: usize,
    },
    #[error("legend '{0}' needs at least one bound")]
    NoBounds(String),
    #[error("legend '{name}': bound {index} is not a finite number")]
    NonFiniteBound { name: String, index: usize },
    #[error("legend '{name}': bounds must be strictly increasing ({previous} followed by {next})")]
    NotIncreasing {
        name: String,
        previous: f64,
        next: f64,
    },
}

/// Per-image classification failures
#[derive(Error, Debug)]
pub enum ClassifyError {
    #[error("no legend color found in the {width}x{height} crop")]
    NoMatch { width: u32, height: u32 },
    #[error("failed to decode image: {0}")]
    Decode(#[from] image::ImageError),
}

/// Per-request fetch failures
#[derive(Error, Debug)]
pub enum FetchError {
    #[error("HTTP {status}: {url}")]
    Status {
        status: reqwest::StatusCode,
        url: String,
    },
    #[error("request failed: {0}")]
    Transport(#[from] reqwest::Error),
}
