use std::collections::HashMap;

use image::RgbImage;
use log::debug;
use serde::{Deserialize, Serialize};

use crate::error::ClassifyError;
use crate::legend::{ColorLegend, Interval, Rgb};

/// Offset applied to an open bound so the representative value stays
/// inside the open-ended bucket when it is encoded back into a color.
pub const DELTA: f64 = 1.0;

/// Pixel rectangle cut out of every forecast map
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CropRect {
    pub x: u32,
    pub y: u32,
    pub width: u32,
    pub height: u32,
}

impl Default for CropRect {
    fn default() -> Self {
        Self {
            x: 160,
            y: 200,
            width: 200,
            height: 200,
        }
    }
}

/// Distinct colors found in a cropped region, with pixel counts
#[derive(Debug, Clone, Default)]
pub struct ObservedColorSet {
    counts: HashMap<Rgb, u32>,
}

impl ObservedColorSet {
    pub fn from_image(region: &RgbImage) -> Self {
        let mut counts = HashMap::new();
        for pixel in region.pixels() {
            *counts.entry(Rgb::from(*pixel)).or_insert(0) += 1;
        }
        Self { counts }
    }

    pub fn len(&self) -> usize {
        self.counts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.counts.is_empty()
    }

    pub fn count(&self, color: Rgb) -> u32 {
        self.counts.get(&color).copied().unwrap_or(0)
    }

    pub fn colors(&self) -> impl Iterator<Item = Rgb> + '_ {
        self.counts.keys().copied()
    }
}

impl FromIterator<Rgb> for ObservedColorSet {
    fn from_iter<I: IntoIterator<Item = Rgb>>(iter: I) -> Self {
        let mut counts = HashMap::new();
        for color in iter {
            *counts.entry(color).or_insert(0) += 1;
        }
        Self { counts }
    }
}

/// Legend bucket chosen for one forecast map
#[derive(Debug, Clone, PartialEq)]
pub struct Classification {
    pub index: usize,
    pub interval: Interval,
    pub display_value: String,
    pub representative_value: f64,
}

impl Classification {
    /// Resolve a legend index into its interval, label and representative value
    pub fn from_index(legend: &ColorLegend, index: usize) -> Self {
        let interval = legend.interval_for_index(index);
        let representative_value = match (interval.lower, interval.upper) {
            (None, Some(upper)) => upper - DELTA,
            (Some(lower), None) => lower + DELTA,
            (Some(lower), Some(upper)) => (lower + upper) / 2.0,
            // a legend always has at least one bound
            (None, None) => 0.0,
        };

        Self {
            index,
            interval,
            display_value: interval.to_string(),
            representative_value,
        }
    }
}

/// Pick the highest legend index among the observed colors.
/// Colors missing from the legend (grid lines, borders, labels) are ignored.
pub fn select_index(observed: &ObservedColorSet, legend: &ColorLegend) -> Option<usize> {
    observed
        .colors()
        .filter_map(|color| legend.index_of(color))
        .max()
}

/// Classify an already cropped RGB region
pub fn classify_region(
    region: &RgbImage,
    legend: &ColorLegend,
) -> Result<Classification, ClassifyError> {
    let observed = ObservedColorSet::from_image(region);
    debug!(
        "{} distinct colors in {}x{} region",
        observed.len(),
        region.width(),
        region.height()
    );

    let index = select_index(&observed, legend).ok_or(ClassifyError::NoMatch {
        width: region.width(),
        height: region.height(),
    })?;

    let classification = Classification::from_index(legend, index);
    debug!(
        "selected legend index {} ({})",
        index, classification.display_value
    );
    Ok(classification)
}

/// Decode image bytes, crop the configured rectangle and classify it.
/// The crop is clamped to the image bounds; alpha is dropped.
pub fn classify_image(
    bytes: &[u8],
    crop: CropRect,
    legend: &ColorLegend,
) -> Result<Classification, ClassifyError> {
    let image = image::load_from_memory(bytes)?;
    let region = image
        .crop_imm(crop.x, crop.y, crop.width, crop.height)
        .to_rgb8();
    classify_region(&region, legend)
}
