use std::fmt;

use crate::error::LegendError;

/// 8-bit RGB color as drawn on the forecast maps
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Rgb(pub u8, pub u8, pub u8);

impl Rgb {
    /// HTML hex notation, e.g. `#0482ff`
    pub fn to_hex(&self) -> String {
        format!("#{:02x}{:02x}{:02x}", self.0, self.1, self.2)
    }
}

impl From<image::Rgb<u8>> for Rgb {
    fn from(pixel: image::Rgb<u8>) -> Self {
        let [r, g, b] = pixel.0;
        Rgb(r, g, b)
    }
}

impl From<(u8, u8, u8)> for Rgb {
    fn from((r, g, b): (u8, u8, u8)) -> Self {
        Rgb(r, g, b)
    }
}

/// Value range covered by one legend color. `None` marks an open end.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Interval {
    pub lower: Option<f64>,
    pub upper: Option<f64>,
}

impl fmt::Display for Interval {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match (self.lower, self.upper) {
            (None, Some(upper)) => write!(f, "<{}", upper),
            (Some(lower), None) => write!(f, ">{}", lower),
            (Some(lower), Some(upper)) => write!(f, "{}..{}", lower, upper),
            (None, None) => write!(f, "any"),
        }
    }
}

/// Discrete color ramp: `colors[i]` stands for the values between
/// `bounds[i - 1]` and `bounds[i]`, with the first and last colors
/// covering everything below the first bound and above the last one.
#[derive(Debug, Clone, PartialEq)]
pub struct ColorLegend {
    name: String,
    bounds: Vec<f64>,
    colors: Vec<Rgb>,
}

impl ColorLegend {
    /// Build a legend, checking that there is exactly one more color than bounds
    /// and that the bounds are finite and strictly increasing.
    pub fn new(
        name: impl Into<String>,
        bounds: Vec<f64>,
        colors: Vec<Rgb>,
    ) -> Result<Self, LegendError> {
        let name = name.into();

        if colors.len() != bounds.len() + 1 {
            return Err(LegendError::LengthMismatch {
                name,
                colors: colors.len(),
                bounds: bounds.len(),
            });
        }
        if bounds.is_empty() {
            return Err(LegendError::NoBounds(name));
        }
        if let Some(index) = bounds.iter().position(|b| !b.is_finite()) {
            return Err(LegendError::NonFiniteBound { name, index });
        }
        if let Some(pair) = bounds.windows(2).find(|pair| pair[0] >= pair[1]) {
            return Err(LegendError::NotIncreasing {
                name,
                previous: pair[0],
                next: pair[1],
            });
        }

        Ok(Self {
            name,
            bounds,
            colors,
        })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn bounds(&self) -> &[f64] {
        &self.bounds
    }

    pub fn colors(&self) -> &[Rgb] {
        &self.colors
    }

    /// Number of colors (buckets)
    pub fn len(&self) -> usize {
        self.colors.len()
    }

    pub fn is_empty(&self) -> bool {
        self.colors.is_empty()
    }

    /// Interval represented by the color at `index`.
    ///
    /// Panics if `index` is not a valid color index.
    pub fn interval_for_index(&self, index: usize) -> Interval {
        assert!(
            index < self.colors.len(),
            "legend '{}' has no color index {}",
            self.name,
            index
        );

        let last = self.colors.len() - 1;
        match index {
            0 => Interval {
                lower: None,
                upper: Some(self.bounds[0]),
            },
            i if i == last => Interval {
                lower: Some(self.bounds[last - 1]),
                upper: None,
            },
            i => Interval {
                lower: Some(self.bounds[i - 1]),
                upper: Some(self.bounds[i]),
            },
        }
    }

    /// Color at `index`. Panics if `index` is not a valid color index.
    pub fn color_at(&self, index: usize) -> Rgb {
        self.colors[index]
    }

    /// Exact RGB lookup of a color in the ramp
    pub fn index_of(&self, color: Rgb) -> Option<usize> {
        self.colors.iter().position(|c| *c == color)
    }

    /// Bucket containing `value`: the number of bounds at or below it.
    /// Values under the first bound land in bucket 0, values at or over the
    /// last bound in the last bucket. NaN lands in bucket 0.
    pub fn bucket_for_value(&self, value: f64) -> usize {
        self.bounds.partition_point(|bound| *bound <= value)
    }

    /// Display color for `value`
    pub fn color_for_value(&self, value: f64) -> Rgb {
        self.color_at(self.bucket_for_value(value))
    }
}

const KACHELMANN_PRECIP_24H_BOUNDS: [f64; 25] = [
    0.1, 0.5, 1.0, 2.0, 3.0, 5.0, 7.0, 10.0, 15.0, 20.0, 25.0, 30.0, 35.0, 40.0, 45.0, 50.0, 60.0,
    70.0, 80.0, 90.0, 100.0, 125.0, 150.0, 200.0, 300.0,
];

const KACHELMANN_PRECIP_24H_COLORS: [(u8, u8, u8); 26] = [
    (240, 240, 240),
    (180, 215, 255),
    (117, 186, 255),
    (53, 154, 255),
    (4, 130, 255),
    (0, 105, 210),
    (0, 54, 127),
    (20, 143, 27),
    (26, 207, 5),
    (99, 237, 7),
    (255, 244, 43),
    (232, 220, 0),
    (240, 96, 0),
    (255, 127, 39),
    (255, 166, 106),
    (248, 78, 120),
    (247, 30, 84),
    (191, 0, 0),
    (136, 0, 0),
    (100, 0, 127),
    (194, 0, 251),
    (221, 102, 255),
    (235, 166, 255),
    (249, 230, 255),
    (212, 212, 212),
    (150, 150, 150),
];

/// Kachelmann accumulated 24 h precipitation scale in mm
pub fn kachelmann_precip_24h() -> Result<ColorLegend, LegendError> {
    ColorLegend::new(
        "Kachelmann Accumulated 24 h Precipitation",
        KACHELMANN_PRECIP_24H_BOUNDS.to_vec(),
        KACHELMANN_PRECIP_24H_COLORS.iter().copied().map(Rgb::from).collect(),
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    fn small_legend() -> ColorLegend {
        ColorLegend::new(
            "test",
            vec![1.0, 5.0],
            vec![Rgb(10, 10, 10), Rgb(20, 20, 20), Rgb(30, 30, 30)],
        )
        .unwrap()
    }

    #[test]
    fn test_length_mismatch_is_rejected() {
        let too_few = ColorLegend::new("bad", vec![1.0, 5.0], vec![Rgb(0, 0, 0), Rgb(1, 1, 1)]);
        assert!(matches!(too_few, Err(LegendError::LengthMismatch { colors: 2, bounds: 2, .. })));

        let too_many = ColorLegend::new("bad", vec![1.0], vec![Rgb(0, 0, 0); 3]);
        assert!(matches!(too_many, Err(LegendError::LengthMismatch { .. })));
    }

    #[test]
    fn test_invalid_bounds_are_rejected() {
        assert_eq!(
            ColorLegend::new("bad", vec![], vec![Rgb(0, 0, 0)]),
            Err(LegendError::NoBounds("bad".to_string()))
        );
        assert!(matches!(
            ColorLegend::new("bad", vec![1.0, f64::NAN], vec![Rgb(0, 0, 0); 3]),
            Err(LegendError::NonFiniteBound { index: 1, .. })
        ));
        assert!(matches!(
            ColorLegend::new("bad", vec![5.0, 5.0], vec![Rgb(0, 0, 0); 3]),
            Err(LegendError::NotIncreasing { .. })
        ));
    }

    #[test]
    fn test_builtin_legend_is_consistent() {
        let legend = kachelmann_precip_24h().unwrap();
        assert_eq!(legend.len(), legend.bounds().len() + 1);
        assert_eq!(legend.len(), 26);
        assert!(!legend.is_empty());
        assert_eq!(legend.color_at(4), Rgb(4, 130, 255));
    }

    #[test]
    fn test_open_ends_only_at_extremes() {
        let legend = kachelmann_precip_24h().unwrap();
        let last = legend.len() - 1;

        for i in 0..legend.len() {
            let interval = legend.interval_for_index(i);
            let open_sides = [interval.lower, interval.upper].iter().filter(|b| b.is_none()).count();
            if i == 0 || i == last {
                assert_eq!(open_sides, 1, "index {}", i);
            } else {
                assert_eq!(open_sides, 0, "index {}", i);
                assert!(interval.lower.unwrap() < interval.upper.unwrap());
            }
        }
    }

    #[test]
    fn test_interval_for_index() {
        let legend = small_legend();
        assert_eq!(legend.interval_for_index(0), Interval { lower: None, upper: Some(1.0) });
        assert_eq!(legend.interval_for_index(1), Interval { lower: Some(1.0), upper: Some(5.0) });
        assert_eq!(legend.interval_for_index(2), Interval { lower: Some(5.0), upper: None });
    }

    #[test]
    #[should_panic]
    fn test_interval_for_index_out_of_range() {
        small_legend().interval_for_index(3);
    }

    #[test]
    fn test_bucket_for_value() {
        let legend = small_legend();
        assert_eq!(legend.bucket_for_value(-100.0), 0);
        assert_eq!(legend.bucket_for_value(0.99), 0);
        assert_eq!(legend.bucket_for_value(1.0), 1);
        assert_eq!(legend.bucket_for_value(3.0), 1);
        assert_eq!(legend.bucket_for_value(5.0), 2);
        assert_eq!(legend.bucket_for_value(1e9), 2);
        assert_eq!(legend.bucket_for_value(f64::NAN), 0);
        assert_eq!(legend.color_for_value(3.0), Rgb(20, 20, 20));
    }

    #[test]
    fn test_index_of_is_exact() {
        let legend = kachelmann_precip_24h().unwrap();
        assert_eq!(legend.index_of(Rgb(150, 150, 150)), Some(25));
        assert_eq!(legend.index_of(Rgb(150, 150, 151)), None);
    }

    #[test]
    fn test_interval_display() {
        let legend = kachelmann_precip_24h().unwrap();
        assert_eq!(legend.interval_for_index(0).to_string(), "<0.1");
        assert_eq!(legend.interval_for_index(9).to_string(), "15..20");
        assert_eq!(legend.interval_for_index(25).to_string(), ">300");
    }

    #[test]
    fn test_hex() {
        assert_eq!(Rgb(4, 130, 255).to_hex(), "#0482ff");
    }
}
