//! Colour parsing, interpolation and the per-cell colour decision.

use phenomap_protocol::{Rgb, Rgba};
use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ColorError {
    #[error("invalid colour: '{0}'")]
    Invalid(String),
}

/// Colours offered by the legend colour picker. The first four are the
/// default endpoints.
pub const PALETTE: [&str; 24] = [
    "#0099ff", "#ebf7ff", "#ff6600", "#ffffff",
    // d3 category20
    "#1f77b4", "#aec7e8", "#ff7f0e", "#ffbb78", "#2ca02c", "#98df8a", "#d62728", "#ff9896",
    "#9467bd", "#c5b0d5", "#8c564b", "#c49c94", "#e377c2", "#f7b6d2", "#7f7f7f", "#c7c7c7",
    "#bcbd22", "#dbdb8d", "#17becf", "#9edae5",
];

/// Parse a colour specification.
///
/// Accepted forms, tried in order:
/// - `rgb(r, g, b)` / `rgba(r, g, b, a)` with decimal channels and an
///   optional alpha in `[0, 1)`
/// - `#RRGGBB` (the `#` is optional)
/// - `#RGB`, every digit doubled (`#abc` is `#aabbcc`)
pub fn parse_color(spec: &str) -> Result<Rgba, ColorError> {
    let trimmed = spec.trim();
    parse_functional(trimmed)
        .or_else(|| parse_hex(trimmed))
        .ok_or_else(|| ColorError::Invalid(spec.to_string()))
}

fn parse_functional(spec: &str) -> Option<Rgba> {
    let body = spec
        .strip_prefix("rgba(")
        .or_else(|| spec.strip_prefix("rgb("))?
        .strip_suffix(')')?;

    let parts: Vec<&str> = body.split(',').map(str::trim).collect();
    if parts.len() != 3 && parts.len() != 4 {
        return None;
    }

    let channel = |s: &str| -> Option<u8> {
        if s.is_empty() || !s.bytes().all(|b| b.is_ascii_digit()) {
            return None;
        }
        s.parse::<u32>().ok().map(|v| v.min(255) as u8)
    };

    let a = match parts.get(3) {
        Some(alpha) => {
            let a: f32 = alpha.parse().ok()?;
            if !(0.0..=1.0).contains(&a) {
                return None;
            }
            Some(a)
        }
        None => None,
    };

    Some(Rgba {
        r: channel(parts[0])?,
        g: channel(parts[1])?,
        b: channel(parts[2])?,
        a,
    })
}

fn parse_hex(spec: &str) -> Option<Rgba> {
    let digits = spec.strip_prefix('#').unwrap_or(spec);
    if !digits.bytes().all(|b| b.is_ascii_hexdigit()) {
        return None;
    }
    let (r, g, b) = match digits.len() {
        6 => (
            u8::from_str_radix(&digits[0..2], 16).ok()?,
            u8::from_str_radix(&digits[2..4], 16).ok()?,
            u8::from_str_radix(&digits[4..6], 16).ok()?,
        ),
        3 => {
            let doubled = |i: usize| {
                let d = &digits[i..=i];
                u8::from_str_radix(&format!("{d}{d}"), 16).ok()
            };
            (doubled(0)?, doubled(1)?, doubled(2)?)
        }
        _ => return None,
    };
    Some(Rgba { r, g, b, a: None })
}

/// Linear interpolation: `low + t * (high - low)`.
pub fn lerp(low: f64, high: f64, t: f64) -> f64 {
    low + t * (high - low)
}

/// Round to the nearest integer and clamp into a colour channel.
pub fn clamp_channel(value: f64) -> u8 {
    if value.is_nan() {
        return 0;
    }
    value.round().clamp(0.0, 255.0) as u8
}

/// Interpolate every channel independently between `low` and `high`.
pub fn gradient(low: Rgb, high: Rgb, t: f64) -> Rgb {
    let ch = |l: u8, h: u8| clamp_channel(lerp(f64::from(l), f64::from(h), t));
    Rgb::new(ch(low.r, high.r), ch(low.g, high.g), ch(low.b, high.b))
}

/// Which of the four endpoints a legend entry edits.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Endpoint {
    Significant,
    Insignificant,
    HighlightedSignificant,
    HighlightedInsignificant,
}

impl Endpoint {
    /// Legend index as used by the colour picker (0..=3).
    pub fn from_index(index: usize) -> Option<Self> {
        match index {
            0 => Some(Self::Significant),
            1 => Some(Self::Insignificant),
            2 => Some(Self::HighlightedSignificant),
            3 => Some(Self::HighlightedInsignificant),
            _ => None,
        }
    }
}

/// The four gradient endpoints.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ColorEndpoints {
    pub significant: Rgb,
    pub insignificant: Rgb,
    pub highlighted_significant: Rgb,
    pub highlighted_insignificant: Rgb,
}

impl Default for ColorEndpoints {
    fn default() -> Self {
        Self {
            significant: Rgb::new(0x00, 0x99, 0xff),
            insignificant: Rgb::new(0xeb, 0xf7, 0xff),
            highlighted_significant: Rgb::new(0xff, 0x66, 0x00),
            highlighted_insignificant: Rgb::new(0xff, 0xff, 0xff),
        }
    }
}

impl ColorEndpoints {
    pub fn get(&self, endpoint: Endpoint) -> Rgb {
        match endpoint {
            Endpoint::Significant => self.significant,
            Endpoint::Insignificant => self.insignificant,
            Endpoint::HighlightedSignificant => self.highlighted_significant,
            Endpoint::HighlightedInsignificant => self.highlighted_insignificant,
        }
    }

    /// Replace one endpoint from a colour specification. The endpoint is
    /// left untouched when the specification does not parse.
    pub fn set(&mut self, endpoint: Endpoint, spec: &str) -> Result<(), ColorError> {
        let rgb = parse_color(spec)?.rgb();
        let slot = match endpoint {
            Endpoint::Significant => &mut self.significant,
            Endpoint::Insignificant => &mut self.insignificant,
            Endpoint::HighlightedSignificant => &mut self.highlighted_significant,
            Endpoint::HighlightedInsignificant => &mut self.highlighted_insignificant,
        };
        *slot = rgb;
        Ok(())
    }
}

/// How a cell with data is coloured.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum ColorMode {
    /// Interpolate between the endpoints over the data extremes.
    Gradient,
    /// Binary: significant below the threshold, insignificant otherwise.
    Threshold(f64),
}

/// Colour decision for a single cell.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum CellColor {
    Rgb(Rgb),
    NoData,
}

/// Maps p-values to cell colours over the extremes of the loaded matrix.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ColorMapper {
    pub endpoints: ColorEndpoints,
    pub min_value: f64,
    pub value_range: f64,
}

impl ColorMapper {
    pub fn new(endpoints: ColorEndpoints, min_value: f64, value_range: f64) -> Self {
        Self {
            endpoints,
            min_value,
            value_range,
        }
    }

    /// Normalised position of `value` between the extremes. A degenerate
    /// range (single distinct value, or no data at all) maps to `0`.
    pub fn scale(&self, value: f64) -> f64 {
        if self.value_range <= 0.0 || !self.value_range.is_finite() {
            return 0.0;
        }
        (value - self.min_value) / self.value_range
    }

    /// Gradient colour for `value`. Lower p-values (more significant) lean
    /// towards the significant endpoint.
    pub fn gradient_rgb(&self, value: f64, highlighted: bool) -> Rgb {
        let (low, high) = if highlighted {
            (
                self.endpoints.highlighted_significant,
                self.endpoints.highlighted_insignificant,
            )
        } else {
            (self.endpoints.significant, self.endpoints.insignificant)
        };
        gradient(low, high, self.scale(value))
    }

    /// Gradient colour as a `#rrggbb` string.
    pub fn gradient_color(&self, value: f64, highlighted: bool) -> String {
        self.gradient_rgb(value, highlighted).to_hex()
    }

    /// Colour for one cell in the given mode.
    pub fn cell_color(&self, pvalue: Option<f64>, mode: ColorMode, highlighted: bool) -> CellColor {
        let Some(p) = pvalue else {
            return CellColor::NoData;
        };
        match mode {
            ColorMode::Gradient => CellColor::Rgb(self.gradient_rgb(p, highlighted)),
            ColorMode::Threshold(threshold) => CellColor::Rgb(if p < threshold {
                self.endpoints.significant
            } else {
                self.endpoints.insignificant
            }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn parses_short_hex_by_doubling_digits() {
        let c = parse_color("#abc").expect("short hex");
        assert_eq!((c.r, c.g, c.b, c.a), (0xaa, 0xbb, 0xcc, None));
    }

    #[test]
    fn parses_long_hex_with_and_without_hash() {
        assert_eq!(parse_color("#0099ff").map(Rgba::rgb), Ok(Rgb::new(0, 0x99, 0xff)));
        assert_eq!(parse_color("ebf7ff").map(Rgba::rgb), Ok(Rgb::new(0xeb, 0xf7, 0xff)));
    }

    #[test]
    fn parses_rgba_with_alpha() {
        let c = parse_color("rgba(10,20,30,0.5)").expect("rgba");
        assert_eq!((c.r, c.g, c.b), (10, 20, 30));
        assert_eq!(c.a, Some(0.5));
    }

    #[test]
    fn parses_rgb_with_spaces() {
        let c = parse_color("rgb(255, 102,  0)").expect("rgb");
        assert_eq!(c.rgb(), Rgb::new(255, 102, 0));
        assert_eq!(c.a, None);
    }

    #[test]
    fn rejects_garbage() {
        for bad in ["", "#12", "#12345", "#ggg", "rgb(1,2)", "rgb(a,b,c)", "blue"] {
            assert!(
                matches!(parse_color(bad), Err(ColorError::Invalid(_))),
                "{bad} should be rejected"
            );
        }
    }

    #[test]
    fn lerp_and_clamp() {
        assert_eq!(lerp(0.0, 10.0, 0.25), 2.5);
        assert_eq!(clamp_channel(-4.0), 0);
        assert_eq!(clamp_channel(300.0), 255);
        assert_eq!(clamp_channel(127.5), 128);
    }

    #[test]
    fn gradient_endpoints_follow_significance() {
        let mapper = ColorMapper::new(ColorEndpoints::default(), 0.0001, 0.9999);
        assert_eq!(mapper.gradient_color(0.0001, false), "#0099ff");
        assert_eq!(mapper.gradient_color(1.0, false), "#ebf7ff");
        assert_eq!(mapper.gradient_color(0.0001, true), "#ff6600");
    }

    #[test]
    fn degenerate_range_uses_significant_endpoint() {
        let mapper = ColorMapper::new(ColorEndpoints::default(), 0.5, 0.0);
        assert_eq!(mapper.gradient_rgb(0.5, false), ColorEndpoints::default().significant);
        let empty = ColorMapper::new(ColorEndpoints::default(), 2.0, -4.0);
        assert_eq!(empty.gradient_rgb(0.3, false), ColorEndpoints::default().significant);
    }

    #[test]
    fn threshold_mode_is_binary() {
        let endpoints = ColorEndpoints::default();
        let mapper = ColorMapper::new(endpoints, 0.0, 1.0);
        let mode = ColorMode::Threshold(0.0001);
        assert_eq!(
            mapper.cell_color(Some(0.00001), mode, false),
            CellColor::Rgb(endpoints.significant)
        );
        assert_eq!(
            mapper.cell_color(Some(0.0001), mode, false),
            CellColor::Rgb(endpoints.insignificant)
        );
        assert_eq!(mapper.cell_color(None, mode, false), CellColor::NoData);
        assert_eq!(mapper.cell_color(None, ColorMode::Gradient, true), CellColor::NoData);
    }

    #[test]
    fn endpoints_set_from_palette() {
        let mut endpoints = ColorEndpoints::default();
        endpoints
            .set(Endpoint::Insignificant, PALETTE[4])
            .expect("palette colour");
        assert_eq!(endpoints.get(Endpoint::Insignificant), Rgb::new(0x1f, 0x77, 0xb4));
        assert!(endpoints.set(Endpoint::Significant, "nope").is_err());
        assert_eq!(endpoints.significant, ColorEndpoints::default().significant);
        assert_eq!(Endpoint::from_index(4), None);
    }

    #[test]
    fn palette_entries_all_parse() {
        for spec in PALETTE {
            assert!(parse_color(spec).is_ok(), "{spec}");
        }
    }

    proptest! {
        #[test]
        fn gradient_channels_stay_in_range(p in 0.0f64..=1.0, lo in 0.0f64..=1.0, hi in 0.0f64..=1.0) {
            let (min, max) = if lo <= hi { (lo, hi) } else { (hi, lo) };
            let mapper = ColorMapper::new(ColorEndpoints::default(), min, max - min);
            let hex = mapper.gradient_color(p, false);
            prop_assert_eq!(hex.len(), 7);
            let parsed = parse_color(&hex);
            prop_assert!(parsed.is_ok());
        }
    }
}
