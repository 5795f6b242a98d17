//! Threshold slider: value/position mapping and the slider's own state.
//!
//! Values in the open interval `(0, 1)` are spread logarithmically along
//! the track (`v' = 0.1 * log10(v) + 1`) so that the small p-values users
//! care about get most of the track. Everything else maps linearly.

use serde::{Deserialize, Serialize};

use crate::precision::{DEFAULT_PRECISION, format_significant, round_significant};

/// Pixel geometry of the slider track, measured after layout.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SliderGeometry {
    pub bar_left: f64,
    pub bar_width: f64,
    pub button_width: f64,
}

impl SliderGeometry {
    pub fn new(bar_left: f64, bar_width: f64, button_width: f64) -> Self {
        Self {
            bar_left,
            bar_width,
            button_width,
        }
    }

    pub fn half_button_width(&self) -> f64 {
        0.5 * self.button_width
    }

    /// Leftmost button position: button centred on the start of the bar.
    pub fn min_button_left(&self) -> f64 {
        self.bar_left - self.half_button_width()
    }

    /// Rightmost button position: button centred on the end of the bar.
    pub fn max_button_right(&self) -> f64 {
        self.bar_left + self.bar_width - self.half_button_width()
    }
}

/// Whether an input had to be clamped to the slider bounds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Clamp {
    None,
    Low,
    High,
}

/// Result of mapping a value onto the track.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Placement {
    pub position: f64,
    pub clamp: Clamp,
}

/// Bidirectional value/position mapping.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SliderValueMapper {
    pub min: f64,
    pub max: f64,
    pub geometry: SliderGeometry,
    /// Significant digits kept by [`Self::position_to_value`].
    pub precision: usize,
}

impl SliderValueMapper {
    pub fn new(min: f64, max: f64, geometry: SliderGeometry) -> Self {
        Self {
            min,
            max,
            geometry,
            precision: DEFAULT_PRECISION,
        }
    }

    pub fn with_precision(mut self, precision: usize) -> Self {
        self.precision = precision;
        self
    }

    pub fn range(&self) -> f64 {
        self.max - self.min
    }

    /// Log compression applied to values strictly inside `(0, 1)`.
    pub fn compress(value: f64) -> f64 {
        if value > 0.0 && value < 1.0 {
            0.1 * value.log10() + 1.0
        } else {
            value
        }
    }

    /// Inverse of [`Self::compress`].
    pub fn expand(scaled: f64) -> f64 {
        if scaled > 0.0 && scaled < 1.0 {
            10f64.powf((scaled - 1.0) * 10.0)
        } else {
            scaled
        }
    }

    /// Button position for `value`, clamping out-of-range inputs.
    pub fn value_to_position(&self, value: f64) -> Placement {
        let scaled = Self::compress(value);
        let (scaled, clamp) = if scaled < self.min {
            (self.min, Clamp::Low)
        } else if scaled > self.max {
            (self.max, Clamp::High)
        } else {
            (scaled, Clamp::None)
        };

        let range = self.range();
        let fraction = if range > 0.0 {
            (scaled - self.min) / range
        } else {
            0.0
        };
        Placement {
            position: self.geometry.min_button_left() + self.geometry.bar_width * fraction,
            clamp,
        }
    }

    /// Value for a button at `position`, rounded to `precision` digits.
    pub fn position_to_value(&self, position: f64) -> f64 {
        let g = &self.geometry;
        let fraction = if g.bar_width > 0.0 {
            ((position - g.min_button_left()) / g.bar_width).clamp(0.0, 1.0)
        } else {
            0.0
        };
        let scaled = self.min + self.range() * fraction;
        round_significant(Self::expand(scaled), self.precision)
    }
}

/// Validation state of the slider's text box.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum InputStatus {
    Valid,
    /// Below the lower bound; shown clamped to the minimum.
    ClampedLow,
    /// Above the upper bound; shown clamped to the maximum.
    ClampedHigh,
    /// Not a number; the slider reverted to its default.
    Invalid,
}

/// A committed slider value, to be forwarded to whoever listens for
/// threshold changes.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SliderChange {
    pub value: f64,
    pub status: InputStatus,
}

/// A value slider with an editable text box and a draggable button.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Slider {
    mapper: SliderValueMapper,
    default_value: f64,
    text: String,
    value: f64,
    button_left: f64,
    status: InputStatus,
    visible: bool,
}

impl Slider {
    /// Create a slider over `[min, max]`. Without an explicit default the
    /// slider starts half way along the value range.
    pub fn new(min: f64, max: f64, default_value: Option<f64>, geometry: SliderGeometry) -> Self {
        let mapper = SliderValueMapper::new(min, max, geometry);
        let default_value = default_value.unwrap_or(0.5 * (max - min));
        let mut slider = Self {
            mapper,
            default_value,
            text: String::new(),
            value: default_value,
            button_left: 0.0,
            status: InputStatus::Valid,
            visible: true,
        };
        slider.reset();
        slider
    }

    pub fn mapper(&self) -> &SliderValueMapper {
        &self.mapper
    }

    pub fn default_value(&self) -> f64 {
        self.default_value
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    /// The last committed value.
    pub fn value(&self) -> f64 {
        self.value
    }

    pub fn button_left(&self) -> f64 {
        self.button_left
    }

    pub fn status(&self) -> InputStatus {
        self.status
    }

    pub fn is_visible(&self) -> bool {
        self.visible
    }

    pub fn set_visible(&mut self, visible: bool) {
        self.visible = visible;
    }

    /// Confirm typed text.
    ///
    /// Non-numeric text reverts to the default value and flags the input
    /// as invalid. Numbers outside the bounds move the button to the end
    /// of the track and commit the bound's value, so the button and the
    /// committed value never disagree; the typed text is kept as-is.
    pub fn set_text(&mut self, text: &str) -> SliderChange {
        let Some(typed) = parse_float_literal(text) else {
            tracing::warn!(input = text, "non-numeric slider value, reverting to default");
            self.revert_to_default();
            self.status = InputStatus::Invalid;
            return self.change();
        };

        let placement = self.mapper.value_to_position(typed);
        self.text = text.trim().to_string();
        self.button_left = placement.position;
        (self.value, self.status) = match placement.clamp {
            Clamp::None => (typed, InputStatus::Valid),
            Clamp::Low => (
                self.mapper.position_to_value(placement.position),
                InputStatus::ClampedLow,
            ),
            Clamp::High => (
                self.mapper.position_to_value(placement.position),
                InputStatus::ClampedHigh,
            ),
        };
        self.change()
    }

    /// Move the button during a drag. Positions outside the track are
    /// ignored and return `None`.
    pub fn drag_to(&mut self, position: f64) -> Option<SliderChange> {
        let g = &self.mapper.geometry;
        if position < g.min_button_left() || position > g.max_button_right() {
            return None;
        }
        self.button_left = position;
        self.value = self.mapper.position_to_value(position);
        self.text = format_significant(self.value, self.mapper.precision);
        self.status = InputStatus::Valid;
        Some(self.change())
    }

    /// Restore the default value and resynchronise the button.
    pub fn reset(&mut self) -> SliderChange {
        self.revert_to_default();
        self.status = InputStatus::Valid;
        self.change()
    }

    /// Apply new track geometry (after a resize) keeping the value.
    pub fn refit(&mut self, geometry: SliderGeometry) {
        self.mapper.geometry = geometry;
        self.button_left = self.mapper.value_to_position(self.value).position;
    }

    fn revert_to_default(&mut self) {
        self.value = self.default_value;
        self.text = self.default_value.to_string();
        self.button_left = self.mapper.value_to_position(self.default_value).position;
    }

    fn change(&self) -> SliderChange {
        SliderChange {
            value: self.value,
            status: self.status,
        }
    }
}

/// Strict decimal literal: optional sign, digits with an optional
/// fraction, optional exponent. Rejects `inf`, `NaN`, `1.` and the like.
pub fn parse_float_literal(text: &str) -> Option<f64> {
    let s = text.trim();
    let body = s.strip_prefix(['+', '-']).unwrap_or(s);
    let (mantissa, exponent) = match body.find(['e', 'E']) {
        Some(i) => (&body[..i], Some(&body[i + 1..])),
        None => (body, None),
    };

    let (int_part, frac_part) = match mantissa.split_once('.') {
        Some((i, f)) => (i, Some(f)),
        None => (mantissa, None),
    };
    let all_digits = |p: &str| p.bytes().all(|b| b.is_ascii_digit());
    let mantissa_ok = match frac_part {
        Some(f) => !f.is_empty() && all_digits(f) && all_digits(int_part),
        None => !int_part.is_empty() && all_digits(int_part),
    };
    if !mantissa_ok {
        return None;
    }
    if let Some(exp) = exponent {
        let digits = exp.strip_prefix(['+', '-']).unwrap_or(exp);
        if digits.is_empty() || !all_digits(digits) {
            return None;
        }
    }
    s.parse().ok()
}
