//! Core types for spark-slider.
//!
//! Positions, geometry and the numeric helpers every layer agrees on. Values cross
//! the host document as strings, so formatting and coercion live here in one place.

// =============================================================================
// Thumb Position
// =============================================================================

/// Which thumb of a slider an operation addresses.
///
/// A single-thumb slider only has `End`. For range sliders `Start` is the first
/// declared thumb and `End` the last.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ThumbPosition {
    Start,
    End,
}

impl ThumbPosition {
    /// Index into two-slot per-thumb storage.
    pub const fn slot(self) -> usize {
        match self {
            ThumbPosition::Start => 0,
            ThumbPosition::End => 1,
        }
    }

    /// The other thumb.
    pub const fn peer(self) -> Self {
        match self {
            ThumbPosition::Start => ThumbPosition::End,
            ThumbPosition::End => ThumbPosition::Start,
        }
    }
}

// =============================================================================
// Tick Marks
// =============================================================================

/// State of one tick mark, one per quantized step.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TickMark {
    Active,
    Inactive,
}

// =============================================================================
// Direction
// =============================================================================

/// Text direction of the surrounding layout.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Direction {
    #[default]
    Ltr,
    Rtl,
}

// =============================================================================
// Geometry
// =============================================================================

/// Axis-aligned rectangle in client coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Rect {
    pub left: f64,
    pub top: f64,
    pub width: f64,
    pub height: f64,
}

impl Rect {
    pub const fn new(left: f64, top: f64, width: f64, height: f64) -> Self {
        Self { left, top, width, height }
    }

    pub fn right(&self) -> f64 {
        self.left + self.width
    }

    pub fn bottom(&self) -> f64 {
        self.top + self.height
    }

    /// Whether `x` falls inside the horizontal extent (edges inclusive).
    pub fn contains_x(&self, x: f64) -> bool {
        x >= self.left && x <= self.right()
    }
}

// =============================================================================
// Numeric helpers
// =============================================================================

/// Format a number the way it is written into attributes: integers without a
/// fractional part, everything else in shortest decimal form.
pub fn format_number(value: f64) -> String {
    if value == 0.0 {
        // Normalizes -0
        return "0".to_string();
    }
    format!("{value}")
}

/// Coerce an attribute string to a number. Missing or unparsable input is 0.
pub fn coerce_number(raw: Option<&str>) -> f64 {
    coerce_number_or(raw, 0.0)
}

/// Coerce an attribute string to a number with an explicit fallback.
pub fn coerce_number_or(raw: Option<&str>, fallback: f64) -> f64 {
    raw.map(str::trim)
        .filter(|s| !s.is_empty())
        .and_then(|s| s.parse::<f64>().ok())
        .filter(|v| v.is_finite())
        .unwrap_or(fallback)
}

/// Number of digits after the decimal point in `value`'s attribute form.
pub fn decimal_places(value: f64) -> usize {
    let text = format_number(value);
    match text.split_once('.') {
        Some((_, fraction)) => fraction.len(),
        None => 0,
    }
}

/// Round to a fixed number of decimal places.
pub fn round_to(value: f64, places: usize) -> f64 {
    let factor = 10f64.powi(places as i32);
    (value * factor).round() / factor
}

/// Snap `value` onto the step grid anchored at `min`.
pub fn quantize(value: f64, min: f64, step: f64) -> f64 {
    if step <= 0.0 {
        return value;
    }
    let steps = ((value - min) / step).round();
    round_to(min + steps * step, decimal_places(step).max(decimal_places(min)))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_number() {
        assert_eq!(format_number(8.0), "8");
        assert_eq!(format_number(0.5), "0.5");
        assert_eq!(format_number(-0.0), "0");
        assert_eq!(format_number(-12.25), "-12.25");
    }

    #[test]
    fn test_coerce_number() {
        assert_eq!(coerce_number(Some("42")), 42.0);
        assert_eq!(coerce_number(Some(" 3.5 ")), 3.5);
        assert_eq!(coerce_number(Some("abc")), 0.0);
        assert_eq!(coerce_number(Some("")), 0.0);
        assert_eq!(coerce_number(None), 0.0);
        assert_eq!(coerce_number_or(Some("NaN"), 7.0), 7.0);
    }

    #[test]
    fn test_decimal_places() {
        assert_eq!(decimal_places(1.0), 0);
        assert_eq!(decimal_places(0.25), 2);
        assert_eq!(decimal_places(0.1), 1);
    }

    #[test]
    fn test_quantize() {
        assert_eq!(quantize(7.4, 0.0, 1.0), 7.0);
        assert_eq!(quantize(7.5, 0.0, 5.0), 10.0);
        assert_eq!(quantize(0.30000000000000004, 0.0, 0.1), 0.3);
        // Grid anchored at min
        assert_eq!(quantize(4.0, 1.0, 2.0), 5.0);
    }

    #[test]
    fn test_rect() {
        let rect = Rect::new(10.0, 0.0, 100.0, 20.0);
        assert_eq!(rect.right(), 110.0);
        assert_eq!(rect.bottom(), 20.0);
        assert!(rect.contains_x(10.0));
        assert!(rect.contains_x(110.0));
        assert!(!rect.contains_x(111.0));
    }

    #[test]
    fn test_thumb_position_helpers() {
        assert_eq!(ThumbPosition::Start.slot(), 0);
        assert_eq!(ThumbPosition::End.slot(), 1);
        assert_eq!(ThumbPosition::Start.peer(), ThumbPosition::End);
    }
}
