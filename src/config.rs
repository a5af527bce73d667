//! Slider configuration.
//!
//! The numeric and boolean inputs a slider container is driven by. The
//! `display_with` formatting hook is a closure and lives next to the config on the
//! container rather than in it, so the config itself stays plain data that can be
//! loaded from TOML.
//!
//! # Example
//!
//! ```ignore
//! let config = SliderConfig::from_toml_str(r#"
//!     min = 0
//!     max = 10
//!     step = 0.5
//!     discrete = true
//! "#)?;
//! ```

use std::rc::Rc;

use serde::{Deserialize, Serialize};

use crate::error::Result;
use crate::types::format_number;

/// Formatting hook turning a thumb value into indicator / aria text.
pub type DisplayWith = Rc<dyn Fn(f64) -> String>;

/// Default `display_with`: the attribute form of the number.
pub fn default_display_with() -> DisplayWith {
    Rc::new(format_number)
}

/// Container configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SliderConfig {
    pub min: f64,
    pub max: f64,
    pub step: f64,
    /// Show a value indicator above the thumb while interacting.
    pub discrete: bool,
    /// Render tick marks (only meaningful when discrete).
    pub show_tick_marks: bool,
    pub disabled: bool,
}

impl Default for SliderConfig {
    fn default() -> Self {
        Self {
            min: 0.0,
            max: 100.0,
            step: 1.0,
            discrete: false,
            show_tick_marks: false,
            disabled: false,
        }
    }
}

impl SliderConfig {
    /// Config with a custom range and default everything else.
    pub fn with_range(min: f64, max: f64, step: f64) -> Self {
        Self { min, max, step, ..Self::default() }
    }

    /// Parse a config from TOML. Missing keys take their defaults.
    pub fn from_toml_str(text: &str) -> Result<Self> {
        Ok(toml::from_str(text)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::SliderError;

    #[test]
    fn test_defaults() {
        let config = SliderConfig::default();
        assert_eq!(config.min, 0.0);
        assert_eq!(config.max, 100.0);
        assert_eq!(config.step, 1.0);
        assert!(!config.discrete);
        assert!(!config.disabled);
    }

    #[test]
    fn test_from_toml_partial() {
        let config = SliderConfig::from_toml_str("max = 10.0\ndiscrete = true\n").unwrap();
        assert_eq!(config.min, 0.0);
        assert_eq!(config.max, 10.0);
        assert!(config.discrete);
        assert!(!config.show_tick_marks);
    }

    #[test]
    fn test_from_toml_rejects_bad_types() {
        let err = SliderConfig::from_toml_str("min = \"zero\"").unwrap_err();
        assert!(matches!(err, SliderError::Config(_)));
    }

    #[test]
    fn test_default_display_with() {
        let display = default_display_with();
        assert_eq!(display(5.0), "5");
        assert_eq!(display(2.5), "2.5");
    }
}
