//! Error Module - Slider configuration and initialization errors
//!
//! Every error here is a programmer misconfiguration, not a recoverable user
//! condition. They are raised synchronously (usually at first layout) and abort
//! initialization; nothing in the crate catches and continues.

use thiserror::Error;

/// Errors raised by the slider core.
#[derive(Debug, Error)]
pub enum SliderError {
    /// The thumb inputs do not carry a valid marker combination.
    #[error(
        "invalid slider thumb input configuration (range: {range}); valid configurations are \
         exactly one input marked `slider-thumb` for a single slider, or exactly one \
         `slider-start-thumb` and one `slider-end-thumb` input for a range slider"
    )]
    InvalidThumbConfiguration { range: bool },

    /// An attribute outside the input attribute allow-list was written.
    #[error("attribute `{name}` cannot be written to a slider thumb input")]
    InvalidAttributeWrite { name: String },

    /// A value was routed to a slider that has no thumb inputs attached.
    #[error("slider has no thumb inputs attached; attach thumb inputs before setting values")]
    MisconfiguredSlider,

    /// The foundation rejected the initial state read from the inputs.
    #[error("slider foundation rejected its initial state: {0}")]
    Foundation(String),

    /// Slider configuration text failed to parse.
    #[error("invalid slider configuration: {0}")]
    Config(#[from] toml::de::Error),
}

/// Result alias used throughout the crate.
pub type Result<T> = std::result::Result<T, SliderError>;
