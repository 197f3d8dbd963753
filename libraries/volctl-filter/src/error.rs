//! Error types for filter negotiation and configuration

use thiserror::Error;

/// Result type for filter operations
pub type Result<T> = std::result::Result<T, FilterError>;

/// Stream format negotiation failures
///
/// Fatal to the current streaming session from the filter's point of view.
/// Nothing is retried internally.
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum NegotiationError {
    /// A buffer arrived before any format was committed
    #[error("No format was negotiated")]
    NotNegotiated,

    /// Format setup with a sample encoding the filter cannot scale
    #[error("Invalid incoming format: {0}")]
    UnsupportedFormat(gst_audio::AudioFormat),
}

/// Errors surfaced by filters and their control handles
#[derive(Error, Debug, Clone, PartialEq)]
pub enum FilterError {
    /// Format negotiation failed
    #[error(transparent)]
    Negotiation(#[from] NegotiationError),

    /// Property name not declared by the element
    #[error("Unknown property: {0}")]
    UnknownProperty(String),

    /// Property value outside the declared range
    #[error("Invalid value {value} for property '{name}'")]
    InvalidPropertyValue { name: String, value: f64 },

    /// The buffer memory could not be mapped for writing
    #[error("Failed to map buffer writable")]
    BufferMap,
}

impl From<FilterError> for gst::FlowError {
    fn from(err: FilterError) -> Self {
        match err {
            FilterError::Negotiation(_) => gst::FlowError::NotNegotiated,
            _ => gst::FlowError::Error,
        }
    }
}
