/// CLI errors
use thiserror::Error;
use volctl_filter::FilterError;

#[derive(Debug, Error)]
pub enum CliError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Unknown element: {0}")]
    UnknownElement(String),

    #[error("Unknown sample format: {0}")]
    UnknownFormat(String),

    #[error("GStreamer initialization failed: {0}")]
    Init(#[from] gst::glib::Error),

    #[error(transparent)]
    Glib(#[from] gst::glib::BoolError),

    #[error("Stream format not accepted by {element}: {caps}")]
    NotAccepted { element: &'static str, caps: String },

    #[error(transparent)]
    Filter(#[from] FilterError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl From<config::ConfigError> for CliError {
    fn from(err: config::ConfigError) -> Self {
        Self::Config(err.to_string())
    }
}

pub type Result<T> = std::result::Result<T, CliError>;
