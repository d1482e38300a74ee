use thiserror::Error;

use crate::config::Region;

/// Hint appended to error descriptions that complain about a rejected value.
const TYPECAST_HINT: &str = ". Consider using 'Typecast' option";
const VALUE_REJECTED: &str = "cannot accept the provided value";

#[derive(Error, Debug)]
pub enum MobvoiError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("No endpoint for operation '{operation}' in region '{region}'")]
    UnknownOperation { region: Region, operation: String },

    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("API error: {status} - {body}")]
    Api { status: u16, body: String },

    #[error("Vendor error: {0}")]
    Vendor(String),

    #[error("failed to get task id")]
    MissingTaskId,

    #[error("Failed to get audio data from text to speech service ({len} bytes)")]
    AudioTooShort { len: usize },

    #[error("Missing field in response: {0}")]
    MissingField(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Broad classification used by callers deciding whether to retry or fix input.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// Bad credentials, region or operation; raised before any network call.
    Configuration,
    /// Network failure or non-2xx status.
    Transport,
    /// Well-formed vendor response that reports or implies failure.
    Vendor,
    /// Local I/O or decoding failure.
    Local,
}

impl MobvoiError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::Config(_) | Self::UnknownOperation { .. } => ErrorKind::Configuration,
            Self::Http(_) | Self::Api { .. } => ErrorKind::Transport,
            Self::Vendor(_)
            | Self::MissingTaskId
            | Self::AudioTooShort { .. }
            | Self::MissingField(_) => ErrorKind::Vendor,
            Self::Io(_) | Self::Json(_) => ErrorKind::Local,
        }
    }

    /// HTTP status reported by the vendor, if the error carries one.
    pub fn status(&self) -> Option<u16> {
        match self {
            Self::Api { status, .. } => Some(*status),
            Self::Http(err) => err.status().map(|s| s.as_u16()),
            _ => None,
        }
    }

    /// User-facing description, with a casting hint for rejected values.
    pub fn describe(&self) -> String {
        with_typecast_hint(&self.to_string())
    }
}

pub(crate) fn with_typecast_hint(description: &str) -> String {
    if description.contains(VALUE_REJECTED) {
        format!("{description}{TYPECAST_HINT}")
    } else {
        description.to_string()
    }
}

pub type Result<T> = std::result::Result<T, MobvoiError>;
