//! Error types for the lighting client, the toggle flow and configuration.
//!
//! # Design
//! `NotFound` and `Unauthorized` get dedicated variants because callers
//! distinguish "the light does not exist" and "the key was rejected" from
//! "the gateway returned an unexpected status." All other non-2xx responses
//! land in `HttpError` with the raw status code and body for debugging.
//! A gateway can also answer 2xx with an error entry in the body; that case
//! is `Gateway`, carrying the gateway's own error type and description.

use thiserror::Error;

/// Errors returned by `LightClient` parse methods and by a `Transport`.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ApiError {
    /// The gateway returned 404; the requested light does not exist.
    #[error("resource not found")]
    NotFound,

    /// The gateway returned 401 or 403; the application key was rejected.
    #[error("unauthorized")]
    Unauthorized,

    /// The gateway returned a non-2xx status other than 401, 403 or 404.
    #[error("HTTP {status}: {body}")]
    HttpError { status: u16, body: String },

    /// The gateway reported an error entry in its response body.
    #[error("gateway error {kind} at {address}: {description}")]
    Gateway {
        kind: u32,
        address: String,
        description: String,
    },

    /// The response body could not be deserialized into the expected type.
    #[error("deserialization failed: {0}")]
    DeserializationError(String),

    /// The request payload could not be serialized to JSON.
    #[error("serialization failed: {0}")]
    SerializationError(String),

    /// The request never produced a response (connect failure, timeout, ...).
    #[error("transport failed: {0}")]
    Transport(String),
}

/// Why a light toggle did not complete.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ToggleError {
    /// Another toggle for the same light has not finished yet.
    #[error("a toggle for light {light_id} is already in flight")]
    Busy { light_id: String },

    /// Reading the light's current state failed; no write was attempted.
    #[error("reading light state failed: {0}")]
    Read(#[source] ApiError),

    /// Writing the inverted state failed after a successful read.
    #[error("updating light state failed: {0}")]
    Write(#[source] ApiError),
}

/// Errors raised while loading `AppConfig`.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("config parse error: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("missing required setting: {0}")]
    Missing(&'static str),

    #[error("invalid value {value:?} for {key}")]
    Invalid { key: &'static str, value: String },
}
