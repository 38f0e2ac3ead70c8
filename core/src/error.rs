//! Error types for the mite client.
//!
//! # Design
//! The service reports domain failures as JSON bodies (`{"error": "..."}`)
//! and those are handed back to the caller as data, not as `MiteError`. This
//! enum only covers what prevents a usable response from existing: a broken
//! URL, a failed transport, or a body that is not JSON at all.

use thiserror::Error;

/// Errors returned by `MiteApi` and the resource adapters.
#[derive(Debug, Error)]
pub enum MiteError {
    /// The request URL could not be built from the realm and path.
    #[error("invalid url {url}: {reason}")]
    InvalidUrl { url: String, reason: String },

    /// The transport failed before any response was received.
    #[error("transport failed: {0}")]
    Transport(String),

    /// The server returned a non-2xx status with a body that is not JSON.
    #[error("HTTP {status}: {body}")]
    Http { status: u16, body: String },

    /// A 2xx response body could not be decoded as JSON.
    #[error("deserialization failed: {0}")]
    Deserialization(String),

    /// A request payload or query filter could not be serialized.
    #[error("serialization failed: {0}")]
    Serialization(String),

    /// Configuration could not be loaded.
    #[error("configuration error: {0}")]
    Config(String),
}
