//! Error and result types shared by every geosort component.

use std::io;
use thiserror::Error;

/// Errors that can occur while parsing coordinates, searching, or reading
/// a record store.
#[derive(Debug, Error)]
pub enum GeoError {
    /// Wrong field count or a field that is not a number.
    #[error("invalid coordinates: {0}")]
    InvalidCoordinates(String),

    /// Well-formed coordinates that fail the bounding-box sanity checks.
    #[error("bad coordinates -- {0}")]
    BadCoordinates(String),

    #[error("not found")]
    NotFound,

    /// A record could not be decoded. The store is corrupt or does not
    /// match the decoder, so the failure is not retried.
    #[error("failed to decode record {index}: {source}")]
    Decode {
        index: usize,
        #[source]
        source: DecodeError,
    },

    #[error("index {index} out of bounds for length {len}")]
    IndexOutOfBounds { index: usize, len: usize },

    /// Latitude outside the longitude-scale lookup table.
    #[error("latitude {0} is outside the lookup range [-90, 90]")]
    LatitudeOutOfRange(f64),

    #[error("Invalid operation: {0}")]
    InvalidOperation(String),

    #[error("invalid record store: {0}")]
    InvalidStore(String),

    #[error("record store is closed")]
    Closed,

    #[error("IO error: {0}")]
    Io(#[from] io::Error),

    #[error("serialization error: {0}")]
    Serialization(String),
}

impl From<serde_json::Error> for GeoError {
    fn from(err: serde_json::Error) -> Self {
        GeoError::Serialization(err.to_string())
    }
}

/// Result type for geosort operations
pub type GeoResult<T> = Result<T, GeoError>;

/// Failure reported by a [`RecordDecoder`](crate::store::RecordDecoder).
///
/// Decoders do not know where their bytes came from; the store attaches the
/// record index when it wraps this into [`GeoError::Decode`].
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{0}")]
pub struct DecodeError(pub String);

impl DecodeError {
    pub fn new(message: impl Into<String>) -> Self {
        DecodeError(message.into())
    }

    /// The byte slice handed to the decoder had the wrong length.
    pub fn truncated(expected: usize, actual: usize) -> Self {
        DecodeError(format!(
            "expected {} bytes, got {}",
            expected, actual
        ))
    }
}
