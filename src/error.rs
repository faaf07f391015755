use std::io;

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum_extra::headers::ContentRange;
use axum_extra::TypedHeader;
use thiserror::Error;

/// Reasons a `Range` value could not be turned into a byte window.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RangeError {
    /// `bytes=-`: neither a first nor a last position was given.
    #[error("range cannot be missing both bounds")]
    MissingRangeBounds,
    /// A bound carried a minus sign.
    #[error("range bounds cannot be negative: {bound:?}")]
    NegativeRangeBound { bound: String },
    /// A bound was present but was not a run of digits.
    #[error("range bound is not a number: {bound:?}")]
    MalformedRangeBound { bound: String },
    /// More than one range was requested; only a single range is served.
    #[error("multiple ranges are not supported")]
    MultipleRanges,
    /// After clamping to the file, the first position lies past the last.
    #[error("range {start}-{end} is not valid for a file of {file_len} bytes")]
    InvalidRangeOrder { start: u64, end: u64, file_len: u64 },
    /// The unit before `=` was something other than `bytes`.
    #[error("unsupported range unit {unit:?}")]
    UnsupportedRangeUnit { unit: String },
}

#[derive(Debug, Error)]
pub enum Error {
    #[error(transparent)]
    Range(#[from] RangeError),
    #[error("io error: {0}")]
    Io(#[from] io::Error),
    #[error("header {name:?} cannot carry value {value:?}")]
    InvalidHeader { name: String, value: String },
}

impl Error {
    /// The status a server would answer with when this error reaches it.
    pub fn status(&self) -> StatusCode {
        match self {
            Error::Range(RangeError::InvalidRangeOrder { .. }) => StatusCode::RANGE_NOT_SATISFIABLE,
            Error::Range(_) => StatusCode::BAD_REQUEST,
            Error::Io(e) if e.kind() == io::ErrorKind::NotFound => StatusCode::NOT_FOUND,
            Error::Io(_) | Error::InvalidHeader { .. } => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for Error {
    fn into_response(self) -> Response {
        let status = self.status();
        tracing::debug!(%status, error = %self, "rejecting ranged request");
        match self {
            Error::Range(RangeError::InvalidRangeOrder { file_len, .. }) => {
                let header = TypedHeader(ContentRange::unsatisfied_bytes(file_len));
                (status, header, ()).into_response()
            }
            other => (status, other.to_string()).into_response(),
        }
    }
}
