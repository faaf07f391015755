use axum::http::header::{HeaderMap, RANGE};
use serde::{Deserialize, Serialize};

/// Diagnostic header that repeats the chosen status code.
pub const STATUS_ECHO_HEADER: &str = "X-Http-Stream-Response-Code";

/// How a single request should be answered.
///
/// Deserializes from the option names used by older configurations
/// (`mimeType`, `ignoreErrors`, `HTTP_RANGE`) as well as the snake case ones.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RangeOptions {
    /// Content type to send instead of a sniffed or default one.
    #[serde(alias = "mimeType")]
    pub mime_type: Option<String>,
    /// Serve the whole file instead of failing on a bad `Range`.
    #[serde(alias = "ignoreErrors")]
    pub tolerate_errors: bool,
    /// Raw `Range` request header.
    #[serde(alias = "HTTP_RANGE")]
    pub range: Option<String>,
    /// Name of a header that echoes the status code, if any.
    pub status_header: Option<String>,
}

impl RangeOptions {
    pub fn new() -> Self {
        Self::default()
    }

    /// Takes the `Range` value from request headers. Bytes that are not
    /// UTF-8 are kept as replacement characters, so a garbled value is still
    /// rejected (or tolerated) by [`crate::resolve`] rather than dropped.
    pub fn from_headers(headers: &HeaderMap) -> Self {
        let range = headers
            .get(RANGE)
            .map(|value| String::from_utf8_lossy(value.as_bytes()).into_owned());
        RangeOptions { range, ..Self::default() }
    }

    pub fn range(mut self, range: impl Into<String>) -> Self {
        self.range = Some(range.into());
        self
    }

    pub fn mime_type(mut self, mime_type: impl Into<String>) -> Self {
        self.mime_type = Some(mime_type.into());
        self
    }

    pub fn tolerate_errors(mut self, tolerate_errors: bool) -> Self {
        self.tolerate_errors = tolerate_errors;
        self
    }

    pub fn status_header(mut self, name: impl Into<String>) -> Self {
        self.status_header = Some(name.into());
        self
    }
}
