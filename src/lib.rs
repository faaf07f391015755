//! # http-stream
//!
//! HTTP partial content responses for a single file.
//!
//! [`resolve`] turns a raw `Range` value into a [`ResolvedRange`]: the
//! status to answer with, the inclusive byte window and the four response
//! headers (`Accept-Ranges`, `Content-Range`, `Content-Length` and
//! `Content-Type`). It does no I/O.
//!
//! [`Ranged`] ties that to a file on disk and produces a [`RangedResponse`],
//! whose headers can be sent before the body is read. The body is only read
//! when asked for, either with [`RangedResponse::content`] or by streaming
//! it. Both [`RangedResponse`] and [`Error`] implement [`IntoResponse`] for
//! use as [`axum`][1] handler results.
//!
//! ```
//! use axum::Router;
//! use axum::http::HeaderMap;
//! use axum::routing::get;
//!
//! use http_stream::{Error, GuessFromExtension, RangeOptions, Ranged, RangedResponse};
//!
//! async fn file(headers: HeaderMap) -> Result<RangedResponse, Error> {
//!     let options = RangeOptions::from_headers(&headers).tolerate_errors(true);
//!     Ranged::new("document.txt", options)
//!         .with_sniffer(GuessFromExtension)
//!         .respond()
//!         .await
//! }
//!
//! let _app = Router::<()>::new().route("/", get(file));
//! ```
//!
//! [1]: https://docs.rs/axum

mod error;
mod file;
mod headers;
mod mime;
mod options;
mod range;

use std::fmt;
use std::io;
use std::path::PathBuf;
use std::sync::Arc;

use async_stream::try_stream;
use axum::body::Body;
use axum::http::{HeaderMap, StatusCode};
use axum::response::{IntoResponse, Response};
use bytes::Bytes;
use futures::Stream;

pub use error::{Error, RangeError};
pub use file::{read_content, read_file, FileResource};
pub use headers::{Header, Headers};
pub use mime::{resolve_mime, ContentTypeSniffer, GuessFromExtension};
pub use options::{RangeOptions, STATUS_ECHO_HEADER};
pub use range::{resolve, ResolvedRange, DEFAULT_MIME_TYPE};

/// Entry point for answering one request for one file.
#[derive(Clone)]
pub struct Ranged {
    path: PathBuf,
    options: RangeOptions,
    sniffer: Option<Arc<dyn ContentTypeSniffer>>,
}

impl fmt::Debug for Ranged {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Ranged")
            .field("path", &self.path)
            .field("options", &self.options)
            .field("sniffer", &self.sniffer.is_some())
            .finish()
    }
}

impl Ranged {
    pub fn new(path: impl Into<PathBuf>, options: RangeOptions) -> Self {
        Ranged { path: path.into(), options, sniffer: None }
    }

    /// Content type lookup used when the options name no type.
    pub fn with_sniffer(mut self, sniffer: impl ContentTypeSniffer + 'static) -> Self {
        self.sniffer = Some(Arc::new(sniffer));
        self
    }

    /// Reads the file size and resolves the requested range. Returns
    /// [`Error::Range`] for a bad range unless errors are tolerated, and
    /// [`Error::Io`] if the file cannot be inspected.
    pub fn try_respond(self) -> Result<RangedResponse, Error> {
        let file = FileResource::open(&self.path)?;
        self.respond_to(file)
    }

    /// Same as [`Ranged::try_respond`], without blocking on file metadata.
    pub async fn respond(self) -> Result<RangedResponse, Error> {
        let file = FileResource::open_async(self.path.clone()).await?;
        self.respond_to(file)
    }

    /// Resolves against an already opened file, skipping the metadata read.
    pub fn respond_to(self, file: FileResource) -> Result<RangedResponse, Error> {
        let mime_type = resolve_mime(self.options.mime_type.as_deref(), self.sniffer.as_deref(), file.path());
        let resolved = resolve(
            file.byte_size(),
            mime_type.as_deref(),
            self.options.range.as_deref(),
            self.options.tolerate_errors,
        )?;
        let headers = Headers::from(&resolved);
        Ok(RangedResponse {
            resolved,
            headers,
            file,
            status_header: self.options.status_header,
        })
    }
}

/// Answers through [`Ranged::try_respond`], which reads file metadata with
/// a blocking call. Inside async handlers prefer returning
/// `ranged.respond().await`.
impl IntoResponse for Ranged {
    fn into_response(self) -> Response {
        self.try_respond().into_response()
    }
}

/// Status, headers and a not yet read body. Implements [`IntoResponse`].
#[derive(Debug, Clone)]
pub struct RangedResponse {
    resolved: ResolvedRange,
    headers: Headers,
    file: FileResource,
    status_header: Option<String>,
}

impl RangedResponse {
    pub fn status(&self) -> StatusCode {
        self.resolved.status()
    }

    pub fn headers(&self) -> &Headers {
        &self.headers
    }

    pub fn resolved(&self) -> &ResolvedRange {
        &self.resolved
    }

    pub fn file(&self) -> &FileResource {
        &self.file
    }

    /// Name of the header echoing the status code, if one was configured.
    pub fn status_header(&self) -> Option<&str> {
        self.status_header.as_deref()
    }

    /// Reads the selected bytes now.
    pub fn content(&self) -> Result<Bytes, Error> {
        let content = self.file.read_range(self.resolved.start(), self.resolved.content_length())?;
        Ok(content)
    }

    /// The selected bytes as a stream. Nothing is read until the stream is
    /// first polled; the read then runs on tokio's blocking pool.
    pub fn into_stream(self) -> impl Stream<Item = io::Result<Bytes>> + Send + 'static {
        let RangedResponse { resolved, file, .. } = self;
        try_stream! {
            if resolved.content_length() > 0 {
                let content = tokio::task::spawn_blocking(move || {
                    file.read_range(resolved.start(), resolved.content_length())
                })
                .await
                .map_err(io::Error::other)??;
                yield content;
            }
        }
    }

    pub fn into_parts(self) -> (StatusCode, Headers, impl Stream<Item = io::Result<Bytes>> + Send + 'static) {
        let status = self.status();
        let headers = self.headers.clone();
        (status, headers, self.into_stream())
    }

    /// The headers to send, including the status echo header.
    pub fn header_map(&self) -> Result<HeaderMap, Error> {
        let mut map = HeaderMap::new();
        self.headers.write_to(&mut map)?;
        if let Some(name) = &self.status_header {
            let mut echo = Headers::new();
            echo.set(name.as_str(), self.status().as_u16());
            echo.write_to(&mut map)?;
        }
        Ok(map)
    }
}

impl IntoResponse for RangedResponse {
    fn into_response(self) -> Response {
        let headers = match self.header_map() {
            Ok(headers) => headers,
            Err(e) => return e.into_response(),
        };
        let status = self.status();
        tracing::debug!(
            %status,
            content_range = %self.resolved.content_range(),
            path = %self.file.path().display(),
            "sending ranged response"
        );
        (status, headers, Body::from_stream(self.into_stream())).into_response()
    }
}
