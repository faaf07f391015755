use std::path::PathBuf;

use axum::extract::Query;
use axum::http::HeaderMap;
use axum::response::{IntoResponse, Response};
use axum::routing::get;
use axum::Router;
use serde::Deserialize;

use http_stream::{Error, GuessFromExtension, RangeOptions, Ranged, RangedResponse, STATUS_ECHO_HEADER};

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
struct FileRequest {
    path: PathBuf,
    #[serde(default)]
    tolerate: bool,
}

fn ranged(headers: &HeaderMap, q: FileRequest) -> Ranged {
    let options = RangeOptions::from_headers(headers)
        .tolerate_errors(q.tolerate)
        .status_header(STATUS_ECHO_HEADER);
    Ranged::new(q.path, options).with_sniffer(GuessFromExtension)
}

/// Headers go out first, the body is streamed afterwards.
async fn get_file(headers: HeaderMap, Query(q): Query<FileRequest>) -> Result<RangedResponse, Error> {
    ranged(&headers, q).respond().await
}

/// Enumerates the headers itself and reads the body in one go.
async fn get_file_manual(headers: HeaderMap, Query(q): Query<FileRequest>) -> Result<Response, Error> {
    let response = ranged(&headers, q).respond().await?;

    for header in response.headers() {
        tracing::debug!(name = header.name(), value = header.value(), "header");
    }
    let map = response.header_map()?;

    let status = response.status();
    let content = tokio::task::spawn_blocking(move || response.content())
        .await
        .map_err(|e| Error::Io(std::io::Error::other(e)))??;
    Ok((status, map, content).into_response())
}

#[tokio::main]
async fn main() -> std::io::Result<()> {
    tracing_subscriber::fmt()
        .with_target(false)
        .with_level(true)
        .init();

    let router = Router::new()
        .route("/", get(|| async { "Hello, World!" }))
        .route("/file", get(get_file))
        .route("/file/manual", get(get_file_manual));

    let listener = tokio::net::TcpListener::bind("0.0.0.0:3000").await?;
    tracing::info!(addr = %listener.local_addr()?, "serving files");

    axum::serve(listener, router)
        .with_graceful_shutdown(async {
            let _ = tokio::signal::ctrl_c().await;
        })
        .await
}
