#![deny(clippy::pedantic, unsafe_code)]
#![allow(clippy::module_name_repetitions)]

//! Network operations for impack
//!
//! A thin wrapper over `reqwest` used to download component archives.
//! Failed transfers are reported, never retried.

mod client;

pub use client::{NetClient, NetConfig};

use impack_errors::{Error, NetworkError};
use impack_events::{AppEvent, DownloadEvent, EventEmitter, EventSender, FailureContext};
use std::path::Path;
use std::time::Instant;
use url::Url;

/// Outcome of a completed download
#[derive(Debug, Clone)]
pub struct DownloadResult {
    pub url: String,
    pub size: u64,
}

/// Download `url` into `dest`, emitting download events
///
/// # Errors
///
/// Returns an error if the URL is invalid, the server answers with an error
/// status, the transfer breaks, or `dest` cannot be written.
pub async fn download_file(
    client: &NetClient,
    url: &str,
    dest: &Path,
    tx: &EventSender,
) -> Result<DownloadResult, Error> {
    let started = Instant::now();
    let result = async {
        parse_url(url)?;
        let response = client.get(url).await?;
        tx.emit_download_started(url, response.content_length());
        client.stream_to_file(response, dest).await
    }
    .await;

    match result {
        Ok(size) => {
            tx.emit_download_completed(url, size, started.elapsed());
            Ok(DownloadResult {
                url: url.to_string(),
                size,
            })
        }
        Err(err) => {
            tx.emit(AppEvent::Download(DownloadEvent::Failed {
                url: url.to_string(),
                failure: FailureContext::from_error(&err),
            }));
            Err(err)
        }
    }
}

/// Parse and validate a URL
///
/// # Errors
///
/// Returns an error if the URL string is malformed.
pub fn parse_url(url: &str) -> Result<Url, Error> {
    Url::parse(url).map_err(|e| NetworkError::InvalidUrl(format!("{url}: {e}")).into())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_url() {
        assert!(parse_url("https://example.com").is_ok());
        assert!(parse_url("not a url").is_err());
    }
}
