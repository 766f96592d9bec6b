//! HTTP client with connection pooling

use futures::StreamExt;
use impack_config::NetworkConfig;
use impack_errors::{Error, NetworkError};
use reqwest::{Client, Response};
use std::path::Path;
use std::time::Duration;
use tokio::io::AsyncWriteExt;

/// Network client configuration
#[derive(Debug, Clone)]
pub struct NetConfig {
    pub timeout: Duration,
    pub connect_timeout: Duration,
    pub pool_idle_timeout: Duration,
    pub pool_max_idle_per_host: usize,
    pub user_agent: String,
}

impl Default for NetConfig {
    fn default() -> Self {
        Self {
            timeout: Duration::from_secs(300), // 5 minutes for large archives
            connect_timeout: Duration::from_secs(30),
            pool_idle_timeout: Duration::from_secs(90),
            pool_max_idle_per_host: 10,
            user_agent: format!("impack/{}", env!("CARGO_PKG_VERSION")),
        }
    }
}

impl From<&NetworkConfig> for NetConfig {
    fn from(settings: &NetworkConfig) -> Self {
        Self {
            timeout: Duration::from_secs(settings.timeout),
            connect_timeout: Duration::from_secs(settings.connect_timeout),
            user_agent: settings.user_agent.clone(),
            ..Self::default()
        }
    }
}

/// HTTP client wrapper
#[derive(Clone)]
pub struct NetClient {
    client: Client,
    config: NetConfig,
}

impl NetClient {
    /// Create a new network client
    ///
    /// # Errors
    ///
    /// Returns an error if the underlying reqwest client fails to initialize.
    pub fn new(config: NetConfig) -> Result<Self, Error> {
        let client = Client::builder()
            .timeout(config.timeout)
            .connect_timeout(config.connect_timeout)
            .pool_idle_timeout(config.pool_idle_timeout)
            .pool_max_idle_per_host(config.pool_max_idle_per_host)
            .user_agent(&config.user_agent)
            .build()
            .map_err(|e| NetworkError::ConnectionRefused(e.to_string()))?;

        Ok(Self { client, config })
    }

    /// Create with default configuration
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP client cannot be created.
    pub fn with_defaults() -> Result<Self, Error> {
        Self::new(NetConfig::default())
    }

    /// Execute a GET request
    ///
    /// Non-success statuses are returned as `NetworkError::HttpError`.
    ///
    /// # Errors
    ///
    /// Returns an error on timeouts, connection failures or error statuses.
    pub async fn get(&self, url: &str) -> Result<Response, Error> {
        let response = self
            .client
            .get(url)
            .header(reqwest::header::ACCEPT, "application/zip, application/octet-stream, */*")
            .send()
            .await
            .map_err(|e| map_request_error(url, &e))?;

        let status = response.status();
        if !status.is_success() {
            return Err(NetworkError::HttpError {
                status: status.as_u16(),
                url: url.to_string(),
            }
            .into());
        }
        Ok(response)
    }

    /// Stream a response body into `dest`, returning the number of bytes written
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails, the body stream breaks, or
    /// the file cannot be written.
    pub async fn stream_to_file(
        &self,
        response: Response,
        dest: &Path,
    ) -> Result<u64, Error> {
        let url = response.url().to_string();
        let mut file = tokio::fs::File::create(dest)
            .await
            .map_err(|e| Error::io_with_path(&e, dest))?;
        let mut stream = response.bytes_stream();
        let mut written = 0u64;

        while let Some(chunk) = stream.next().await {
            let chunk = chunk.map_err(|e| map_request_error(&url, &e))?;
            file.write_all(&chunk)
                .await
                .map_err(|e| Error::io_with_path(&e, dest))?;
            written += chunk.len() as u64;
        }
        file.flush()
            .await
            .map_err(|e| Error::io_with_path(&e, dest))?;

        Ok(written)
    }

    /// Client configuration
    #[must_use]
    pub fn config(&self) -> &NetConfig {
        &self.config
    }
}

fn map_request_error(url: &str, error: &reqwest::Error) -> Error {
    if error.is_timeout() {
        NetworkError::Timeout {
            url: url.to_string(),
        }
        .into()
    } else if error.is_connect() {
        NetworkError::ConnectionRefused(format!("{url}: {error}")).into()
    } else if error.is_builder() {
        NetworkError::InvalidUrl(format!("{url}: {error}")).into()
    } else {
        NetworkError::DownloadFailed(format!("{url}: {error}")).into()
    }
}
