//! Single-attempt document retrieval

use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::Result;
use async_trait::async_trait;
use futures::StreamExt;
use reqwest::{Client, StatusCode};
use tokio::fs;
use tokio::io::AsyncWriteExt;
use tracing::debug;

use crate::config::HttpConfig;
use crate::errors::FetchError;

/// Sibling `<filename>.part` the body is streamed into. Removed on drop
/// unless it was renamed over the destination, so an interrupted download
/// never replaces a good copy.
struct PartialDownload {
    path: PathBuf,
    persisted: bool,
}

impl PartialDownload {
    fn beside(destination: &Path) -> Self {
        let mut name = destination.file_name().unwrap_or_default().to_os_string();
        name.push(".part");
        Self {
            path: destination.with_file_name(name),
            persisted: false,
        }
    }

    async fn persist(mut self, destination: &Path) -> Result<(), FetchError> {
        fs::rename(&self.path, destination)
            .await
            .map_err(|source| FetchError::Io {
                path: destination.to_path_buf(),
                source,
            })?;
        self.persisted = true;
        Ok(())
    }
}

impl Drop for PartialDownload {
    fn drop(&mut self) {
        if !self.persisted {
            let _ = std::fs::remove_file(&self.path);
        }
    }
}

#[async_trait]
pub trait Fetcher: Send + Sync {
    /// GET `url` and store the body at `destination`.
    ///
    /// Returns `Ok(true)` only for HTTP 200, `Ok(false)` for any other
    /// status, and an error for transport or filesystem failures.
    async fn fetch(&self, url: &str, destination: &Path) -> Result<bool, FetchError>;
}

/// Plain GET over reqwest, no custom headers beyond an optional user agent
#[derive(Debug, Clone)]
pub struct HttpFetcher {
    client: Client,
}

impl HttpFetcher {
    pub fn new(config: &HttpConfig) -> Result<Self> {
        let mut builder = Client::builder();
        if let Some(user_agent) = &config.user_agent {
            builder = builder.user_agent(user_agent);
        }
        if let Some(seconds) = config.timeout_seconds {
            builder = builder.timeout(Duration::from_secs(seconds));
        }
        Ok(Self {
            client: builder.build()?,
        })
    }

    pub fn with_client(client: Client) -> Self {
        Self { client }
    }

    async fn write_body(
        response: reqwest::Response,
        url: &str,
        destination: &Path,
    ) -> Result<u64, FetchError> {
        let io_error = |source: std::io::Error| FetchError::Io {
            path: destination.to_path_buf(),
            source,
        };

        let mut file = fs::File::create(destination).await.map_err(io_error)?;
        let mut written = 0u64;
        let mut stream = response.bytes_stream();
        while let Some(chunk) = stream.next().await {
            let chunk = chunk.map_err(|source| FetchError::Http {
                url: url.to_string(),
                source,
            })?;
            file.write_all(&chunk).await.map_err(io_error)?;
            written += chunk.len() as u64;
        }
        file.flush().await.map_err(io_error)?;
        Ok(written)
    }
}

#[async_trait]
impl Fetcher for HttpFetcher {
    async fn fetch(&self, url: &str, destination: &Path) -> Result<bool, FetchError> {
        let response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|source| FetchError::Http {
                url: url.to_string(),
                source,
            })?;

        let status = response.status();
        debug!("HTTP GET {} {}", url, status.as_u16());
        if status != StatusCode::OK {
            return Ok(false);
        }

        if let Some(parent) = destination.parent() {
            fs::create_dir_all(parent)
                .await
                .map_err(|source| FetchError::Io {
                    path: parent.to_path_buf(),
                    source,
                })?;
        }

        let partial = PartialDownload::beside(destination);
        let bytes = Self::write_body(response, url, &partial.path).await?;
        partial.persist(destination).await?;
        debug!("Stored {} bytes at {}", bytes, destination.display());
        Ok(true)
    }
}
