use std::{path::PathBuf, time::Duration};

use futures::TryStreamExt;
use thiserror::Error;
use utils::stream_lines::{LineStream, LinesStreamExt, read_lines};

use super::config::SourceMode;

#[derive(Debug, Error)]
pub enum SourceError {
    #[error("Failed to build HTTP client: {0}")]
    Client(#[source] reqwest::Error),
    #[error("Request to {url} failed: {source}")]
    Request {
        url: String,
        #[source]
        source: reqwest::Error,
    },
    #[error("statusCode={status} from {url}")]
    Status {
        url: String,
        status: reqwest::StatusCode,
    },
    #[error("Failed to open {}: {source}", path.display())]
    Open {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// Opens chat line streams. Both modes hand back the same [`LineStream`], so the
/// rest of the pipeline never knows which transport it is reading from.
#[derive(Debug, Clone)]
pub struct LineSource {
    mode: SourceMode,
    client: reqwest::Client,
}

impl LineSource {
    pub fn new(mode: SourceMode) -> Result<Self, SourceError> {
        // No overall timeout: the chat endpoint is a long-lived stream.
        let client = reqwest::Client::builder()
            .connect_timeout(Duration::from_secs(30))
            .build()
            .map_err(SourceError::Client)?;

        Ok(Self { mode, client })
    }

    pub async fn open(&self, locator: &str) -> Result<LineStream, SourceError> {
        match self.mode {
            SourceMode::Http => self.open_http(locator).await,
            SourceMode::File => open_file(locator).await,
        }
    }

    async fn open_http(&self, url: &str) -> Result<LineStream, SourceError> {
        let response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|source| SourceError::Request {
                url: url.to_string(),
                source,
            })?;

        let status = response.status();
        if !status.is_success() {
            return Err(SourceError::Status {
                url: url.to_string(),
                status,
            });
        }

        tracing::debug!("Streaming chat lines from {} ({})", url, status);
        Ok(response.bytes_stream().map_err(std::io::Error::other).lines())
    }
}

async fn open_file(path: &str) -> Result<LineStream, SourceError> {
    let file = tokio::fs::File::open(path)
        .await
        .map_err(|source| SourceError::Open {
            path: PathBuf::from(path),
            source,
        })?;

    tracing::debug!("Replaying chat lines from {}", path);
    Ok(read_lines(file))
}
