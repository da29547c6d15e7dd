//! Fetching artifacts to local temporary files.

use std::path::Path;

use async_trait::async_trait;
use binvendor_core::{Error, Result};
use reqwest::Client;
use tempfile::NamedTempFile;
use tokio::io::AsyncWriteExt;
use tracing::debug;

/// Fetches the bytes behind a URI into a local temporary file.
///
/// The returned file is deleted when dropped; callers copy it to its final
/// location first. Timeouts, retries and authentication are the
/// implementation's concern.
#[async_trait]
pub trait Downloader: Send + Sync {
    /// Short name used in logs.
    fn name(&self) -> &'static str;

    /// Download `uri`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Download`] when the transfer fails.
    async fn fetch(&self, uri: &str) -> Result<NamedTempFile>;
}

/// Downloads over HTTP(S) with reqwest. `file://` URIs are read from the
/// local file system.
#[derive(Debug, Clone)]
pub struct HttpDownloader {
    client: Client,
}

impl HttpDownloader {
    /// Create a downloader with a default client.
    ///
    /// # Errors
    ///
    /// Returns an error if the TLS backend cannot be initialised.
    pub fn new() -> Result<Self> {
        let client = Client::builder()
            .user_agent(concat!("binvendor/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| Error::configuration(format!("Failed to create HTTP client: {e}")))?;
        Ok(Self { client })
    }

    /// Use a preconfigured client (proxies, timeouts, ...).
    #[must_use]
    pub fn with_client(client: Client) -> Self {
        Self { client }
    }

    async fn fetch_http(&self, uri: &str) -> Result<NamedTempFile> {
        let mut response = self
            .client
            .get(uri)
            .send()
            .await
            .map_err(|e| Error::download(uri, format!("request failed: {e}")))?;

        if !response.status().is_success() {
            return Err(Error::download(uri, format!("HTTP {}", response.status())));
        }

        let temp = NamedTempFile::new()?;
        let handle = temp
            .reopen()
            .map_err(|e| Error::file("open", temp.path(), e))?;
        let mut file = tokio::fs::File::from_std(handle);

        let mut written = 0usize;
        while let Some(chunk) = response
            .chunk()
            .await
            .map_err(|e| Error::download(uri, format!("failed to read body: {e}")))?
        {
            file.write_all(&chunk)
                .await
                .map_err(|e| Error::file("write", temp.path(), e))?;
            written += chunk.len();
        }
        file.flush()
            .await
            .map_err(|e| Error::file("write", temp.path(), e))?;

        debug!(%uri, bytes = written, "Downloaded");
        Ok(temp)
    }
}

async fn fetch_local(uri: &str, path: &Path) -> Result<NamedTempFile> {
    let temp = NamedTempFile::new()?;
    let bytes = tokio::fs::copy(path, temp.path())
        .await
        .map_err(|e| Error::download(uri, e.to_string()))?;
    debug!(%uri, bytes, "Copied local artifact");
    Ok(temp)
}

#[async_trait]
impl Downloader for HttpDownloader {
    fn name(&self) -> &'static str {
        "http"
    }

    async fn fetch(&self, uri: &str) -> Result<NamedTempFile> {
        debug!(%uri, "Fetching");
        match uri.strip_prefix("file://") {
            Some(path) => fetch_local(uri, Path::new(path)).await,
            None => self.fetch_http(uri).await,
        }
    }
}

#[cfg(test)]
mod tests {
    use tokio::io::AsyncReadExt;
    use tokio::net::TcpListener;

    use super::*;

    /// Serve one canned HTTP response on a local port.
    async fn serve_once(response: &'static str) -> String {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let address = listener.local_addr().unwrap();
        tokio::spawn(async move {
            let (mut socket, _) = listener.accept().await.unwrap();
            let mut request = [0u8; 1024];
            let _ = socket.read(&mut request).await.unwrap();
            socket.write_all(response.as_bytes()).await.unwrap();
            socket.shutdown().await.unwrap();
        });
        format!("http://{address}/artifact.zip")
    }

    #[tokio::test]
    async fn test_http_success_writes_body() {
        let uri = serve_once(
            "HTTP/1.1 200 OK\r\nContent-Length: 5\r\nConnection: close\r\n\r\nhello",
        )
        .await;
        let downloader = HttpDownloader::new().unwrap();
        let file = downloader.fetch(&uri).await.unwrap();
        assert_eq!(std::fs::read(file.path()).unwrap(), b"hello");
    }

    #[tokio::test]
    async fn test_http_error_status_is_download_error() {
        let uri = serve_once(
            "HTTP/1.1 404 Not Found\r\nContent-Length: 0\r\nConnection: close\r\n\r\n",
        )
        .await;
        let downloader = HttpDownloader::new().unwrap();
        let err = downloader.fetch(&uri).await.unwrap_err();
        match err {
            Error::Download { uri: failed, message } => {
                assert_eq!(failed, uri);
                assert!(message.contains("404"), "{message}");
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[tokio::test]
    async fn test_file_uri_is_read_locally() {
        let temp = tempfile::tempdir().unwrap();
        let source = temp.path().join("tool.zip");
        std::fs::write(&source, b"archive").unwrap();

        let downloader = HttpDownloader::new().unwrap();
        let file = downloader
            .fetch(&format!("file://{}", source.display()))
            .await
            .unwrap();
        assert_eq!(std::fs::read(file.path()).unwrap(), b"archive");
    }

    #[tokio::test]
    async fn test_missing_local_file_is_download_error() {
        let temp = tempfile::tempdir().unwrap();
        let uri = format!("file://{}", temp.path().join("missing").display());

        let err = HttpDownloader::new().unwrap().fetch(&uri).await.unwrap_err();
        assert!(matches!(err, Error::Download { .. }));
    }
}
