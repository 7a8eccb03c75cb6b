//! A1000 client - HTTP transport to the Spectra Analyze appliance

pub mod resolver;

pub use resolver::{resolve, EntryPoint, UploadOperation};

use std::path::Path;

use anyhow::Result;
use reqwest::multipart;
use serde::Deserialize;
use thiserror::Error;
use tracing::debug;

use crate::config::Config;

/// User-Agent header value sent on every request
const USER_AGENT: &str = concat!("spectra-upload/", env!("CARGO_PKG_VERSION"));

/// Transport-level failure of a single upload attempt, normalized so the
/// retry logic never has to inspect library error types.
#[derive(Debug, Error)]
pub enum TransportError {
    #[error("timeout")]
    Timeout,

    #[error("connection error: {0}")]
    Connection(String),

    /// The transport library reported an HTTP status inside its own error
    /// instead of returning a response.
    #[error("HTTP {status} (via {via})")]
    UpstreamStatus { status: u16, via: String },

    #[error("{0}")]
    Unknown(String),
}

impl TransportError {
    /// Status code embedded in the error, if any.
    pub fn status(&self) -> Option<u16> {
        match self {
            Self::UpstreamStatus { status, .. } => Some(*status),
            _ => None,
        }
    }
}

/// Response descriptor for one completed HTTP upload attempt.
#[derive(Debug, Clone)]
pub struct UploadResponse {
    pub status: u16,
    /// SHA-1 the appliance assigned to the sample, when the body carried one.
    pub sha1: Option<String>,
}

#[derive(Debug, Deserialize)]
struct UploadBody {
    detail: Option<UploadDetail>,
}

#[derive(Debug, Deserialize)]
struct UploadDetail {
    sha1: Option<String>,
}

/// Authenticated client for one A1000 appliance.
///
/// The request timeout is installed on the underlying `reqwest::Client` at
/// construction and never changed afterwards.
#[derive(Debug)]
pub struct A1000Client {
    http: reqwest::Client,
    host: String,
    token: String,
    capabilities: Vec<EntryPoint>,
}

impl A1000Client {
    pub fn new(config: &Config) -> Result<Self> {
        Self::from_parts(
            config.host.clone(),
            config.token.clone(),
            config.verify_tls,
            config.request_timeout,
        )
    }

    /// Build a client from already-normalized parts.
    pub fn from_parts(
        host: impl Into<String>,
        token: impl Into<String>,
        verify_tls: bool,
        timeout: std::time::Duration,
    ) -> Result<Self> {
        let http = reqwest::Client::builder()
            .timeout(timeout)
            .danger_accept_invalid_certs(!verify_tls)
            .user_agent(USER_AGENT)
            .build()?;

        Ok(Self {
            http,
            host: host.into().trim_end_matches('/').to_string(),
            token: token.into(),
            capabilities: EntryPoint::ALL.to_vec(),
        })
    }

    /// Restrict the advertised upload entry points. Used to model older
    /// appliance API generations (and to exercise resolver fallback in tests).
    pub fn with_capabilities(mut self, capabilities: Vec<EntryPoint>) -> Self {
        self.capabilities = capabilities;
        self
    }

    pub fn supports(&self, entry: EntryPoint) -> bool {
        self.capabilities.contains(&entry)
    }

    /// Path-based upload: multipart POST with the part name the resolved
    /// API generation expects.
    pub(crate) async fn upload_from_path(
        &self,
        part_name: &'static str,
        path: &Path,
    ) -> std::result::Result<UploadResponse, TransportError> {
        let bytes = read_file(path).await?;
        let url = format!("{}/api/uploads/", self.host);
        debug!("POST {} ({}={})", url, part_name, path.display());

        let part = multipart::Part::bytes(bytes).file_name(display_name(path));
        let form = multipart::Form::new().part(part_name, part);

        let request = self
            .http
            .post(&url)
            .header("Authorization", format!("Token {}", self.token))
            .multipart(form);

        self.execute(request).await
    }

    /// Handle-based upload: the file is opened, read and closed once per
    /// attempt, then submitted as a raw request body.
    pub(crate) async fn submit_from_handle(
        &self,
        path: &Path,
    ) -> std::result::Result<UploadResponse, TransportError> {
        let bytes = read_file(path).await?;
        let url = format!("{}/api/submit/", self.host);
        debug!("POST {} ({})", url, path.display());

        let request = self
            .http
            .post(&url)
            .header("Authorization", format!("Token {}", self.token))
            .header("Content-Type", "application/octet-stream")
            .header("X-File-Name", display_name(path))
            .body(bytes);

        self.execute(request).await
    }

    async fn execute(
        &self,
        request: reqwest::RequestBuilder,
    ) -> std::result::Result<UploadResponse, TransportError> {
        let response = request.send().await.map_err(classify)?;
        let status = response.status().as_u16();

        // The body only matters on success, and only for the sample SHA-1.
        let sha1 = if response.status().is_success() {
            response
                .json::<UploadBody>()
                .await
                .ok()
                .and_then(|body| body.detail)
                .and_then(|detail| detail.sha1)
        } else {
            None
        };

        Ok(UploadResponse { status, sha1 })
    }
}

/// Map a reqwest error onto the transport taxonomy.
fn classify(err: reqwest::Error) -> TransportError {
    if err.is_timeout() {
        return TransportError::Timeout;
    }
    if err.is_connect() {
        return TransportError::Connection(err.to_string());
    }
    if let Some(status) = err.status() {
        return TransportError::UpstreamStatus {
            status: status.as_u16(),
            via: "reqwest".to_string(),
        };
    }
    TransportError::Unknown(err.to_string())
}

async fn read_file(path: &Path) -> std::result::Result<Vec<u8>, TransportError> {
    tokio::fs::read(path)
        .await
        .map_err(|e| TransportError::Unknown(format!("failed to read {}: {}", path.display(), e)))
}

fn display_name(path: &Path) -> String {
    path.file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| "sample".to_string())
}
