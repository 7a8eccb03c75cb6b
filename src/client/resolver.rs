//! Upload entry point resolution across A1000 API generations

use std::path::Path;

use anyhow::{anyhow, Result};
use tracing::info;

use super::{A1000Client, TransportError, UploadResponse};

/// Multipart part name used when an entry point does not declare one.
const DEFAULT_PART: &str = "file";

/// Upload entry points known across appliance API generations.
///
/// Path-based entries hand the client a path and let it build the request;
/// handle-based entries open the file themselves on every attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EntryPoint {
    UploadSampleFromPath,
    SubmitFileFromPath,
    UploadSampleFromFile,
    SubmitFileFromHandle,
}

impl EntryPoint {
    /// Probe order: path-based entries are preferred over handle-based ones.
    pub const ALL: [EntryPoint; 4] = [
        EntryPoint::UploadSampleFromPath,
        EntryPoint::SubmitFileFromPath,
        EntryPoint::UploadSampleFromFile,
        EntryPoint::SubmitFileFromHandle,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            Self::UploadSampleFromPath => "upload_sample_from_path",
            Self::SubmitFileFromPath => "submit_file_from_path",
            Self::UploadSampleFromFile => "upload_sample_from_file",
            Self::SubmitFileFromHandle => "submit_file_from_handle",
        }
    }

    fn is_path_based(&self) -> bool {
        matches!(self, Self::UploadSampleFromPath | Self::SubmitFileFromPath)
    }

    /// Part name the entry's API generation expects for the file, where the
    /// generations drifted. `None` falls back to [`DEFAULT_PART`].
    fn part_name(&self) -> Option<&'static str> {
        match self {
            Self::UploadSampleFromPath => Some("file_path"),
            Self::SubmitFileFromPath => Some("sample_path"),
            _ => None,
        }
    }
}

/// A resolved upload operation, bound once per run and reused for every file.
#[derive(Debug)]
pub struct UploadOperation<'c> {
    client: &'c A1000Client,
    entry: EntryPoint,
    part_name: &'static str,
}

impl UploadOperation<'_> {
    pub fn entry(&self) -> EntryPoint {
        self.entry
    }

    /// Perform one HTTP upload attempt for `path`.
    pub async fn invoke(&self, path: &Path) -> std::result::Result<UploadResponse, TransportError> {
        if self.entry.is_path_based() {
            self.client.upload_from_path(self.part_name, path).await
        } else {
            self.client.submit_from_handle(path).await
        }
    }
}

/// Bind to the first entry point the client supports.
///
/// Fails before any file is touched when none of the known candidates is
/// available; the diagnostic names every candidate checked, since that
/// points at an incompatible appliance API version.
pub fn resolve(client: &A1000Client) -> Result<UploadOperation<'_>> {
    for entry in EntryPoint::ALL {
        if client.supports(entry) {
            let part_name = entry.part_name().unwrap_or(DEFAULT_PART);
            info!("Resolved upload entry point: {}", entry.name());
            return Ok(UploadOperation {
                client,
                entry,
                part_name,
            });
        }
    }

    let checked: Vec<&str> = EntryPoint::ALL.iter().map(|e| e.name()).collect();
    Err(anyhow!(
        "no supported upload entry point on this client (checked: {})",
        checked.join(", ")
    ))
}
