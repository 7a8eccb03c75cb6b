//! spectra-upload library - bulk file uploads to Spectra Analyze (A1000)

pub mod client;
pub mod collector;
pub mod config;
pub mod runner;
pub mod uploader;

// Re-export commonly used types
pub use client::{resolve, A1000Client, EntryPoint, TransportError, UploadOperation, UploadResponse};
pub use collector::{collect, CollectionResult, UploadTarget};
pub use config::{Config, ConfigOptions};
pub use runner::{run, RunSummary};
pub use uploader::{upload_with_retry, RetryPolicy, UploadOutcome};
