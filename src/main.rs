//! spectra-upload - bulk file uploader for Spectra Analyze (A1000)

use std::path::{Path, PathBuf};

use anyhow::{anyhow, Result};
use clap::Parser;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use spectra_upload::config::truthy;
use spectra_upload::uploader::UploadOutcome;
use spectra_upload::{collect, resolve, run, A1000Client, Config, ConfigOptions, RetryPolicy, RunSummary};

#[derive(Parser, Debug)]
#[command(name = "spectra-upload")]
#[command(about = "Upload files to ReversingLabs Spectra Analyze (A1000)")]
struct Args {
    /// File or directory to upload
    #[arg(value_name = "PATH")]
    target: Option<PathBuf>,

    /// File or directory to upload (alternative to positional)
    #[arg(long = "path", value_name = "PATH", env = "RL_PATH")]
    path_flag: Option<PathBuf>,

    /// A1000 host URL (or set RL_HOST)
    #[arg(long, env = "RL_HOST")]
    host: String,

    /// API token (or set RL_TOKEN)
    #[arg(long, env = "RL_TOKEN", hide_env_values = true)]
    token: String,

    /// Disable TLS certificate verification
    #[arg(long)]
    no_verify_ssl: bool,

    /// Recurse into subdirectories (default: no, or set RL_RECURSIVE)
    #[arg(long)]
    recursive: bool,

    /// Do not recurse into subdirectories
    #[arg(long, conflicts_with = "recursive")]
    no_recursive: bool,

    /// Exclude filenames matching this glob pattern (repeatable)
    #[arg(long = "exclude", value_name = "PATTERN")]
    exclude: Vec<String>,

    /// Seconds to wait between uploads (or set RL_SLEEP)
    #[arg(long, env = "RL_SLEEP", default_value_t = 2.0)]
    sleep: f64,

    /// Max upload attempts per file
    #[arg(long, default_value_t = 3)]
    retries: u32,

    /// Base retry delay in seconds, multiplied by attempt number
    #[arg(long, default_value_t = 5.0)]
    retry_delay: f64,

    /// HTTP request timeout in seconds
    #[arg(long, default_value_t = 300)]
    timeout: u64,
}

impl Args {
    fn into_config(self) -> Result<Config> {
        // Positional wins over --path / RL_PATH
        let target = self
            .target
            .or(self.path_flag)
            .ok_or_else(|| anyhow!("PATH is required (positional, --path, or set RL_PATH)"))?;

        let recursive = if self.no_recursive {
            false
        } else {
            self.recursive
                || std::env::var("RL_RECURSIVE")
                    .map(|v| truthy(&v))
                    .unwrap_or(false)
        };

        Config::new(
            target,
            self.host,
            self.token,
            ConfigOptions {
                verify_tls: Some(!self.no_verify_ssl),
                recursive: Some(recursive),
                exclude_patterns: self.exclude,
                sleep_secs: Some(self.sleep),
                retries: Some(self.retries),
                retry_delay_secs: Some(self.retry_delay),
                timeout_secs: Some(self.timeout),
            },
        )
    }
}

fn print_header(target_path: &Path, recursive: bool) {
    println!();
    println!("Spectra Analyze Bulk Uploader");
    println!("{}", "\u{2500}".repeat(29));
    if target_path.is_file() {
        println!("Path:       {} (single file)", target_path.display());
    } else {
        println!("Path:       {}", target_path.display());
        println!("Recursive:  {}", if recursive { "yes" } else { "no" });
    }
    println!();
}

fn print_summary(summary: &RunSummary) {
    let mut parts = vec![
        format!("{} uploaded", summary.uploaded),
        format!("{} failed", summary.failed),
    ];
    if summary.skipped > 0 {
        parts.push(format!("{} skipped", summary.skipped));
    }
    parts.push(format!("{} total", summary.total_seen()));
    let line = parts.join(" \u{2502} ");
    let bar = "\u{2550}".repeat(line.len() + 8);
    println!();
    println!("{}", bar);
    println!("  Done.  {}", line);
    println!("{}", bar);
}

#[tokio::main]
async fn main() -> Result<()> {
    // Progress goes to stdout; keep tracing on stderr
    tracing_subscriber::registry()
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .with(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    let config = Args::parse().into_config()?;

    let client = A1000Client::new(&config)?;
    let operation = resolve(&client)?;

    let collection = collect(&config.target_path, config.recursive, &config.exclude_patterns)?;

    print_header(&config.target_path, config.recursive);
    println!("Scanning ...");
    if collection.excluded > 0 {
        println!(
            "Found {} files ({} excluded)",
            collection.total_seen(),
            collection.excluded
        );
    } else {
        println!("Found {} files", collection.targets.len());
    }
    println!();

    if collection.targets.is_empty() {
        print_summary(&RunSummary {
            skipped: collection.excluded,
            ..Default::default()
        });
        return Ok(());
    }

    let policy = RetryPolicy {
        max_attempts: config.max_attempts,
        base_delay: config.base_retry_delay,
    };

    // Base for relative display: the directory itself, or the file's parent
    let display_base = if config.target_path.is_dir() {
        config.target_path.clone()
    } else {
        config
            .target_path
            .parent()
            .map(Path::to_path_buf)
            .unwrap_or_default()
    };
    let display_base = std::path::absolute(&display_base).unwrap_or(display_base);

    let total = collection.targets.len();
    let width = total.to_string().len();

    let summary = run(
        &collection,
        &operation,
        &policy,
        config.inter_upload_delay,
        |idx, target, outcome| {
            let rel = target.path.strip_prefix(&display_base).unwrap_or(&target.path);
            let counter = format!("[{:>width$}/{}]", idx, total, width = width);
            match outcome {
                UploadOutcome::Uploaded { status, .. } => {
                    println!("{} [OK]   {} (HTTP {})", counter, rel.display(), status);
                }
                UploadOutcome::Failed { reason, .. } => {
                    println!("{} [FAIL] {} ({})", counter, rel.display(), reason);
                }
            }
        },
    )
    .await;

    print_summary(&summary);

    if summary.failed > 0 {
        std::process::exit(1);
    }

    Ok(())
}
