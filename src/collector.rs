//! File collector - deterministic enumeration of upload candidates

use std::path::{Path, PathBuf};

use anyhow::{anyhow, Context, Result};
use globset::{Glob, GlobSet, GlobSetBuilder};
use tracing::warn;
use walkdir::WalkDir;

/// A file selected for upload. The path is absolute and was a regular file
/// at collection time.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UploadTarget {
    pub path: PathBuf,
}

/// Ordered upload candidates plus the count of files an exclude pattern
/// filtered out.
#[derive(Debug, Default)]
pub struct CollectionResult {
    pub targets: Vec<UploadTarget>,
    pub excluded: usize,
}

impl CollectionResult {
    pub fn total_seen(&self) -> usize {
        self.targets.len() + self.excluded
    }
}

/// Enumerate files under `root`, applying base-name exclusion patterns.
///
/// A file root yields at most one target. A directory root yields its
/// immediate children, or the full subtree when `recursive` is set. Only
/// regular files are eligible; directories and special files are silently
/// skipped without counting as excluded. The result is sorted by absolute
/// path so successive runs over an unchanged tree are identical.
pub fn collect(root: &Path, recursive: bool, patterns: &[String]) -> Result<CollectionResult> {
    let excludes = build_exclude_set(patterns)?;

    if root.is_file() {
        if is_excluded(&excludes, root) {
            return Ok(CollectionResult {
                targets: Vec::new(),
                excluded: 1,
            });
        }
        return Ok(CollectionResult {
            targets: vec![UploadTarget {
                path: absolute(root)?,
            }],
            excluded: 0,
        });
    }

    if !root.is_dir() {
        return Err(anyhow!("path does not exist: {}", root.display()));
    }

    let mut targets = Vec::new();
    let mut excluded = 0usize;

    let max_depth = if recursive { usize::MAX } else { 1 };
    for entry in WalkDir::new(root).follow_links(false).max_depth(max_depth) {
        let entry = match entry {
            Ok(e) => e,
            Err(e) => {
                warn!("Failed to access entry during directory walk: {}", e);
                continue;
            }
        };

        if entry.depth() == 0 {
            continue;
        }

        // Follow a file symlink for the regular-file check, but never
        // descend through directory symlinks (follow_links is off).
        let is_regular = entry
            .path()
            .metadata()
            .map(|m| m.is_file())
            .unwrap_or(false);
        if !is_regular {
            continue;
        }

        if is_excluded(&excludes, entry.path()) {
            excluded += 1;
            continue;
        }

        targets.push(UploadTarget {
            path: absolute(entry.path())?,
        });
    }

    targets.sort_by(|a, b| a.path.cmp(&b.path));

    Ok(CollectionResult { targets, excluded })
}

fn build_exclude_set(patterns: &[String]) -> Result<GlobSet> {
    let mut builder = GlobSetBuilder::new();
    for pattern in patterns {
        let glob = Glob::new(pattern)
            .with_context(|| format!("invalid exclude pattern: {}", pattern))?;
        builder.add(glob);
    }
    Ok(builder.build()?)
}

/// Exclusion matches the base name only, never parent path components.
fn is_excluded(excludes: &GlobSet, path: &Path) -> bool {
    match path.file_name() {
        Some(name) => excludes.is_match(Path::new(name)),
        None => false,
    }
}

fn absolute(path: &Path) -> Result<PathBuf> {
    std::path::absolute(path)
        .with_context(|| format!("failed to absolutize {}", path.display()))
}
