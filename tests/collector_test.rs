//! Tests for the file collector

use std::fs;
use std::path::Path;

use tempfile::TempDir;

use spectra_upload::collect;

fn touch(path: &Path) {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).unwrap();
    }
    fs::write(path, b"sample").unwrap();
}

fn no_patterns() -> Vec<String> {
    Vec::new()
}

#[test]
fn test_single_file_root() {
    let temp_dir = TempDir::new().unwrap();
    let file = temp_dir.path().join("sample.bin");
    touch(&file);

    let result = collect(&file, false, &no_patterns()).unwrap();

    assert_eq!(result.targets.len(), 1);
    assert_eq!(result.excluded, 0);
    assert!(result.targets[0].path.is_absolute());
    assert!(result.targets[0].path.ends_with("sample.bin"));
}

#[test]
fn test_single_file_root_excluded() {
    let temp_dir = TempDir::new().unwrap();
    let file = temp_dir.path().join("junk.tmp");
    touch(&file);

    let result = collect(&file, false, &["*.tmp".to_string()]).unwrap();

    assert!(result.targets.is_empty());
    assert_eq!(result.excluded, 1);
    assert_eq!(result.total_seen(), 1);
}

#[test]
fn test_missing_root_is_error() {
    let temp_dir = TempDir::new().unwrap();
    let missing = temp_dir.path().join("no-such-path");

    let err = collect(&missing, false, &no_patterns()).unwrap_err();
    assert!(err.to_string().contains("does not exist"));
}

#[test]
fn test_non_recursive_skips_subdirectories() {
    let temp_dir = TempDir::new().unwrap();
    touch(&temp_dir.path().join("top.txt"));
    touch(&temp_dir.path().join("sub/nested.txt"));

    let result = collect(temp_dir.path(), false, &no_patterns()).unwrap();

    assert_eq!(result.targets.len(), 1);
    assert!(result.targets[0].path.ends_with("top.txt"));
    // Subdirectory itself is silently skipped, not counted as excluded
    assert_eq!(result.excluded, 0);
}

#[test]
fn test_recursive_walks_subtree() {
    let temp_dir = TempDir::new().unwrap();
    touch(&temp_dir.path().join("top.txt"));
    touch(&temp_dir.path().join("sub/nested.txt"));
    touch(&temp_dir.path().join("sub/deeper/leaf.txt"));

    let result = collect(temp_dir.path(), true, &no_patterns()).unwrap();

    assert_eq!(result.targets.len(), 3);
}

#[test]
fn test_exclusion_matches_base_name_only() {
    let temp_dir = TempDir::new().unwrap();
    touch(&temp_dir.path().join("a/b/file.tmp"));
    touch(&temp_dir.path().join("a/b/file.txt"));
    touch(&temp_dir.path().join("sub/data.txt"));

    // *.tmp excludes the nested file by its base name
    let result = collect(temp_dir.path(), true, &["*.tmp".to_string()]).unwrap();
    assert_eq!(result.excluded, 1);
    assert_eq!(result.targets.len(), 2);

    // A pattern matching a directory name does not exclude files inside it
    let result = collect(temp_dir.path(), true, &["sub".to_string()]).unwrap();
    assert_eq!(result.excluded, 0);
    assert_eq!(result.targets.len(), 3);
}

#[test]
fn test_glob_metacharacters() {
    let temp_dir = TempDir::new().unwrap();
    touch(&temp_dir.path().join("run1.log"));
    touch(&temp_dir.path().join("run2.log"));
    touch(&temp_dir.path().join("run10.log"));
    touch(&temp_dir.path().join("keep.log.bak"));

    // ? matches exactly one character
    let result = collect(temp_dir.path(), false, &["run?.log".to_string()]).unwrap();
    assert_eq!(result.excluded, 2);
    assert_eq!(result.targets.len(), 2);

    // [seq] matches a character class
    let result = collect(temp_dir.path(), false, &["run[12].log".to_string()]).unwrap();
    assert_eq!(result.excluded, 2);
}

#[test]
fn test_exclusion_is_case_sensitive() {
    let temp_dir = TempDir::new().unwrap();
    touch(&temp_dir.path().join("README.TMP"));
    touch(&temp_dir.path().join("notes.tmp"));

    let result = collect(temp_dir.path(), false, &["*.tmp".to_string()]).unwrap();
    assert_eq!(result.excluded, 1);
    assert_eq!(result.targets.len(), 1);
    assert!(result.targets[0].path.ends_with("README.TMP"));
}

#[test]
fn test_ordering_is_deterministic_and_sorted() {
    let temp_dir = TempDir::new().unwrap();
    for name in ["zeta.bin", "alpha.bin", "midway.bin"] {
        touch(&temp_dir.path().join(name));
    }

    let first = collect(temp_dir.path(), false, &no_patterns()).unwrap();
    let second = collect(temp_dir.path(), false, &no_patterns()).unwrap();

    assert_eq!(first.targets, second.targets);

    let names: Vec<_> = first
        .targets
        .iter()
        .map(|t| t.path.file_name().unwrap().to_string_lossy().into_owned())
        .collect();
    assert_eq!(names, vec!["alpha.bin", "midway.bin", "zeta.bin"]);
}

#[test]
fn test_counts_cover_all_visited_files() {
    let temp_dir = TempDir::new().unwrap();
    touch(&temp_dir.path().join("a.txt"));
    touch(&temp_dir.path().join("b.exe"));
    touch(&temp_dir.path().join("c.tmp"));

    let result = collect(temp_dir.path(), false, &["*.tmp".to_string()]).unwrap();

    assert_eq!(result.targets.len(), 2);
    assert_eq!(result.excluded, 1);
    assert_eq!(result.total_seen(), 3);
}

#[cfg(unix)]
#[test]
fn test_symlinks() {
    use std::os::unix::fs::symlink;

    let temp_dir = TempDir::new().unwrap();
    touch(&temp_dir.path().join("real.txt"));
    touch(&temp_dir.path().join("outside/inner.txt"));

    let scan_root = temp_dir.path().join("scan");
    fs::create_dir(&scan_root).unwrap();
    touch(&scan_root.join("plain.txt"));
    symlink(temp_dir.path().join("real.txt"), scan_root.join("link.txt")).unwrap();
    symlink(temp_dir.path().join("outside"), scan_root.join("linkdir")).unwrap();

    let result = collect(&scan_root, true, &no_patterns()).unwrap();

    // The file symlink is eligible, the directory symlink is not descended
    let names: Vec<_> = result
        .targets
        .iter()
        .map(|t| t.path.file_name().unwrap().to_string_lossy().into_owned())
        .collect();
    assert_eq!(names, vec!["link.txt", "plain.txt"]);
}
