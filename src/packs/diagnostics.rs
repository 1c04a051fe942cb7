//! Best-effort source diagnostics for packs that fail to load.
//!
//! Looks for leftovers that commonly break a pack: merge-conflict markers
//! and lines starting with a stray `||`.

use std::path::{Path, PathBuf};

use serde::Serialize;
use walkdir::{DirEntry, WalkDir};

const MAX_FILES: usize = 200;
const MAX_DEPTH: usize = 6;
const MAX_FILE_BYTES: u64 = 512 * 1024;

const TEXT_EXTENSIONS: &[&str] = &[
    "toml", "json", "js", "mjs", "cjs", "ts", "rs", "html", "css", "md", "txt", "yaml", "yml",
];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum FindingKind {
    MergeMarker,
    StrayOperator,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Finding {
    pub path: PathBuf,
    /// 1-based
    pub line: usize,
    pub kind: FindingKind,
    pub text: String,
}

fn classify(line: &str) -> Option<FindingKind> {
    let trimmed = line.trim_start();
    if trimmed.starts_with("<<<<<<<") || trimmed.starts_with("=======") || trimmed.starts_with(">>>>>>>") {
        Some(FindingKind::MergeMarker)
    } else if trimmed.starts_with("||") {
        Some(FindingKind::StrayOperator)
    } else {
        None
    }
}

/// Findings in one file's contents
pub fn scan_text(path: &Path, contents: &str) -> Vec<Finding> {
    contents
        .lines()
        .enumerate()
        .filter_map(|(i, line)| {
            classify(line).map(|kind| Finding {
                path: path.to_path_buf(),
                line: i + 1,
                kind,
                text: line.trim().to_string(),
            })
        })
        .collect()
}

fn is_text_file(path: &Path) -> bool {
    path.extension()
        .and_then(|e| e.to_str())
        .is_some_and(|e| TEXT_EXTENSIONS.contains(&e.to_lowercase().as_str()))
}

fn skipped_dir(entry: &DirEntry) -> bool {
    entry.depth() > 0
        && entry.file_type().is_dir()
        && entry
            .file_name()
            .to_str()
            .is_some_and(|n| n.starts_with('.') || n == "node_modules" || n == "target")
}

/// Scan text files under `dir` (bounded in depth, count and size)
pub fn scan_pack(dir: &Path) -> Vec<Finding> {
    WalkDir::new(dir)
        .max_depth(MAX_DEPTH)
        .sort_by_file_name()
        .into_iter()
        .filter_entry(|entry| !skipped_dir(entry))
        .filter_map(Result::ok)
        .filter(|entry| entry.file_type().is_file() && is_text_file(entry.path()))
        .filter(|entry| {
            entry
                .metadata()
                .is_ok_and(|m| m.len() <= MAX_FILE_BYTES)
        })
        .take(MAX_FILES)
        .filter_map(|entry| {
            let contents = std::fs::read_to_string(entry.path()).ok()?;
            Some(scan_text(entry.path(), &contents))
        })
        .flatten()
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_scan_text_markers() {
        let contents = "ok\n<<<<<<< HEAD\na\n=======\nb\n>>>>>>> branch\n  || fallback\nx || y\n";
        let findings = scan_text(Path::new("router.js"), contents);
        let lines: Vec<(usize, FindingKind)> = findings.iter().map(|f| (f.line, f.kind)).collect();
        assert_eq!(
            lines,
            vec![
                (2, FindingKind::MergeMarker),
                (4, FindingKind::MergeMarker),
                (6, FindingKind::MergeMarker),
                (7, FindingKind::StrayOperator),
            ]
        );
        assert_eq!(findings[3].text, "|| fallback");
    }

    #[test]
    fn test_scan_pack_recurses_text_files() {
        let temp_dir = TempDir::new().unwrap();
        let server = temp_dir.path().join("server");
        std::fs::create_dir_all(&server).unwrap();
        std::fs::write(server.join("pack.toml"), "kind = \"x\"\n<<<<<<< HEAD\n").unwrap();
        std::fs::write(server.join("logo.png"), "|| not text").unwrap();

        let findings = scan_pack(temp_dir.path());
        assert_eq!(findings.len(), 1);
        assert_eq!(findings[0].path, server.join("pack.toml"));
        assert_eq!(findings[0].line, 2);
    }

    #[test]
    fn test_scan_pack_skips_vendored_dirs_and_caps_depth() {
        let temp_dir = TempDir::new().unwrap();
        for skipped in ["node_modules", ".git", "target"] {
            let dir = temp_dir.path().join(skipped);
            std::fs::create_dir_all(&dir).unwrap();
            std::fs::write(dir.join("index.js"), "<<<<<<< HEAD\n").unwrap();
        }
        let mut deep = temp_dir.path().to_path_buf();
        for level in 0..MAX_DEPTH {
            deep = deep.join(format!("d{}", level));
        }
        std::fs::create_dir_all(&deep).unwrap();
        std::fs::write(deep.join("too-deep.js"), "|| x\n").unwrap();
        std::fs::write(deep.parent().unwrap().join("deepest.js"), "|| y\n").unwrap();

        let findings = scan_pack(temp_dir.path());
        assert_eq!(findings.len(), 1);
        assert_eq!(findings[0].text, "|| y");
    }

    #[test]
    fn test_scan_pack_file_cap() {
        let temp_dir = TempDir::new().unwrap();
        for i in 0..MAX_FILES + 5 {
            std::fs::write(temp_dir.path().join(format!("f{:03}.txt", i)), "=======\n").unwrap();
        }
        assert_eq!(scan_pack(temp_dir.path()).len(), MAX_FILES);
    }

    #[test]
    fn test_scan_missing_dir_is_empty() {
        assert!(scan_pack(Path::new("/definitely/not/here")).is_empty());
    }
}
