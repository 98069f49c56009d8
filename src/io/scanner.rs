//! Directory walker: discovers candidate log files and classifies each with
//! a skip reason up front.
//!
//! Deliberately separate from the matching engine itself: a "simple
//! iterator" collaborator the orchestrator depends on to turn a root path
//! into a stream of [`FileMetadata`].

use std::path::{Path, PathBuf};

use ignore::WalkBuilder;

use crate::error::{LogsiftError, Result};

/// One file discovered under the scan root, already classified.
#[derive(Debug, Clone)]
pub struct FileMetadata {
    pub path: PathBuf,
    pub size_bytes: u64,
    pub extension: Option<String>,
    pub compressed: bool,
    pub readable: bool,
    pub skip_reason: Option<String>,
}

impl FileMetadata {
    #[must_use]
    pub fn should_skip(&self) -> bool {
        self.skip_reason.is_some()
    }
}

/// Aggregate counts produced by [`FileScanner::count_files`] for dry-run
/// summaries.
#[derive(Debug, Clone, Default)]
pub struct ScanSummary {
    pub total: usize,
    pub eligible: usize,
    pub skipped: usize,
    pub by_reason: std::collections::BTreeMap<String, usize>,
}

const COMPRESSED_EXTENSIONS: [&str; 4] = ["gz", "bz2", "xz", "zip"];

/// Lazily walks `root_path`, yielding [`FileMetadata`] with `skip_reason`
/// already populated for entries that fail a filter.
pub struct FileScanner {
    root_path: PathBuf,
    allowed_extensions: Vec<String>,
    file_masks: Vec<String>,
    include_patterns: Vec<String>,
    exclude_patterns: Vec<String>,
    max_file_size_bytes: Option<u64>,
    recursive: bool,
}

impl FileScanner {
    /// # Errors
    ///
    /// Returns [`LogsiftError::Configuration`] if `root_path` does not exist
    /// or is not a directory.
    pub fn new(
        root_path: impl Into<PathBuf>,
        allowed_extensions: Vec<String>,
        file_masks: Vec<String>,
        include_patterns: &[String],
        exclude_patterns: &[String],
        max_file_size_bytes: Option<u64>,
        recursive: bool,
    ) -> Result<Self> {
        let root_path = root_path.into();
        if !root_path.exists() {
            return Err(LogsiftError::Configuration(format!(
                "path does not exist: {}",
                root_path.display()
            )));
        }
        if !root_path.is_dir() {
            return Err(LogsiftError::Configuration(format!(
                "path is not a directory: {}",
                root_path.display()
            )));
        }

        Ok(Self {
            root_path,
            allowed_extensions: allowed_extensions.into_iter().map(|e| e.to_lowercase()).collect(),
            file_masks,
            include_patterns: include_patterns.to_vec(),
            exclude_patterns: exclude_patterns.to_vec(),
            max_file_size_bytes,
            recursive,
        })
    }

    /// Walks the tree and classifies every regular file found.
    #[must_use]
    pub fn scan(&self) -> Vec<FileMetadata> {
        let mut builder = WalkBuilder::new(&self.root_path);
        builder
            .standard_filters(false)
            .hidden(false)
            .follow_links(false)
            .threads(1);
        if !self.recursive {
            builder.max_depth(Some(1));
        }

        builder
            .build()
            .filter_map(std::result::Result::ok)
            .filter(|entry| entry.depth() > 0)
            .filter(|entry| entry.file_type().is_some_and(|ft| ft.is_file()))
            .map(|entry| self.classify(entry.path()))
            .collect()
    }

    /// Summarizes [`Self::scan`] without requiring the caller to hold every
    /// per-file result, used by the dry-run branch.
    #[must_use]
    pub fn count_files(&self) -> ScanSummary {
        let mut summary = ScanSummary::default();
        for metadata in self.scan() {
            summary.total += 1;
            if let Some(reason) = &metadata.skip_reason {
                summary.skipped += 1;
                *summary.by_reason.entry(reason.clone()).or_insert(0) += 1;
            } else {
                summary.eligible += 1;
            }
        }
        summary
    }

    fn classify(&self, path: &Path) -> FileMetadata {
        let extension = path
            .extension()
            .and_then(|e| e.to_str())
            .map(str::to_lowercase);
        let compressed = extension
            .as_deref()
            .is_some_and(|e| COMPRESSED_EXTENSIONS.contains(&e));

        if !self.has_allowed_extension(&extension) {
            return self.skipped(path, 0, extension, compressed, "extension-not-allowed");
        }

        let size_bytes = match std::fs::metadata(path) {
            Ok(meta) => meta.len(),
            Err(e) => {
                return self.skipped(path, 0, extension, compressed, &format!("stat-error: {e}"));
            }
        };

        if !self.matches_file_mask(path) {
            return self.skipped(path, size_bytes, extension, compressed, "name-filter");
        }

        if !self.include_patterns.is_empty() && !self.matches_any(path, &self.include_patterns) {
            return self.skipped(path, size_bytes, extension, compressed, "include-pattern");
        }

        if !self.exclude_patterns.is_empty() && self.matches_any(path, &self.exclude_patterns) {
            return self.skipped(path, size_bytes, extension, compressed, "exclude-pattern");
        }

        if let Some(max) = self.max_file_size_bytes {
            if size_bytes > max {
                return self.skipped(path, size_bytes, extension, compressed, "size-limit");
            }
        }

        let readable = is_readable(path);
        let skip_reason = if readable { None } else { Some("access-denied".to_string()) };

        FileMetadata {
            path: path.to_path_buf(),
            size_bytes,
            extension,
            compressed,
            readable,
            skip_reason,
        }
    }

    fn has_allowed_extension(&self, extension: &Option<String>) -> bool {
        if self.allowed_extensions.is_empty() {
            return true;
        }
        extension.as_deref().is_some_and(|e| self.allowed_extensions.iter().any(|a| a == e))
    }

    fn matches_file_mask(&self, path: &Path) -> bool {
        if self.file_masks.is_empty() {
            return true;
        }
        let Some(name) = path.file_name().and_then(|n| n.to_str()) else {
            return false;
        };
        let name = name.to_lowercase();
        self.file_masks.iter().any(|mask| name.contains(&mask.to_lowercase()))
    }

    fn matches_any(&self, path: &Path, patterns: &[String]) -> bool {
        let Some(name) = path.file_name().and_then(|n| n.to_str()) else {
            return false;
        };
        patterns.iter().any(|pattern| glob_match(pattern, name))
    }

    fn skipped(
        &self,
        path: &Path,
        size_bytes: u64,
        extension: Option<String>,
        compressed: bool,
        reason: &str,
    ) -> FileMetadata {
        FileMetadata {
            path: path.to_path_buf(),
            size_bytes,
            extension,
            compressed,
            readable: false,
            skip_reason: Some(reason.to_string()),
        }
    }
}

fn is_readable(path: &Path) -> bool {
    use std::io::Read;
    std::fs::File::open(path)
        .and_then(|mut f| {
            let mut buf = [0u8; 1];
            f.read(&mut buf)
        })
        .is_ok()
}

/// Minimal shell-style glob matcher supporting `*` (any run) and `?` (one
/// char), enough for the file-mask/include/exclude patterns a log filter
/// CLI actually needs (`*.log`, `app-*.txt`), without pulling in a full glob
/// engine for an out-of-core collaborator.
fn glob_match(pattern: &str, text: &str) -> bool {
    let pattern: Vec<char> = pattern.chars().collect();
    let text: Vec<char> = text.chars().collect();
    glob_match_inner(&pattern, &text)
}

fn glob_match_inner(pattern: &[char], text: &[char]) -> bool {
    match pattern.first() {
        None => text.is_empty(),
        Some('*') => {
            glob_match_inner(&pattern[1..], text)
                || (!text.is_empty() && glob_match_inner(pattern, &text[1..]))
        }
        Some('?') => !text.is_empty() && glob_match_inner(&pattern[1..], &text[1..]),
        Some(c) => text.first() == Some(c) && glob_match_inner(&pattern[1..], &text[1..]),
    }
}
