//! Single serial batch write of matched records to the output artifact.

use std::io::Write;
use std::path::Path;

use crate::error::{LogsiftError, Result};

/// Writes every matched record body to `output_path` in one batch, once, at
/// the end of a run. If `records` is empty, no file is created.
pub struct OutputWriter;

impl OutputWriter {
    /// # Errors
    ///
    /// Returns [`LogsiftError::FileHandling`] if the output file cannot be
    /// created or written.
    pub fn write_all(output_path: &Path, records: &[String]) -> Result<()> {
        if records.is_empty() {
            return Ok(());
        }

        if let Some(parent) = output_path.parent() {
            if !parent.as_os_str().is_empty() && !parent.exists() {
                std::fs::create_dir_all(parent).map_err(|e| LogsiftError::FileHandling {
                    message: format!("cannot create output directory: {e}"),
                    path: parent.to_path_buf(),
                })?;
            }
        }

        let file = std::fs::File::create(output_path).map_err(|e| LogsiftError::FileHandling {
            message: format!("cannot create output file: {e}"),
            path: output_path.to_path_buf(),
        })?;
        let mut writer = std::io::BufWriter::with_capacity(64 * 1024, file);

        for record in records {
            writer
                .write_all(record.as_bytes())
                .and_then(|()| writer.write_all(b"\n"))
                .map_err(|e| LogsiftError::FileHandling {
                    message: format!("error writing to output file: {e}"),
                    path: output_path.to_path_buf(),
                })?;
        }

        writer.flush().map_err(|e| LogsiftError::FileHandling {
            message: format!("error flushing output file: {e}"),
            path: output_path.to_path_buf(),
        })
    }

    /// Formats one matched record body, prefixing it with its source path
    /// when `include_path` is set (§6 output format).
    #[must_use]
    pub fn format_record(content: &str, source_path: &Path, include_path: bool) -> String {
        if include_path {
            format!("{}: {}", source_path.display(), content)
        } else {
            content.to_string()
        }
    }
}
