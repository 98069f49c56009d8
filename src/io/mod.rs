//! File handlers (plain/gzip) and the directory scanner.

mod handler;
mod scanner;

pub use handler::{FileHandler, GzipFileHandler, PlainFileHandler};
pub use scanner::{FileMetadata, FileScanner, ScanSummary};
