//! Proxy list loading and newline-delimited list persistence

use crate::error::SetupError;
use crate::proxy::models::{BatchReport, ProxyAddress};
use std::fs;
use std::io;
use std::path::Path;

/// Reads proxy lists and writes result lists
pub struct ProxyParser;

impl ProxyParser {
    /// Parse a single proxy line
    ///
    /// Blank lines and `#` comments yield `None`; anything else is accepted
    /// as a `host:port` entry without further validation.
    pub fn parse_line(line: &str) -> Option<ProxyAddress> {
        let line = line.trim();
        if line.is_empty() || line.starts_with('#') {
            return None;
        }
        Some(ProxyAddress::parse(line))
    }

    /// Parse proxies from a string (multiple lines)
    pub fn parse_string(content: &str) -> Vec<ProxyAddress> {
        content.lines().filter_map(Self::parse_line).collect()
    }

    /// Parse proxies from a file
    pub fn parse_file<P: AsRef<Path>>(path: P) -> Result<Vec<ProxyAddress>, SetupError> {
        let path = path.as_ref();
        let content = fs::read_to_string(path).map_err(|source| SetupError::ProxyFile {
            path: path.to_path_buf(),
            source,
        })?;
        Ok(Self::parse_string(&content))
    }

    /// Overwrite `path` with one entry per line
    pub fn save_to_file<P: AsRef<Path>>(lines: &[String], path: P) -> io::Result<()> {
        fs::write(path, lines.join("\n"))
    }

    /// Persist the unique list, and the duplicate list when it is non-empty.
    ///
    /// Returns whether the duplicates file was written.
    pub fn save_report<P: AsRef<Path>, Q: AsRef<Path>>(
        report: &BatchReport,
        unique_path: P,
        duplicates_path: Q,
    ) -> io::Result<bool> {
        Self::save_to_file(&report.unique, unique_path)?;

        if report.has_duplicates() {
            Self::save_to_file(&report.duplicates, duplicates_path)?;
            return Ok(true);
        }
        Ok(false)
    }
}
