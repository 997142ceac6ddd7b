//! JSON output for packaging runs and size reports.
//!
//! # Output Schema (pack)
//!
//! ```json
//! {
//!   "generated_at": "2026-10-16T09:30:00Z",
//!   "dry_run": false,
//!   "interrupted": false,
//!   "pending": ["dc001"],
//!   "already_archived": ["adys5"],
//!   "packaged": [
//!     {
//!       "case": "dc001",
//!       "archive": "/data/Not_Uploaded/dc001.tgz",
//!       "copied": { "folders": 3, "files": 540, "bytes": 120000000 },
//!       "stripped": { "files": 2, "bytes": 8000000 },
//!       "archive_size": 61000000
//!     }
//!   ],
//!   "oversized": [],
//!   "size_limit": 80000000,
//!   "duration_ms": 5123,
//!   "exit_code": 0,
//!   "exit_code_name": "RP000"
//! }
//! ```

use std::io::Write;

use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::error::ExitCode;
use crate::packager::{CaseOutcome, OversizedArchive, PackSummary};

/// JSON view of a packaging run.
#[derive(Debug, Clone, Serialize)]
pub struct JsonPackOutput {
    /// When the output was produced
    pub generated_at: DateTime<Utc>,
    /// Whether this was a dry run
    pub dry_run: bool,
    /// Whether the run was interrupted
    pub interrupted: bool,
    /// Cases selected for packaging
    pub pending: Vec<String>,
    /// Cases skipped because an archive exists
    pub already_archived: Vec<String>,
    /// Cases packaged in this run
    pub packaged: Vec<CaseOutcome>,
    /// Archives over the size limit
    pub oversized: Vec<OversizedArchive>,
    /// Size limit in bytes
    pub size_limit: u64,
    /// Run duration in milliseconds
    pub duration_ms: u64,
    /// The exit code number
    pub exit_code: i32,
    /// The machine-readable exit code name (e.g., "RP000")
    pub exit_code_name: String,
}

impl JsonPackOutput {
    /// Build the JSON view of `summary`.
    #[must_use]
    pub fn new(summary: &PackSummary, exit_code: ExitCode) -> Self {
        Self {
            generated_at: Utc::now(),
            dry_run: summary.dry_run,
            interrupted: summary.interrupted,
            pending: summary.selection.pending.clone(),
            already_archived: summary.selection.already_archived.clone(),
            packaged: summary.packaged.clone(),
            oversized: summary.oversized.clone(),
            size_limit: summary.size_limit,
            duration_ms: summary.duration.as_millis() as u64,
            exit_code: exit_code.as_i32(),
            exit_code_name: exit_code.code_prefix().to_string(),
        }
    }

    /// Serialize to pretty-printed JSON.
    ///
    /// # Errors
    ///
    /// Returns an error if serialization fails.
    pub fn to_json_pretty(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }

    /// Write pretty-printed JSON followed by a newline.
    ///
    /// # Errors
    ///
    /// Returns an error if serialization or writing fails.
    pub fn write_to<W: Write>(&self, writer: &mut W) -> anyhow::Result<()> {
        serde_json::to_writer_pretty(&mut *writer, self)?;
        writeln!(writer)?;
        Ok(())
    }
}

/// JSON view of a standalone size report.
#[derive(Debug, Clone, Serialize)]
pub struct JsonReportOutput {
    /// When the output was produced
    pub generated_at: DateTime<Utc>,
    /// Directory that was checked
    pub staging_dir: String,
    /// Size limit in bytes
    pub size_limit: u64,
    /// Archives over the size limit
    pub oversized: Vec<OversizedArchive>,
    /// The exit code number
    pub exit_code: i32,
    /// The machine-readable exit code name
    pub exit_code_name: String,
}

impl JsonReportOutput {
    /// Build the JSON view of a report.
    #[must_use]
    pub fn new(
        staging_dir: &std::path::Path,
        size_limit: u64,
        oversized: &[OversizedArchive],
        exit_code: ExitCode,
    ) -> Self {
        Self {
            generated_at: Utc::now(),
            staging_dir: staging_dir.display().to_string(),
            size_limit,
            oversized: oversized.to_vec(),
            exit_code: exit_code.as_i32(),
            exit_code_name: exit_code.code_prefix().to_string(),
        }
    }

    /// Write pretty-printed JSON followed by a newline.
    ///
    /// # Errors
    ///
    /// Returns an error if serialization or writing fails.
    pub fn write_to<W: Write>(&self, writer: &mut W) -> anyhow::Result<()> {
        serde_json::to_writer_pretty(&mut *writer, self)?;
        writeln!(writer)?;
        Ok(())
    }
}
