//! Human-readable text output.

use std::io::{self, Write};

use bytesize::ByteSize;
use yansi::Paint;

use crate::packager::{OversizedArchive, PackSummary};

/// Text renderer for run summaries and size reports.
pub struct TextOutput<'a> {
    summary: Option<&'a PackSummary>,
    oversized: &'a [OversizedArchive],
    size_limit: u64,
}

impl<'a> TextOutput<'a> {
    /// Render a packaging run.
    #[must_use]
    pub fn for_summary(summary: &'a PackSummary) -> Self {
        Self {
            summary: Some(summary),
            oversized: &summary.oversized,
            size_limit: summary.size_limit,
        }
    }

    /// Render a standalone size report.
    #[must_use]
    pub fn for_report(oversized: &'a [OversizedArchive], size_limit: u64) -> Self {
        Self {
            summary: None,
            oversized,
            size_limit,
        }
    }

    /// Write the output to `writer`.
    ///
    /// # Errors
    ///
    /// Returns an error if writing fails.
    pub fn write_to<W: Write>(&self, writer: &mut W) -> io::Result<()> {
        if let Some(summary) = self.summary {
            write_summary(writer, summary)?;
        }
        self.write_oversized(writer)
    }

    /// Render to a string.
    #[must_use]
    pub fn render(&self) -> String {
        let mut buf = Vec::new();
        // Writing to a Vec cannot fail.
        let _ = self.write_to(&mut buf);
        String::from_utf8_lossy(&buf).into_owned()
    }

    fn write_oversized<W: Write>(&self, writer: &mut W) -> io::Result<()> {
        if self.oversized.is_empty() {
            let line = format!("No archives over {}.", ByteSize::b(self.size_limit));
            writeln!(writer, "{}", line.green())?;
            return Ok(());
        }

        let header = format!("{} archive(s) over the upload limit:", self.oversized.len());
        writeln!(writer, "{}", header.yellow().bold())?;
        for archive in self.oversized {
            writeln!(writer, "  {}", archive.message(self.size_limit).yellow())?;
        }
        writeln!(
            writer,
            "Remove the least important scans (end of the scan type list) before uploading."
        )
    }
}

fn write_summary<W: Write>(writer: &mut W, summary: &PackSummary) -> io::Result<()> {
    let selection = &summary.selection;

    if !selection.already_archived.is_empty() {
        writeln!(
            writer,
            "Skipped {} case(s) already archived: {}",
            selection.already_archived.len(),
            selection.already_archived.join(", ")
        )?;
    }

    if summary.dry_run {
        if selection.pending.is_empty() {
            writeln!(writer, "Nothing to package.")?;
        } else {
            writeln!(writer, "Would package {} case(s):", selection.pending.len())?;
            for case in &selection.pending {
                writeln!(writer, "  {case}")?;
            }
        }
        return Ok(());
    }

    if summary.packaged.is_empty() && !summary.interrupted {
        writeln!(writer, "Nothing to package.")?;
        return Ok(());
    }

    writeln!(
        writer,
        "{}",
        format!(
            "Packaged {} case(s), {} in {:.1}s",
            summary.packaged.len(),
            ByteSize::b(summary.archived_bytes()),
            summary.duration.as_secs_f64()
        )
        .bold()
    )?;
    for outcome in &summary.packaged {
        writeln!(
            writer,
            "  {:<16} {} scan folder(s), {} file(s), {} derived removed -> {} ({})",
            outcome.case,
            outcome.copied.folders,
            outcome.copied.files,
            outcome.stripped.files,
            outcome
                .archive
                .file_name()
                .map(|n| n.to_string_lossy().into_owned())
                .unwrap_or_default(),
            ByteSize::b(outcome.archive_size)
        )?;
    }

    if summary.interrupted {
        let remaining = selection.pending.len().saturating_sub(summary.packaged.len());
        writeln!(
            writer,
            "{}",
            format!("Interrupted: {remaining} case(s) left for the next run.").red()
        )?;
    }
    Ok(())
}
