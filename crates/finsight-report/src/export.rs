//! Report persistence and packaging

use crate::error::{ReportError, Result};
use crate::validation::CHART_FILE;
use finsight_core::ChatMessage;
use serde::{Deserialize, Serialize};
use std::fs::File;
use std::io::Write;
use std::path::{Path, PathBuf};
use tracing::{info, instrument};
use zip::write::SimpleFileOptions;
use zip::{CompressionMethod, ZipArchive, ZipWriter};

/// Markdown file name
pub const REPORT_FILE: &str = "final_report.md";

/// Archive file name
pub const ARCHIVE_FILE: &str = "financial_report_bundle.zip";

/// Image reference appended to the report
pub const CHART_REFERENCE: &str = "![Normalized Prices](normalized_prices.png)";

/// Files produced for one report
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReportArtifact {
    /// Report text as written by the final agent
    pub report: String,
    pub markdown_path: PathBuf,
    pub chart_path: PathBuf,
    pub archive_path: PathBuf,
}

/// Writes the report and bundles it with the chart
#[derive(Debug, Clone)]
pub struct ReportExporter {
    work_dir: PathBuf,
}

impl ReportExporter {
    /// Create an exporter writing into `work_dir`
    pub fn new(work_dir: impl Into<PathBuf>) -> Self {
        Self {
            work_dir: work_dir.into(),
        }
    }

    pub fn work_dir(&self) -> &Path {
        &self.work_dir
    }

    /// Export the last message of `transcript`
    ///
    /// The markdown file is written before the chart is looked up, so it
    /// survives a [`ReportError::MissingArtifact`] failure.
    #[instrument(skip_all, fields(work_dir = %self.work_dir.display()))]
    pub fn export(&self, transcript: &[ChatMessage]) -> Result<ReportArtifact> {
        let report = transcript
            .last()
            .filter(|m| !m.is_blank())
            .map(|m| m.content.clone())
            .ok_or(ReportError::EmptyTranscript)?;

        std::fs::create_dir_all(&self.work_dir)?;
        let markdown_path = self.work_dir.join(REPORT_FILE);
        let markdown = format!("{report}\n\n{CHART_REFERENCE}");
        std::fs::write(&markdown_path, &markdown)?;
        info!(path = %markdown_path.display(), "Report written");

        let chart_path = self.work_dir.join(CHART_FILE);
        if !chart_path.is_file() {
            return Err(ReportError::MissingArtifact { path: chart_path });
        }

        let archive_path = self.work_dir.join(ARCHIVE_FILE);
        write_archive(&archive_path, markdown.as_bytes(), &chart_path)?;
        info!(path = %archive_path.display(), "Report bundle written");

        Ok(ReportArtifact {
            report,
            markdown_path,
            chart_path,
            archive_path,
        })
    }
}

fn write_archive(path: &Path, markdown: &[u8], chart_path: &Path) -> Result<()> {
    let options = SimpleFileOptions::default().compression_method(CompressionMethod::Deflated);
    let mut zip = ZipWriter::new(File::create(path)?);

    zip.start_file(REPORT_FILE, options)?;
    zip.write_all(markdown)?;

    zip.start_file(CHART_FILE, options)?;
    std::io::copy(&mut File::open(chart_path)?, &mut zip)?;

    zip.finish()?;
    Ok(())
}

/// Entry names of a zip archive, in archive order
pub fn archive_entries(path: &Path) -> Result<Vec<String>> {
    let mut archive = ZipArchive::new(File::open(path)?)?;
    (0..archive.len())
        .map(|i| -> Result<String> { Ok(archive.by_index(i)?.name().to_string()) })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn transcript(last: &str) -> Vec<ChatMessage> {
        vec![
            ChatMessage::new("Critic", "Write the report"),
            ChatMessage::new("writer", last),
        ]
    }

    #[test]
    fn test_export_writes_markdown_and_bundle() {
        let dir = TempDir::new().unwrap();
        std::fs::write(dir.path().join(CHART_FILE), b"\x89PNG").unwrap();

        let artifact = ReportExporter::new(dir.path())
            .export(&transcript("# Report\n\nAll good."))
            .unwrap();

        assert_eq!(artifact.report, "# Report\n\nAll good.");
        let markdown = std::fs::read_to_string(&artifact.markdown_path).unwrap();
        assert_eq!(
            markdown,
            "# Report\n\nAll good.\n\n![Normalized Prices](normalized_prices.png)"
        );
        assert_eq!(
            archive_entries(&artifact.archive_path).unwrap(),
            ["final_report.md", "normalized_prices.png"]
        );
    }

    #[test]
    fn test_empty_transcript() {
        let dir = TempDir::new().unwrap();
        let exporter = ReportExporter::new(dir.path());

        assert!(matches!(exporter.export(&[]), Err(ReportError::EmptyTranscript)));
        assert!(matches!(
            exporter.export(&transcript("  \n")),
            Err(ReportError::EmptyTranscript)
        ));
        assert!(!dir.path().join(REPORT_FILE).exists());
    }

    #[test]
    fn test_missing_chart_keeps_markdown() {
        let dir = TempDir::new().unwrap();
        let err = ReportExporter::new(dir.path())
            .export(&transcript("# Report"))
            .unwrap_err();

        match err {
            ReportError::MissingArtifact { path } => assert!(path.ends_with(CHART_FILE)),
            other => panic!("unexpected error: {other}"),
        }
        assert!(dir.path().join(REPORT_FILE).exists());
        assert!(!dir.path().join(ARCHIVE_FILE).exists());
    }
}
