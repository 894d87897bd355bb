//! Output formatting

use comfy_table::presets::UTF8_FULL;
use comfy_table::{ContentArrangement, Table};
use finsight_report::{ReportArtifact, StageReport};

/// One row per stage: attempts, turns, why it stopped and leftover issues
pub fn stage_table(stages: &[StageReport]) -> Table {
    let mut table = Table::new();
    table
        .load_preset(UTF8_FULL)
        .set_content_arrangement(ContentArrangement::Dynamic)
        .set_header(vec!["Stage", "Attempts", "Turns", "Termination", "Issues"]);

    for stage in stages {
        let issues = if stage.issues.is_empty() {
            "-".to_string()
        } else {
            stage.issues.join("\n")
        };
        table.add_row(vec![
            stage.stage.to_string(),
            stage.attempts.to_string(),
            stage.turns.to_string(),
            stage.termination.to_string(),
            issues,
        ]);
    }
    table
}

/// Lines printed after the report
pub fn artifact_lines(artifact: &ReportArtifact) -> Vec<String> {
    vec![
        "Markdown saved as final_report.md".to_string(),
        format!("Chart: {}", artifact.chart_path.display()),
        format!(
            "Download Report (Markdown + PNG): {}",
            artifact.archive_path.display()
        ),
    ]
}
