//! End-to-end runs of the report pipeline against a scripted model

use finsight_llm::CompletionRequest;
use finsight_llm::testing::ScriptedProvider;
use finsight_report::{
    CHART_FILE, REPORT_FILE, ReportConfig, ReportError, ReportPipeline, Stage, Tickers,
    archive_entries,
};
use finsight_runtime::TerminationReason;
use std::path::Path;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use tempfile::TempDir;

const VALID_PRICES: &str =
    r#"{"AAPL": {"full_name": "Apple Inc.", "current_price": 189.5}, "figures": ["normalized_prices.png"]}"#;
const ZERO_PRICES: &str = r#"{"AAPL": {"full_name": "Apple Inc.", "current_price": 0}}"#;
const HEADLINES: &str = r#"{"AAPL": "Apple unveils a new chip."}"#;
const DRAFT: &str = "# Draft report";
const REVISION: &str = "# Revised report\n\n| Ticker | P/E |\n|---|---|\n| AAPL | 29.1 |";

/// Knobs for the scripted conversation
#[derive(Clone, Copy)]
struct Script {
    /// Whether the financial assistant's code saves the chart
    write_chart: bool,
    /// How many pricing summaries report a zero price before a valid one
    bad_price_summaries: usize,
}

impl Default for Script {
    fn default() -> Self {
        Self {
            write_chart: true,
            bad_price_summaries: 0,
        }
    }
}

fn first_text(req: &CompletionRequest) -> &str {
    req.messages.first().map_or("", |m| m.text())
}

/// Answers each request the way the addressed agent would
fn scripted(script: Script) -> Arc<ScriptedProvider> {
    let price_summaries = AtomicUsize::new(0);

    Arc::new(ScriptedProvider::new(move |req| {
        let system = req.system.as_deref().unwrap_or_default();
        let last = req.last_text().unwrap_or_default();

        let reply = if last.starts_with("Return the stock prices") {
            let n = price_summaries.fetch_add(1, Ordering::SeqCst);
            if n < script.bad_price_summaries {
                ZERO_PRICES.to_string()
            } else {
                VALID_PRICES.to_string()
            }
        } else if last.starts_with("Provide the news headlines") {
            HEADLINES.to_string()
        } else if last.starts_with("Return review into a JSON") {
            "{'reviewer': 'Reviewer', 'review': 'Add a risk section.'}".to_string()
        } else if last.starts_with("Review the following content.") {
            "- The report needs a risk section.".to_string()
        } else if last.starts_with("Aggregate feedback") {
            "Final suggestion: add a risk section and the ratio table.".to_string()
        } else if system.contains("professional writer") {
            if req.messages.len() == 1 {
                DRAFT.to_string()
            } else {
                REVISION.to_string()
            }
        } else if first_text(req).starts_with("Today is the") {
            financial_assistant(last, script.write_chart)
        } else if first_text(req).starts_with("Investigate possible reasons") {
            if last.starts_with("exitcode:") {
                "Headlines collected.\nTERMINATE".to_string()
            } else {
                "```sh\necho 'Apple unveils a new chip'\n```".to_string()
            }
        } else {
            format!("unexpected request: {last}")
        };
        Ok(reply)
    }))
}

fn financial_assistant(last: &str, write_chart: bool) -> String {
    if last.starts_with("exitcode:") {
        "Prices collected and chart saved.\nTERMINATE".to_string()
    } else if write_chart {
        "```sh\n# filename: chart.sh\nprintf 'png' > normalized_prices.png\necho saved\n```"
            .to_string()
    } else {
        "AAPL trades at 189.5 USD.\nTERMINATE".to_string()
    }
}

fn pipeline(dir: &Path, provider: Arc<ScriptedProvider>) -> ReportPipeline {
    let config = ReportConfig::builder()
        .work_dir(dir)
        .report_date(chrono::NaiveDate::from_ymd_opt(2026, 10, 19).unwrap())
        .build()
        .unwrap();
    ReportPipeline::new(config, provider).unwrap()
}

#[tokio::test]
async fn test_full_run_produces_reviewed_report() {
    let dir = TempDir::new().unwrap();
    let provider = scripted(Script::default());
    let tickers = Tickers::parse("aapl").unwrap();

    let outcome = pipeline(dir.path(), provider.clone())
        .run(&tickers)
        .await
        .unwrap();

    let stages: Vec<Stage> = outcome.stages.iter().map(|s| s.stage).collect();
    assert_eq!(stages, Stage::ALL);

    let pricing = outcome.stage(Stage::Pricing).unwrap();
    assert_eq!(pricing.attempts, 1);
    assert_eq!(pricing.turns, 2);
    assert_eq!(
        pricing.termination,
        TerminationReason::Sentinel {
            detected_by: "User_Proxy_Auto".to_string()
        }
    );
    assert!(pricing.issues.is_empty());
    assert_eq!(pricing.summary, VALID_PRICES);

    let drafting = outcome.stage(Stage::Drafting).unwrap();
    assert_eq!(drafting.termination, TerminationReason::MaxTurns);
    assert_eq!(drafting.turns, 2);
    assert_eq!(outcome.report(), Some(REVISION));

    // One reviewed draft, reviewers in fixed order
    assert_eq!(outcome.reviews.len(), 1);
    let review = &outcome.reviews[0];
    assert_eq!(
        review.consulted,
        [
            "Legal_Reviewer",
            "Text_alignment_reviewer",
            "Consistency_reviewer",
            "Completion_Reviewer",
            "Meta_Reviewer"
        ]
    );
    assert!(review.reviews.iter().all(|r| r.structured));
    assert_eq!(
        review.meta_review,
        "Final suggestion: add a risk section and the ratio table."
    );

    let requests = provider.requests();
    let reviewer_systems: Vec<String> = requests
        .iter()
        .filter(|r| r.last_text().is_some_and(|t| t.starts_with("Review the following content.")))
        .map(|r| r.system.clone().unwrap_or_default())
        .collect();
    assert_eq!(reviewer_systems.len(), 4);
    assert!(reviewer_systems[0].contains("legal reviewer"));
    assert!(reviewer_systems[1].contains("text data alignment reviewer"));
    assert!(reviewer_systems[2].contains("consistency reviewer"));
    assert!(reviewer_systems[3].contains("content completion reviewer"));

    let summary_prompts: Vec<&str> = requests
        .iter()
        .filter_map(|r| r.last_text())
        .filter(|t| t.starts_with("Return review into a JSON"))
        .collect();
    assert_eq!(summary_prompts.len(), 4);
    assert!(summary_prompts[0].contains("{'Reviewer': '', 'Review': ''}"));
    assert!(summary_prompts[1..].iter().all(|p| p.contains("{'reviewer': '', 'review': ''}")));
    assert_eq!(
        requests
            .iter()
            .filter(|r| r.last_text().is_some_and(|t| t.starts_with("Aggregate feedback")))
            .count(),
        1
    );

    // The writer sees both earlier summaries as carryover
    let writer_task = requests
        .iter()
        .find(|r| r.system.as_deref().is_some_and(|s| s.contains("professional writer")))
        .map(|r| first_text(r).to_string())
        .unwrap();
    assert!(writer_task.starts_with("Develop an engaging financial report"));
    assert!(writer_task.ends_with(&format!(
        "\nContext: \nI want to include a figure and a table of the provided data in the financial report.\n{VALID_PRICES}\n{HEADLINES}"
    )));

    let pricing_task = requests
        .iter()
        .find(|r| first_text(r).starts_with("Today is the"))
        .map(|r| first_text(r).to_string())
        .unwrap();
    assert!(pricing_task.starts_with("Today is the 2026-10-19.\nWhat are the current stock prices of AAPL,"));

    let artifact = outcome.export().unwrap();
    assert_eq!(artifact.report, REVISION);
    assert_eq!(
        archive_entries(&artifact.archive_path).unwrap(),
        [REPORT_FILE, CHART_FILE]
    );
}

#[tokio::test]
async fn test_invalid_prices_are_retried() {
    let dir = TempDir::new().unwrap();
    let provider = scripted(Script {
        bad_price_summaries: 1,
        ..Script::default()
    });

    let outcome = pipeline(dir.path(), provider.clone())
        .run(&Tickers::parse("AAPL").unwrap())
        .await
        .unwrap();

    let pricing = outcome.stage(Stage::Pricing).unwrap();
    assert_eq!(pricing.attempts, 2);
    assert!(pricing.issues.is_empty());
    assert_eq!(pricing.summary, VALID_PRICES);

    let retry = provider
        .requests()
        .iter()
        .map(|r| first_text(r).to_string())
        .find(|t| t.contains("Previous attempt problems:"))
        .unwrap();
    assert!(retry.starts_with("Today is the 2026-10-19."));
    assert!(retry.contains("- AAPL.current_price is not a positive price (0)\n"));
}

#[tokio::test]
async fn test_missing_chart_is_reported_at_export() {
    let dir = TempDir::new().unwrap();
    let config = ReportConfig::builder()
        .work_dir(dir.path())
        .isolate_runs(true)
        .build()
        .unwrap();
    let provider = scripted(Script {
        write_chart: false,
        ..Script::default()
    });

    let outcome = ReportPipeline::new(config, provider)
        .unwrap()
        .run(&Tickers::parse("AAPL").unwrap())
        .await
        .unwrap();

    assert_eq!(outcome.work_dir, dir.path().join(&outcome.run_id));
    let pricing = outcome.stage(Stage::Pricing).unwrap();
    assert_eq!(pricing.attempts, 2);
    assert_eq!(pricing.issues, ["normalized_prices.png was not created"]);

    // The run still finishes
    assert_eq!(outcome.report(), Some(REVISION));

    match outcome.export() {
        Err(ReportError::MissingArtifact { path }) => assert!(path.ends_with(CHART_FILE)),
        other => panic!("expected MissingArtifact, got {other:?}"),
    }
    assert!(outcome.work_dir.join(REPORT_FILE).exists());
}

#[tokio::test]
async fn test_chart_from_previous_run_is_not_reused() {
    let dir = TempDir::new().unwrap();
    std::fs::write(dir.path().join(CHART_FILE), "old run").unwrap();
    let provider = scripted(Script {
        write_chart: false,
        ..Script::default()
    });

    let outcome = pipeline(dir.path(), provider)
        .run(&Tickers::parse("AAPL").unwrap())
        .await
        .unwrap();

    let pricing = outcome.stage(Stage::Pricing).unwrap();
    assert_eq!(pricing.attempts, 2);
    assert_eq!(pricing.issues, ["normalized_prices.png was not created"]);
    assert!(matches!(
        outcome.export(),
        Err(ReportError::MissingArtifact { .. })
    ));
}

#[tokio::test]
async fn test_runs_are_deterministic() {
    let mut runs = Vec::new();
    for _ in 0..2 {
        let dir = TempDir::new().unwrap();
        let outcome = pipeline(dir.path(), scripted(Script::default()))
            .run(&Tickers::parse("AAPL").unwrap())
            .await
            .unwrap();
        runs.push((outcome.stages, outcome.transcript));
    }
    assert_eq!(runs[0], runs[1]);
}
