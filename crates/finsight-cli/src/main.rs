//! Command-line front end for the finsight report pipeline

mod progress;
mod render;

use anyhow::Context as _;
use clap::Parser;
use finsight_llm::providers::{OpenAIConfig, OpenAIProvider};
use finsight_report::{ReportConfig, ReportConfigBuilder, ReportError, ReportPipeline, Tickers};
use progress::Spinner;
use std::path::PathBuf;
use std::sync::Arc;
use tracing::{error, info};

#[derive(Parser, Debug)]
#[command(name = "finsight", version)]
#[command(about = "Multi-agent financial report generator", long_about = None)]
struct Args {
    /// Assets to analyze, e.g. "AAPL, MSFT"
    tickers: Vec<String>,

    /// Model identifier (overrides FINSIGHT_MODEL)
    #[arg(long)]
    model: Option<String>,

    /// Base URL of the chat-completions API (overrides OPENAI_API_BASE)
    #[arg(long)]
    api_base: Option<String>,

    /// Working directory for code and artifacts (overrides FINSIGHT_WORK_DIR)
    #[arg(long)]
    work_dir: Option<PathBuf>,

    /// Run in a fresh subdirectory of the working directory
    #[arg(long)]
    isolate: bool,

    /// Review rounds before the final revision
    #[arg(long)]
    review_rounds: Option<usize>,

    /// Emit logs as JSON
    #[arg(long)]
    log_json: bool,
}

impl Args {
    fn report_config(&self) -> anyhow::Result<ReportConfig> {
        let builder = ReportConfig::builder()
            .with_env()
            .context("reading FINSIGHT_* environment")?;
        Ok(self.apply_flags(builder).build()?)
    }

    /// Layer command-line flags over `builder`
    fn apply_flags(&self, mut builder: ReportConfigBuilder) -> ReportConfigBuilder {
        if let Some(model) = &self.model {
            builder = builder.model(model);
        }
        if let Some(dir) = &self.work_dir {
            builder = builder.work_dir(dir);
        }
        if let Some(rounds) = self.review_rounds {
            builder = builder.review_rounds(rounds);
        }
        if self.isolate {
            builder = builder.isolate_runs(true);
        }
        builder
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    let args = Args::parse();

    if args.log_json {
        finsight_utils::init_tracing_json();
    } else {
        finsight_utils::init_tracing();
    }

    let result = match Tickers::parse(&args.tickers.join(" ")) {
        Err(ReportError::NoTickers) => {
            println!("{}", ReportError::NoTickers);
            return Ok(());
        }
        Err(e) => Err(e.into()),
        Ok(tickers) => run(&args, &tickers).await,
    };

    if let Err(err) = result {
        error!(error = %err, "Report generation failed");
        eprintln!("Something went wrong: {err}");
        std::process::exit(1);
    }
    Ok(())
}

async fn run(args: &Args, tickers: &Tickers) -> anyhow::Result<()> {
    let config = args.report_config()?;

    let mut openai = OpenAIConfig::from_env()?.with_timeout(config.request_timeout.as_secs());
    if let Some(base) = &args.api_base {
        openai = openai.with_api_base(base);
    }
    let provider = Arc::new(OpenAIProvider::with_config(openai)?);

    info!(%tickers, model = %config.model, "Starting analysis");
    let pipeline = ReportPipeline::new(config, provider)?;

    let spinner = Spinner::start("Agents working on the analysis....");
    let outcome = pipeline.run(tickers).await;
    spinner.finish();
    let outcome = outcome?;

    let artifact = outcome.export()?;

    println!("{}", artifact.report);
    println!();
    println!("{}", render::stage_table(&outcome.stages));
    for line in render::artifact_lines(&artifact) {
        println!("{line}");
    }
    Ok(())
}
