use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use clap::Parser;
use market_scout::clients::polymarket::SITE_BASE;
use market_scout::clients::{create_completion_client, Browser, CompletionClient, WebDriverBrowser};
use market_scout::config::{Config, FallbackPolicy, DEFAULT_OUTPUT_PATH};
use market_scout::pipeline::Pipeline;
use market_scout::report::{render_analysis, write_report};
use market_scout::types::RunOutcome;

/// Look up prediction markets for a question and write an analysis of them.
#[derive(Parser)]
#[command(name = "market-scout", version)]
struct Cli {
    /// Free-text question, e.g. "starship launches in 2024"
    query: String,

    /// Where to write the JSON report
    #[arg(long, default_value = DEFAULT_OUTPUT_PATH)]
    output: PathBuf,

    /// WebDriver endpoint (chromedriver or Selenium)
    #[arg(long, env = "WEBDRIVER_URL", default_value = "http://localhost:4444")]
    webdriver_url: String,

    #[arg(long, env = "MARKET_SITE_URL", default_value = SITE_BASE)]
    site_url: String,

    /// Show the browser window instead of running headless
    #[arg(long)]
    headed: bool,

    #[arg(long, default_value_t = 15)]
    element_timeout_secs: u64,

    #[arg(long, value_enum, default_value_t = FallbackPolicy::AbandonState)]
    fallback_policy: FallbackPolicy,

    /// Model for keyword extraction and relevance filtering
    #[arg(long, env = "TRIAGE_MODEL")]
    triage_model: Option<String>,

    /// Model for the final analysis
    #[arg(long, env = "ANALYSIS_MODEL")]
    analysis_model: Option<String>,

    /// Also print the full report JSON to stdout
    #[arg(long)]
    print_results: bool,
}

impl Cli {
    fn into_config(self, mut config: Config) -> (Config, String, bool) {
        config.output_path = self.output;
        config.site_url = self.site_url;
        config.browser.webdriver_url = self.webdriver_url;
        config.browser.headless = !self.headed;
        config.wait.element_timeout = Duration::from_secs(self.element_timeout_secs);
        config.extraction.fallback_policy = self.fallback_policy;
        if let Some(model) = self.triage_model {
            config.completion.triage_model = model;
        }
        if let Some(model) = self.analysis_model {
            config.completion.analysis_model = model;
        }
        (config, self.query, self.print_results)
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load environment variables
    dotenvy::dotenv().ok();

    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "market_scout=info".into()),
        )
        .init();

    let cli = Cli::parse();
    let (config, query, print_results) = cli.into_config(Config::from_env()?);

    // Initialize clients
    let completion: Arc<dyn CompletionClient> =
        Arc::from(create_completion_client(&config.completion)?);
    tracing::info!("Initializing WebDriver...");
    let browser = Arc::new(WebDriverBrowser::connect(&config.browser).await?);

    let output_path = config.output_path.clone();
    let pipeline = match Pipeline::new(completion, browser.clone(), config) {
        Ok(pipeline) => pipeline,
        Err(e) => {
            browser.close().await.ok();
            return Err(e.into());
        }
    };

    match pipeline.run_to_completion(&query).await? {
        RunOutcome::Completed(report) => {
            write_report(&output_path, &report)?;
            println!("\n{}", render_analysis(&report.analysis));
            if print_results {
                println!("\nFinal Results: {}", serde_json::to_string_pretty(&report)?);
            }
        }
        RunOutcome::NoRelevantMarkets { .. } => {
            tracing::info!("No analysis produced: no relevant markets");
        }
        RunOutcome::NoAnalysis { market_details, .. } => {
            tracing::warn!(
                "No analysis produced; {} market(s) were scraped but not analyzed",
                market_details.len()
            );
        }
    }

    Ok(())
}
