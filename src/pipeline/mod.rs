pub mod detail;
pub mod keyword;
pub mod locator;
pub mod markets;
pub mod synthesis;

use std::sync::Arc;
use std::time::{Duration, Instant};

use chrono::Utc;
use tracing::{error, info, warn};

use crate::clients::ai::CompletionClient;
use crate::clients::browser::Browser;
use crate::clients::polymarket::{PolymarketSite, PositionalSelectors};
use crate::config::Config;
use crate::types::{FinalReport, RunMetadata, RunOutcome};
use crate::Result;
use locator::{PageLocator, Role, SelectorStrategy};

/// One query, one browser session, one pass over the relevant markets.
pub struct Pipeline {
    completion: Arc<dyn CompletionClient>,
    locator: PageLocator,
    site: PolymarketSite,
    config: Config,
}

impl Pipeline {
    pub fn new(
        completion: Arc<dyn CompletionClient>,
        browser: Arc<dyn Browser>,
        config: Config,
    ) -> Result<Self> {
        Self::with_selectors(completion, browser, Arc::new(PositionalSelectors), config)
    }

    pub fn with_selectors(
        completion: Arc<dyn CompletionClient>,
        browser: Arc<dyn Browser>,
        selectors: Arc<dyn SelectorStrategy>,
        config: Config,
    ) -> Result<Self> {
        let site = PolymarketSite::new(&config.site_url)?;
        let locator = PageLocator::new(browser, selectors, config.wait);
        Ok(Self {
            completion,
            locator,
            site,
            config,
        })
    }

    /// Runs the pipeline, then closes the browser session whatever the
    /// result was.
    pub async fn run_to_completion(&self, query: &str) -> Result<RunOutcome> {
        let outcome = self.run(query).await;
        if let Err(e) = self.locator.browser().close().await {
            warn!("Failed to close browser session: {}", e);
        }
        outcome
    }

    /// Errors only when the keyword cannot be derived or the search view
    /// cannot be loaded. Later failures degrade to partial results.
    pub async fn run(&self, query: &str) -> Result<RunOutcome> {
        let start = Instant::now();
        let completion = self.completion.as_ref();
        let models = &self.config.completion;

        info!(provider = completion.provider_name(), "Transforming query to keywords...");
        let keyword = keyword::derive_keyword(completion, &models.triage_model, query)
            .await
            .map_err(|e| {
                error!("Failed to transform query to keywords: {}", e);
                e
            })?;

        let search_url = self.site.search_url(&keyword)?;
        info!("Navigating to: {}", search_url);
        let candidates = markets::locate_markets(&self.locator, &search_url).await?;

        info!("Analyzing market relevance...");
        let relevance =
            markets::filter_relevant(completion, &models.triage_model, query, &candidates).await;
        let relevant = match relevance {
            Ok(relevant) => relevant,
            Err(e) => {
                warn!("Error analyzing market relevance: {}", e);
                Vec::new()
            }
        };

        if relevant.is_empty() {
            let available_titles: Vec<String> = candidates.into_iter().map(|m| m.title).collect();
            info!("No relevant markets found");
            info!("Available market titles were: {:?}", available_titles);
            return Ok(RunOutcome::NoRelevantMarkets { available_titles });
        }

        info!("Found {} relevant markets:", relevant.len());
        for market in &relevant {
            info!("- {}", market.title);
        }

        let mut market_details = Vec::with_capacity(relevant.len());
        for market in &relevant {
            match detail::extract_detail(&self.locator, &self.config.extraction, market).await {
                Ok(Some(detail)) => {
                    info!("Processed market: {}", detail.title.as_deref().unwrap_or(&market.title));
                    market_details.push(detail);
                }
                Ok(None) => {}
                Err(e) => {
                    warn!("Error processing market card {}: {}", market.index, e);
                    self.reload_search(&search_url).await;
                }
            }
        }

        let synthesis =
            synthesis::synthesize(completion, &models.analysis_model, query, &market_details).await;
        let analysis = match synthesis {
            Ok(analysis) => analysis,
            Err(e) => {
                error!("Failed to generate final analysis: {}", e);
                return Ok(RunOutcome::NoAnalysis {
                    search_keywords: keyword,
                    market_details,
                });
            }
        };

        Ok(RunOutcome::Completed(FinalReport {
            query: query.to_string(),
            search_keywords: keyword,
            market_details,
            analysis,
            metadata: RunMetadata {
                generated_at: Utc::now().to_rfc3339(),
                execution_time_ms: elapsed_millis(start.elapsed()),
                provider: completion.provider_name().to_string(),
                analysis_model: models.analysis_model.clone(),
            },
        }))
    }

    /// Loads the search view afresh; history may not be trustworthy after a
    /// failed extraction.
    async fn reload_search(&self, search_url: &str) {
        if let Err(e) = self.locator.browser().navigate(search_url).await {
            warn!("Failed to reload {}: {}", search_url, e);
            return;
        }
        self.locator.await_view(Role::MarketCards).await;
    }
}

/// Milliseconds in `elapsed`, saturating at `u64::MAX`.
fn elapsed_millis(elapsed: Duration) -> u64 {
    u64::try_from(elapsed.as_millis()).unwrap_or(u64::MAX)
}
