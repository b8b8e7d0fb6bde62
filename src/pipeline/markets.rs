use std::collections::HashSet;

use tracing::{debug, info, instrument};

use crate::clients::ai::prompts::{build_relevance_prompt, RELEVANCE_SYSTEM_PROMPT};
use crate::clients::ai::{CompletionClient, CompletionRequest};
use crate::pipeline::locator::{PageLocator, Role};
use crate::types::{MarketTitleRef, RelevanceResponse};
use crate::{AppError, Result};

/// Loads the search view and lists the cards that have a readable title.
///
/// Cards without one are skipped; the results list also renders decorative
/// rows at the same depth.
#[instrument(skip(locator))]
pub async fn locate_markets(
    locator: &PageLocator,
    search_url: &str,
) -> Result<Vec<MarketTitleRef>> {
    locator.browser().navigate(search_url).await?;

    let cards = locator.locate_all(Role::MarketCards).await?;
    info!("Found {} market cards", cards.len());

    let mut markets = Vec::with_capacity(cards.len());
    for (position, card) in cards.into_iter().enumerate() {
        let index = position + 1;
        match locator.read_child_text(card, Role::CardTitle).await {
            Ok(Some(title)) if !title.is_empty() => {
                info!("Found market {}: {}", index, title);
                markets.push(MarketTitleRef { title, index });
            }
            Ok(_) => debug!("Card {} has no title, skipping", index),
            Err(e) => debug!("Card {} title unreadable, skipping: {}", index, e),
        }
    }

    Ok(markets)
}

/// Asks the completion service for the most relevant market among `markets`.
#[instrument(skip(client, markets), fields(candidates = markets.len()))]
pub async fn filter_relevant(
    client: &dyn CompletionClient,
    model: &str,
    query: &str,
    markets: &[MarketTitleRef],
) -> Result<Vec<MarketTitleRef>> {
    let request = CompletionRequest::new(
        model,
        RELEVANCE_SYSTEM_PROMPT,
        build_relevance_prompt(query, markets)?,
    );
    let content = client.complete(request).await?;
    let titles = parse_relevance(&content)?;
    Ok(match_relevant(&titles, markets))
}

pub fn parse_relevance(content: &str) -> Result<Vec<String>> {
    let response: RelevanceResponse = serde_json::from_str(content).map_err(|e| {
        AppError::MalformedResponse(format!("Relevance response is not JSON: {}", e))
    })?;
    Ok(response.relevant_market)
}

/// Keeps the markets whose title equals one of `titles`, ignoring case and
/// surrounding whitespace. Each title selects only its first card, so
/// duplicate cards are dropped along with unknown titles. Enumeration order
/// is preserved.
pub fn match_relevant(titles: &[String], markets: &[MarketTitleRef]) -> Vec<MarketTitleRef> {
    let mut wanted: HashSet<String> = titles.iter().map(|t| normalize_title(t)).collect();
    markets
        .iter()
        .filter(|market| wanted.remove(&normalize_title(&market.title)))
        .cloned()
        .collect()
}

fn normalize_title(title: &str) -> String {
    title.trim().to_lowercase()
}
