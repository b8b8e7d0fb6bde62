//! Market detail extraction.
//!
//! Outcomes come in two layouts. The multi-outcome layout is tried first,
//! slot by slot; when it does not hold up, the single-outcome layout is read
//! instead. Only the outcomes of the layout that produced them are returned.

use tracing::{debug, info, instrument, warn};

use crate::config::{ExtractionConfig, FallbackPolicy};
use crate::pipeline::locator::{PageLocator, Role, SingleField, SlotField};
use crate::types::{MarketDetail, MarketTitleRef, Outcome, VOLUME_NOT_APPLICABLE};
use crate::{AppError, Result};

/// Opens `market`, reads it and returns to the results list.
///
/// `Ok(None)` when the card could not be clicked; the browser is still on the
/// results list then. Any `Err` leaves the browser in an unknown state.
#[instrument(skip(locator, config, market), fields(index = market.index, title = %market.title))]
pub async fn extract_detail(
    locator: &PageLocator,
    config: &ExtractionConfig,
    market: &MarketTitleRef,
) -> Result<Option<MarketDetail>> {
    if !open_market(locator, market).await? {
        return Ok(None);
    }

    let mut detail = read_summary(locator).await;
    detail.outcomes = read_outcomes(locator, config).await?;

    locator.browser().go_back().await?;
    locator.await_view(Role::MarketCards).await;

    Ok(Some(detail))
}

/// Scrolls to the card's title link and clicks it. Returns `false` when the
/// card is not on the page or cannot be interacted with.
async fn open_market(locator: &PageLocator, market: &MarketTitleRef) -> Result<bool> {
    let result = async {
        let link = locator.locate(Role::CardLink { index: market.index }).await?;
        locator.browser().scroll_into_view(link).await?;
        locator.browser().click(link).await
    }
    .await;

    match result {
        Ok(()) => {
            locator.await_view(Role::DetailTitle).await;
            Ok(true)
        }
        Err(e) if e.is_element_miss() => {
            warn!("Error clicking market card {}: {}", market.index, e);
            Ok(false)
        }
        Err(e) => Err(e),
    }
}

async fn read_summary(locator: &PageLocator) -> MarketDetail {
    MarketDetail {
        title: locator.read_text(Role::DetailTitle).await,
        volume: locator.read_text(Role::DetailVolume).await,
        end_date: locator.read_text(Role::DetailEndDate).await,
        outcomes: Vec::new(),
    }
}

/// Outcomes of the current detail view. Failures inside the multi-outcome
/// layout never escape: they only decide whether the single-outcome layout
/// is read instead.
pub async fn read_outcomes(
    locator: &PageLocator,
    config: &ExtractionConfig,
) -> Result<Vec<Outcome>> {
    match read_multi_outcomes(locator, config).await {
        Ok(outcomes) if !outcomes.is_empty() => Ok(outcomes),
        Ok(outcomes) => match config.fallback_policy {
            // Every slot was present but none carried a title.
            FallbackPolicy::AbandonState => Ok(outcomes),
            FallbackPolicy::SkipSlot => read_single_outcome(locator).await,
        },
        Err(_) => {
            info!("Attempting to process single outcome case...");
            read_single_outcome(locator).await
        }
    }
}

/// Multi-outcome layout. A failing slot either aborts the whole layout or is
/// skipped, depending on the policy.
async fn read_multi_outcomes(
    locator: &PageLocator,
    config: &ExtractionConfig,
) -> Result<Vec<Outcome>> {
    let mut outcomes = Vec::new();

    for slot in config.outcome_slots.clone() {
        debug!("Processing outcome slot {}", slot);
        match read_slot(locator, slot).await {
            Ok(Some(outcome)) => {
                info!("Successfully extracted outcome {}", outcome.title);
                outcomes.push(outcome);
            }
            Ok(None) => debug!("Slot {} has an empty title", slot),
            Err(e) if config.fallback_policy == FallbackPolicy::SkipSlot => {
                warn!("Skipping outcome slot {}: {}", slot, e);
            }
            Err(e) => {
                warn!("Error processing outcome slot {}: {}", slot, e);
                return Err(e);
            }
        }
    }

    Ok(outcomes)
}

async fn read_slot(locator: &PageLocator, slot: usize) -> Result<Option<Outcome>> {
    let role = |field: SlotField| Role::OutcomeSlot { slot, field };

    let title_element = locator
        .probe(role(SlotField::Title))
        .await?
        .ok_or_else(|| AppError::ElementNotFound(format!("outcome slot {} title", slot)))?;
    locator.browser().scroll_into_view(title_element).await?;

    let Some(title) = locator
        .read_text(role(SlotField::Title))
        .await
        .filter(|t| !t.is_empty())
    else {
        return Ok(None);
    };

    Ok(Some(Outcome {
        title,
        volume: locator.read_text(role(SlotField::Volume)).await,
        percentage: locator.read_text(role(SlotField::Percentage)).await,
        buy_yes_price: locator.read_text(role(SlotField::BuyYes)).await,
        buy_no_price: locator.read_text(role(SlotField::BuyNo)).await,
    }))
}

/// Single-outcome layout: at most one outcome, named after the market and
/// without a per-outcome volume.
async fn read_single_outcome(locator: &PageLocator) -> Result<Vec<Outcome>> {
    let title = locator.read_text(Role::DetailTitle).await;
    let percentage = locator.read_text(Role::SingleOutcome(SingleField::Percentage)).await;
    let outcome_type = locator.read_text(Role::SingleOutcome(SingleField::OutcomeType)).await;
    let buy_yes_price = locator.read_text(Role::SingleOutcome(SingleField::BuyYes)).await;
    let buy_no_price = locator.read_text(Role::SingleOutcome(SingleField::BuyNo)).await;

    let title = title.filter(|t| !t.is_empty());
    let percentage = percentage.filter(|p| !p.is_empty());
    match (title, percentage) {
        (Some(title), Some(percentage)) => {
            debug!("Single outcome type: {:?}", outcome_type);
            info!("Successfully extracted single outcome");
            Ok(vec![Outcome {
                title,
                volume: Some(VOLUME_NOT_APPLICABLE.to_string()),
                percentage: Some(percentage),
                buy_yes_price,
                buy_no_price,
            }])
        }
        _ => Ok(Vec::new()),
    }
}
