use tracing::{info, instrument};

use crate::clients::ai::prompts::{build_analysis_prompt, ANALYSIS_SYSTEM_PROMPT};
use crate::clients::ai::{CompletionClient, CompletionRequest};
use crate::types::{AnalysisEnvelope, AnalysisResult, MarketDetail};
use crate::{AppError, Result};

#[instrument(skip(client, market_details), fields(markets = market_details.len()))]
pub async fn synthesize(
    client: &dyn CompletionClient,
    model: &str,
    query: &str,
    market_details: &[MarketDetail],
) -> Result<AnalysisResult> {
    info!("Performing final analysis...");
    let request = CompletionRequest::new(
        model,
        ANALYSIS_SYSTEM_PROMPT,
        build_analysis_prompt(query, market_details)?,
    );
    let content = client.complete(request).await?;
    parse_analysis(&content)
}

/// Parses `{"analysis": {...}}` with all seven fields present.
pub fn parse_analysis(content: &str) -> Result<AnalysisResult> {
    let envelope: AnalysisEnvelope = serde_json::from_str(content).map_err(|e| {
        AppError::MalformedResponse(format!("Analysis response is not valid: {}", e))
    })?;
    Ok(envelope.analysis)
}
