use serde::{Deserialize, Serialize};

/// Volume marker used for single-outcome markets, whose layout has no
/// per-outcome volume.
pub const VOLUME_NOT_APPLICABLE: &str = "N/A";

// Search Types
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MarketTitleRef {
    pub title: String,
    /// 1-based position among the rendered cards, decorative rows included.
    pub index: usize,
}

// Market Types
//
// Values are kept exactly as displayed on the page (currency and percent
// symbols included). `None` serializes as `null` and means "not found".
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Outcome {
    pub title: String,
    pub volume: Option<String>,
    pub percentage: Option<String>,
    pub buy_yes_price: Option<String>,
    pub buy_no_price: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MarketDetail {
    pub title: Option<String>,
    pub volume: Option<String>,
    pub end_date: Option<String>,
    pub outcomes: Vec<Outcome>,
}

// AI Response Types
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AnalysisResult {
    pub bet_description: String,
    pub probabilities: String,
    pub volume_and_liquidity: String,
    pub opportunities: String,
    pub risks: String,
    pub additional_info: String,
    pub summary: String,
}

impl AnalysisResult {
    /// Fields in schema order, for paragraph-style printing.
    pub fn paragraphs(&self) -> [&str; 7] {
        [
            &self.bet_description,
            &self.probabilities,
            &self.volume_and_liquidity,
            &self.opportunities,
            &self.risks,
            &self.additional_info,
            &self.summary,
        ]
    }
}

#[derive(Debug, Deserialize)]
pub(crate) struct KeywordResponse {
    #[serde(default)]
    pub keyword: Option<String>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct RelevanceResponse {
    #[serde(default)]
    pub relevant_market: Vec<String>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct AnalysisEnvelope {
    pub analysis: AnalysisResult,
}

// Report Types
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FinalReport {
    pub query: String,
    pub search_keywords: String,
    pub market_details: Vec<MarketDetail>,
    pub analysis: AnalysisResult,
    pub metadata: RunMetadata,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RunMetadata {
    pub generated_at: String,
    pub execution_time_ms: u64,
    /// Completion backend that produced the analysis.
    pub provider: String,
    pub analysis_model: String,
}

#[derive(Debug)]
pub enum RunOutcome {
    Completed(FinalReport),
    NoRelevantMarkets {
        available_titles: Vec<String>,
    },
    /// Synthesis failed; the scraped details are still handed back.
    NoAnalysis {
        search_keywords: String,
        market_details: Vec<MarketDetail>,
    },
}
