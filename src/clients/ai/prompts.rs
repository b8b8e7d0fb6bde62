use crate::types::{MarketDetail, MarketTitleRef};
use crate::Result;

pub const KEYWORD_SYSTEM_PROMPT: &str = r#"You are a search keyword extractor. Your task is to transform a user's query into a single relevant keyword
that can be used to search on Polymarket. You must respond in the following JSON format:
{
    "keyword": "your extracted keyword here" (ONLY ONE WORD)
}
Be concise and focus on the most important concept. Return ONLY the JSON, nothing else."#;

pub const RELEVANCE_SYSTEM_PROMPT: &str = r#"You are a market relevance analyzer. Given a user's original query and a list of market data,
determine which markets are relevant to the query. You must respond in the following JSON format:
{
    "relevant_market": [
        "market title 1"
    ]
}
Return ONLY the JSON with the list of relevant market titles, nothing else. Only return one market title, the most relevant one to the query."#;

pub const ANALYSIS_SYSTEM_PROMPT: &str = r#"IMPORTANT: Return ONLY the JSON, nothing else, no markdown formatting nor backticks, nor bold asterisks or other formatting.
You are a financial market analyst specializing in prediction markets. Given a user's query and detailed market data,
provide a thorough analysis in formal but simple language. You must respond in the following JSON format:
{
    "analysis": {
        "bet_description": "What the bet is about and what outcomes are possible",
        "probabilities": "Current probabilities and what they mean",
        "volume_and_liquidity": "Trading volume and market liquidity analysis",
        "opportunities": "Most profitable opportunities if any",
        "risks": "Risks and uncertainties",
        "additional_info": "Any other relevant information",
        "summary": "A concise summary of the analysis"
    }
}
Make your explanation detailed but easy to understand for someone who can only see your description.
Return ONLY the JSON, nothing else, no markdown formatting nor backticks, nor bold asterisks or other formatting."#;

pub fn build_keyword_prompt(query: &str) -> String {
    format!(
        r#"Important: Extract ONLY ONE keyword that is most relevant for searching. Just return the main concept as the keyword.
Query: {}

Note 1: You must respond in the following JSON format:
{{
    "keyword": "your extracted keyword here" (ONLY ONE WORD)
}}

Note 2: Extract ONLY ONE keyword that is most relevant for searching. Just return the main concept as the keyword.

Note 3: Return ONLY the JSON, no other text, no markdown formatting."#,
        query
    )
}

pub fn build_relevance_prompt(query: &str, markets: &[MarketTitleRef]) -> Result<String> {
    Ok(format!(
        "Query: {}\nMarkets: {}",
        query,
        serde_json::to_string_pretty(markets)?
    ))
}

pub fn build_analysis_prompt(query: &str, market_details: &[MarketDetail]) -> Result<String> {
    Ok(format!(
        "Query: {}\nMarket Details: {} ; Return ONLY the JSON, nothing else, no markdown formatting nor backticks, nor bold asterisks or other formatting.",
        query,
        serde_json::to_string_pretty(market_details)?
    ))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn relevance_prompt_lists_titles_with_indices() {
        let markets = vec![
            MarketTitleRef { title: "Bitcoin price".into(), index: 2 },
            MarketTitleRef { title: "Elections".into(), index: 3 },
        ];
        let prompt = build_relevance_prompt("btc", &markets).unwrap();
        assert!(prompt.starts_with("Query: btc\nMarkets: ["));
        assert!(prompt.contains(r#""title": "Bitcoin price""#));
        assert!(prompt.contains(r#""index": 3"#));
    }

    #[test]
    fn analysis_prompt_marks_missing_fields_as_null() {
        let details = vec![MarketDetail {
            title: Some("Starship".into()),
            volume: None,
            end_date: None,
            outcomes: vec![],
        }];
        let prompt = build_analysis_prompt("q", &details).unwrap();
        assert!(prompt.contains(r#""volume": null"#));
        assert!(prompt.contains(r#""outcomes": []"#));
    }
}
