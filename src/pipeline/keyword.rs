use tracing::{info, instrument};

use crate::clients::ai::prompts::{build_keyword_prompt, KEYWORD_SYSTEM_PROMPT};
use crate::clients::ai::{CompletionClient, CompletionRequest};
use crate::types::KeywordResponse;
use crate::{AppError, Result};

/// Turns a free-text query into one search keyword.
///
/// Service failures come back as `ServiceUnavailable`, unusable answers as
/// `MalformedResponse`. Both are fatal to the run.
#[instrument(skip(client))]
pub async fn derive_keyword(
    client: &dyn CompletionClient,
    model: &str,
    query: &str,
) -> Result<String> {
    let request = CompletionRequest::new(model, KEYWORD_SYSTEM_PROMPT, build_keyword_prompt(query));
    let content = client.complete(request).await?;
    let keyword = parse_keyword(&content)?;
    info!("Search keyword: {}", keyword);
    Ok(keyword)
}

/// Extracts the keyword from `{"keyword": "..."}`, keeping only the first
/// whitespace-separated token.
pub fn parse_keyword(content: &str) -> Result<String> {
    let response: KeywordResponse = serde_json::from_str(content)
        .map_err(|e| AppError::MalformedResponse(format!("Keyword response is not JSON: {}", e)))?;

    response
        .keyword
        .as_deref()
        .and_then(|keyword| keyword.split_whitespace().next())
        .map(str::to_string)
        .ok_or_else(|| AppError::MalformedResponse("Keyword response has no keyword".to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::ScriptedCompletion;

    #[test]
    fn single_word_is_returned_as_received() {
        assert_eq!(parse_keyword(r#"{"keyword": "Starship"}"#).unwrap(), "Starship");
        assert_eq!(parse_keyword(r#"{"keyword": "  bitcoin \n"}"#).unwrap(), "bitcoin");
    }

    #[test]
    fn multi_word_keyword_is_truncated_to_first_token() {
        assert_eq!(parse_keyword(r#"{"keyword": "SpaceX Starship launch"}"#).unwrap(), "SpaceX");
    }

    #[test]
    fn empty_or_missing_keyword_is_malformed() {
        let contents = [
            r#"{"keyword": ""}"#,
            r#"{"keyword": "   "}"#,
            r#"{}"#,
            r#"{"keyword": null}"#,
        ];
        for content in contents {
            assert!(
                matches!(parse_keyword(content), Err(AppError::MalformedResponse(_))),
                "{content}"
            );
        }
    }

    #[test]
    fn non_json_is_malformed() {
        assert!(matches!(
            parse_keyword("```json\n{\"keyword\": \"x\"}\n```"),
            Err(AppError::MalformedResponse(_))
        ));
    }

    #[tokio::test]
    async fn sends_query_to_triage_model() {
        let client = ScriptedCompletion::new().reply(r#"{"keyword": "starship"}"#);
        let keyword = derive_keyword(&client, "triage", "starship launches in 2024").await.unwrap();
        assert_eq!(keyword, "starship");

        let requests = client.requests();
        assert_eq!(requests.len(), 1);
        assert_eq!(requests[0].model, "triage");
        assert_eq!(requests[0].system, KEYWORD_SYSTEM_PROMPT);
        assert!(requests[0].user.contains("Query: starship launches in 2024"));
    }

    #[tokio::test]
    async fn service_errors_propagate() {
        let client = ScriptedCompletion::new().fail(AppError::ServiceUnavailable("down".into()));
        assert!(matches!(
            derive_keyword(&client, "triage", "q").await,
            Err(AppError::ServiceUnavailable(_))
        ));
    }
}
