use super::sanitize::sanitize_payload;
use super::PipelineError;

/// Sanitize one raw model response and parse it as JSON.
///
/// If the sanitized text still fails to parse this is a fatal
/// `UnparseableResponse` for that chunk; the orchestrator decides whether
/// the run continues without it.
pub fn parse_payload(raw: &str) -> Result<serde_json::Value, PipelineError> {
    let cleaned = sanitize_payload(raw);
    if cleaned.is_empty() {
        return Err(PipelineError::UnparseableResponse(
            "response is empty after sanitization".to_string(),
        ));
    }
    serde_json::from_str(&cleaned).map_err(|e| PipelineError::UnparseableResponse(e.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_bare_json() {
        let value = parse_payload(r#"{"metadata": {"bankName": "Acme Bank"}}"#).unwrap();
        assert_eq!(value["metadata"]["bankName"], "Acme Bank");
    }

    #[test]
    fn parses_fenced_json() {
        let raw = "```json\n{\"partial\": true}\n```";
        let value = parse_payload(raw).unwrap();
        assert_eq!(value["partial"], true);
    }

    #[test]
    fn parses_after_numeric_repair() {
        let raw = r#"{"summary": {"endingBalance": 1,234.56.78}}"#;
        let value = parse_payload(raw).unwrap();
        assert!(value["summary"]["endingBalance"].is_number());
    }

    #[test]
    fn parses_after_trailing_comma_repair() {
        let raw = r#"{"categories": [{"name": "Food", "value": 100},],}"#;
        let value = parse_payload(raw).unwrap();
        assert_eq!(value["categories"][0]["name"], "Food");
    }

    #[test]
    fn prose_response_is_unparseable() {
        let result = parse_payload("I could not find any financial data in this text.");
        assert!(matches!(result, Err(PipelineError::UnparseableResponse(_))));
    }

    #[test]
    fn empty_response_is_unparseable() {
        let result = parse_payload("   \n ");
        assert!(matches!(result, Err(PipelineError::UnparseableResponse(_))));
    }

    #[test]
    fn truncated_json_is_unparseable() {
        let result = parse_payload(r#"{"metadata": {"bankName": "Acme"#);
        assert!(matches!(result, Err(PipelineError::UnparseableResponse(_))));
    }
}
