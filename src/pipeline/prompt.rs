/// Fixed system instruction describing the extractor's role.
pub const EXTRACTION_SYSTEM_PROMPT: &str = "You are a financial analyst specializing in bank \
statement analysis. Extract key financial metrics and provide loan recommendations based on \
spending patterns and income stability. Return data in a clean JSON format with no additional \
text or formatting.";

/// Build the per-chunk extraction prompt: the fixed JSON schema contract
/// followed by the chunk text.
pub fn build_extraction_prompt(chunk_text: &str) -> String {
    format!(
        r#"Analyze this bank statement text and return ONLY the following key metrics in JSON format:

{{
  "regularPayments": [
    {{
      "description": "string",
      "amount": number,
      "frequency": "monthly" | "weekly" | "quarterly"
    }}
  ],
  "categories": [
    {{
      "name": "string",
      "value": number
    }}
  ],
  "balanceTrend": [
    {{
      "date": "YYYY-MM-DD",
      "balance": number
    }}
  ],
  "summary": {{
    "totalDeposits": number,
    "totalWithdrawals": number,
    "endingBalance": number,
    "regularPayments": [
      {{
        "description": "string",
        "amount": number,
        "frequency": "monthly" | "weekly" | "quarterly"
      }}
    ]
  }},
  "loanRecommendation": {{
    "approved": boolean,
    "score": number,
    "maxAmount": number,
    "reason": "string",
    "keyFactors": {{
      "incomeStability": number,
      "spendingPatterns": number,
      "regularPayments": number,
      "balanceTrend": number
    }}
  }},
  "metadata": {{
    "bankName": "string",
    "accountHolder": "string",
    "currency": "string",
    "statementPeriod": {{
      "start": "YYYY-MM-DD",
      "end": "YYYY-MM-DD"
    }}
  }},
  "partial": boolean
}}

Key requirements:
1. Focus on identifying regular payments and their frequencies
2. Calculate total deposits and withdrawals
3. Group expenses into meaningful categories (e.g., Utilities, Food, Transport)
4. Track balance trend over time (monthly points)
5. Assess loan eligibility based on income stability, spending patterns, regular payments, and balance trend (each a 0-100 score)
6. Return ONLY the JSON object with no formatting
7. Ensure all numbers are valid JSON numbers (no commas)
8. Detect and specify the currency (USD, GBP, AUD, INR, etc.) based on statement format
9. Set "partial" to true if this text covers only part of a statement period

Here's the bank statement text:

{chunk_text}"#
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn prompt_contains_chunk_text() {
        let prompt = build_extraction_prompt("01/02 SALARY +2500.00");
        assert!(prompt.contains("01/02 SALARY +2500.00"));
    }

    #[test]
    fn prompt_describes_payload_schema() {
        let prompt = build_extraction_prompt("text");
        assert!(prompt.contains("\"regularPayments\""));
        assert!(prompt.contains("\"balanceTrend\""));
        assert!(prompt.contains("\"loanRecommendation\""));
        assert!(prompt.contains("\"keyFactors\""));
        assert!(prompt.contains("\"partial\""));
    }

    #[test]
    fn prompt_demands_bare_json() {
        let prompt = build_extraction_prompt("text");
        assert!(prompt.contains("ONLY the JSON object"));
        assert!(prompt.contains("no commas"));
    }

    #[test]
    fn system_prompt_sets_analyst_role() {
        assert!(EXTRACTION_SYSTEM_PROMPT.contains("financial analyst"));
        assert!(EXTRACTION_SYSTEM_PROMPT.contains("JSON"));
    }
}
