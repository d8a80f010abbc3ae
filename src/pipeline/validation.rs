// Structural validation of parsed extraction payloads, applied between
// parse_payload() and the merge. A payload failing a required check is
// dropped from the merge; it never aborts the whole run on its own.

use serde_json::Value;

use super::types::StatementExtraction;
use super::PipelineError;

/// Confirm a parsed payload satisfies the minimum structural contract
/// required for merging, then deserialize it.
///
/// Checks run in order and short-circuit on the first failure:
/// metadata identity fields, then the three required sequences, then the
/// field types of each sequence entry. Missing optional blocks (`summary`,
/// `loanRecommendation`, category colors) are defaulted, not rejected.
pub fn validate_payload(
    index: usize,
    value: &Value,
) -> Result<StatementExtraction, PipelineError> {
    let obj = value
        .as_object()
        .ok_or_else(|| invalid(index, "payload is not a JSON object"))?;

    let metadata = obj
        .get("metadata")
        .and_then(Value::as_object)
        .ok_or_else(|| invalid(index, "missing metadata"))?;
    require_non_empty_string(metadata.get("bankName"), "metadata.bankName", index)?;
    require_non_empty_string(metadata.get("accountHolder"), "metadata.accountHolder", index)?;

    let payments = require_array(obj.get("regularPayments"), "regularPayments", index)?;
    for (i, entry) in payments.iter().enumerate() {
        require_string(entry.get("description"), &format!("regularPayments[{i}].description"), index)?;
        require_number(entry.get("amount"), &format!("regularPayments[{i}].amount"), index)?;
        require_string(entry.get("frequency"), &format!("regularPayments[{i}].frequency"), index)?;
    }

    let categories = require_array(obj.get("categories"), "categories", index)?;
    for (i, entry) in categories.iter().enumerate() {
        require_string(entry.get("name"), &format!("categories[{i}].name"), index)?;
        require_number(entry.get("value"), &format!("categories[{i}].value"), index)?;
    }

    let trend = require_array(obj.get("balanceTrend"), "balanceTrend", index)?;
    for (i, entry) in trend.iter().enumerate() {
        require_string(entry.get("date"), &format!("balanceTrend[{i}].date"), index)?;
        require_number(entry.get("balance"), &format!("balanceTrend[{i}].balance"), index)?;
    }

    serde_json::from_value(value.clone()).map_err(|e| invalid(index, &e.to_string()))
}

fn invalid(index: usize, reason: &str) -> PipelineError {
    PipelineError::InvalidPayload {
        index,
        reason: reason.to_string(),
    }
}

fn require_non_empty_string(
    value: Option<&Value>,
    field: &str,
    index: usize,
) -> Result<(), PipelineError> {
    match value.and_then(Value::as_str) {
        Some(s) if !s.trim().is_empty() => Ok(()),
        Some(_) => Err(invalid(index, &format!("{field} is empty"))),
        None => Err(invalid(index, &format!("missing {field}"))),
    }
}

fn require_string(value: Option<&Value>, field: &str, index: usize) -> Result<(), PipelineError> {
    match value {
        Some(Value::String(_)) => Ok(()),
        _ => Err(invalid(index, &format!("{field} is not a string"))),
    }
}

fn require_number(value: Option<&Value>, field: &str, index: usize) -> Result<(), PipelineError> {
    match value {
        Some(v) if v.is_number() => Ok(()),
        _ => Err(invalid(index, &format!("{field} is not a number"))),
    }
}

fn require_array<'a>(
    value: Option<&'a Value>,
    field: &str,
    index: usize,
) -> Result<&'a Vec<Value>, PipelineError> {
    match value {
        Some(Value::Array(items)) => Ok(items),
        _ => Err(invalid(index, &format!("missing {field} array"))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn minimal_payload() -> Value {
        json!({
            "regularPayments": [],
            "categories": [],
            "balanceTrend": [],
            "metadata": {
                "bankName": "First National",
                "accountHolder": "J. Doe",
                "currency": "USD",
                "statementPeriod": {"start": "2024-01-01", "end": "2024-01-31"}
            }
        })
    }

    #[test]
    fn minimal_payload_validates() {
        let payload = validate_payload(0, &minimal_payload()).unwrap();
        assert_eq!(payload.metadata.bank_name, "First National");
        assert!(payload.summary.is_none());
        assert!(payload.loan_recommendation.is_none());
        assert!(!payload.partial);
    }

    #[test]
    fn missing_metadata_rejected() {
        let mut value = minimal_payload();
        value.as_object_mut().unwrap().remove("metadata");
        let err = validate_payload(3, &value).unwrap_err();
        match err {
            PipelineError::InvalidPayload { index, reason } => {
                assert_eq!(index, 3);
                assert!(reason.contains("metadata"));
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn empty_bank_name_rejected() {
        let mut value = minimal_payload();
        value["metadata"]["bankName"] = json!("   ");
        let err = validate_payload(0, &value).unwrap_err();
        assert!(err.to_string().contains("bankName"));
    }

    #[test]
    fn missing_account_holder_rejected() {
        let mut value = minimal_payload();
        value["metadata"].as_object_mut().unwrap().remove("accountHolder");
        let err = validate_payload(0, &value).unwrap_err();
        assert!(err.to_string().contains("accountHolder"));
    }

    #[test]
    fn missing_regular_payments_rejected() {
        let mut value = minimal_payload();
        value.as_object_mut().unwrap().remove("regularPayments");
        let err = validate_payload(0, &value).unwrap_err();
        assert!(err.to_string().contains("regularPayments"));
    }

    #[test]
    fn missing_balance_trend_rejected() {
        let mut value = minimal_payload();
        value.as_object_mut().unwrap().remove("balanceTrend");
        let err = validate_payload(0, &value).unwrap_err();
        assert!(err.to_string().contains("balanceTrend"));
    }

    #[test]
    fn non_numeric_payment_amount_rejected() {
        let mut value = minimal_payload();
        value["regularPayments"] = json!([
            {"description": "Rent", "amount": "1200", "frequency": "monthly"}
        ]);
        let err = validate_payload(0, &value).unwrap_err();
        assert!(err.to_string().contains("amount"));
    }

    #[test]
    fn category_without_name_rejected() {
        let mut value = minimal_payload();
        value["categories"] = json!([{"value": 100.0}]);
        let err = validate_payload(0, &value).unwrap_err();
        assert!(err.to_string().contains("name"));
    }

    #[test]
    fn trend_entry_without_date_rejected() {
        let mut value = minimal_payload();
        value["balanceTrend"] = json!([{"balance": 100.0}]);
        let err = validate_payload(0, &value).unwrap_err();
        assert!(err.to_string().contains("date"));
    }

    #[test]
    fn missing_summary_defaults_to_none() {
        let payload = validate_payload(0, &minimal_payload()).unwrap();
        assert!(payload.summary.is_none());
    }

    #[test]
    fn category_color_is_optional() {
        let mut value = minimal_payload();
        value["categories"] = json!([
            {"name": "Food", "value": 100.0},
            {"name": "Rent", "value": 900.0, "color": "#60a5fa"}
        ]);
        let payload = validate_payload(0, &value).unwrap();
        assert!(payload.categories[0].color.is_none());
        assert_eq!(payload.categories[1].color.as_deref(), Some("#60a5fa"));
    }

    #[test]
    fn full_payload_round_trips() {
        let mut value = minimal_payload();
        value["summary"] = json!({
            "totalDeposits": 5000.0,
            "totalWithdrawals": 1600.0,
            "endingBalance": 3400.0,
            "regularPayments": [{"description": "Rent", "amount": 1200.0, "frequency": "monthly"}]
        });
        value["loanRecommendation"] = json!({
            "approved": true, "score": 78.0, "maxAmount": 15000.0,
            "reason": "Stable income",
            "keyFactors": {"incomeStability": 80.0, "spendingPatterns": 70.0,
                           "regularPayments": 75.0, "balanceTrend": 82.0}
        });
        value["partial"] = json!(true);

        let payload = validate_payload(0, &value).unwrap();
        assert_eq!(payload.summary.as_ref().unwrap().ending_balance, 3400.0);
        let rec = payload.loan_recommendation.as_ref().unwrap();
        assert!(rec.approved);
        assert_eq!(rec.key_factors.balance_trend, 82.0);
        assert!(payload.partial);
    }

    #[test]
    fn non_object_payload_rejected() {
        let err = validate_payload(0, &json!([1, 2, 3])).unwrap_err();
        assert!(err.to_string().contains("not a JSON object"));
    }
}
