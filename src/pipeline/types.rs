use serde::{Deserialize, Serialize};

use super::PipelineError;

/// Sentinel for metadata fields the model could not determine.
pub const UNKNOWN: &str = "Unknown";

/// Currency assumed when the model does not detect one.
pub const DEFAULT_CURRENCY: &str = "USD";

/// One bounded slice of statement text, processed independently by the
/// extractor. Boundaries always fall on line boundaries.
#[derive(Debug, Clone)]
pub struct RawChunk {
    pub index: usize,
    pub text: String,
    pub approx_size: usize,
}

/// A recurring payment identified in the statement.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RegularPayment {
    pub description: String,
    pub amount: f64,
    pub frequency: String,
}

/// A spending category. `color` is absent on per-chunk payloads and assigned
/// positionally after merging.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Category {
    pub name: String,
    pub value: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub color: Option<String>,
}

/// A single point in the account balance history.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BalancePoint {
    pub date: String,
    pub balance: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct StatementPeriod {
    pub start: String,
    pub end: String,
}

impl Default for StatementPeriod {
    fn default() -> Self {
        Self {
            start: UNKNOWN.to_string(),
            end: UNKNOWN.to_string(),
        }
    }
}

/// Metadata about one statement chunk: issuing bank, holder, currency, period.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct StatementMetadata {
    pub bank_name: String,
    pub account_holder: String,
    pub currency: String,
    pub statement_period: StatementPeriod,
}

impl Default for StatementMetadata {
    fn default() -> Self {
        Self {
            bank_name: UNKNOWN.to_string(),
            account_holder: UNKNOWN.to_string(),
            currency: DEFAULT_CURRENCY.to_string(),
            statement_period: StatementPeriod::default(),
        }
    }
}

/// Summary statistics for a chunk, or for the merged report.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct StatementSummary {
    pub total_deposits: f64,
    pub total_withdrawals: f64,
    pub ending_balance: f64,
    pub regular_payments: Vec<RegularPayment>,
}

/// Component scores (0-100) behind a loan recommendation.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct KeyFactors {
    pub income_stability: f64,
    pub spending_patterns: f64,
    pub regular_payments: f64,
    pub balance_trend: f64,
}

/// Scored, explainable loan eligibility assessment.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LoanRecommendation {
    pub approved: bool,
    pub score: f64,
    pub max_amount: f64,
    pub reason: String,
    #[serde(default)]
    pub key_factors: KeyFactors,
}

impl LoanRecommendation {
    /// Fallback when no chunk produced a scored signal.
    pub fn insufficient_data() -> Self {
        Self {
            approved: false,
            score: 0.0,
            max_amount: 0.0,
            reason: "Insufficient data".to_string(),
            key_factors: KeyFactors::default(),
        }
    }
}

/// The structured result of one chunk's extraction, after validation.
///
/// `summary` and `loan_recommendation` are optional on the wire; chunks
/// without them simply contribute nothing to the corresponding merge rules.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StatementExtraction {
    #[serde(default)]
    pub regular_payments: Vec<RegularPayment>,
    #[serde(default)]
    pub categories: Vec<Category>,
    #[serde(default)]
    pub balance_trend: Vec<BalancePoint>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub summary: Option<StatementSummary>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub loan_recommendation: Option<LoanRecommendation>,
    #[serde(default)]
    pub metadata: StatementMetadata,
    #[serde(default)]
    pub partial: bool,
}

/// The pipeline's final output: merged summary plus the validated per-chunk
/// payloads retained as the auditable `statements` collection.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AnalysisReport {
    pub statements: Vec<StatementExtraction>,
    pub summary: StatementSummary,
    pub categories: Vec<Category>,
    pub balance_trend: Vec<BalancePoint>,
    pub loan_recommendation: LoanRecommendation,
    pub metadata: StatementMetadata,
}

/// Size and determinism budget for one extraction call.
#[derive(Debug, Clone)]
pub struct TokenBudget {
    pub max_tokens: u32,
    pub temperature: f32,
}

impl Default for TokenBudget {
    fn default() -> Self {
        Self {
            max_tokens: crate::config::DEFAULT_MAX_TOKENS,
            temperature: crate::config::DEFAULT_TEMPERATURE,
        }
    }
}

/// Extraction service abstraction (allows mocking).
///
/// One call per chunk; no retries at this layer. Implementations signal
/// quota, transport, and empty-response failures as typed errors, never
/// swallow them.
pub trait ChatClient {
    fn complete(
        &self,
        system: &str,
        prompt: &str,
        budget: &TokenBudget,
    ) -> Result<String, PipelineError>;
}
