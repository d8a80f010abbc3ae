//! Deterministic aggregation of validated per-chunk extractions into one
//! consistent report. Pure function of its input: no hidden state, no I/O.

use std::cmp::Ordering;
use std::collections::{HashMap, HashSet};

use chrono::NaiveDate;

use super::types::{
    AnalysisReport, BalancePoint, Category, LoanRecommendation, RegularPayment,
    StatementExtraction, StatementMetadata, StatementSummary, DEFAULT_CURRENCY, UNKNOWN,
};

/// Display palette for merged categories, assigned positionally. The last
/// entry lands on the synthetic "Other" bucket when all nine slots fill up.
pub const CHART_COLORS: [&str; 10] = [
    "#60a5fa", // soft blue
    "#f87171", // soft red
    "#4ade80", // soft green
    "#c084fc", // soft purple
    "#fb923c", // soft orange
    "#facc15", // soft yellow
    "#38bdf8", // sky blue
    "#a78bfa", // soft violet
    "#34d399", // soft emerald
    "#94a3b8", // soft slate
];

/// Categories kept verbatim before the tail folds into "Other".
const TOP_CATEGORIES: usize = 8;

/// Maximum categories in a merged report: top 8 plus "Other".
const MAX_CATEGORIES: usize = 9;

/// Suffix appended to the recommendation reason when any chunk was partial.
const PARTIAL_DATA_SUFFIX: &str = " (Analysis based on partial statement data)";

/// Combine validated per-chunk extractions into a single report.
///
/// Chunks are assumed to arrive in document (chronological) order; the
/// ending balance and the metadata override rule both rely on it. Currency
/// uniformity across payloads is the caller's contract and is not checked
/// here.
pub fn merge_extractions(payloads: &[StatementExtraction]) -> AnalysisReport {
    let mut summary = StatementSummary::default();
    let mut seen_payments: HashSet<String> = HashSet::new();
    let mut has_partial = false;

    for payload in payloads {
        if let Some(s) = &payload.summary {
            summary.total_deposits += s.total_deposits;
            summary.total_withdrawals += s.total_withdrawals;
            // Later chunks hold more recent activity, so the last summary
            // wins the ending balance.
            summary.ending_balance = s.ending_balance;

            for payment in &s.regular_payments {
                if seen_payments.insert(payment_key(payment)) {
                    summary.regular_payments.push(payment.clone());
                }
            }
        }
        if payload.partial {
            has_partial = true;
        }
    }

    let mut loan_recommendation = best_recommendation(payloads);
    if has_partial {
        loan_recommendation.reason.push_str(PARTIAL_DATA_SUFFIX);
    }

    AnalysisReport {
        statements: payloads.to_vec(),
        summary,
        categories: merge_categories(payloads),
        balance_trend: merge_balance_trend(payloads),
        loan_recommendation,
        metadata: merge_metadata(payloads),
    }
}

/// Dedup key for a regular payment: exact match on all three fields.
fn payment_key(payment: &RegularPayment) -> String {
    format!(
        "{}-{}-{}",
        payment.description, payment.amount, payment.frequency
    )
}

/// Sum category values by name, sort descending, cap at nine buckets, and
/// assign display colors by position.
fn merge_categories(payloads: &[StatementExtraction]) -> Vec<Category> {
    let mut order: Vec<String> = Vec::new();
    let mut totals: HashMap<String, f64> = HashMap::new();

    for payload in payloads {
        for category in &payload.categories {
            if !totals.contains_key(&category.name) {
                order.push(category.name.clone());
            }
            *totals.entry(category.name.clone()).or_insert(0.0) += category.value;
        }
    }

    let mut merged: Vec<Category> = order
        .into_iter()
        .map(|name| {
            let value = totals.get(&name).copied().unwrap_or(0.0);
            Category {
                name,
                value,
                color: None,
            }
        })
        .collect();

    // Stable sort keeps first-seen order among equal values
    merged.sort_by(|a, b| b.value.partial_cmp(&a.value).unwrap_or(Ordering::Equal));

    if merged.len() > MAX_CATEGORIES {
        let other_total: f64 = merged[TOP_CATEGORIES..].iter().map(|c| c.value).sum();
        merged.truncate(TOP_CATEGORIES);
        merged.push(Category {
            name: "Other".to_string(),
            value: other_total,
            color: None,
        });
    }

    for (i, category) in merged.iter_mut().enumerate() {
        category.color = CHART_COLORS.get(i).map(|c| c.to_string());
    }

    merged
}

/// Dedup balance points by date (first occurrence wins), then sort ascending
/// by the precomputed key from `date_key`.
fn merge_balance_trend(payloads: &[StatementExtraction]) -> Vec<BalancePoint> {
    let mut seen: HashSet<String> = HashSet::new();
    let mut points: Vec<BalancePoint> = Vec::new();

    for payload in payloads {
        for point in &payload.balance_trend {
            if seen.insert(point.date.clone()) {
                points.push(point.clone());
            }
        }
    }

    points.sort_by_key(|p| date_key(&p.date));
    points
}

/// Total ordering over date strings: `YYYY-MM-DD` dates sort chronologically,
/// anything unparseable sorts before them, lexicographically.
fn date_key(date: &str) -> (Option<NaiveDate>, String) {
    (
        NaiveDate::parse_from_str(date, "%Y-%m-%d").ok(),
        date.to_string(),
    )
}

/// Pick the recommendation with the strictly highest score; ties keep the
/// first-seen maximum. No score above zero means insufficient data.
fn best_recommendation(payloads: &[StatementExtraction]) -> LoanRecommendation {
    let mut best = LoanRecommendation::insufficient_data();
    let mut best_score = 0.0;

    for payload in payloads {
        if let Some(rec) = &payload.loan_recommendation {
            if rec.score > best_score {
                best_score = rec.score;
                best = rec.clone();
            }
        }
    }

    best
}

/// Merge metadata with the last non-default value winning for every field.
/// Defaults are "Unknown" for identity and period fields, "USD" for currency.
fn merge_metadata(payloads: &[StatementExtraction]) -> StatementMetadata {
    let mut merged = StatementMetadata::default();

    for payload in payloads {
        let meta = &payload.metadata;
        if is_set(&meta.bank_name, UNKNOWN) {
            merged.bank_name = meta.bank_name.clone();
        }
        if is_set(&meta.account_holder, UNKNOWN) {
            merged.account_holder = meta.account_holder.clone();
        }
        if is_set(&meta.currency, DEFAULT_CURRENCY) {
            merged.currency = meta.currency.clone();
        }
        if is_set(&meta.statement_period.start, UNKNOWN) {
            merged.statement_period.start = meta.statement_period.start.clone();
        }
        if is_set(&meta.statement_period.end, UNKNOWN) {
            merged.statement_period.end = meta.statement_period.end.clone();
        }
    }

    merged
}

fn is_set(value: &str, default: &str) -> bool {
    !value.is_empty() && value != default
}
