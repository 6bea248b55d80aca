// dqguard-core/src/infrastructure/adapters/heuristic.rs

use async_trait::async_trait;
use tracing::{debug, instrument};

use crate::domain::dataset::{Dataset, Value};
use crate::domain::policy::{ActionKind, Rule, RuleSet};
use crate::domain::quality::{QualityReport, Suggestion, SuggestionSource};
use crate::error::GuardError;
use crate::ports::suggester::RuleSuggester;

const ALLOWED_CURRENCIES: [&str; 3] = ["USD", "EUR", "GBP"];
const MIN_CURRENCY_ROWS: u64 = 10;
const MAX_CURRENCY_RULES: usize = 3;
const MISSING_CONTACT_RATIO: f64 = 0.30;
const PRICE_CEILING: f64 = 1000.0;
const MEAN_SHIFT_ALERT: f64 = 50.0;

/// Rule proposals from fixed data checks over the order schema.
/// Nothing leaves the process.
#[derive(Debug, Default, Clone)]
pub struct HeuristicSuggester;

impl HeuristicSuggester {
    pub fn new() -> Self {
        Self
    }

    fn analyze(&self, dataset: &Dataset, report: &QualityReport) -> Vec<Suggestion> {
        let mut out = Vec::new();
        let rows = dataset.len();
        if rows == 0 {
            debug!("Heuristics skipped: dataset has zero rows");
            return out;
        }

        // A. Contact data
        if dataset.contains("customer_email") {
            let missing = count_where(dataset, "customer_email", Value::is_missing);
            let ratio = missing as f64 / rows as f64;
            if ratio >= MISSING_CONTACT_RATIO {
                out.push(suggestion(
                    "High missing email ratio",
                    Rule::new("customer_email IS NULL", "assign dq_flag = 'missing_contact'"),
                    format!("{:.0}% of customer_email is missing.", ratio * 100.0),
                    0.90,
                ));
            }
        }

        // B. Negative totals
        let negative = count_numbers(dataset, "total_amount", |n| n < 0.0);
        if negative > 0 {
            out.push(suggestion(
                "Negative total amounts",
                Rule::new("total_amount < 0", "assign dq_flag = 'negative_amount'"),
                format!("{negative} rows have total_amount < 0."),
                0.89,
            ));
        }

        // C. Price outliers, one rule per side
        let low = count_numbers(dataset, "unit_price", |n| n <= 0.0);
        if low > 0 {
            out.push(suggestion(
                "Zero or negative unit price",
                Rule::new("unit_price <= 0", "assign dq_flag = 'price_outlier_low'"),
                format!("{low} rows with unit_price <= 0."),
                0.90,
            ));
        }
        let high = count_numbers(dataset, "unit_price", |n| n > PRICE_CEILING);
        if high > 0 {
            out.push(suggestion(
                "Extreme unit price",
                Rule::new("unit_price > 1000", "assign dq_flag = 'price_outlier_high'"),
                format!("{high} rows with unit_price > 1000."),
                0.90,
            ));
        }

        // D. Unexpected currencies, most frequent first
        let mut unexpected: Vec<(String, u64)> = dataset
            .value_counts("currency")
            .into_iter()
            .filter(|(val, ct)| !ALLOWED_CURRENCIES.contains(&val.as_str()) && *ct >= MIN_CURRENCY_ROWS)
            .collect();
        unexpected.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(&b.0)));
        for (val, ct) in unexpected.into_iter().take(MAX_CURRENCY_RULES) {
            out.push(suggestion(
                &format!("Unexpected currency: {val}"),
                Rule::new(
                    format!("currency == '{val}'"),
                    "assign dq_alert = 'unexpected_currency'",
                ),
                format!("{ct} rows contain currency={val}."),
                0.86,
            ));
        }

        // E. Status imputation that looks too broad
        let assigned = report.transform_audit.count(ActionKind::Assign, "status");
        if assigned > 250
            && assigned as f64 / rows as f64 >= 0.30
            && dataset.contains("order_id")
        {
            out.push(suggestion(
                "Guard status assignment to order-like rows only",
                Rule::new("order_id IS NOT NULL and status IS NULL", "assign status = 'unknown'"),
                "High volume of status assignment suggests non-order rows in the batch.".to_string(),
                0.90,
            ));
        }

        // F. Mean shift against the previous run
        for (column, delta) in &report.drift.mean_delta {
            if let Some(delta) = delta
                && delta.abs() >= MEAN_SHIFT_ALERT
            {
                out.push(suggestion(
                    "Drift alert rule suggestion",
                    Rule::new("true", format!("assign dq_alert = 'mean_{column}_shift'")),
                    format!("Detected large mean shift in {column} (Δ≈{delta:.2})."),
                    0.87,
                ));
            }
        }

        out
    }
}

#[async_trait]
impl RuleSuggester for HeuristicSuggester {
    #[instrument(skip_all, fields(rows = dataset.len()))]
    async fn suggest(
        &self,
        dataset: &Dataset,
        report: &QualityReport,
        existing: &RuleSet,
    ) -> Result<Vec<Suggestion>, GuardError> {
        let proposals: Vec<Suggestion> = self
            .analyze(dataset, report)
            .into_iter()
            .filter(|s| !existing.contains(&s.rule))
            .collect();
        debug!(count = proposals.len(), "Heuristic suggestions");
        Ok(proposals)
    }
}

fn count_where(dataset: &Dataset, column: &str, pred: impl Fn(&Value) -> bool) -> usize {
    dataset
        .column(column)
        .map(|c| c.values().iter().filter(|v| pred(*v)).count())
        .unwrap_or(0)
}

fn count_numbers(dataset: &Dataset, column: &str, pred: impl Fn(f64) -> bool) -> usize {
    if !dataset.contains(column) {
        return 0;
    }
    dataset
        .numbers(column)
        .into_iter()
        .flatten()
        .filter(|n| pred(*n))
        .count()
}

fn suggestion(title: &str, rule: Rule, reason: String, confidence: f64) -> Suggestion {
    Suggestion {
        id: rule_id(&rule),
        title: title.to_string(),
        rule,
        reason,
        confidence,
        source: SuggestionSource::Heuristic,
    }
}

const FNV_OFFSET: u64 = 0xcbf2_9ce4_8422_2325;
const FNV_PRIME: u64 = 0x0000_0100_0000_01b3;

/// Short id from a 64-bit FNV-1a over `if`, a NUL separator, then `then`.
/// Same rule, same id, on every build.
fn rule_id(rule: &Rule) -> String {
    let bytes = rule
        .condition
        .bytes()
        .chain(std::iter::once(0u8))
        .chain(rule.action.bytes());
    let hash = bytes.fold(FNV_OFFSET, |h, b| (h ^ u64::from(b)).wrapping_mul(FNV_PRIME));
    format!("{hash:016x}")[..10].to_string()
}
