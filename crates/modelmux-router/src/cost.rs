//! Cost metering — best-effort per-invocation cost estimates.
//!
//! Backends mostly don't report billed usage, so tokens are estimated from
//! byte lengths (`bytes/4 + 1`); the messages-style API reports exact
//! counts and those are used instead. Prices come from a CSV table; models
//! without a priced row are skipped silently so unknown models never block
//! normal operation.

use std::collections::VecDeque;
use std::path::Path;

use chrono::{DateTime, Utc};
use tracing::{debug, info, warn};

use modelmux_core::types::UsageInfo;

/// Marker substring injected into internally generated follow-up prompts,
/// used to tell them apart from user-authored ones in the cost report.
pub const AUTO_GENERATED_PROMPT_MARKER: &str = "Generate three prompts";

/// How many recent invocations the rolling history keeps.
const MAX_RECENT_RUNS: usize = 5;

// ─────────────────────────────────────────────
// Usage basis
// ─────────────────────────────────────────────

/// What a successful invocation should be billed on.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum UsageBasis {
    /// Backend did not report usage; estimate from raw byte sizes.
    Estimated {
        input_bytes: usize,
        output_bytes: usize,
    },
    /// Backend reported exact token counts.
    Reported(UsageInfo),
    /// Not billed (embeddings, images, endpoint-family models).
    NotMetered,
}

/// Token estimate for a byte length: `floor(bytes / 4) + 1`.
pub fn estimate_tokens(bytes: usize) -> u64 {
    (bytes / 4) as u64 + 1
}

// ─────────────────────────────────────────────
// Pricing table
// ─────────────────────────────────────────────

/// Prices for one model id, per 1000 tokens.
#[derive(Clone, Debug, PartialEq)]
pub struct PriceEntry {
    pub model_id: String,
    pub input_per_k: f64,
    pub output_per_k: f64,
}

/// The per-model pricing table, filtered to the active region.
///
/// CSV columns: `region, model_id, input_token_price, output_token_price`.
/// Rows with region `all` apply everywhere; other rows only when the
/// active region matches.
#[derive(Clone, Debug, Default)]
pub struct PricingTable {
    entries: Vec<PriceEntry>,
}

impl PricingTable {
    /// Load the table from a CSV file. A missing or unreadable file yields
    /// an empty table (invocations simply go uncosted).
    pub fn load(path: &Path, region: &str) -> Self {
        match std::fs::read_to_string(path) {
            Ok(content) => Self::from_csv(&content, region),
            Err(e) => {
                warn!(path = %path.display(), error = %e, "pricing table unavailable, costs disabled");
                PricingTable::default()
            }
        }
    }

    /// Parse the table from CSV text.
    pub fn from_csv(content: &str, region: &str) -> Self {
        let mut entries = Vec::new();
        for line in content.lines().skip(1) {
            let line = line.trim();
            if line.is_empty() {
                continue;
            }
            let fields: Vec<&str> = line.split(',').map(str::trim).collect();
            if fields.len() != 4 {
                warn!(row = line, "skipping malformed pricing row");
                continue;
            }
            let (row_region, model_id) = (fields[0], fields[1]);
            if row_region != "all" && !region.contains(row_region) {
                continue;
            }
            match (fields[2].parse::<f64>(), fields[3].parse::<f64>()) {
                (Ok(input_per_k), Ok(output_per_k)) => entries.push(PriceEntry {
                    model_id: model_id.to_string(),
                    input_per_k,
                    output_per_k,
                }),
                _ => warn!(row = line, "skipping pricing row with non-numeric price"),
            }
        }
        debug!(entries = entries.len(), "pricing table loaded");
        PricingTable { entries }
    }

    /// Find the price row for a model id: exact match first, then the first
    /// row whose id is a substring of the requested id.
    pub fn find(&self, model_id: &str) -> Option<&PriceEntry> {
        self.entries
            .iter()
            .find(|e| e.model_id == model_id)
            .or_else(|| self.entries.iter().find(|e| model_id.contains(&e.model_id)))
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

// ─────────────────────────────────────────────
// Cost records
// ─────────────────────────────────────────────

/// One costed invocation.
#[derive(Clone, Debug)]
pub struct CostRecord {
    pub cost: f64,
    pub model_id: String,
    pub input_tokens: u64,
    pub output_tokens: u64,
    /// Whether the originating prompt was user-authored (vs internally
    /// auto-generated).
    pub user_generated: bool,
    pub at: DateTime<Utc>,
}

// ─────────────────────────────────────────────
// CostMeter
// ─────────────────────────────────────────────

/// Session-scoped cost bookkeeping: a running total plus a bounded
/// recent-history ring buffer (oldest evicted first).
#[derive(Debug, Default)]
pub struct CostMeter {
    pricing: PricingTable,
    recent: VecDeque<CostRecord>,
    running_total: f64,
}

impl CostMeter {
    pub fn new(pricing: PricingTable) -> Self {
        Self {
            pricing,
            recent: VecDeque::with_capacity(MAX_RECENT_RUNS),
            running_total: 0.0,
        }
    }

    /// Record a successful invocation against its usage basis.
    ///
    /// `prompt` is only inspected for the auto-generated marker.
    pub fn record(&mut self, model_id: &str, basis: &UsageBasis, prompt: &str) {
        let user_generated = !prompt.contains(AUTO_GENERATED_PROMPT_MARKER);
        match basis {
            UsageBasis::Estimated {
                input_bytes,
                output_bytes,
            } => self.record_tokens(
                model_id,
                estimate_tokens(*input_bytes),
                estimate_tokens(*output_bytes),
                user_generated,
            ),
            UsageBasis::Reported(usage) => self.record_tokens(
                model_id,
                u64::from(usage.input_tokens),
                u64::from(usage.output_tokens),
                user_generated,
            ),
            UsageBasis::NotMetered => {}
        }
    }

    /// Record exact token counts for one invocation.
    pub fn record_tokens(
        &mut self,
        model_id: &str,
        input_tokens: u64,
        output_tokens: u64,
        user_generated: bool,
    ) {
        let entry = match self.pricing.find(model_id) {
            Some(e) => e,
            // Unpriced models must not block normal operation
            None => {
                debug!(model = model_id, "no pricing row, invocation not costed");
                return;
            }
        };

        let cost = input_tokens as f64 * entry.input_per_k / 1000.0
            + output_tokens as f64 * entry.output_per_k / 1000.0;

        info!(
            model = model_id,
            input_tokens, output_tokens, cost, "invocation cost"
        );

        if self.recent.len() == MAX_RECENT_RUNS {
            self.recent.pop_front();
        }
        self.recent.push_back(CostRecord {
            cost,
            model_id: model_id.to_string(),
            input_tokens,
            output_tokens,
            user_generated,
            at: Utc::now(),
        });
        self.running_total += cost;
    }

    /// The running session total in dollars.
    pub fn total(&self) -> f64 {
        self.running_total
    }

    /// Recent records, oldest first.
    pub fn recent(&self) -> impl Iterator<Item = &CostRecord> {
        self.recent.iter()
    }

    /// Render the running total and the recent history (most recent first).
    /// Empty string when nothing has been costed yet.
    pub fn report(&self) -> String {
        if self.recent.is_empty() {
            return String::new();
        }

        let mut breakdown = String::new();
        for entry in self.recent.iter().rev() {
            breakdown.push_str(&format!(
                "  \n\n Invoke cost: ${:.6}, model: {}, input tokens: {}, output tokens: {}, user-generated-prompt: {}",
                entry.cost, entry.model_id, entry.input_tokens, entry.output_tokens, entry.user_generated
            ));
        }

        format!(
            "Estimated cost of recent runs: ${:.8}  \n\n Breakdown: {}",
            self.running_total, breakdown
        )
    }
}

// ─────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    const CSV: &str = "\
region,model_id,input_token_price,output_token_price
all,anthropic.claude-v2,0.008,0.024
all,amazon.titan-text-lite-v1,0.0003,0.0004
us-east-1,ai21.j2-ultra,0.0188,0.0188
eu-west-1,ai21.j2-mid,0.0125,0.0125
";

    fn table() -> PricingTable {
        PricingTable::from_csv(CSV, "us-east-1")
    }

    // ── Token estimation ──

    #[test]
    fn test_estimate_tokens() {
        assert_eq!(estimate_tokens(0), 1);
        assert_eq!(estimate_tokens(3), 1);
        assert_eq!(estimate_tokens(4), 2);
        assert_eq!(estimate_tokens(400), 101);
        assert_eq!(estimate_tokens(800), 201);
    }

    // ── Pricing table ──

    #[test]
    fn test_csv_region_filtering() {
        let table = table();
        assert!(table.find("anthropic.claude-v2").is_some());
        assert!(table.find("ai21.j2-ultra").is_some());
        // eu-west-1 row filtered out for us-east-1
        assert!(table.find("ai21.j2-mid").is_none());
    }

    #[test]
    fn test_csv_all_rows_apply_everywhere() {
        let table = PricingTable::from_csv(CSV, "ap-southeast-2");
        assert!(table.find("anthropic.claude-v2").is_some());
        assert!(table.find("ai21.j2-ultra").is_none());
    }

    #[test]
    fn test_csv_malformed_rows_skipped() {
        let csv = "\
region,model_id,input_token_price,output_token_price
all,good.model,1.0,2.0
all,missing-price,1.0
all,bad.price,one,2.0
";
        let table = PricingTable::from_csv(csv, "us-east-1");
        assert!(table.find("good.model").is_some());
        assert!(table.find("missing-price").is_none());
        assert!(table.find("bad.price").is_none());
    }

    #[test]
    fn test_find_substring_fallback() {
        let table = table();
        // "anthropic.claude-v2" is a substring of the qualified variant
        let entry = table.find("anthropic.claude-v2:1").unwrap();
        assert_eq!(entry.model_id, "anthropic.claude-v2");
    }

    #[test]
    fn test_find_no_match() {
        assert!(table().find("mistral.mistral-7b-instruct-v0:2").is_none());
    }

    #[test]
    fn test_load_missing_file_gives_empty_table() {
        let table = PricingTable::load(Path::new("/nonexistent/pricing.csv"), "us-east-1");
        assert!(table.is_empty());
    }

    // ── Cost arithmetic ──

    #[test]
    fn test_cost_linear_and_deterministic() {
        let csv = "region,model_id,input_token_price,output_token_price\nall,modelX,1.0,2.0\n";
        let mut meter = CostMeter::new(PricingTable::from_csv(csv, "us-east-1"));

        // 400-byte prompt, 800-byte completion
        meter.record(
            "modelX",
            &UsageBasis::Estimated {
                input_bytes: 400,
                output_bytes: 800,
            },
            "a prompt",
        );

        let record = meter.recent().next().unwrap();
        assert_eq!(record.input_tokens, 101);
        assert_eq!(record.output_tokens, 201);
        assert!((record.cost - 0.000503).abs() < 1e-8);
        assert!((meter.total() - 0.000503).abs() < 1e-8);
    }

    #[test]
    fn test_reported_usage_is_used_verbatim() {
        let csv = "region,model_id,input_token_price,output_token_price\nall,modelX,1.0,2.0\n";
        let mut meter = CostMeter::new(PricingTable::from_csv(csv, "us-east-1"));

        meter.record(
            "modelX",
            &UsageBasis::Reported(modelmux_core::types::UsageInfo {
                input_tokens: 10,
                output_tokens: 20,
            }),
            "a prompt",
        );

        let record = meter.recent().next().unwrap();
        assert_eq!(record.input_tokens, 10);
        assert_eq!(record.output_tokens, 20);
        assert!((record.cost - (10.0 * 0.001 + 20.0 * 0.002)).abs() < 1e-8);
    }

    #[test]
    fn test_unpriced_model_not_recorded() {
        let mut meter = CostMeter::new(table());
        meter.record(
            "mystery.model",
            &UsageBasis::Estimated {
                input_bytes: 100,
                output_bytes: 100,
            },
            "a prompt",
        );
        assert_eq!(meter.recent().count(), 0);
        assert_eq!(meter.total(), 0.0);
        assert_eq!(meter.report(), "");
    }

    #[test]
    fn test_not_metered_is_skipped() {
        let mut meter = CostMeter::new(table());
        meter.record("anthropic.claude-v2", &UsageBasis::NotMetered, "a prompt");
        assert_eq!(meter.recent().count(), 0);
    }

    // ── Ring buffer ──

    #[test]
    fn test_ring_buffer_evicts_oldest_first() {
        let mut meter = CostMeter::new(table());
        for i in 0..7 {
            meter.record_tokens("anthropic.claude-v2", 100 + i, 10, true);
        }

        let inputs: Vec<u64> = meter.recent().map(|r| r.input_tokens).collect();
        // Capacity 5, the two oldest (100, 101) evicted
        assert_eq!(inputs, vec![102, 103, 104, 105, 106]);
    }

    #[test]
    fn test_running_total_survives_eviction() {
        let mut meter = CostMeter::new(table());
        for _ in 0..7 {
            meter.record_tokens("anthropic.claude-v2", 1000, 1000, true);
        }
        let per_call = 1000.0 * 0.008 / 1000.0 + 1000.0 * 0.024 / 1000.0;
        assert!((meter.total() - 7.0 * per_call).abs() < 1e-8);
    }

    // ── Auto-generated marker ──

    #[test]
    fn test_auto_generated_prompt_detection() {
        let mut meter = CostMeter::new(table());
        meter.record(
            "anthropic.claude-v2",
            &UsageBasis::Estimated {
                input_bytes: 10,
                output_bytes: 10,
            },
            "Generate three prompts about cats",
        );
        meter.record(
            "anthropic.claude-v2",
            &UsageBasis::Estimated {
                input_bytes: 10,
                output_bytes: 10,
            },
            "tell me about cats",
        );

        let flags: Vec<bool> = meter.recent().map(|r| r.user_generated).collect();
        assert_eq!(flags, vec![false, true]);
    }

    // ── Report ──

    #[test]
    fn test_report_empty_before_any_cost() {
        let meter = CostMeter::new(table());
        assert_eq!(meter.report(), "");
    }

    #[test]
    fn test_report_contains_total_and_entries() {
        let mut meter = CostMeter::new(table());
        meter.record_tokens("anthropic.claude-v2", 100, 50, true);

        let report = meter.report();
        assert!(report.starts_with("Estimated cost of recent runs: $"));
        assert!(report.contains("model: anthropic.claude-v2"));
        assert!(report.contains("input tokens: 100"));
        assert!(report.contains("user-generated-prompt: true"));
    }

    #[test]
    fn test_report_is_reverse_chronological() {
        let mut meter = CostMeter::new(table());
        meter.record_tokens("amazon.titan-text-lite-v1", 1, 1, true);
        meter.record_tokens("anthropic.claude-v2", 1, 1, true);

        let report = meter.report();
        let claude_pos = report.find("anthropic.claude-v2").unwrap();
        let titan_pos = report.find("amazon.titan-text-lite-v1").unwrap();
        // Most recent first
        assert!(claude_pos < titan_pos);
    }
}
