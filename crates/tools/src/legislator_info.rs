//! Legislator lookup by fuzzy name match.
//!
//! Names are compared with trigram similarity: each word is lower-cased,
//! padded with two leading spaces and one trailing space, and cut into
//! three-character windows. The similarity of two names is the size of the
//! intersection of their trigram sets over the size of the union. A query
//! is scored against the full name and against each word of it, and the
//! best score wins, so "Smith" finds "Smith, John".

use std::collections::{BTreeMap, HashSet};
use std::sync::Arc;

use async_trait::async_trait;
use billwise_core::error::ToolError;
use billwise_core::tool::Tool;

use crate::bill_store::BillStore;

/// Minimum similarity for a name to count as a match.
pub const SIMILARITY_THRESHOLD: f32 = 0.3;

const MAX_MATCHES: usize = 5;

pub struct LegislatorInfoTool {
    store: Arc<BillStore>,
}

impl LegislatorInfoTool {
    pub fn new(store: Arc<BillStore>) -> Self {
        Self { store }
    }
}

#[derive(Debug, Default, serde::Serialize)]
struct LegislatorMatch {
    name: String,
    similarity: f32,
    sponsored_count: usize,
    cosponsored_count: usize,
    sponsored_bills: Vec<String>,
    cosponsored_bills: Vec<String>,
}

fn trigrams(text: &str) -> HashSet<String> {
    let mut set = HashSet::new();
    for word in text
        .to_lowercase()
        .split(|c: char| !c.is_alphanumeric())
        .filter(|w| !w.is_empty())
    {
        let padded: Vec<char> = format!("  {word} ").chars().collect();
        for window in padded.windows(3) {
            set.insert(window.iter().collect());
        }
    }
    set
}

/// Trigram similarity in `0.0..=1.0`.
pub fn similarity(a: &str, b: &str) -> f32 {
    let left = trigrams(a);
    let right = trigrams(b);
    if left.is_empty() || right.is_empty() {
        return 0.0;
    }
    let shared = left.intersection(&right).count();
    let total = left.union(&right).count();
    shared as f32 / total as f32
}

fn name_score(query: &str, name: &str) -> f32 {
    name.split(|c: char| !c.is_alphanumeric())
        .filter(|w| !w.is_empty())
        .map(|word| similarity(query, word))
        .fold(similarity(query, name), f32::max)
}

impl LegislatorInfoTool {
    fn lookup(&self, query: &str) -> Vec<LegislatorMatch> {
        // Keyed by name so output order is stable among equal scores.
        let mut by_name: BTreeMap<String, LegislatorMatch> = BTreeMap::new();

        for bill in self.store.bills() {
            let sponsor = bill.sponsor.trim();
            if !sponsor.is_empty() {
                let entry = by_name.entry(sponsor.to_string()).or_default();
                entry.sponsored_bills.push(bill.bill_number.clone());
            }
            for cosponsor in bill.cosponsor_names() {
                let entry = by_name.entry(cosponsor.to_string()).or_default();
                entry.cosponsored_bills.push(bill.bill_number.clone());
            }
        }

        let mut matches: Vec<LegislatorMatch> = by_name
            .into_iter()
            .filter_map(|(name, mut m)| {
                let score = name_score(query, &name);
                if score < SIMILARITY_THRESHOLD {
                    return None;
                }
                m.similarity = (score * 100.0).round() / 100.0;
                m.sponsored_count = m.sponsored_bills.len();
                m.cosponsored_count = m.cosponsored_bills.len();
                m.name = name;
                Some(m)
            })
            .collect();

        matches.sort_by(|a, b| {
            b.similarity
                .partial_cmp(&a.similarity)
                .unwrap_or(std::cmp::Ordering::Equal)
        });
        matches.truncate(MAX_MATCHES);
        matches
    }
}

#[async_trait]
impl Tool for LegislatorInfoTool {
    fn name(&self) -> &str {
        "get_legislator_info"
    }

    fn description(&self) -> &str {
        "Look up a legislator by name (fuzzy match). Returns matching legislators with the bills they sponsored and cosponsored."
    }

    fn parameters_schema(&self) -> serde_json::Value {
        serde_json::json!({
            "type": "object",
            "properties": {
                "name": {
                    "type": "string",
                    "description": "Full or partial legislator name"
                }
            },
            "required": ["name"]
        })
    }

    async fn execute(&self, arguments: serde_json::Value) -> Result<String, ToolError> {
        let name = arguments["name"]
            .as_str()
            .map(str::trim)
            .filter(|n| !n.is_empty())
            .ok_or_else(|| ToolError::InvalidArguments("Missing 'name' argument".into()))?;

        let matches = self.lookup(name);
        tracing::debug!(name, found = matches.len(), "get_legislator_info");

        if matches.is_empty() {
            return Ok(format!("No legislators found matching '{name}'."));
        }

        serde_json::to_string_pretty(&matches).map_err(|e| ToolError::ExecutionFailed {
            tool_name: self.name().into(),
            reason: e.to_string(),
        })
    }
}
