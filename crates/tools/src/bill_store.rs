//! In-memory store of scraped bill records.
//!
//! Loaded once from the JSON array the ingestion pipeline writes and never
//! mutated afterwards, so it is shared between tools and concurrent queries
//! behind a plain `Arc` with no locking.

use std::path::{Path, PathBuf};

use billwise_core::bill::BillRecord;

/// A bill with its relevance score for a search.
#[derive(Debug, Clone)]
pub struct ScoredBill<'a> {
    pub bill: &'a BillRecord,
    pub score: f32,
}

/// Structured filter for [`BillStore::query`]. Unset fields match everything.
#[derive(Debug, Clone, Default)]
pub struct BillFilter {
    /// Case-insensitive substring of the sponsor or any cosponsor
    pub sponsor: Option<String>,
    pub year: Option<u16>,
    pub session_code: Option<String>,
    /// Case-insensitive substring of the last action
    pub status: Option<String>,
    pub has_hearing: Option<bool>,
}

impl BillFilter {
    pub fn is_empty(&self) -> bool {
        self.sponsor.is_none()
            && self.year.is_none()
            && self.session_code.is_none()
            && self.status.is_none()
            && self.has_hearing.is_none()
    }

    fn matches(&self, bill: &BillRecord) -> bool {
        if let Some(sponsor) = &self.sponsor {
            let needle = sponsor.to_lowercase();
            let hit = bill.sponsor.to_lowercase().contains(&needle)
                || bill
                    .cosponsor_names()
                    .iter()
                    .any(|n| n.to_lowercase().contains(&needle));
            if !hit {
                return false;
            }
        }
        if self.year.is_some_and(|y| y != bill.year) {
            return false;
        }
        if let Some(code) = &self.session_code {
            if !bill.session_code.eq_ignore_ascii_case(code) {
                return false;
            }
        }
        if let Some(status) = &self.status {
            if !bill.last_action.to_lowercase().contains(&status.to_lowercase()) {
                return false;
            }
        }
        if let Some(wanted) = self.has_hearing {
            let has = !bill.hearings.trim().is_empty() || !bill.hearing_status.trim().is_empty();
            if has != wanted {
                return false;
            }
        }
        true
    }
}

#[derive(Debug, thiserror::Error)]
pub enum BillStoreError {
    #[error("Failed to read bill data at {path}: {reason}")]
    Read { path: PathBuf, reason: String },

    #[error("Failed to parse bill data at {path}: {reason}")]
    Parse { path: PathBuf, reason: String },
}

#[derive(Debug, Default)]
pub struct BillStore {
    bills: Vec<BillRecord>,
}

impl BillStore {
    pub fn new(bills: Vec<BillRecord>) -> Self {
        Self { bills }
    }

    pub fn empty() -> Self {
        Self::default()
    }

    /// Load a JSON array of bill records.
    pub fn load(path: &Path) -> Result<Self, BillStoreError> {
        let content = std::fs::read_to_string(path).map_err(|e| BillStoreError::Read {
            path: path.to_path_buf(),
            reason: e.to_string(),
        })?;

        let bills: Vec<BillRecord> =
            serde_json::from_str(&content).map_err(|e| BillStoreError::Parse {
                path: path.to_path_buf(),
                reason: e.to_string(),
            })?;

        tracing::info!(count = bills.len(), path = %path.display(), "Loaded bill data");
        Ok(Self::new(bills))
    }

    pub fn bills(&self) -> &[BillRecord] {
        &self.bills
    }

    pub fn len(&self) -> usize {
        self.bills.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bills.is_empty()
    }

    /// Look up a bill by number, ignoring case and whitespace.
    pub fn find(&self, bill_number: &str) -> Option<&BillRecord> {
        let wanted = BillRecord::normalize_number(bill_number);
        self.bills.iter().find(|b| b.normalized_number() == wanted)
    }

    /// Rank bills by how often the topic's terms appear in their text.
    ///
    /// Title hits count double. A term that only appears once spaces are
    /// removed ("healthcare" in "health care") counts once.
    pub fn search(&self, topic: &str, year: Option<u16>, limit: usize) -> Vec<ScoredBill<'_>> {
        let terms = tokenize(topic);
        if terms.is_empty() {
            return Vec::new();
        }

        let mut scored: Vec<ScoredBill<'_>> = self
            .bills
            .iter()
            .filter(|b| year.is_none_or(|y| b.year == y))
            .filter_map(|bill| {
                let title = bill.title.to_lowercase();
                let body = format!("{} {}", bill.description, bill.bill_string).to_lowercase();
                let compact: String = bill
                    .searchable_text()
                    .to_lowercase()
                    .chars()
                    .filter(|c| !c.is_whitespace())
                    .collect();

                let score: f32 = terms
                    .iter()
                    .map(|term| {
                        let hits = 2 * title.matches(term.as_str()).count()
                            + body.matches(term.as_str()).count();
                        if hits == 0 && compact.contains(term.as_str()) {
                            1.0
                        } else {
                            hits as f32
                        }
                    })
                    .sum();

                (score > 0.0).then_some(ScoredBill { bill, score })
            })
            .collect();

        scored.sort_by(|a, b| {
            b.score
                .partial_cmp(&a.score)
                .unwrap_or(std::cmp::Ordering::Equal)
                .then_with(|| a.bill.bill_number.cmp(&b.bill.bill_number))
        });
        scored.truncate(limit);
        scored
    }

    /// All bills matching `filter`, in store order, at most `limit`.
    pub fn query(&self, filter: &BillFilter, limit: usize) -> Vec<&BillRecord> {
        self.bills
            .iter()
            .filter(|b| filter.matches(b))
            .take(limit)
            .collect()
    }
}

const STOPWORDS: &[&str] = &[
    "the", "and", "for", "about", "with", "that", "this", "from", "bill", "bills", "are", "what",
    "which", "relating",
];

/// Lowercase alphanumeric terms of at least three characters, minus stopwords.
fn tokenize(text: &str) -> Vec<String> {
    let mut terms: Vec<String> = text
        .to_lowercase()
        .split(|c: char| !c.is_alphanumeric())
        .filter(|t| t.len() >= 3 && !STOPWORDS.contains(t))
        .map(String::from)
        .collect();
    terms.sort();
    terms.dedup();
    terms
}

/// One-line summary used by several tools.
pub(crate) fn summary_line(bill: &BillRecord) -> String {
    let mut line = bill.bill_number.clone();
    let title = if bill.title.is_empty() { &bill.description } else { &bill.title };
    if !title.is_empty() {
        line.push_str(&format!(" - {title}"));
    }
    if !bill.sponsor.is_empty() {
        line.push_str(&format!(" (sponsor: {})", bill.sponsor));
    }
    if !bill.last_action.is_empty() {
        line.push_str(&format!(" [last action: {}]", bill.last_action));
    }
    line
}

#[cfg(test)]
pub(crate) mod fixtures {
    use super::*;

    pub fn sample_store() -> BillStore {
        BillStore::new(vec![
            BillRecord {
                bill_number: "HB1366".into(),
                title: "Modifies provisions relating to health care".into(),
                description: "Expands health care coverage for rural hospitals".into(),
                sponsor: "Smith, John".into(),
                cosponsors: "Doe, Jane; Brown, Lee".into(),
                last_action: "Referred: Health and Mental Health Policy (H)".into(),
                hearings: "Health and Mental Health Policy | 2/3/2026 | 12:00 PM | HR 6".into(),
                actions: "1/8/2026 | Introduced and Read First Time (H) || 1/9/2026 | Read Second Time (H)".into(),
                bill_documents: "Introduced | https://house.mo.gov/hb1366i.pdf".into(),
                year: 2026,
                session_code: "R".into(),
                ..BillRecord::default()
            },
            BillRecord {
                bill_number: "HB1402".into(),
                title: "Establishes the Healthcare Workforce Act".into(),
                description: "Creates grants for nursing programs".into(),
                sponsor: "Doe, Jane".into(),
                last_action: "Passed (H)".into(),
                year: 2026,
                session_code: "R".into(),
                ..BillRecord::default()
            },
            BillRecord {
                bill_number: "HB77".into(),
                title: "Modifies income tax deductions".into(),
                description: "Changes deductions for health savings accounts".into(),
                sponsor: "Brown, Lee".into(),
                last_action: "Signed by Governor".into(),
                year: 2025,
                session_code: "R".into(),
                ..BillRecord::default()
            },
            BillRecord {
                bill_number: "HB2".into(),
                title: "Appropriations for elementary education".into(),
                sponsor: "Smith, John".into(),
                last_action: "Passed (H)".into(),
                year: 2026,
                session_code: "E".into(),
                ..BillRecord::default()
            },
        ])
    }
}
