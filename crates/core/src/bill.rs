//! Bill records as produced by the ingestion pipeline.
//!
//! The scraper emits one flat row per bill. Multi-valued columns keep the
//! scraper's string encodings (`" || "` between entries, `" | "` between
//! fields of an entry, `"; "` between cosponsor names); the accessors below
//! decode them on demand.

use serde::{Deserialize, Serialize};

const ENTRY_SEPARATOR: &str = " || ";
const FIELD_SEPARATOR: &str = " | ";
const NAME_SEPARATOR: char = ';';

/// One bill as scraped from the legislature's website.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BillRecord {
    /// e.g. "HB1366"
    pub bill_number: String,
    pub bill_url: String,
    pub title: String,
    pub description: String,
    pub sponsor: String,
    pub sponsor_url: String,
    pub lr_number: String,
    pub last_action: String,
    pub last_action_date: String,
    pub proposed_effective_date: String,
    pub bill_string: String,
    pub calendar_status: String,
    pub hearing_status: String,
    /// `"type | url || type | url"`
    pub bill_documents: String,
    /// `"Name; Name"`
    pub cosponsors: String,
    /// `"date | description || ..."`
    pub actions: String,
    /// `"committee | date | time | location || ..."`
    pub hearings: String,
    /// Legislative year; 0 when the scrape did not record it.
    pub year: u16,
    /// "R" (regular) or "E" (extraordinary).
    pub session_code: String,
}

/// A dated entry in a bill's action history.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BillAction {
    pub date: String,
    pub description: String,
}

/// A scheduled committee hearing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BillHearing {
    pub committee: String,
    pub date: String,
    pub time: String,
    pub location: String,
}

/// A published bill text or summary.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BillDocument {
    pub doc_type: String,
    pub url: String,
}

fn entries(raw: &str) -> impl Iterator<Item = Vec<&str>> {
    raw.split(ENTRY_SEPARATOR)
        .map(str::trim)
        .filter(|e| !e.is_empty())
        .map(|e| e.split(FIELD_SEPARATOR).map(str::trim).collect())
}

impl BillRecord {
    /// Bill number with whitespace removed and upper-cased ("hb 1366" → "HB1366").
    pub fn normalize_number(number: &str) -> String {
        number
            .chars()
            .filter(|c| !c.is_whitespace())
            .flat_map(char::to_uppercase)
            .collect()
    }

    pub fn normalized_number(&self) -> String {
        Self::normalize_number(&self.bill_number)
    }

    pub fn cosponsor_names(&self) -> Vec<&str> {
        self.cosponsors
            .split(NAME_SEPARATOR)
            .map(str::trim)
            .filter(|n| !n.is_empty())
            .collect()
    }

    pub fn actions(&self) -> Vec<BillAction> {
        entries(&self.actions)
            .filter_map(|fields| match fields.as_slice() {
                [date, description, ..] => Some(BillAction {
                    date: date.to_string(),
                    description: description.to_string(),
                }),
                _ => None,
            })
            .collect()
    }

    pub fn hearings(&self) -> Vec<BillHearing> {
        entries(&self.hearings)
            .filter_map(|fields| {
                let committee = fields.first().filter(|c| !c.is_empty())?;
                Some(BillHearing {
                    committee: committee.to_string(),
                    date: fields.get(1).copied().unwrap_or_default().to_string(),
                    time: fields.get(2).copied().unwrap_or_default().to_string(),
                    location: fields.get(3).copied().unwrap_or_default().to_string(),
                })
            })
            .collect()
    }

    /// Documents; entries that are not exactly `type | url` are skipped.
    pub fn documents(&self) -> Vec<BillDocument> {
        entries(&self.bill_documents)
            .filter_map(|fields| match fields.as_slice() {
                [doc_type, url] if !doc_type.is_empty() && !url.is_empty() => Some(BillDocument {
                    doc_type: doc_type.to_string(),
                    url: url.to_string(),
                }),
                _ => None,
            })
            .collect()
    }

    /// The text searched by relevance queries.
    pub fn searchable_text(&self) -> String {
        format!("{} {} {}", self.title, self.description, self.bill_string)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> BillRecord {
        BillRecord {
            bill_number: "HB1366".into(),
            title: "Modifies provisions relating to health care".into(),
            cosponsors: "Smith; Jones ;  ; Doe".into(),
            actions: "1/8/2026 | Introduced and Read First Time (H) || 1/9/2026 | Read Second Time (H)".into(),
            hearings: "Health and Mental Health Policy | 2/3/2026 | 12:00 PM | House Hearing Room 6".into(),
            bill_documents: "Introduced | https://house.mo.gov/hb1366i.pdf || broken entry || Summary | https://house.mo.gov/hb1366s.pdf".into(),
            year: 2026,
            session_code: "R".into(),
            ..BillRecord::default()
        }
    }

    #[test]
    fn decodes_cosponsors() {
        assert_eq!(sample().cosponsor_names(), vec!["Smith", "Jones", "Doe"]);
    }

    #[test]
    fn decodes_actions() {
        let actions = sample().actions();
        assert_eq!(actions.len(), 2);
        assert_eq!(actions[0].date, "1/8/2026");
        assert_eq!(actions[1].description, "Read Second Time (H)");
    }

    #[test]
    fn decodes_hearings() {
        let hearings = sample().hearings();
        assert_eq!(hearings.len(), 1);
        assert_eq!(hearings[0].committee, "Health and Mental Health Policy");
        assert_eq!(hearings[0].location, "House Hearing Room 6");
    }

    #[test]
    fn skips_malformed_documents() {
        let docs = sample().documents();
        assert_eq!(docs.len(), 2);
        assert_eq!(docs[1].doc_type, "Summary");
    }

    #[test]
    fn empty_fields_decode_to_nothing() {
        let bill = BillRecord::default();
        assert!(bill.actions().is_empty());
        assert!(bill.hearings().is_empty());
        assert!(bill.documents().is_empty());
        assert!(bill.cosponsor_names().is_empty());
    }

    #[test]
    fn normalizes_bill_numbers() {
        assert_eq!(BillRecord::normalize_number("hb 1366"), "HB1366");
        assert_eq!(sample().normalized_number(), "HB1366");
    }

    #[test]
    fn partial_rows_deserialize() {
        let bill: BillRecord =
            serde_json::from_str(r#"{"bill_number": "SB5", "sponsor": "Doe"}"#).unwrap();
        assert_eq!(bill.bill_number, "SB5");
        assert_eq!(bill.year, 0);
    }
}
