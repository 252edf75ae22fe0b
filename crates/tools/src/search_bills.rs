//! Topic search over bill titles, descriptions and bill strings.

use std::sync::Arc;

use async_trait::async_trait;
use billwise_core::error::ToolError;
use billwise_core::tool::Tool;

use crate::bill_store::BillStore;

const DEFAULT_LIMIT: u64 = 5;
const MAX_LIMIT: u64 = 20;

pub struct SearchBillsTool {
    store: Arc<BillStore>,
}

impl SearchBillsTool {
    pub fn new(store: Arc<BillStore>) -> Self {
        Self { store }
    }
}

#[derive(serde::Serialize)]
struct SearchHit<'a> {
    bill_number: &'a str,
    title: &'a str,
    description: &'a str,
    sponsor: &'a str,
    last_action: &'a str,
    year: u16,
    score: f32,
}

#[async_trait]
impl Tool for SearchBillsTool {
    fn name(&self) -> &str {
        "search_bills"
    }

    fn description(&self) -> &str {
        "Search Missouri House bills by topic. Returns the most relevant bills with their number, title, sponsor and latest action."
    }

    fn parameters_schema(&self) -> serde_json::Value {
        serde_json::json!({
            "type": "object",
            "properties": {
                "topic": {
                    "type": "string",
                    "description": "Topic or keywords to search for (e.g. \"healthcare\", \"school funding\")"
                },
                "year": {
                    "type": "integer",
                    "description": "Only return bills from this legislative year"
                },
                "limit": {
                    "type": "integer",
                    "description": "Maximum number of bills to return (default 5, max 20)",
                    "default": DEFAULT_LIMIT
                }
            },
            "required": ["topic"]
        })
    }

    async fn execute(&self, arguments: serde_json::Value) -> Result<String, ToolError> {
        let topic = arguments["topic"]
            .as_str()
            .map(str::trim)
            .filter(|t| !t.is_empty())
            .ok_or_else(|| ToolError::InvalidArguments("Missing 'topic' argument".into()))?;

        let year = crate::optional_year(&arguments)?;
        let limit = crate::optional_u64(&arguments, "limit")?
            .unwrap_or(DEFAULT_LIMIT)
            .clamp(1, MAX_LIMIT) as usize;

        let hits = self.store.search(topic, year, limit);
        tracing::debug!(topic, ?year, found = hits.len(), "search_bills");

        if hits.is_empty() {
            return Ok(match year {
                Some(y) => format!("No bills found about '{topic}' in {y}."),
                None => format!("No bills found about '{topic}'."),
            });
        }

        let results: Vec<SearchHit<'_>> = hits
            .iter()
            .map(|h| SearchHit {
                bill_number: &h.bill.bill_number,
                title: &h.bill.title,
                description: &h.bill.description,
                sponsor: &h.bill.sponsor,
                last_action: &h.bill.last_action,
                year: h.bill.year,
                score: h.score,
            })
            .collect();

        serde_json::to_string_pretty(&results).map_err(|e| ToolError::ExecutionFailed {
            tool_name: self.name().into(),
            reason: e.to_string(),
        })
    }
}
