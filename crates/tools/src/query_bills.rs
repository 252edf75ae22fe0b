//! Structured bill filters: sponsor, year, session, status, hearings.

use std::sync::Arc;

use async_trait::async_trait;
use billwise_core::error::ToolError;
use billwise_core::tool::Tool;

use crate::bill_store::{BillFilter, BillStore, summary_line};

const DEFAULT_LIMIT: u64 = 10;
const MAX_LIMIT: u64 = 50;

pub struct QueryBillsTool {
    store: Arc<BillStore>,
}

impl QueryBillsTool {
    pub fn new(store: Arc<BillStore>) -> Self {
        Self { store }
    }
}

fn optional_str(arguments: &serde_json::Value, key: &str) -> Option<String> {
    arguments[key]
        .as_str()
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(String::from)
}

fn parse_filter(arguments: &serde_json::Value) -> Result<BillFilter, ToolError> {
    let has_hearing = match &arguments["has_hearing"] {
        serde_json::Value::Null => None,
        serde_json::Value::Bool(b) => Some(*b),
        _ => {
            return Err(ToolError::InvalidArguments(
                "'has_hearing' must be a boolean".into(),
            ));
        }
    };

    Ok(BillFilter {
        sponsor: optional_str(arguments, "sponsor"),
        year: crate::optional_year(arguments)?,
        session_code: optional_str(arguments, "session_code"),
        status: optional_str(arguments, "status"),
        has_hearing,
    })
}

#[async_trait]
impl Tool for QueryBillsTool {
    fn name(&self) -> &str {
        "query_bills"
    }

    fn description(&self) -> &str {
        "List bills matching structured filters such as sponsor, year, session code, status or whether a hearing is scheduled. At least one filter is required."
    }

    fn parameters_schema(&self) -> serde_json::Value {
        serde_json::json!({
            "type": "object",
            "properties": {
                "sponsor": {
                    "type": "string",
                    "description": "Sponsor or cosponsor name (partial match)"
                },
                "year": {
                    "type": "integer",
                    "description": "Legislative year"
                },
                "session_code": {
                    "type": "string",
                    "description": "Session code, e.g. \"R\" for regular or \"E\" for extraordinary"
                },
                "status": {
                    "type": "string",
                    "description": "Text contained in the bill's last action (e.g. \"Passed\", \"Signed\")"
                },
                "has_hearing": {
                    "type": "boolean",
                    "description": "Only bills with (true) or without (false) a hearing"
                },
                "limit": {
                    "type": "integer",
                    "description": "Maximum number of bills to return (default 10, max 50)",
                    "default": DEFAULT_LIMIT
                }
            }
        })
    }

    async fn execute(&self, arguments: serde_json::Value) -> Result<String, ToolError> {
        let filter = parse_filter(&arguments)?;
        if filter.is_empty() {
            return Err(ToolError::InvalidArguments(
                "Provide at least one of: sponsor, year, session_code, status, has_hearing".into(),
            ));
        }

        let limit = crate::optional_u64(&arguments, "limit")?
            .unwrap_or(DEFAULT_LIMIT)
            .clamp(1, MAX_LIMIT) as usize;

        let bills = self.store.query(&filter, limit);
        tracing::debug!(?filter, found = bills.len(), "query_bills");

        if bills.is_empty() {
            return Ok("No bills match the given filters.".into());
        }

        let mut output = format!("Found {} bill(s):\n", bills.len());
        for bill in bills {
            output.push_str("- ");
            output.push_str(&summary_line(bill));
            output.push('\n');
        }
        Ok(output)
    }
}
