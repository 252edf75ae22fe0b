//! Full record of a single bill.

use std::fmt::Write as _;
use std::sync::Arc;

use async_trait::async_trait;
use billwise_core::bill::BillRecord;
use billwise_core::error::ToolError;
use billwise_core::tool::Tool;

use crate::bill_store::BillStore;

pub struct BillDetailsTool {
    store: Arc<BillStore>,
}

impl BillDetailsTool {
    pub fn new(store: Arc<BillStore>) -> Self {
        Self { store }
    }
}

#[async_trait]
impl Tool for BillDetailsTool {
    fn name(&self) -> &str {
        "get_bill_details"
    }

    fn description(&self) -> &str {
        "Get the full details of one bill by its number (e.g. \"HB1366\"): sponsor, cosponsors, status, action history, hearings and documents."
    }

    fn parameters_schema(&self) -> serde_json::Value {
        serde_json::json!({
            "type": "object",
            "properties": {
                "bill_number": {
                    "type": "string",
                    "description": "The bill number, e.g. \"HB1366\""
                }
            },
            "required": ["bill_number"]
        })
    }

    async fn execute(&self, arguments: serde_json::Value) -> Result<String, ToolError> {
        let number = arguments["bill_number"]
            .as_str()
            .map(str::trim)
            .filter(|n| !n.is_empty())
            .ok_or_else(|| ToolError::InvalidArguments("Missing 'bill_number' argument".into()))?;

        let bill = self
            .store
            .find(number)
            .ok_or_else(|| ToolError::ExecutionFailed {
                tool_name: self.name().into(),
                reason: format!("no bill numbered '{number}'"),
            })?;

        Ok(render(bill))
    }
}

fn field(out: &mut String, label: &str, value: &str) {
    if !value.trim().is_empty() {
        let _ = writeln!(out, "{label}: {value}");
    }
}

fn render(bill: &BillRecord) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "{} ({} session {})", bill.bill_number, bill.year, bill.session_code);
    field(&mut out, "Title", &bill.title);
    field(&mut out, "Description", &bill.description);
    field(&mut out, "Bill string", &bill.bill_string);
    field(&mut out, "Sponsor", &bill.sponsor);

    let cosponsors = bill.cosponsor_names();
    if !cosponsors.is_empty() {
        let _ = writeln!(out, "Cosponsors: {}", cosponsors.join(", "));
    }

    field(&mut out, "LR number", &bill.lr_number);
    field(&mut out, "Last action", &bill.last_action);
    field(&mut out, "Proposed effective date", &bill.proposed_effective_date);
    field(&mut out, "Hearing status", &bill.hearing_status);
    field(&mut out, "Calendar status", &bill.calendar_status);
    field(&mut out, "URL", &bill.bill_url);

    let actions = bill.actions();
    if !actions.is_empty() {
        out.push_str("Actions:\n");
        for action in actions {
            let _ = writeln!(out, "  {} {}", action.date, action.description);
        }
    }

    let hearings = bill.hearings();
    if !hearings.is_empty() {
        out.push_str("Hearings:\n");
        for h in hearings {
            let _ = writeln!(out, "  {} on {} {} at {}", h.committee, h.date, h.time, h.location);
        }
    }

    let documents = bill.documents();
    if !documents.is_empty() {
        out.push_str("Documents:\n");
        for doc in documents {
            let _ = writeln!(out, "  {}: {}", doc.doc_type, doc.url);
        }
    }

    out
}
