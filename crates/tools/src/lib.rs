//! Bill lookup tools for billwise.
//!
//! Every tool reads from one shared, read-only [`BillStore`] loaded from the
//! ingestion pipeline's output. Results are plain text meant for the
//! reasoner to read, not for display.

pub mod bill_details;
pub mod bill_store;
pub mod legislator_info;
pub mod query_bills;
pub mod search_bills;

use std::sync::Arc;

use billwise_core::tool::ToolRegistry;

pub use bill_store::{BillFilter, BillStore, BillStoreError};

/// Create the registry of all bill lookup tools over `store`.
pub fn default_registry(store: Arc<BillStore>) -> ToolRegistry {
    let mut registry = ToolRegistry::new();
    registry.register(Arc::new(search_bills::SearchBillsTool::new(store.clone())));
    registry.register(Arc::new(query_bills::QueryBillsTool::new(store.clone())));
    registry.register(Arc::new(bill_details::BillDetailsTool::new(store.clone())));
    registry.register(Arc::new(legislator_info::LegislatorInfoTool::new(store)));
    registry
}

/// Read an optional non-negative integer argument.
pub(crate) fn optional_u64(
    arguments: &serde_json::Value,
    key: &str,
) -> Result<Option<u64>, billwise_core::ToolError> {
    match &arguments[key] {
        serde_json::Value::Null => Ok(None),
        value => value.as_u64().map(Some).ok_or_else(|| {
            billwise_core::ToolError::InvalidArguments(format!(
                "'{key}' must be a non-negative integer"
            ))
        }),
    }
}

/// Read an optional legislative year argument.
pub(crate) fn optional_year(
    arguments: &serde_json::Value,
) -> Result<Option<u16>, billwise_core::ToolError> {
    optional_u64(arguments, "year")?
        .map(|y| {
            u16::try_from(y).map_err(|_| {
                billwise_core::ToolError::InvalidArguments(format!("'year' out of range: {y}"))
            })
        })
        .transpose()
}
