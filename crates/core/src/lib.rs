//! # billwise core
//!
//! Domain types, traits, and error definitions for the billwise legislative
//! question-answering agent. This crate has **no runtime dependencies** beyond
//! serde and friends: it defines the model every other crate builds against.
//!
//! ## Design Philosophy
//!
//! The two external collaborators of the agent loop (the reasoning backend
//! and the lookup tools) are traits here. Implementations live in their
//! respective crates, which lets tests swap in scripted stand-ins.

pub mod bill;
pub mod error;
pub mod message;
pub mod reasoner;
pub mod tool;

// Re-export key types at crate root for ergonomics
pub use bill::{BillAction, BillDocument, BillHearing, BillRecord};
pub use error::{Error, ReasoningError, Result, ToolError};
pub use message::{Message, MessageKind, Role, ToolCallRequest, Transcript};
pub use reasoner::{Reasoner, ToolDefinition};
pub use tool::{Tool, ToolRegistry, ToolResult};
