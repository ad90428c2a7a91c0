//! Run history
//!
//! JSONL record of every finished flow run. Diagnostic output goes through
//! `tracing`; this module only keeps the durable history.

pub mod jsonl;

pub use jsonl::{FlowRunRecord, RunLog};
