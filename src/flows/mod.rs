//! Declarative menu flows
//!
//! Definition types, the validator, the runner and the prompt contract,
//! plus the built-in flows with their handler registries.

pub mod definition;
pub mod handlers;
pub mod prompt;
pub mod runner;
pub mod types;
pub mod validate;

pub use definition::FlowCatalog;
pub use prompt::{PromptAdapter, RawResponse};
pub use runner::{run_flow, FlowError};
pub use types::{FlowDefinition, FlowHandlers, FlowRunResult, StateDefinition, Terminal};
pub use validate::{validate, ValidatedFlow, ValidationError};
