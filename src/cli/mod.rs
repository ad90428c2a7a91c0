//! Terminal front end
//!
//! Colored status output and the stdin-backed prompt adapter.

pub mod display;
pub mod terminal;

pub use display::{print_error, print_hint, print_ok, render_diagnostic_report};
pub use terminal::TerminalPrompts;
