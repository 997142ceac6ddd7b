//! Output formatters for packaging runs and size reports.
//!
//! - [`text`]: human-readable, colored with yansi
//! - [`json`]: machine-readable JSON for scripting

pub mod json;
pub mod text;

pub use json::{JsonPackOutput, JsonReportOutput};
pub use text::TextOutput;
