//! Helpers for the values users type.
//!
//! - [`duration`]: Parsing and formatting of duration strings (e.g., "15s", "500ms")

pub mod duration;
