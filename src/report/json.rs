//! JSON output for growth and count reports.
//!
//! Serializes reports for scripting and piping; labels keep chart order.

use serde::Serialize;

use crate::error::Result;

pub fn render<T: Serialize>(report: &T) -> Result<String> {
    Ok(serde_json::to_string_pretty(report)?)
}
