//! Plain-text response for a question answered from graph records.
//!
//! A stand-in for a text generator: it echoes the question and attaches the
//! records as JSON.

use crate::property::Record;

/// Render the question and its result rows.
pub fn render_response(question: &str, records: &[Record]) -> serde_json::Result<String> {
    let data = serde_json::to_string(records)?;
    Ok(format!("Question: {}\nGraph Data: {}", question, data))
}
