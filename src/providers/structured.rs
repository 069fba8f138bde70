/*!
 * Structured-output parsing shared by every provider.
 *
 * Models that honour a JSON schema answer with a bare object; others wrap it
 * in a code fence or surround it with prose. The object is extracted, parsed
 * and checked against the batch schema.
 */

use std::collections::HashMap;

use serde_json::Value;

use crate::errors::ProviderError;
use crate::translation::planner::BatchSchema;

/// Parse a model answer into a key → translation map
pub fn parse_batch_response(text: &str, schema: &BatchSchema) -> Result<HashMap<String, String>, ProviderError> {
    let json = extract_json_object(text)
        .ok_or_else(|| ProviderError::ParseError(format!("no JSON object in response: {}", preview(text))))?;
    let value: Value = serde_json::from_str(json)
        .map_err(|e| ProviderError::ParseError(format!("{} in response: {}", e, preview(text))))?;
    schema.validate(&value)
}

/// Locate the outermost JSON object in a model answer
fn extract_json_object(text: &str) -> Option<&str> {
    let trimmed = strip_code_fence(text.trim());
    let start = trimmed.find('{')?;
    let end = trimmed.rfind('}')?;
    (end > start).then(|| &trimmed[start..=end])
}

fn strip_code_fence(text: &str) -> &str {
    let Some(body) = text.strip_prefix("```") else {
        return text;
    };
    // Drop the info string (```json) and the closing fence
    let body = body.split_once('\n').map(|(_, rest)| rest).unwrap_or(body);
    body.trim_end().strip_suffix("```").unwrap_or(body)
}

fn preview(text: &str) -> String {
    const LIMIT: usize = 200;
    if text.chars().count() > LIMIT {
        format!("{}...", text.chars().take(LIMIT).collect::<String>())
    } else {
        text.to_string()
    }
}
