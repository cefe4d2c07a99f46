//! Identity resolution from free-form user input
//!
//! Two phases: a syntactic guess of the id, then confirmation against the
//! live API (fetch the document, build the source, validate it). Nothing is
//! persisted here; a failed guess leaves no trace.

use crate::{Adapter, SourceError, TrackedSource};
use serde_json::Value;
use std::sync::Arc;

/// URL path segment that precedes a document item id
const ITEM_PATH: &str = "documents/items/";

/// Extract a document item id from user input
///
/// Tries, in order: an id following `documents/items/` anywhere in the
/// input (ending at the next `/`, `?` or `#`), then the whole trimmed input
/// if it contains no `/`.
///
/// # Examples
///
/// ```
/// use docharvest_source::extract_identifier;
///
/// assert_eq!(
///     extract_identifier("https://paperhive.org/documents/items/abc123?a=1"),
///     Some("abc123")
/// );
/// assert_eq!(extract_identifier("abc123"), Some("abc123"));
/// assert_eq!(extract_identifier("https://example.org/other/path"), None);
/// ```
pub fn extract_identifier(input: &str) -> Option<&str> {
    let input = input.trim();

    if let Some(pos) = input.find(ITEM_PATH) {
        let rest = &input[pos + ITEM_PATH.len()..];
        let id = rest.split(['/', '?', '#']).next().unwrap_or_default();
        if !id.is_empty() {
            return Some(id);
        }
    }

    if !input.is_empty() && !input.contains('/') {
        return Some(input);
    }

    None
}

/// Resolve arbitrary JSON input into a validated tracked source
///
/// # Errors
///
/// - [`SourceError::InvalidInput`] if the input is not a string (no request is made)
/// - everything [`guess_str`] returns
pub async fn guess(adapter: &Arc<Adapter>, input: &Value) -> Result<TrackedSource, SourceError> {
    let Some(text) = input.as_str() else {
        return Err(SourceError::InvalidInput(json_type_name(input).to_string()));
    };
    guess_str(adapter, text).await
}

/// Resolve a string into a validated tracked source
///
/// # Errors
///
/// - [`SourceError::Unresolvable`] if no id can be extracted
/// - [`SourceError::Fetch`] if the document cannot be fetched
/// - [`SourceError::Validation`] if its discussions cannot be read
pub async fn guess_str(adapter: &Arc<Adapter>, input: &str) -> Result<TrackedSource, SourceError> {
    let item_id = extract_identifier(input).ok_or_else(|| SourceError::Unresolvable {
        input: input.to_string(),
    })?;

    let document = adapter.client().fetch_document_item(item_id).await?;
    let source = TrackedSource::from_document(Arc::clone(adapter), &document)?;
    source.validate().await?;

    tracing::info!(
        source_id = %source.id(),
        document_id = %source.identifier().document_id,
        title = %source.decoration().title,
        "Resolved new source"
    );

    Ok(source)
}

fn json_type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}
