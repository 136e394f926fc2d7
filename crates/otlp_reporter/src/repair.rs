//! Timestamp repair for encoded OTLP/JSON documents.
//!
//! The proto3 JSON mapping writes every 64-bit integer as a quoted string, but
//! OTLP/JSON receivers expect the span and event timestamps as JSON numbers.
//! This pass walks the decoded document along
//!
//! - `resourceSpans[*].scopeSpans[*].spans[*].startTimeUnixNano`
//! - `resourceSpans[*].scopeSpans[*].spans[*].endTimeUnixNano`
//! - `resourceSpans[*].scopeSpans[*].spans[*].events[*].timeUnixNano`
//!
//! and turns string values back into numbers. Everything else is left as the
//! encoder wrote it.

use crate::config::JsonStyle;
use crate::error::ReportError;
use serde_json::Value;

const SPAN_TIMESTAMPS: [&str; 2] = ["startTimeUnixNano", "endTimeUnixNano"];
const EVENT_TIMESTAMP: &str = "timeUnixNano";

/// Rewrites the timestamp fields of an encoded document as numeric literals.
///
/// Missing or empty containers simply match nothing. A timestamp string that
/// is not a base-10 integer fails with [`ReportError::MalformedPayload`], as
/// does input that is not JSON.
pub fn repair_timestamps(json: &str, style: JsonStyle) -> Result<String, ReportError> {
    let mut document: Value =
        serde_json::from_str(json).map_err(|e| ReportError::MalformedPayload {
            path: "$".to_string(),
            reason: e.to_string(),
        })?;

    repair_document(&mut document)?;
    render_document(&document, style)
}

/// Writes a document out in the given layout.
pub fn render_document(document: &Value, style: JsonStyle) -> Result<String, ReportError> {
    let text = match style {
        JsonStyle::Compact => serde_json::to_string(document)?,
        JsonStyle::Pretty => serde_json::to_string_pretty(document)?,
    };
    Ok(text)
}

/// In-place variant of [`repair_timestamps`] for an already decoded document.
pub fn repair_document(document: &mut Value) -> Result<(), ReportError> {
    for (r, resource_spans) in elements(document, "resourceSpans") {
        for (s, scope_spans) in elements(resource_spans, "scopeSpans") {
            for (i, span) in elements(scope_spans, "spans") {
                let span_path = format!("resourceSpans[{r}].scopeSpans[{s}].spans[{i}]");
                for field in SPAN_TIMESTAMPS {
                    restore_number(span, field, &span_path)?;
                }
                for (e, event) in elements(span, "events") {
                    let event_path = format!("{span_path}.events[{e}]");
                    restore_number(event, EVENT_TIMESTAMP, &event_path)?;
                }
            }
        }
    }
    Ok(())
}

/// Indexed elements of the array stored under `key`; empty if absent or not an array.
fn elements<'a>(parent: &'a mut Value, key: &str) -> impl Iterator<Item = (usize, &'a mut Value)> {
    parent
        .get_mut(key)
        .and_then(Value::as_array_mut)
        .into_iter()
        .flatten()
        .enumerate()
}

fn restore_number(object: &mut Value, field: &str, parent_path: &str) -> Result<(), ReportError> {
    let Some(value) = object.get_mut(field) else {
        return Ok(());
    };

    let nanos: u64 = match value {
        Value::String(text) => text.parse().map_err(|e| ReportError::MalformedPayload {
            path: format!("{parent_path}.{field}"),
            reason: format!("{text:?} is not an integer: {e}"),
        })?,
        _ => return Ok(()),
    };

    *value = Value::from(nanos);
    Ok(())
}
