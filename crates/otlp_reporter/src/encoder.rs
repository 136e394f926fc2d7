//! Trace tree to wire text.

use crate::encoding::Encoding;
use crate::error::ReportError;
use crate::trace::TracesData;
use serde_json::Value;

/// Serializes `traces` in the requested wire encoding.
///
/// JSON output follows the canonical proto3 mapping (see [`crate::trace`]),
/// so the span and event timestamps come out as quoted strings; run the result
/// through [`repair_timestamps`](crate::repair_timestamps) before sending it.
///
/// Any other encoding fails with [`ReportError::UnsupportedEncoding`] without
/// touching the tree.
pub fn encode(traces: &TracesData, encoding: Encoding) -> Result<String, ReportError> {
    Ok(serde_json::to_string(&encode_document(traces, encoding)?)?)
}

/// Same as [`encode`], but stops at the decoded JSON tree.
///
/// Feed the result to [`repair_document`](crate::repair_document) to repair
/// timestamps without re-parsing text, which keeps arbitrarily deep attribute
/// values out of the parser's nesting limit.
pub fn encode_document(traces: &TracesData, encoding: Encoding) -> Result<Value, ReportError> {
    if encoding.is_binary() {
        return Err(ReportError::UnsupportedEncoding(encoding));
    }
    Ok(serde_json::to_value(traces)?)
}
