//! Configuration for reporter behavior.

/// Layout of the JSON document handed to the transport.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum JsonStyle {
    /// No insignificant whitespace.
    #[default]
    Compact,
    /// Two-space indented, one field per line.
    Pretty,
}

/// Configuration for [`SyncOtlpReporter`](crate::SyncOtlpReporter).
#[derive(Debug, Clone, Default)]
pub struct ReporterConfig {
    /// Output layout of the repaired payload.
    ///
    /// Default: [`JsonStyle::Compact`]
    pub json_style: JsonStyle,

    /// Upper bound on the payload size in bytes.
    ///
    /// Larger payloads are rejected before the transport is invoked.
    ///
    /// Default: no limit
    pub max_payload_bytes: Option<usize>,
}

impl ReporterConfig {
    /// Sets the output layout.
    pub fn with_json_style(mut self, style: JsonStyle) -> Self {
        self.json_style = style;
        self
    }

    /// Sets the payload size limit.
    pub fn with_max_payload_bytes(mut self, limit: usize) -> Self {
        self.max_payload_bytes = Some(limit);
        self
    }
}
