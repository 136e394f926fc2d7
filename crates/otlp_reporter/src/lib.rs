//! Synchronous OTLP/JSON Trace Reporter
//!
//! Converts an in-memory OTLP trace tree into the JSON payload OTLP/HTTP
//! receivers accept and hands it to a pluggable [`Transport`].
//!
//! The pipeline is two pure steps followed by one blocking send:
//!
//! - [`encode`] renders the tree with the canonical proto3 JSON mapping
//! - [`repair_timestamps`] rewrites the span and event timestamps, which that
//!   mapping quotes as strings, back into JSON numbers
//! - [`SyncOtlpReporter::report`] sends the result and waits for the outcome
//!
//! Only JSON is supported; a transport declaring a binary [`Encoding`] is
//! rejected before any I/O.

pub mod config;
pub mod diagnostics;
pub mod encoder;
pub mod encoding;
pub mod error;
pub mod repair;
pub mod reporter;
pub mod trace;
pub mod transport;

// Re-export main types
pub use config::{JsonStyle, ReporterConfig};
pub use diagnostics::{DiagnosticSink, TracingSink};
pub use encoder::{encode, encode_document};
pub use encoding::Encoding;
pub use error::ReportError;
pub use repair::{render_document, repair_document, repair_timestamps};
pub use reporter::{ReporterBuilder, SyncOtlpReporter};
pub use trace::{
    AnyValue, ArrayValue, Event, InstrumentationScope, KeyValue, KeyValueList, Link, Resource,
    ResourceSpans, ScopeSpans, Span, SpanKind, Status, StatusCode, TracesData,
};
pub use transport::{
    JsonFileTransport, NullTransport, StdoutTransport, Transport, TransportBoxed, TransportError,
};
