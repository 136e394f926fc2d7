//! OTLP trace data tree.
//!
//! These types mirror `opentelemetry.proto.trace.v1` and serialize with the
//! canonical proto3 JSON mapping: lowerCamelCase field names, enums as integer
//! codes, default values omitted, 64-bit integers as decimal strings and bytes
//! as base64. The 64-bit string rendering is what the OTLP/JSON receivers
//! reject for timestamps; see [`crate::repair`].

use serde::{Serialize, Serializer};
use std::time::SystemTime;

/// Root of a trace payload: everything sent in one report call.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TracesData {
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub resource_spans: Vec<ResourceSpans>,
}

/// Spans originating from one resource (typically one service instance).
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ResourceSpans {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub resource: Option<Resource>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub scope_spans: Vec<ScopeSpans>,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub schema_url: String,
}

/// Spans produced by one instrumentation scope.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ScopeSpans {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub scope: Option<InstrumentationScope>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub spans: Vec<Span>,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub schema_url: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Resource {
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub attributes: Vec<KeyValue>,
    #[serde(skip_serializing_if = "is_default")]
    pub dropped_attributes_count: u32,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct InstrumentationScope {
    #[serde(skip_serializing_if = "String::is_empty")]
    pub name: String,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub version: String,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub attributes: Vec<KeyValue>,
    #[serde(skip_serializing_if = "is_default")]
    pub dropped_attributes_count: u32,
}

/// A single traced operation.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Span {
    /// 16-byte trace identifier
    #[serde(skip_serializing_if = "Vec::is_empty", serialize_with = "base64_bytes")]
    pub trace_id: Vec<u8>,
    /// 8-byte span identifier
    #[serde(skip_serializing_if = "Vec::is_empty", serialize_with = "base64_bytes")]
    pub span_id: Vec<u8>,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub trace_state: String,
    /// Empty for root spans
    #[serde(skip_serializing_if = "Vec::is_empty", serialize_with = "base64_bytes")]
    pub parent_span_id: Vec<u8>,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub name: String,
    #[serde(skip_serializing_if = "is_default")]
    pub kind: SpanKind,
    /// Unix nanoseconds
    #[serde(skip_serializing_if = "is_default", serialize_with = "decimal_string")]
    pub start_time_unix_nano: u64,
    /// Unix nanoseconds
    #[serde(skip_serializing_if = "is_default", serialize_with = "decimal_string")]
    pub end_time_unix_nano: u64,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub attributes: Vec<KeyValue>,
    #[serde(skip_serializing_if = "is_default")]
    pub dropped_attributes_count: u32,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub events: Vec<Event>,
    #[serde(skip_serializing_if = "is_default")]
    pub dropped_events_count: u32,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub links: Vec<Link>,
    #[serde(skip_serializing_if = "is_default")]
    pub dropped_links_count: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<Status>,
}

/// A time-stamped annotation on a span.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Event {
    #[serde(skip_serializing_if = "is_default", serialize_with = "decimal_string")]
    pub time_unix_nano: u64,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub name: String,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub attributes: Vec<KeyValue>,
    #[serde(skip_serializing_if = "is_default")]
    pub dropped_attributes_count: u32,
}

/// A pointer from a span to another span, possibly in another trace.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Link {
    #[serde(skip_serializing_if = "Vec::is_empty", serialize_with = "base64_bytes")]
    pub trace_id: Vec<u8>,
    #[serde(skip_serializing_if = "Vec::is_empty", serialize_with = "base64_bytes")]
    pub span_id: Vec<u8>,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub trace_state: String,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub attributes: Vec<KeyValue>,
    #[serde(skip_serializing_if = "is_default")]
    pub dropped_attributes_count: u32,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Status {
    #[serde(skip_serializing_if = "String::is_empty")]
    pub message: String,
    #[serde(skip_serializing_if = "is_default")]
    pub code: StatusCode,
}

/// Span kind according to the OpenTelemetry specification
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
#[repr(i32)]
pub enum SpanKind {
    #[default]
    Unspecified = 0,
    Internal = 1,
    Server = 2,
    Client = 3,
    Producer = 4,
    Consumer = 5,
}

/// Final status of a span
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
#[repr(i32)]
pub enum StatusCode {
    #[default]
    Unset = 0,
    Ok = 1,
    Error = 2,
}

// Enums go on the wire as their integer codes, never as symbolic names.
impl Serialize for SpanKind {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_i32(*self as i32)
    }
}

impl Serialize for StatusCode {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_i32(*self as i32)
    }
}

/// Attribute key/value pair
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct KeyValue {
    pub key: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub value: Option<AnyValue>,
}

/// Attribute value types (the `AnyValue` oneof)
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum AnyValue {
    StringValue(String),
    BoolValue(bool),
    #[serde(serialize_with = "decimal_string")]
    IntValue(i64),
    #[serde(serialize_with = "proto_double")]
    DoubleValue(f64),
    ArrayValue(ArrayValue),
    KvlistValue(KeyValueList),
    #[serde(serialize_with = "base64_bytes")]
    BytesValue(Vec<u8>),
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ArrayValue {
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub values: Vec<AnyValue>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct KeyValueList {
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub values: Vec<KeyValue>,
}

impl TracesData {
    /// Creates an empty payload
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a resource group to the payload
    pub fn with_resource_spans(mut self, resource_spans: ResourceSpans) -> Self {
        self.resource_spans.push(resource_spans);
        self
    }

    /// Total number of spans across all resources and scopes
    pub fn span_count(&self) -> usize {
        self.resource_spans
            .iter()
            .flat_map(|rs| &rs.scope_spans)
            .map(|ss| ss.spans.len())
            .sum()
    }
}

impl ResourceSpans {
    /// Creates a resource group for the named service (`service.name` attribute).
    pub fn for_service(service_name: impl Into<String>) -> Self {
        Self {
            resource: Some(Resource {
                attributes: vec![KeyValue::new("service.name", service_name.into())],
                dropped_attributes_count: 0,
            }),
            ..Self::default()
        }
    }

    pub fn with_scope_spans(mut self, scope_spans: ScopeSpans) -> Self {
        self.scope_spans.push(scope_spans);
        self
    }
}

impl ScopeSpans {
    pub fn new(scope: InstrumentationScope) -> Self {
        Self {
            scope: Some(scope),
            ..Self::default()
        }
    }

    pub fn with_span(mut self, span: Span) -> Self {
        self.spans.push(span);
        self
    }
}

impl InstrumentationScope {
    pub fn new(name: impl Into<String>, version: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            version: version.into(),
            ..Self::default()
        }
    }
}

impl Span {
    /// Creates a new span that starts now
    pub fn new(trace_id: [u8; 16], span_id: [u8; 8], name: impl Into<String>, kind: SpanKind) -> Self {
        let now = unix_nanos_now();
        Self {
            trace_id: trace_id.to_vec(),
            span_id: span_id.to_vec(),
            name: name.into(),
            kind,
            start_time_unix_nano: now,
            end_time_unix_nano: now,
            ..Self::default()
        }
    }

    /// Sets the parent span, making this a child span
    pub fn with_parent(mut self, parent_span_id: [u8; 8]) -> Self {
        self.parent_span_id = parent_span_id.to_vec();
        self
    }

    /// Sets explicit start and end timestamps (Unix nanoseconds)
    pub fn with_times(mut self, start_time_unix_nano: u64, end_time_unix_nano: u64) -> Self {
        self.start_time_unix_nano = start_time_unix_nano;
        self.end_time_unix_nano = end_time_unix_nano;
        self
    }

    /// Adds an attribute to the span
    pub fn set_attribute(&mut self, key: impl Into<String>, value: impl Into<AnyValue>) {
        self.attributes.push(KeyValue::new(key, value));
    }

    /// Records an event at the current time
    pub fn annotate(&mut self, name: impl Into<String>) {
        self.events.push(Event::new(name, unix_nanos_now()));
    }

    pub fn add_event(&mut self, event: Event) {
        self.events.push(event);
    }

    /// Marks the span as failed with the given message
    pub fn set_error(&mut self, message: impl Into<String>) {
        self.status = Some(Status {
            message: message.into(),
            code: StatusCode::Error,
        });
    }

    /// Marks the span as completed now. An error status set earlier is kept.
    pub fn finish(&mut self) {
        self.end_time_unix_nano = unix_nanos_now().max(self.start_time_unix_nano);
    }

    /// Duration of the span in nanoseconds
    pub fn duration_nanos(&self) -> u64 {
        self.end_time_unix_nano.saturating_sub(self.start_time_unix_nano)
    }
}

impl Event {
    pub fn new(name: impl Into<String>, time_unix_nano: u64) -> Self {
        Self {
            time_unix_nano,
            name: name.into(),
            ..Self::default()
        }
    }
}

impl KeyValue {
    pub fn new(key: impl Into<String>, value: impl Into<AnyValue>) -> Self {
        Self {
            key: key.into(),
            value: Some(value.into()),
        }
    }
}

impl From<String> for AnyValue {
    fn from(value: String) -> Self {
        AnyValue::StringValue(value)
    }
}

impl From<&str> for AnyValue {
    fn from(value: &str) -> Self {
        AnyValue::StringValue(value.to_string())
    }
}

impl From<bool> for AnyValue {
    fn from(value: bool) -> Self {
        AnyValue::BoolValue(value)
    }
}

impl From<i64> for AnyValue {
    fn from(value: i64) -> Self {
        AnyValue::IntValue(value)
    }
}

impl From<f64> for AnyValue {
    fn from(value: f64) -> Self {
        AnyValue::DoubleValue(value)
    }
}

/// Current wall-clock time as Unix nanoseconds, saturating at `u64::MAX`.
pub fn unix_nanos_now() -> u64 {
    let nanos = SystemTime::now()
        .duration_since(SystemTime::UNIX_EPOCH)
        .unwrap_or_default()
        .as_nanos();
    u64::try_from(nanos).unwrap_or(u64::MAX)
}

// =============================================================================
// proto3 JSON mapping helpers
// =============================================================================

fn is_default<T: Default + PartialEq>(value: &T) -> bool {
    *value == T::default()
}

/// int64/uint64/fixed64 are written as quoted decimal strings.
fn decimal_string<T: std::fmt::Display, S: Serializer>(value: &T, serializer: S) -> Result<S::Ok, S::Error> {
    serializer.collect_str(value)
}

fn base64_bytes<T: AsRef<[u8]>, S: Serializer>(bytes: &T, serializer: S) -> Result<S::Ok, S::Error> {
    use base64::Engine as _;
    serializer.serialize_str(&base64::engine::general_purpose::STANDARD.encode(bytes.as_ref()))
}

/// Non-finite doubles have no JSON number form and use the proto3 string names.
fn proto_double<S: Serializer>(value: &f64, serializer: S) -> Result<S::Ok, S::Error> {
    if value.is_nan() {
        serializer.serialize_str("NaN")
    } else if value.is_infinite() {
        serializer.serialize_str(if *value > 0.0 { "Infinity" } else { "-Infinity" })
    } else {
        serializer.serialize_f64(*value)
    }
}
