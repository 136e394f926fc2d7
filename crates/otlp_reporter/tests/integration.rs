use otlp_reporter::{
    encode, repair_timestamps, AnyValue, ArrayValue, DiagnosticSink, Encoding, Event,
    InstrumentationScope, JsonStyle, KeyValue, KeyValueList, NullTransport, ReportError,
    ResourceSpans, ScopeSpans, Span, SpanKind, SyncOtlpReporter, TracesData, Transport,
    TransportBoxed, TransportError,
};
use proptest::prelude::*;
use serde_json::Value;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

struct CapturingTransport {
    encoding: Encoding,
    payloads: Arc<Mutex<Vec<Vec<u8>>>>,
    sends: Arc<AtomicUsize>,
    fail_with: Option<String>,
}

impl CapturingTransport {
    fn new(encoding: Encoding) -> Self {
        Self {
            encoding,
            payloads: Arc::new(Mutex::new(Vec::new())),
            sends: Arc::new(AtomicUsize::new(0)),
            fail_with: None,
        }
    }

    fn failing(reason: &str) -> Self {
        Self {
            fail_with: Some(reason.to_string()),
            ..Self::new(Encoding::Json)
        }
    }

    fn last_payload(&self) -> Value {
        let payloads = self.payloads.lock().unwrap();
        serde_json::from_slice(payloads.last().expect("no payload sent")).unwrap()
    }
}

impl Transport for CapturingTransport {
    fn encoding(&self) -> Encoding {
        self.encoding
    }

    async fn send_spans(&self, payload: Vec<u8>) -> Result<(), TransportError> {
        self.sends.fetch_add(1, Ordering::SeqCst);
        if let Some(reason) = &self.fail_with {
            return Err(TransportError::Send(reason.clone()));
        }
        self.payloads.lock().unwrap().push(payload);
        Ok(())
    }

    fn close(&self) -> Result<(), TransportError> {
        Ok(())
    }

    fn name(&self) -> &str {
        "capturing"
    }
}

#[derive(Default)]
struct CountingSink {
    warnings: AtomicUsize,
}

impl DiagnosticSink for CountingSink {
    fn warn(&self, _message: &str, _error: &dyn std::error::Error) {
        self.warnings.fetch_add(1, Ordering::SeqCst);
    }
}

fn scenario_traces() -> TracesData {
    let mut span = Span::new([7; 16], [3; 8], "foo", SpanKind::Consumer)
        .with_times(1_000_000_000, 2_000_000_000);
    span.add_event(Event::new("boom!", 1_500_000_000));

    TracesData::new().with_resource_spans(
        ResourceSpans::for_service("my-service").with_scope_spans(
            ScopeSpans::new(InstrumentationScope::new("brave", "5.16")).with_span(span),
        ),
    )
}

#[test]
fn test_scenario_payload_has_numeric_timestamps() {
    let transport = CapturingTransport::new(Encoding::Json);
    let payloads = Arc::clone(&transport.payloads);
    let reporter = SyncOtlpReporter::new(transport);

    reporter.report(&scenario_traces()).unwrap();

    let payloads = payloads.lock().unwrap();
    let text = std::str::from_utf8(&payloads[0]).unwrap();
    assert!(text.contains(r#""startTimeUnixNano":1000000000,"endTimeUnixNano":2000000000"#));
    assert!(text.contains(r#""timeUnixNano":1500000000"#));
    assert!(!text.contains(r#""1000000000""#));

    let doc: Value = serde_json::from_str(text).unwrap();
    let span = &doc["resourceSpans"][0]["scopeSpans"][0]["spans"][0];
    assert_eq!(span["kind"], Value::from(5));
    assert_eq!(span["events"][0]["timeUnixNano"].as_u64(), Some(1_500_000_000));
}

#[test]
fn test_encoder_and_repair_compose() {
    let json = encode(&scenario_traces(), Encoding::Json).unwrap();
    assert!(json.contains(r#""startTimeUnixNano":"1000000000""#));

    let repaired = repair_timestamps(&json, JsonStyle::Compact).unwrap();
    assert!(repaired.contains(r#""startTimeUnixNano":1000000000"#));
}

#[test]
fn test_deeply_nested_attributes_survive_report() {
    let mut value = AnyValue::from(42_i64);
    for depth in 0..100 {
        value = if depth % 2 == 0 {
            AnyValue::ArrayValue(ArrayValue { values: vec![value] })
        } else {
            AnyValue::KvlistValue(KeyValueList {
                values: vec![KeyValue::new(format!("level-{depth}"), value)],
            })
        };
    }
    let mut traces = scenario_traces();
    traces.resource_spans[0].scope_spans[0].spans[0].set_attribute("deep", value);

    let transport = CapturingTransport::new(Encoding::Json);
    let payloads = Arc::clone(&transport.payloads);
    let reporter = SyncOtlpReporter::new(transport);
    reporter.report(&traces).unwrap();

    let payloads = payloads.lock().unwrap();
    let text = std::str::from_utf8(&payloads[0]).unwrap();
    assert!(text.contains(r#""startTimeUnixNano":1000000000,"endTimeUnixNano":2000000000"#));
    assert!(text.contains(r#"{"intValue":"42"}"#));
}

#[test]
fn test_proto3_transport_is_rejected_without_sending() {
    let transport = CapturingTransport::new(Encoding::Proto3);
    let sends = Arc::clone(&transport.sends);
    let reporter = SyncOtlpReporter::new(transport);

    let result = reporter.report(&scenario_traces());
    assert!(matches!(result, Err(ReportError::UnsupportedEncoding(Encoding::Proto3))));
    assert_eq!(sends.load(Ordering::SeqCst), 0);
}

#[test]
fn test_transport_failure_is_logged_and_returned() {
    let sink = Arc::new(CountingSink::default());
    let reporter = SyncOtlpReporter::builder(CapturingTransport::failing("connection reset"))
        .diagnostics(sink.clone())
        .build();

    let err = reporter.report(&scenario_traces()).unwrap_err();
    assert!(err.is_retryable());
    assert_eq!(err.to_string(), "transport error: send failed: connection reset");
    assert_eq!(sink.warnings.load(Ordering::SeqCst), 1);
}

#[test]
fn test_empty_trees_are_sent_as_valid_json() {
    let transport = CapturingTransport::new(Encoding::Json);
    let payloads = Arc::clone(&transport.payloads);
    let reporter = SyncOtlpReporter::new(transport);

    let empty_scope = TracesData::new().with_resource_spans(
        ResourceSpans::for_service("idle").with_scope_spans(ScopeSpans::default()),
    );
    reporter.report(&TracesData::new()).unwrap();
    reporter.report(&empty_scope).unwrap();

    let payloads = payloads.lock().unwrap();
    assert_eq!(payloads.len(), 2);
    for payload in payloads.iter() {
        assert!(serde_json::from_slice::<Value>(payload).is_ok());
    }
}

#[test]
fn test_reporter_over_boxed_transport() {
    let transport: Box<dyn TransportBoxed> = Box::new(NullTransport::new());
    let reporter = SyncOtlpReporter::new(transport);
    reporter.report(&scenario_traces()).unwrap();
    reporter.close().unwrap();
    assert!(matches!(reporter.report(&scenario_traces()), Err(ReportError::Closed)));
}

#[test]
fn test_concurrent_reports_share_reporter() {
    let transport = CapturingTransport::new(Encoding::Json);
    let sends = Arc::clone(&transport.sends);
    let reporter = Arc::new(SyncOtlpReporter::new(transport));

    let handles: Vec<_> = (0..4)
        .map(|_| {
            let reporter = Arc::clone(&reporter);
            std::thread::spawn(move || {
                for _ in 0..25 {
                    reporter.report(&scenario_traces()).unwrap();
                }
            })
        })
        .collect();
    for handle in handles {
        handle.join().unwrap();
    }

    assert_eq!(sends.load(Ordering::SeqCst), 100);
}

// =============================================================================
// Property tests: timestamps in the wire payload are numbers equal to the
// values in the tree, for arbitrary tree shapes.
// =============================================================================

fn arb_span() -> impl Strategy<Value = Span> {
    (any::<u64>(), any::<u64>(), prop::collection::vec(any::<u64>(), 0..4)).prop_map(
        |(start, end, event_times)| {
            let mut span = Span::default().with_times(start, end);
            for (i, time) in event_times.into_iter().enumerate() {
                span.add_event(Event::new(format!("event-{i}"), time));
            }
            span
        },
    )
}

fn arb_traces() -> impl Strategy<Value = TracesData> {
    prop::collection::vec(prop::collection::vec(prop::collection::vec(arb_span(), 0..4), 0..3), 0..3)
        .prop_map(|resources| TracesData {
            resource_spans: resources
                .into_iter()
                .map(|scopes| ResourceSpans {
                    scope_spans: scopes
                        .into_iter()
                        .map(|spans| ScopeSpans {
                            spans,
                            ..ScopeSpans::default()
                        })
                        .collect(),
                    ..ResourceSpans::default()
                })
                .collect(),
        })
}

/// A zero timestamp is a default value and is omitted from the document.
fn assert_timestamp(value: &Value, expected: u64) -> Result<(), TestCaseError> {
    if expected == 0 {
        prop_assert!(value.is_null());
    } else {
        prop_assert!(value.is_number(), "expected number, got {}", value);
        prop_assert_eq!(value.as_u64(), Some(expected));
    }
    Ok(())
}

proptest! {
    #[test]
    fn prop_timestamps_are_numbers(traces in arb_traces()) {
        let transport = CapturingTransport::new(Encoding::Json);
        let payloads = Arc::clone(&transport.payloads);
        let reporter = SyncOtlpReporter::new(transport);
        reporter.report(&traces).unwrap();

        let doc: Value = serde_json::from_slice(&payloads.lock().unwrap()[0]).unwrap();
        for (r, resource_spans) in traces.resource_spans.iter().enumerate() {
            for (s, scope_spans) in resource_spans.scope_spans.iter().enumerate() {
                for (i, span) in scope_spans.spans.iter().enumerate() {
                    let wire = &doc["resourceSpans"][r]["scopeSpans"][s]["spans"][i];
                    assert_timestamp(&wire["startTimeUnixNano"], span.start_time_unix_nano)?;
                    assert_timestamp(&wire["endTimeUnixNano"], span.end_time_unix_nano)?;
                    for (e, event) in span.events.iter().enumerate() {
                        assert_timestamp(&wire["events"][e]["timeUnixNano"], event.time_unix_nano)?;
                    }
                }
            }
        }
    }

    #[test]
    fn prop_repair_is_idempotent(traces in arb_traces()) {
        let json = encode(&traces, Encoding::Json).unwrap();
        let once = repair_timestamps(&json, JsonStyle::Compact).unwrap();
        let twice = repair_timestamps(&once, JsonStyle::Compact).unwrap();
        prop_assert_eq!(once, twice);
    }
}
