//! # OTLP Reporter Demo
//!
//! Records one span the way an instrumented consumer would (tag, kind, error,
//! annotation), reports it and prints the OTLP/JSON payload that would go on
//! the wire.
//!
//! ## Running
//!
//! ```bash
//! # Compact payload on stdout
//! cargo run -p otlp_reporter --bin demo
//!
//! # Indented payload
//! cargo run -p otlp_reporter --bin demo -- --pretty
//!
//! # Append payloads to a file instead
//! cargo run -p otlp_reporter --bin demo -- --file spans.jsonl
//! ```

use otlp_reporter::{
    InstrumentationScope, JsonFileTransport, JsonStyle, ResourceSpans, ScopeSpans, Span, SpanKind,
    StdoutTransport, SyncOtlpReporter, TracesData, TransportBoxed,
};
use std::thread;
use std::time::Duration;
use tracing_subscriber::EnvFilter;

fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let args: Vec<String> = std::env::args().collect();
    let pretty = args.iter().any(|a| a == "--pretty");
    let file = args
        .iter()
        .position(|a| a == "--file")
        .and_then(|i| args.get(i + 1));

    let transport: Box<dyn TransportBoxed> = match file {
        Some(path) => {
            let transport = JsonFileTransport::open(path)?;
            println!("Appending payloads to {}", transport.file_path().display());
            Box::new(transport)
        }
        None => Box::new(StdoutTransport::new(true)),
    };

    let reporter = SyncOtlpReporter::builder(transport)
        .json_style(if pretty { JsonStyle::Pretty } else { JsonStyle::Compact })
        .build();

    let trace_id: [u8; 16] = rand::random();
    let span_id: [u8; 8] = rand::random();

    let mut span = Span::new(trace_id, span_id, "foo", SpanKind::Consumer);
    span.set_attribute("foo tag", "foo value");
    span.set_attribute("peer.service", "remote service");
    span.set_error("BOOOOOM!");

    thread::sleep(Duration::from_millis(100));
    span.annotate("boom!");
    thread::sleep(Duration::from_millis(100));
    span.finish();

    println!("Trace Id <{}>", hex(&trace_id));
    println!("Span duration: {}ns\n", span.duration_nanos());

    let traces = TracesData::new().with_resource_spans(
        ResourceSpans::for_service("my-service").with_scope_spans(
            ScopeSpans::new(InstrumentationScope::new("otlp_reporter", env!("CARGO_PKG_VERSION")))
                .with_span(span),
        ),
    );

    println!("Reporting {} span(s)", traces.span_count());
    reporter.report(&traces)?;
    reporter.close()?;
    Ok(())
}

fn hex(bytes: &[u8]) -> String {
    bytes.iter().map(|b| format!("{b:02x}")).collect()
}
