//! Synchronous OTLP reporter.
//!
//! [`SyncOtlpReporter`] turns one [`TracesData`] tree into one transport send:
//!
//! 1. the transport's declared [`Encoding`](crate::Encoding) is checked (only JSON is accepted),
//! 2. the tree is encoded and its timestamps are repaired on the JSON value
//!    tree (see [`encode_document`] and [`repair_document`]),
//! 3. the UTF-8 payload is sent and the send is awaited on the calling thread.
//!
//! There is no batching, no background worker and no retry. Each `report`
//! call either delivers its payload or returns the error that prevented it.
//!
//! # Lifecycle
//!
//! The reporter owns its transport. It starts open; [`SyncOtlpReporter::close`]
//! releases the transport exactly once and moves the reporter to the terminal
//! closed state, after which `report` returns [`ReportError::Closed`]. An open
//! reporter that is dropped closes its transport on the way out.
//!
//! # Example
//!
//! ```ignore
//! let reporter = SyncOtlpReporter::builder(StdoutTransport::new(true))
//!     .json_style(JsonStyle::Pretty)
//!     .build();
//!
//! reporter.report(&traces)?;
//! reporter.close()?;
//! ```

use crate::config::{JsonStyle, ReporterConfig};
use crate::diagnostics::{DiagnosticSink, TracingSink};
use crate::encoder::encode_document;
use crate::error::ReportError;
use crate::repair::{render_document, repair_document};
use crate::trace::TracesData;
use crate::transport::Transport;
use futures::executor::block_on;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

/// Reports trace trees through an owned [`Transport`], one send per call.
///
/// `report` takes `&self` and adds no lock of its own: concurrent calls are
/// only as safe as the transport's `send_spans`.
pub struct SyncOtlpReporter<T: Transport> {
    transport: T,
    config: ReporterConfig,
    diagnostics: Arc<dyn DiagnosticSink>,
    closed: AtomicBool,
}

impl<T: Transport> SyncOtlpReporter<T> {
    /// Creates a reporter with default configuration, logging through `tracing`.
    pub fn new(transport: T) -> Self {
        Self::builder(transport).build()
    }

    /// Starts a [`ReporterBuilder`] around `transport`.
    pub fn builder(transport: T) -> ReporterBuilder<T> {
        ReporterBuilder::new(transport)
    }

    /// Encodes, repairs and sends one trace tree.
    ///
    /// Blocks until the transport's send completes. A transport failure is
    /// reported to the diagnostic sink and then returned.
    pub fn report(&self, traces: &TracesData) -> Result<(), ReportError> {
        if self.is_closed() {
            return Err(ReportError::Closed);
        }

        let encoding = self.transport.encoding();
        if encoding.is_binary() {
            return Err(ReportError::UnsupportedEncoding(encoding));
        }

        let mut document = encode_document(traces, encoding)?;
        repair_document(&mut document)?;
        let payload = render_document(&document, self.config.json_style)?.into_bytes();

        if let Some(limit) = self.config.max_payload_bytes {
            if payload.len() > limit {
                return Err(ReportError::PayloadTooLarge {
                    size: payload.len(),
                    limit,
                });
            }
        }

        if let Err(error) = block_on(self.transport.send_spans(payload)) {
            self.diagnostics.warn(
                &format!("failed to send spans via {} transport", self.transport.name()),
                &error,
            );
            return Err(error.into());
        }
        Ok(())
    }

    /// Releases the transport and closes the reporter.
    ///
    /// Only the first call reaches the transport; later calls return
    /// [`ReportError::Closed`].
    pub fn close(&self) -> Result<(), ReportError> {
        if self
            .closed
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .is_err()
        {
            return Err(ReportError::Closed);
        }
        self.transport.close()?;
        Ok(())
    }

    /// Returns `true` once [`close`](Self::close) has been called.
    #[inline]
    pub fn is_closed(&self) -> bool {
        self.closed.load(Ordering::Acquire)
    }

    /// The owned transport.
    pub fn transport(&self) -> &T {
        &self.transport
    }

    /// The configuration the reporter was built with.
    pub fn config(&self) -> &ReporterConfig {
        &self.config
    }
}

impl<T: Transport> Drop for SyncOtlpReporter<T> {
    fn drop(&mut self) {
        let closed = self.closed.get_mut();
        if *closed {
            return;
        }
        *closed = true;
        if let Err(error) = self.transport.close() {
            self.diagnostics
                .warn(&format!("failed to close {} transport on drop", self.transport.name()), &error);
        }
    }
}

/// Builder for [`SyncOtlpReporter`].
pub struct ReporterBuilder<T: Transport> {
    transport: T,
    config: ReporterConfig,
    diagnostics: Option<Arc<dyn DiagnosticSink>>,
}

impl<T: Transport> ReporterBuilder<T> {
    /// Creates a builder with default configuration and no explicit sink.
    pub fn new(transport: T) -> Self {
        Self {
            transport,
            config: ReporterConfig::default(),
            diagnostics: None,
        }
    }

    /// Replaces the whole configuration.
    pub fn config(mut self, config: ReporterConfig) -> Self {
        self.config = config;
        self
    }

    /// Sets the output layout of the payload.
    pub fn json_style(mut self, style: JsonStyle) -> Self {
        self.config.json_style = style;
        self
    }

    /// Rejects payloads larger than `limit` bytes before they are sent.
    pub fn max_payload_bytes(mut self, limit: usize) -> Self {
        self.config.max_payload_bytes = Some(limit);
        self
    }

    /// Sets the sink that receives warnings. Defaults to [`TracingSink`].
    pub fn diagnostics(mut self, sink: Arc<dyn DiagnosticSink>) -> Self {
        self.diagnostics = Some(sink);
        self
    }

    /// Builds an open reporter that owns the transport.
    pub fn build(self) -> SyncOtlpReporter<T> {
        SyncOtlpReporter {
            transport: self.transport,
            config: self.config,
            diagnostics: self.diagnostics.unwrap_or_else(|| Arc::new(TracingSink)),
            closed: AtomicBool::new(false),
        }
    }
}
