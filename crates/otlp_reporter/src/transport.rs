use crate::encoding::Encoding;
use std::fs::{File, OpenOptions};
use std::future::Future;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::pin::Pin;
use std::sync::{Mutex, PoisonError};
use thiserror::Error;

/// Error types for transport operations
#[derive(Debug, Error)]
pub enum TransportError {
    /// I/O failure (socket, file)
    #[error("i/o error: {0}")]
    Io(#[from] std::io::Error),
    /// The backend refused or failed the request
    #[error("send failed: {0}")]
    Send(String),
    /// Releasing the transport failed
    #[error("close failed: {0}")]
    Close(String),
}

/// Delivers encoded span payloads to a backend.
///
/// The reporter drives `send_spans` to completion on the calling thread, so
/// implementations must not rely on being polled inside an async runtime.
///
/// # Note on Object Safety
///
/// This trait uses `impl Future` return types which are not object-safe.
/// For dynamic dispatch, use `Box<dyn TransportBoxed>`.
pub trait Transport: Send + Sync {
    /// Wire encoding this transport accepts.
    fn encoding(&self) -> Encoding;

    /// Sends one encoded payload.
    fn send_spans(&self, payload: Vec<u8>) -> impl Future<Output = Result<(), TransportError>> + Send;

    /// Releases the transport's resources. Called once by the owning reporter.
    fn close(&self) -> Result<(), TransportError>;

    /// Returns the transport name for diagnostics.
    fn name(&self) -> &str;
}

/// Object-safe version of Transport for dynamic dispatch.
pub trait TransportBoxed: Send + Sync {
    fn encoding(&self) -> Encoding;

    fn send_spans_boxed(
        &self,
        payload: Vec<u8>,
    ) -> Pin<Box<dyn Future<Output = Result<(), TransportError>> + Send + '_>>;

    fn close(&self) -> Result<(), TransportError>;

    fn name(&self) -> &str;
}

/// Blanket implementation: any Transport can be used as TransportBoxed
impl<T: Transport> TransportBoxed for T {
    fn encoding(&self) -> Encoding {
        Transport::encoding(self)
    }

    fn send_spans_boxed(
        &self,
        payload: Vec<u8>,
    ) -> Pin<Box<dyn Future<Output = Result<(), TransportError>> + Send + '_>> {
        Box::pin(self.send_spans(payload))
    }

    fn close(&self) -> Result<(), TransportError> {
        Transport::close(self)
    }

    fn name(&self) -> &str {
        Transport::name(self)
    }
}

/// Lets a reporter own a transport chosen at runtime.
impl Transport for Box<dyn TransportBoxed> {
    fn encoding(&self) -> Encoding {
        TransportBoxed::encoding(&**self)
    }

    fn send_spans(&self, payload: Vec<u8>) -> impl Future<Output = Result<(), TransportError>> + Send {
        TransportBoxed::send_spans_boxed(&**self, payload)
    }

    fn close(&self) -> Result<(), TransportError> {
        TransportBoxed::close(&**self)
    }

    fn name(&self) -> &str {
        TransportBoxed::name(&**self)
    }
}

/// Stdout transport for testing and debugging
pub struct StdoutTransport {
    verbose: bool,
}

impl StdoutTransport {
    /// Creates a new stdout transport
    pub fn new(verbose: bool) -> Self {
        Self { verbose }
    }
}

impl Transport for StdoutTransport {
    fn encoding(&self) -> Encoding {
        Encoding::Json
    }

    async fn send_spans(&self, payload: Vec<u8>) -> Result<(), TransportError> {
        if self.verbose {
            println!(
                "=== Sending {} bytes ({}) ===",
                payload.len(),
                Encoding::Json.media_type()
            );
            println!("{}", String::from_utf8_lossy(&payload));
            println!("=== Send complete ===\n");
        }
        Ok(())
    }

    fn close(&self) -> Result<(), TransportError> {
        Ok(())
    }

    fn name(&self) -> &str {
        "stdout"
    }
}

/// Appends one JSON payload per line to a local file, for local development
pub struct JsonFileTransport {
    file_path: PathBuf,
    file: Mutex<Option<File>>,
}

impl JsonFileTransport {
    /// Opens (or creates) the file in append mode
    pub fn open(file_path: impl AsRef<Path>) -> Result<Self, TransportError> {
        let file_path = file_path.as_ref().to_path_buf();
        let file = OpenOptions::new().create(true).append(true).open(&file_path)?;
        Ok(Self {
            file_path,
            file: Mutex::new(Some(file)),
        })
    }

    pub fn file_path(&self) -> &Path {
        &self.file_path
    }
}

impl Transport for JsonFileTransport {
    fn encoding(&self) -> Encoding {
        Encoding::Json
    }

    async fn send_spans(&self, mut payload: Vec<u8>) -> Result<(), TransportError> {
        payload.push(b'\n');
        let mut guard = self.file.lock().unwrap_or_else(PoisonError::into_inner);
        let file = guard
            .as_mut()
            .ok_or_else(|| TransportError::Send(format!("{} is closed", self.file_path.display())))?;
        file.write_all(&payload)?;
        Ok(())
    }

    fn close(&self) -> Result<(), TransportError> {
        let file = self.file.lock().unwrap_or_else(PoisonError::into_inner).take();
        match file {
            Some(file) => file
                .sync_all()
                .map_err(|e| TransportError::Close(format!("{}: {e}", self.file_path.display()))),
            None => Ok(()),
        }
    }

    fn name(&self) -> &str {
        "json_file"
    }
}

/// Null transport that discards all payloads (for benchmarking)
pub struct NullTransport {
    encoding: Encoding,
}

impl NullTransport {
    pub fn new() -> Self {
        Self::with_encoding(Encoding::Json)
    }

    /// Declares a different encoding, e.g. to exercise rejection paths
    pub fn with_encoding(encoding: Encoding) -> Self {
        Self { encoding }
    }
}

impl Default for NullTransport {
    fn default() -> Self {
        Self::new()
    }
}

impl Transport for NullTransport {
    fn encoding(&self) -> Encoding {
        self.encoding
    }

    async fn send_spans(&self, _payload: Vec<u8>) -> Result<(), TransportError> {
        // Discard
        Ok(())
    }

    fn close(&self) -> Result<(), TransportError> {
        Ok(())
    }

    fn name(&self) -> &str {
        "null"
    }
}
