//! Error types for report operations.

use crate::encoding::Encoding;
use crate::transport::TransportError;
use thiserror::Error;

/// Errors returned by [`encode`](crate::encode), [`repair_timestamps`](crate::repair_timestamps)
/// and the [`SyncOtlpReporter`](crate::SyncOtlpReporter).
///
/// None of these are recovered internally. A failed report loses exactly the
/// payload it was given.
#[derive(Debug, Error)]
pub enum ReportError {
    /// The transport declared an encoding other than JSON.
    #[error("unsupported encoding {0}: spans can only be reported as JSON")]
    UnsupportedEncoding(Encoding),

    /// A timestamp in the encoded document is not an integer.
    #[error("malformed payload at {path}: {reason}")]
    MalformedPayload { path: String, reason: String },

    /// The JSON library failed to serialize the document.
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// The repaired payload is larger than the configured limit.
    #[error("payload of {size} bytes exceeds the {limit} byte limit")]
    PayloadTooLarge { size: usize, limit: usize },

    /// Sending or closing through the transport failed.
    #[error("transport error: {0}")]
    Transport(#[from] TransportError),

    /// The reporter has been closed.
    #[error("reporter is closed")]
    Closed,
}

impl ReportError {
    /// Returns `true` if resending the same payload could succeed.
    ///
    /// Only transport failures qualify; every other kind fails the same way again.
    #[inline]
    pub fn is_retryable(&self) -> bool {
        matches!(self, Self::Transport(_))
    }
}
