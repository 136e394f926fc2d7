//! Wire encodings a transport can declare.

use std::fmt;

/// Wire serialization format negotiated with a [`Transport`](crate::Transport).
///
/// Only [`Encoding::Json`] can be reported; binary encodings are recognised so
/// they can be rejected with a precise error.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Encoding {
    /// OTLP/JSON
    Json,
    /// OTLP/protobuf (binary)
    Proto3,
    /// Thrift (binary)
    Thrift,
}

impl Encoding {
    /// Content type a transport should send the payload with.
    pub fn media_type(self) -> &'static str {
        match self {
            Self::Json => "application/json",
            Self::Proto3 => "application/x-protobuf",
            Self::Thrift => "application/x-thrift",
        }
    }

    /// Returns `true` for the binary (non-text) encodings.
    #[inline]
    pub fn is_binary(self) -> bool {
        !matches!(self, Self::Json)
    }
}

impl fmt::Display for Encoding {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Json => "JSON",
            Self::Proto3 => "PROTO3",
            Self::Thrift => "THRIFT",
        })
    }
}
