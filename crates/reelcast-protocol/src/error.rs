//! Error types for the protocol layer.

/// Errors that can occur while encoding or decoding wire events.
#[derive(Debug, thiserror::Error)]
pub enum ProtocolError {
    /// Serialization failed (turning a Rust type into bytes).
    #[error("encode failed: {0}")]
    Encode(serde_json::Error),

    /// Deserialization failed. Common causes: malformed JSON, a missing
    /// or unknown `type` tag, or wrong field types.
    #[error("decode failed: {0}")]
    Decode(serde_json::Error),
}
