//! Error type for the fallible edges of the engine: snapshot decoding and
//! CSS value parsing. Editor operations themselves never fail.

/// Errors raised by `pb-core`.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// A CSS value could not be parsed as the expected kind.
    #[error("invalid CSS {kind} value: {value:?}")]
    InvalidCss { kind: &'static str, value: String },

    /// Snapshot JSON could not be read or written.
    #[error("snapshot JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// A binary history snapshot could not be encoded.
    #[error("snapshot encode error: {0}")]
    Encode(#[from] rmp_serde::encode::Error),

    /// A binary history snapshot could not be decoded.
    #[error("snapshot decode error: {0}")]
    Decode(#[from] rmp_serde::decode::Error),
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
