use std::io;

/// Errors raised while processing a single unit.
///
/// Every variant is scoped to the unit that triggered it: the unit is
/// dropped from the pipeline and no partial contents are emitted. Other
/// units are unaffected.
#[derive(Debug, thiserror::Error)]
pub enum CompressError {
    /// The configured format is not one of `gzip`, `deflate` or `zlib`.
    #[error("unsupported compression format: {0:?}")]
    UnsupportedFormat(String),

    /// The codec reported a failure while producing compressed output.
    #[error("compression codec failed")]
    Codec(#[source] io::Error),

    /// Reading the contents stream to completion failed.
    #[error("failed to read contents stream")]
    StreamDrain(#[source] io::Error),
}
