use bytes::{Bytes, BytesMut};
use std::io;
use tracing::trace;

use crate::codec::Format;
use crate::config::CompressionConfig;
use crate::error::CompressError;

/// Result of one compression attempt.
///
/// Lives only for the duration of a single unit's processing; the
/// transformer folds it back into the unit.
pub(crate) struct Outcome<C> {
    /// Replacement contents for the unit.
    pub contents: C,
    /// Whether the codec actually ran.
    pub was_compressed: bool,
}

/// Compresses fully materialized contents.
///
/// Contents below the threshold come back untouched without an encoder ever
/// being constructed. The format has already been validated by the caller.
pub(crate) fn compress(
    contents: Bytes,
    format: Format,
    config: &CompressionConfig,
) -> Result<Outcome<Bytes>, CompressError> {
    if !config.threshold.should_compress(contents.len() as u64) {
        trace!(len = contents.len(), "below threshold, passing through");
        return Ok(Outcome {
            contents,
            was_compressed: false,
        });
    }

    let compressed = encode_all(format, config, &contents).map_err(CompressError::Codec)?;
    trace!(
        len = contents.len(),
        compressed_len = compressed.len(),
        format = format.name(),
        "contents compressed"
    );

    Ok(Outcome {
        contents: compressed,
        was_compressed: true,
    })
}

/// Runs the whole input through a fresh encoder to completion.
fn encode_all(format: Format, config: &CompressionConfig, input: &[u8]) -> io::Result<Bytes> {
    let mut encoder = format.encoder(&config.codec_options);
    let mut out = BytesMut::new();

    encoder.encode(input, &mut out)?;
    while !encoder.finish(&mut out)? {}

    Ok(out.freeze())
}
