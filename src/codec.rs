use bytes::BytesMut;
use compression_codecs::{EncodeV2, deflate::DeflateEncoder, gzip::GzipEncoder, zlib::ZlibEncoder};
use compression_core::Level;
use compression_core::util::{PartialBuffer, WriteBuffer};
use std::io;

use crate::error::CompressError;

const OUTPUT_BUFFER_SIZE: usize = 8 * 1024; // 8KB output buffer

/// Supported compression formats.
///
/// The set is closed; each format produces a standard bitstream consumable
/// by off-the-shelf decompressors.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Format {
    /// Gzip framing.
    Gzip,
    /// Raw deflate, no framing.
    Deflate,
    /// Zlib framing.
    Zlib,
}

impl Format {
    /// Resolves a configured format name.
    ///
    /// Names are case-sensitive and there are no aliases; anything but
    /// `gzip`, `deflate` or `zlib` is rejected with the offending value
    /// attached.
    pub fn from_name(name: &str) -> Result<Format, CompressError> {
        match name {
            "gzip" => Ok(Format::Gzip),
            "deflate" => Ok(Format::Deflate),
            "zlib" => Ok(Format::Zlib),
            other => Err(CompressError::UnsupportedFormat(other.to_owned())),
        }
    }

    /// Returns the format name.
    pub fn name(&self) -> &'static str {
        match self {
            Format::Gzip => "gzip",
            Format::Deflate => "deflate",
            Format::Zlib => "zlib",
        }
    }

    /// Returns the canonical path suffix for this format.
    pub fn suffix(&self) -> &'static str {
        match self {
            Format::Gzip => ".gz",
            Format::Deflate => ".deflate",
            Format::Zlib => ".zz",
        }
    }

    /// Creates a new encoder for this format.
    pub(crate) fn encoder(&self, options: &CodecOptions) -> Encoder {
        let inner: Box<dyn EncodeV2 + Send> = match self {
            Format::Gzip => Box::new(GzipEncoder::new(options.level.into())),
            Format::Deflate => Box::new(DeflateEncoder::new(options.level.into())),
            Format::Zlib => Box::new(ZlibEncoder::new(options.level.into())),
        };
        Encoder {
            inner,
            output_buffer: vec![0u8; OUTPUT_BUFFER_SIZE],
        }
    }
}

/// Pass-through parameterization for the codec.
///
/// Interpreted only at encoder construction; the decision logic never looks
/// inside.
#[derive(Debug, Clone, Copy)]
pub struct CodecOptions {
    /// Compression effort level.
    pub level: Level,
}

impl CodecOptions {
    /// Options with the given effort level.
    pub fn with_level(level: Level) -> Self {
        Self { level }
    }
}

impl Default for CodecOptions {
    fn default() -> Self {
        Self {
            level: Level::Default,
        }
    }
}

/// Drives a boxed encoder, collecting whatever output it produces.
pub(crate) struct Encoder {
    inner: Box<dyn EncodeV2 + Send>,
    output_buffer: Vec<u8>,
}

impl Encoder {
    /// Feeds one input chunk through the encoder until it is fully
    /// consumed, appending produced output to `out`.
    pub(crate) fn encode(&mut self, input: &[u8], out: &mut BytesMut) -> io::Result<()> {
        let mut input_buf = PartialBuffer::new(input);

        loop {
            let mut output = WriteBuffer::new_initialized(self.output_buffer.as_mut_slice());

            self.inner
                .encode(&mut input_buf, &mut output)
                .map_err(io::Error::other)?;

            let written = output.written_len();
            if written > 0 {
                out.extend_from_slice(&self.output_buffer[..written]);
            }

            if input_buf.written_len() >= input.len() {
                return Ok(());
            }

            // Safety check to prevent an infinite loop if the encoder makes
            // no progress in either direction.
            if written == 0 && input_buf.written_len() == 0 {
                return Ok(());
            }
        }
    }

    /// Runs one finalization step, appending produced output to `out`.
    /// Returns `true` once the encoder has written its trailer completely.
    pub(crate) fn finish(&mut self, out: &mut BytesMut) -> io::Result<bool> {
        let mut output = WriteBuffer::new_initialized(self.output_buffer.as_mut_slice());

        let done = self.inner.finish(&mut output).map_err(io::Error::other)?;

        let written = output.written_len();
        if written > 0 {
            out.extend_from_slice(&self.output_buffer[..written]);
        }

        Ok(done)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_name() {
        assert_eq!(Format::from_name("gzip").unwrap(), Format::Gzip);
        assert_eq!(Format::from_name("deflate").unwrap(), Format::Deflate);
        assert_eq!(Format::from_name("zlib").unwrap(), Format::Zlib);
    }

    #[test]
    fn test_from_name_rejects_unknown() {
        let err = Format::from_name("7z").unwrap_err();
        match err {
            CompressError::UnsupportedFormat(name) => assert_eq!(name, "7z"),
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn test_from_name_is_case_sensitive() {
        assert!(Format::from_name("Gzip").is_err());
        assert!(Format::from_name("GZIP").is_err());
        assert!(Format::from_name("x-gzip").is_err());
    }

    #[test]
    fn test_suffix_table() {
        assert_eq!(Format::Gzip.suffix(), ".gz");
        assert_eq!(Format::Deflate.suffix(), ".deflate");
        assert_eq!(Format::Zlib.suffix(), ".zz");
    }

    #[test]
    fn test_encoder_produces_gzip_framing() {
        let mut encoder = Format::Gzip.encoder(&CodecOptions::default());
        let mut out = BytesMut::new();
        encoder.encode(b"hello world", &mut out).unwrap();
        while !encoder.finish(&mut out).unwrap() {}

        // Gzip output starts with the 0x1f 0x8b magic.
        assert!(out.len() >= 2);
        assert_eq!(&out[..2], &[0x1f, 0x8b]);
    }

    #[test]
    fn test_encoder_produces_zlib_framing() {
        let mut encoder = Format::Zlib.encoder(&CodecOptions::default());
        let mut out = BytesMut::new();
        encoder.encode(b"hello world", &mut out).unwrap();
        while !encoder.finish(&mut out).unwrap() {}

        // Zlib output starts with a 0x78 CMF byte for deflate.
        assert!(!out.is_empty());
        assert_eq!(out[0], 0x78);
    }
}
