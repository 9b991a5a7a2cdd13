//! Content compression stage for file-unit build pipelines.
//!
//! This crate provides a pipeline transform stage that compresses the
//! contents of file-like units using Gzip, Deflate, or Zlib, and renames the
//! unit to carry the format's canonical suffix when compression happened.
//!
//! # Example
//!
//! ```ignore
//! use asset_compression::{CompressionConfig, CompressionLayer};
//! use tower::{Layer, ServiceExt};
//!
//! let layer = CompressionLayer::with_config(
//!     CompressionConfig::new().threshold("1kb"),
//! );
//! let stage = layer.layer(downstream_stage);
//! stage.oneshot(unit).await?;
//! ```
//!
//! # Compression Rules
//!
//! The stage will **not** compress a unit when:
//! - The unit carries no contents at all (e.g. it represents a directory);
//!   it is forwarded untouched.
//! - A size threshold is configured and the contents are smaller than it.
//!
//! Streaming contents are compressed lazily, chunk by chunk, unless a
//! threshold is configured: an exact size gate needs the full length, so
//! the input is drained and measured first.
//!
//! # Unit Modifications
//!
//! When compression is applied:
//! - The contents are replaced with the compressed encoding, keeping the
//!   representation (buffer stays buffer, stream stays stream).
//! - With `append` enabled, the path gains `.gz`, `.deflate`, or `.zz`.
//! - Every other field of the unit is preserved.

#![deny(missing_docs)]

mod buffer;
mod codec;
mod config;
mod error;
mod future;
mod layer;
mod service;
mod stream;
mod transform;
mod unit;

pub use codec::{CodecOptions, Format};
pub use compression_core::Level;
pub use config::{CompressionConfig, DEFAULT_THRESHOLD, Threshold};
pub use error::CompressError;
pub use future::ResponseFuture;
pub use layer::CompressionLayer;
pub use service::CompressionService;
pub use transform::transform;
pub use unit::{Content, ContentStream, Unit};
