//! Stream-mode compression.
//!
//! Without a threshold the input is wired straight into the encoder and
//! compressed chunks are yielded lazily as the codec produces them. With a
//! threshold the whole input has to be drained first so the size gate sees
//! an exact length; enabling a threshold on streaming input trades
//! constant-memory processing for exact size-based gating.

use bytes::{Bytes, BytesMut};
use futures::StreamExt;
use futures::stream::{self, Stream};
use pin_project_lite::pin_project;
use std::io;
use std::pin::Pin;
use std::task::{Context, Poll};
use tracing::{debug, trace};

use crate::buffer::Outcome;
use crate::codec::{Encoder, Format};
use crate::config::{CompressionConfig, Threshold};
use crate::error::CompressError;
use crate::unit::ContentStream;

/// Compresses streaming contents.
///
/// The format has already been validated by the caller, so nothing of the
/// input is consumed when the configuration is bad. Failures while draining
/// are reported here; failures in the lazy path surface as error items on
/// the returned stream, since compression happens as the consumer reads.
pub(crate) async fn compress(
    contents: ContentStream,
    format: Format,
    config: &CompressionConfig,
) -> Result<Outcome<ContentStream>, CompressError> {
    match config.threshold {
        Threshold::Disabled => Ok(Outcome {
            contents: encoded(contents, format, config),
            was_compressed: true,
        }),
        Threshold::MinSize(min) => {
            let buffered = drain(contents).await?;
            debug!(len = buffered.len(), min, "stream drained for size gate");

            if (buffered.len() as u64) < min {
                trace!(len = buffered.len(), "below threshold, passing through");
                Ok(Outcome {
                    contents: replay(buffered),
                    was_compressed: false,
                })
            } else {
                Ok(Outcome {
                    contents: encoded(replay(buffered), format, config),
                    was_compressed: true,
                })
            }
        }
    }
}

/// Wraps contents in a stream that compresses lazily.
fn encoded(contents: ContentStream, format: Format, config: &CompressionConfig) -> ContentStream {
    Box::pin(EncoderStream::new(
        contents,
        format.encoder(&config.codec_options),
    ))
}

/// A one-shot stream yielding already-materialized contents.
fn replay(contents: Bytes) -> ContentStream {
    Box::pin(stream::once(std::future::ready(Ok(contents))))
}

/// Reads a stream to completion, concatenating every chunk.
async fn drain(mut contents: ContentStream) -> Result<Bytes, CompressError> {
    let mut buffered = BytesMut::new();
    while let Some(chunk) = contents.next().await {
        let chunk = chunk.map_err(CompressError::StreamDrain)?;
        buffered.extend_from_slice(&chunk);
    }
    Ok(buffered.freeze())
}

pin_project! {
    /// A stream that compresses its inner stream's chunks as they arrive.
    ///
    /// Reads and encodes input chunks until the inner stream ends, then
    /// runs encoder finalization until the trailer is out. Output chunk
    /// order follows input order.
    pub(crate) struct EncoderStream<S> {
        #[pin]
        inner: S,
        encoder: Encoder,
        state: EncodeState,
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum EncodeState {
    Reading,
    Finishing,
    Done,
}

impl<S> EncoderStream<S> {
    pub(crate) fn new(inner: S, encoder: Encoder) -> Self {
        Self {
            inner,
            encoder,
            state: EncodeState::Reading,
        }
    }
}

impl<S> Stream for EncoderStream<S>
where
    S: Stream<Item = io::Result<Bytes>>,
{
    type Item = io::Result<Bytes>;

    fn poll_next(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<Self::Item>> {
        let mut this = self.project();

        loop {
            match *this.state {
                EncodeState::Done => return Poll::Ready(None),

                EncodeState::Finishing => {
                    let mut out = BytesMut::new();
                    loop {
                        match this.encoder.finish(&mut out) {
                            Ok(true) => {
                                *this.state = EncodeState::Done;
                                break;
                            }
                            Ok(false) => {}
                            Err(e) => {
                                *this.state = EncodeState::Done;
                                return Poll::Ready(Some(Err(e)));
                            }
                        }
                    }
                    if !out.is_empty() {
                        return Poll::Ready(Some(Ok(out.freeze())));
                    }
                }

                EncodeState::Reading => match this.inner.as_mut().poll_next(cx) {
                    Poll::Pending => return Poll::Pending,
                    Poll::Ready(None) => {
                        *this.state = EncodeState::Finishing;
                    }
                    Poll::Ready(Some(Err(e))) => {
                        *this.state = EncodeState::Done;
                        return Poll::Ready(Some(Err(e)));
                    }
                    Poll::Ready(Some(Ok(chunk))) => {
                        let mut out = BytesMut::new();
                        if let Err(e) = this.encoder.encode(&chunk, &mut out) {
                            *this.state = EncodeState::Done;
                            return Poll::Ready(Some(Err(e)));
                        }
                        if !out.is_empty() {
                            return Poll::Ready(Some(Ok(out.freeze())));
                        }
                        // The encoder buffered the whole chunk; keep reading.
                    }
                },
            }
        }
    }
}
