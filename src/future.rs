use pin_project_lite::pin_project;
use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;
use std::task::{Context, Poll, ready};
use tower::{BoxError, Service};

use crate::config::CompressionConfig;
use crate::error::CompressError;
use crate::transform::transform;
use crate::unit::Unit;

type TransformFuture = Pin<Box<dyn Future<Output = Result<Unit, CompressError>> + Send>>;

pin_project! {
    /// Future for compression service calls.
    ///
    /// Runs the unit transform first, then forwards the transformed unit to
    /// the downstream service. When the transform fails, the future
    /// resolves to the error and the downstream never sees the unit.
    #[project = ResponseFutureProj]
    #[allow(missing_docs)]
    pub enum ResponseFuture<S, F> {
        /// Transform in flight.
        Transforming {
            #[pin]
            transform: TransformFuture,
            downstream: Option<S>,
        },
        /// Downstream call in flight.
        Forwarding {
            #[pin]
            future: F,
        },
    }
}

impl<S> ResponseFuture<S, S::Future>
where
    S: Service<Unit>,
{
    pub(crate) fn new(unit: Unit, config: Arc<CompressionConfig>, downstream: S) -> Self {
        let transform = Box::pin(async move { transform(unit, &config).await });
        ResponseFuture::Transforming {
            transform,
            downstream: Some(downstream),
        }
    }
}

impl<S> Future for ResponseFuture<S, S::Future>
where
    S: Service<Unit>,
    S::Error: Into<BoxError>,
{
    type Output = Result<S::Response, BoxError>;

    fn poll(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Self::Output> {
        loop {
            match self.as_mut().project() {
                ResponseFutureProj::Transforming {
                    transform,
                    downstream,
                } => match ready!(transform.poll(cx)) {
                    Ok(unit) => {
                        let mut downstream =
                            downstream.take().expect("future polled after completion");
                        let future = downstream.call(unit);
                        self.set(ResponseFuture::Forwarding { future });
                    }
                    Err(e) => return Poll::Ready(Err(e.into())),
                },
                ResponseFutureProj::Forwarding { future } => {
                    return future.poll(cx).map(|result| result.map_err(Into::into));
                }
            }
        }
    }
}
