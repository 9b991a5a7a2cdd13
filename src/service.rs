use std::sync::Arc;
use std::task::{Context, Poll};
use tower::{BoxError, Service};

use crate::config::CompressionConfig;
use crate::future::ResponseFuture;
use crate::unit::Unit;

/// A Tower service that compresses unit contents on the way to the
/// downstream service.
///
/// Each call transforms exactly one unit. Units whose transform fails are
/// not forwarded; the call resolves to the error instead.
#[derive(Debug, Clone)]
pub struct CompressionService<S> {
    downstream: S,
    config: Arc<CompressionConfig>,
}

impl<S> CompressionService<S> {
    /// Creates a compression service in front of `downstream`.
    pub fn new(downstream: S, config: Arc<CompressionConfig>) -> Self {
        Self { downstream, config }
    }

    /// Returns a reference to the downstream service.
    pub fn downstream(&self) -> &S {
        &self.downstream
    }

    /// Consumes this service, returning the downstream service.
    pub fn into_downstream(self) -> S {
        self.downstream
    }
}

impl<S> Service<Unit> for CompressionService<S>
where
    S: Service<Unit> + Clone,
    S::Error: Into<BoxError>,
{
    type Response = S::Response;
    type Error = BoxError;
    type Future = ResponseFuture<S, S::Future>;

    fn poll_ready(&mut self, cx: &mut Context<'_>) -> Poll<Result<(), Self::Error>> {
        self.downstream.poll_ready(cx).map_err(Into::into)
    }

    fn call(&mut self, unit: Unit) -> Self::Future {
        // Hand the service that was driven to readiness to the future and
        // keep a fresh clone for the next call.
        let clone = self.downstream.clone();
        let downstream = std::mem::replace(&mut self.downstream, clone);

        ResponseFuture::new(unit, self.config.clone(), downstream)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::layer::CompressionLayer;
    use crate::unit::Content;
    use bytes::Bytes;
    use flate2::read::GzDecoder;
    use futures::executor::block_on;
    use std::convert::Infallible;
    use std::future::{Ready, ready};
    use std::io::Read;
    use std::sync::Mutex;
    use tower::{Layer, ServiceExt};

    /// Downstream stand-in that records every unit it receives.
    #[derive(Clone, Default)]
    struct Sink {
        seen: Arc<Mutex<Vec<Unit>>>,
    }

    impl Service<Unit> for Sink {
        type Response = ();
        type Error = Infallible;
        type Future = Ready<Result<(), Infallible>>;

        fn poll_ready(&mut self, _cx: &mut Context<'_>) -> Poll<Result<(), Self::Error>> {
            Poll::Ready(Ok(()))
        }

        fn call(&mut self, unit: Unit) -> Self::Future {
            self.seen.lock().unwrap().push(unit);
            ready(Ok(()))
        }
    }

    fn gunzip(data: &[u8]) -> Vec<u8> {
        let mut out = Vec::new();
        GzDecoder::new(data).read_to_end(&mut out).unwrap();
        out
    }

    #[test]
    fn test_transformed_unit_reaches_downstream() {
        let sink = Sink::default();
        let service = CompressionLayer::new().layer(sink.clone());

        let mut unit = Unit::from_buffer("bundle.js", "var x = 1;".repeat(40));
        unit.metadata.insert("stage".into(), "bundle".into());

        block_on(service.oneshot(unit)).unwrap();

        let seen = sink.seen.lock().unwrap();
        assert_eq!(seen.len(), 1);
        assert_eq!(seen[0].path, "bundle.js.gz");
        assert_eq!(seen[0].metadata.get("stage").map(String::as_str), Some("bundle"));

        match &seen[0].content {
            Content::Buffer(contents) => {
                assert_eq!(gunzip(contents), "var x = 1;".repeat(40).as_bytes());
            }
            other => panic!("expected buffered contents, got {other:?}"),
        }
    }

    #[test]
    fn test_failed_unit_is_not_forwarded() {
        let sink = Sink::default();
        let config = CompressionConfig::default().format("7z");
        let service = CompressionLayer::with_config(config).layer(sink.clone());

        let unit = Unit::from_buffer("a.txt", "contents");
        let result = block_on(service.oneshot(unit));

        assert!(result.is_err());
        assert!(sink.seen.lock().unwrap().is_empty());
    }

    #[test]
    fn test_marker_unit_is_forwarded_unchanged() {
        let sink = Sink::default();
        let service = CompressionLayer::new().layer(sink.clone());

        block_on(service.oneshot(Unit::marker("img/"))).unwrap();

        let seen = sink.seen.lock().unwrap();
        assert_eq!(seen.len(), 1);
        assert_eq!(seen[0].path, "img/");
        assert!(matches!(seen[0].content, Content::Empty));
    }

    #[test]
    fn test_service_handles_sequential_units() {
        let sink = Sink::default();
        let mut service = CompressionLayer::new().layer(sink.clone());

        block_on(async {
            for name in ["a.txt", "b.txt"] {
                let unit = Unit::from_buffer(name, "contents");
                let svc = service.ready().await.unwrap();
                svc.call(unit).await.unwrap();
            }
        });

        let seen = sink.seen.lock().unwrap();
        assert_eq!(seen.len(), 2);
        assert_eq!(seen[0].path, "a.txt.gz");
        assert_eq!(seen[1].path, "b.txt.gz");
    }
}
