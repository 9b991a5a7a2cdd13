use std::sync::Arc;
use tower::Layer;

use crate::config::CompressionConfig;
use crate::service::CompressionService;

/// A Tower layer that inserts content compression into a unit pipeline.
///
/// The configuration is resolved once and shared by every service the layer
/// produces.
#[derive(Debug, Clone, Default)]
pub struct CompressionLayer {
    config: Arc<CompressionConfig>,
}

impl CompressionLayer {
    /// Creates a compression layer with the default configuration: gzip,
    /// suffix appended, no size threshold.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a compression layer from an already-resolved configuration.
    pub fn with_config(config: CompressionConfig) -> Self {
        Self {
            config: Arc::new(config),
        }
    }

    /// Returns the configuration this layer installs.
    pub fn config(&self) -> &CompressionConfig {
        &self.config
    }
}

impl<S> Layer<S> for CompressionLayer {
    type Service = CompressionService<S>;

    fn layer(&self, inner: S) -> Self::Service {
        CompressionService::new(inner, self.config.clone())
    }
}
