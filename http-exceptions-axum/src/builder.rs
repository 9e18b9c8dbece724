//! Composition root for the recovery and shaping layers.
//!
//! [`HttpExceptions`] collects the configuration of both layers and installs
//! them on a router in the right order.
//!
//! # Examples
//!
//! ```rust,no_run
//! use axum::Router;
//! use axum::response::IntoResponse;
//! use axum::http::StatusCode;
//! use http_exceptions_axum::HttpExceptions;
//!
//! let app: Router = HttpExceptions::new()
//!     .log_unhandled(true)
//!     .fallback(|raised| (StatusCode::SERVICE_UNAVAILABLE, raised.to_string()).into_response())
//!     .apply(Router::new());
//! ```

use std::fmt;
use std::sync::Arc;

use axum::Router;
use axum::response::Response;

use crate::layer::{DEFAULT_MAX_INSPECT_BYTES, FallbackHandler, RecoveryLayer, ShapingLayer};
use crate::raised::Raised;

/// Builder for the exception handling layers.
#[derive(Clone)]
pub struct HttpExceptions {
    /// Log unrecognized raised values before handling them
    log_unhandled: bool,
    /// Handler for unrecognized raised values
    fallback: Option<FallbackHandler>,
    /// Largest response body the shaping layer buffers
    max_inspect_bytes: usize,
}

impl Default for HttpExceptions {
    fn default() -> Self {
        Self {
            log_unhandled: false,
            fallback: None,
            max_inspect_bytes: DEFAULT_MAX_INSPECT_BYTES,
        }
    }
}

impl HttpExceptions {
    /// Creates a new `HttpExceptions` with logging off, no fallback and the
    /// default inspection limit.
    pub fn new() -> Self {
        Self::default()
    }

    /// Log unrecognized raised values at `error` level.
    pub fn log_unhandled(mut self, enabled: bool) -> Self {
        self.log_unhandled = enabled;
        self
    }

    /// Handle unrecognized raised values with `fallback` instead of the raw
    /// 500 serialization.
    pub fn fallback<F>(mut self, fallback: F) -> Self
    where
        F: Fn(Raised) -> Response + Send + Sync + 'static,
    {
        self.fallback = Some(Arc::new(fallback));
        self
    }

    /// Set the largest response body the shaping layer buffers.
    pub fn max_inspect_bytes(mut self, max_inspect_bytes: usize) -> Self {
        self.max_inspect_bytes = max_inspect_bytes;
        self
    }

    /// Build the recovery layer.
    pub fn recovery_layer(&self) -> RecoveryLayer {
        RecoveryLayer::new()
            .log_unhandled(self.log_unhandled)
            .with_fallback(self.fallback.clone())
    }

    /// Build the shaping layer.
    pub fn shaping_layer(&self) -> ShapingLayer {
        ShapingLayer::with_max_inspect_bytes(self.max_inspect_bytes)
    }

    /// Install both layers on `router`, recovery outermost.
    ///
    /// Layers apply to the routes present when this is called, so call it
    /// after adding every route.
    pub fn apply<S>(self, router: Router<S>) -> Router<S>
    where
        S: Clone + Send + Sync + 'static,
    {
        router
            .layer(self.shaping_layer())
            .layer(self.recovery_layer())
    }
}

impl fmt::Debug for HttpExceptions {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("HttpExceptions")
            .field("log_unhandled", &self.log_unhandled)
            .field("fallback", &self.fallback.is_some())
            .field("max_inspect_bytes", &self.max_inspect_bytes)
            .finish()
    }
}
