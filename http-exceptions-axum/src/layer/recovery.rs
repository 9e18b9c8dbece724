//! Recovery layer for raised failures.
//!
//! See the [parent module](super) documentation for how it composes with the
//! shaping layer.

use std::fmt;
use std::panic::AssertUnwindSafe;
use std::sync::Arc;
use std::{
    future::Future,
    pin::Pin,
    task::{Context, Poll},
};

use axum::body::Body;
use axum::http::Request;
use axum::response::Response;
use futures::FutureExt;
use tower::{Layer, Service, ServiceExt};

use crate::raised::{Raised, take_raised};
use crate::respond::{last_resort_response, render_exception};

/// Handler for raised values that are not HTTP failures.
pub type FallbackHandler = Arc<dyn Fn(Raised) -> Response + Send + Sync>;

/// Layer that turns raised failures into canonical responses.
///
/// Catches panics escaping the inner service and responses carrying a
/// deferred [`Raised`] value. Recognized failures are translated and
/// rendered; anything else goes to the fallback handler, or is serialized as
/// a raw 500 when there is none.
#[derive(Clone, Default)]
pub struct RecoveryLayer {
    log_unhandled: bool,
    fallback: Option<FallbackHandler>,
}

impl RecoveryLayer {
    /// Create a new RecoveryLayer with no fallback handler.
    pub fn new() -> Self {
        Self::default()
    }

    /// Log unrecognized raised values at `error` level before handling them.
    pub fn log_unhandled(mut self, enabled: bool) -> Self {
        self.log_unhandled = enabled;
        self
    }

    /// Handle unrecognized raised values with `fallback`.
    pub fn fallback<F>(mut self, fallback: F) -> Self
    where
        F: Fn(Raised) -> Response + Send + Sync + 'static,
    {
        self.fallback = Some(Arc::new(fallback));
        self
    }

    pub(crate) fn with_fallback(mut self, fallback: Option<FallbackHandler>) -> Self {
        self.fallback = fallback;
        self
    }

    /// Render a raised value.
    pub fn recover(&self, raised: Raised) -> Response {
        if let Some(exception) = raised.recognize() {
            return render_exception(&exception);
        }
        if self.log_unhandled {
            tracing::error!(error = %raised, "unhandled value raised by handler");
        }
        match &self.fallback {
            Some(fallback) => fallback(raised),
            None => last_resort_response(&raised.to_string()),
        }
    }
}

impl fmt::Debug for RecoveryLayer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RecoveryLayer")
            .field("log_unhandled", &self.log_unhandled)
            .field("fallback", &self.fallback.is_some())
            .finish()
    }
}

impl<S> Layer<S> for RecoveryLayer {
    type Service = RecoveryService<S>;

    fn layer(&self, inner: S) -> Self::Service {
        RecoveryService {
            inner,
            layer: self.clone(),
        }
    }
}

/// Service that turns raised failures into canonical responses.
#[derive(Debug, Clone)]
pub struct RecoveryService<S> {
    inner: S,
    layer: RecoveryLayer,
}

impl<S> Service<Request<Body>> for RecoveryService<S>
where
    S: Service<Request<Body>, Response = Response> + Clone + Send + 'static,
    S::Error: Send + 'static,
    S::Future: Send + 'static,
{
    type Response = Response;
    type Error = S::Error;
    type Future = Pin<Box<dyn Future<Output = Result<Response, S::Error>> + Send>>;

    fn poll_ready(&mut self, cx: &mut Context<'_>) -> Poll<Result<(), Self::Error>> {
        self.inner.poll_ready(cx)
    }

    fn call(&mut self, req: Request<Body>) -> Self::Future {
        let inner = self.inner.clone();
        let inner = std::mem::replace(&mut self.inner, inner);
        let layer = self.layer.clone();

        Box::pin(async move {
            match AssertUnwindSafe(inner.oneshot(req)).catch_unwind().await {
                Ok(Ok(mut response)) => match take_raised(&mut response) {
                    Some(raised) => Ok(layer.recover(raised)),
                    None => Ok(response),
                },
                Ok(Err(err)) => Err(err),
                Err(payload) => Ok(layer.recover(Raised::Panic(payload))),
            }
        })
    }
}
