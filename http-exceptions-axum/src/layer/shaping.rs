//! Shaping layer for returned outcome values.
//!
//! Handlers that return `Json(HttpResponse::not_found("..."))` produce an
//! ordinary JSON response containing the outcome envelope. This layer buffers
//! such responses, recognizes the envelope and re-renders it with the right
//! status, headers and body.

use std::{
    future::Future,
    pin::Pin,
    task::{Context, Poll},
};

use axum::body::Body;
use axum::http::header::{CONTENT_LENGTH, CONTENT_TYPE};
use axum::http::{HeaderMap, Request};
use axum::response::Response;
use bytes::Bytes;
use http_body::Body as _;
use http_exceptions_core::{HttpResponse, RawOutcome};
use serde_json::Value;
use tower::{Layer, Service, ServiceExt};

use crate::raised::RaisedSlot;
use crate::respond::{Rendered, internal_error_response, respond, violation_response};

/// Default upper bound on the size of a streamed body the shaping layer
/// inspects.
pub const DEFAULT_MAX_INSPECT_BYTES: usize = 64 * 1024;

/// Layer that renders returned outcome envelopes.
///
/// Only responses that were not already rendered by this crate, carry no
/// raised value and have a JSON content type are inspected. Bodies of exact
/// size (everything `Json` produces) are always inspected. Bodies of unknown
/// size are inspected only when their upper bound fits the inspection limit,
/// otherwise they stream through untouched.
#[derive(Debug, Clone, Copy)]
pub struct ShapingLayer {
    max_inspect_bytes: usize,
}

impl Default for ShapingLayer {
    fn default() -> Self {
        Self {
            max_inspect_bytes: DEFAULT_MAX_INSPECT_BYTES,
        }
    }
}

impl ShapingLayer {
    /// Create a new ShapingLayer with the default inspection limit.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a new ShapingLayer that buffers bodies of unknown size only
    /// when they are at most `max_inspect_bytes` long.
    pub fn with_max_inspect_bytes(max_inspect_bytes: usize) -> Self {
        Self { max_inspect_bytes }
    }
}

impl<S> Layer<S> for ShapingLayer {
    type Service = ShapingService<S>;

    fn layer(&self, inner: S) -> Self::Service {
        ShapingService {
            inner,
            max_inspect_bytes: self.max_inspect_bytes,
        }
    }
}

/// Service that renders returned outcome envelopes.
#[derive(Debug, Clone)]
pub struct ShapingService<S> {
    inner: S,
    max_inspect_bytes: usize,
}

impl<S> Service<Request<Body>> for ShapingService<S>
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
        let max_inspect_bytes = self.max_inspect_bytes;

        Box::pin(async move {
            let response = inner.oneshot(req).await?;
            Ok(shape(response, max_inspect_bytes).await)
        })
    }
}

/// Re-render a response if its body is an outcome envelope.
pub(crate) async fn shape(response: Response, max_inspect_bytes: usize) -> Response {
    if response.extensions().get::<Rendered>().is_some()
        || response.extensions().get::<RaisedSlot>().is_some()
        || !is_json(response.headers())
    {
        return response;
    }
    let hint = response.body().size_hint();
    // an exact size means the body is already in memory
    let limit = match (hint.exact(), hint.upper()) {
        (Some(_), _) => usize::MAX,
        (None, Some(upper)) if upper <= max_inspect_bytes as u64 => max_inspect_bytes,
        _ => return response,
    };

    let (parts, body) = response.into_parts();
    let bytes: Bytes = match axum::body::to_bytes(body, limit).await {
        Ok(bytes) => bytes,
        Err(err) => {
            tracing::error!(%err, "failed to buffer response body for shaping");
            return internal_error_response();
        }
    };

    let outcome = serde_json::from_slice::<Value>(&bytes)
        .ok()
        .as_ref()
        .and_then(RawOutcome::from_json);
    let Some(raw) = outcome else {
        return Response::from_parts(parts, Body::from(bytes));
    };

    tracing::debug!(status = raw.status_code, "rendering returned outcome envelope");
    match HttpResponse::try_from(raw) {
        Ok(outcome) => {
            let mut shaped = respond(outcome);
            carry_headers(&parts.headers, shaped.headers_mut());
            shaped
        }
        Err(violation) => violation_response(&violation),
    }
}

/// Copy headers set by the handler that the rendered response does not set
/// itself. Body framing headers are never copied.
fn carry_headers(from: &HeaderMap, to: &mut HeaderMap) {
    for name in from.keys() {
        if name == CONTENT_TYPE || name == CONTENT_LENGTH || to.contains_key(name) {
            continue;
        }
        for value in from.get_all(name) {
            to.append(name.clone(), value.clone());
        }
    }
}

fn is_json(headers: &HeaderMap) -> bool {
    headers
        .get(CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .and_then(|ct| ct.split(';').next())
        .map(|mime| {
            let mime = mime.trim();
            mime.eq_ignore_ascii_case("application/json") || mime.ends_with("+json")
        })
        .unwrap_or(false)
}
