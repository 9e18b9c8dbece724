//! Per-handler exception handling for routers without the layers.
//!
//! [`guard`] wraps a single handler and applies the same recognition,
//! translation and shaping the layer pair applies, so a guarded handler
//! produces byte-identical responses to an unguarded one behind
//! [`HttpExceptions::apply`](crate::HttpExceptions::apply).
//!
//! ```rust,ignore
//! use http_exceptions_axum::guard;
//!
//! let app = Router::new().route("/users/{id}", get(guard(get_user)));
//! ```

use std::future::Future;
use std::panic::AssertUnwindSafe;
use std::pin::Pin;

use axum::extract::Request;
use axum::handler::Handler;
use axum::response::Response;
use futures::FutureExt;
use http_exceptions_core::recognize;

use crate::layer::{DEFAULT_MAX_INSPECT_BYTES, shape};
use crate::raised::RaisedSlot;
use crate::respond::render_exception;

/// A handler wrapped by [`guard`].
#[derive(Debug, Clone, Copy)]
pub struct Guarded<H>(pub H);

/// Wrap a handler so that its failures and returned outcomes are rendered
/// canonically.
///
/// Panics carrying a recognized failure are rendered; any other panic is
/// resumed. A raised value that is not a failure is returned unchanged, so
/// an outer recovery layer can still handle it.
pub fn guard<H>(handler: H) -> Guarded<H> {
    Guarded(handler)
}

impl<H, T, S> Handler<T, S> for Guarded<H>
where
    H: Handler<T, S>,
    T: 'static,
    S: Send + 'static,
{
    type Future = Pin<Box<dyn Future<Output = Response> + Send>>;

    fn call(self, req: Request, state: S) -> Self::Future {
        let handler = self.0;
        Box::pin(async move {
            let result = AssertUnwindSafe(async move {
                <H as Handler<T, S>>::call(handler, req, state).await
            })
            .catch_unwind()
            .await;
            match result {
                Ok(response) => guard_response(response).await,
                Err(payload) => match recognize(&*payload) {
                    Some(exception) => render_exception(&exception),
                    None => std::panic::resume_unwind(payload),
                },
            }
        })
    }
}

async fn guard_response(response: Response) -> Response {
    if let Some(slot) = response.extensions().get::<RaisedSlot>() {
        return match slot.recognize() {
            Some(exception) => render_exception(&exception),
            None => response,
        };
    }
    shape(response, DEFAULT_MAX_INSPECT_BYTES).await
}
