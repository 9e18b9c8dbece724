//! Raised values travelling from a handler to the recovery hook.

use std::any::Any;
use std::error::Error;
use std::fmt;
use std::sync::{Arc, Mutex, PoisonError};

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use http_exceptions_core::{HttpException, from_error, recognize};
use serde_json::Value;

/// A value raised by a handler.
///
/// Use it as the error type of a handler so that `?` works on any error:
///
/// ```rust,ignore
/// async fn get_user(Path(id): Path<u32>) -> Result<Json<User>, Raised> {
///     let user = load(id).await?;                       // any std error
///     let user = user.ok_or_else(|| HttpException::not_found("user"))?;
///     Ok(Json(user))
/// }
/// ```
///
/// Converting a `Raised` into a response defers the decision to the recovery
/// hook (or the guard): the placeholder response is an empty 500 that carries
/// the value in its extensions.
pub enum Raised {
    /// A Rust error. Recognized when its source chain contains an
    /// [`HttpException`].
    Error(Box<dyn Error + Send + Sync>),
    /// A JSON value, recognized through its `isHttpException` marker or its
    /// `statusCode`/`message` shape.
    Json(Value),
    /// A panic payload caught by the recovery hook.
    Panic(Box<dyn Any + Send>),
}

impl Raised {
    /// Raise a JSON value.
    pub fn json(value: Value) -> Self {
        Self::Json(value)
    }

    /// Recognize the raised value as an HTTP failure.
    pub fn recognize(&self) -> Option<HttpException> {
        match self {
            Self::Error(err) => from_error(&**err),
            Self::Json(value) => HttpException::from_json(value),
            Self::Panic(payload) => recognize(&**payload),
        }
    }
}

impl<E> From<E> for Raised
where
    E: Error + Send + Sync + 'static,
{
    fn from(err: E) -> Self {
        Self::Error(Box::new(err))
    }
}

impl fmt::Display for Raised {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Error(err) => fmt::Display::fmt(err, f),
            Self::Json(value) => fmt::Display::fmt(value, f),
            Self::Panic(payload) => {
                if let Some(message) = payload.downcast_ref::<&str>() {
                    f.write_str(message)
                } else if let Some(message) = payload.downcast_ref::<String>() {
                    f.write_str(message)
                } else if let Some(exception) = payload.downcast_ref::<HttpException>() {
                    fmt::Display::fmt(exception, f)
                } else {
                    f.write_str("handler panicked")
                }
            }
        }
    }
}

impl fmt::Debug for Raised {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Error(err) => f.debug_tuple("Error").field(err).finish(),
            Self::Json(value) => f.debug_tuple("Json").field(value).finish(),
            Self::Panic(_) => f.debug_tuple("Panic").field(&self.to_string()).finish(),
        }
    }
}

/// Response extension holding a deferred [`Raised`] value.
///
/// Extensions must be `Clone`; the slot is shared and emptied by whoever
/// handles it first.
#[derive(Clone)]
pub(crate) struct RaisedSlot(Arc<Mutex<Option<Raised>>>);

impl RaisedSlot {
    fn new(raised: Raised) -> Self {
        Self(Arc::new(Mutex::new(Some(raised))))
    }

    pub(crate) fn take(&self) -> Option<Raised> {
        self.0.lock().unwrap_or_else(PoisonError::into_inner).take()
    }

    /// Recognize the held value without taking it.
    pub(crate) fn recognize(&self) -> Option<HttpException> {
        self.0
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .as_ref()
            .and_then(Raised::recognize)
    }
}

impl IntoResponse for Raised {
    fn into_response(self) -> Response {
        let mut response = StatusCode::INTERNAL_SERVER_ERROR.into_response();
        response.extensions_mut().insert(RaisedSlot::new(self));
        response
    }
}

/// Take the deferred raised value out of a response, if it carries one.
pub(crate) fn take_raised(response: &mut Response) -> Option<Raised> {
    response
        .extensions_mut()
        .remove::<RaisedSlot>()
        .and_then(|slot| slot.take())
}
