//! Rendering of outcome values onto axum responses.
//!
//! Everything that writes status lines, headers and body bytes for an outcome
//! lives here. The hooks and the guard only decide *what* to render.

use axum::body::Body;
use axum::http::{HeaderValue, StatusCode, header};
use axum::response::{IntoResponse, Response};
use http_exceptions_core::{
    ErrorBody, HttpException, HttpResponse, RawOutcome, ShapeViolation, translate,
};
use serde::Serialize;
use serde_json::Value;

/// Marker extension set on every response produced by this crate.
///
/// Responses carrying it are final: neither hook touches them again.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Rendered;

/// Render a typed outcome.
///
/// Shape violations (a scalar success body, an empty redirect URL, a
/// non-error status in [`HttpResponse::Error`]) become a 500 whose `error`
/// names the violation.
pub fn respond<T: Serialize>(outcome: HttpResponse<T>) -> Response {
    match outcome.normalize() {
        Ok(outcome) => write(outcome),
        Err(violation) => violation_response(&violation),
    }
}

/// Render an untyped outcome envelope.
pub fn respond_raw(raw: RawOutcome) -> Response {
    match HttpResponse::try_from(raw) {
        Ok(outcome) => respond(outcome),
        Err(violation) => violation_response(&violation),
    }
}

/// Translate and render a recognized failure.
///
/// Failures that end up as a 500 are logged with their origin location first,
/// since the client only ever sees the message.
pub fn render_exception(exception: &HttpException) -> Response {
    let outcome: HttpResponse = translate(exception);
    if outcome.status_code() == 500 {
        tracing::error!(
            error = %exception,
            kind = %exception.kind(),
            location = %exception.location(),
            "internal server error"
        );
    }
    respond(outcome)
}

fn write(outcome: HttpResponse<Value>) -> Response {
    let status = StatusCode::from_u16(outcome.status_code())
        .unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
    match outcome {
        HttpResponse::Ok(body) | HttpResponse::Created(body) => {
            if body.is_null() {
                empty_response(status)
            } else {
                json_response(status, &body)
            }
        }
        HttpResponse::NoContent | HttpResponse::NotModified => empty_response(status),
        HttpResponse::Redirect(url) | HttpResponse::PermanentRedirect(url) => {
            let Ok(location) = HeaderValue::from_str(&url) else {
                return violation_response(&ShapeViolation::InvalidRedirectUrl(url));
            };
            let mut response = empty_response(status);
            response.headers_mut().insert(header::LOCATION, location);
            response
        }
        HttpResponse::BadRequest(body)
        | HttpResponse::Unauthorized(body)
        | HttpResponse::Forbidden(body)
        | HttpResponse::NotFound(body)
        | HttpResponse::InternalServerError(body)
        | HttpResponse::Error(_, body) => json_response(status, &body),
    }
}

/// Render a shape violation as `500 {"error": "<violation>"}`.
pub fn violation_response(violation: &ShapeViolation) -> Response {
    tracing::error!(%violation, "outcome shape violation");
    json_response(
        StatusCode::INTERNAL_SERVER_ERROR,
        &ErrorBody::new(violation.to_string()),
    )
}

/// Raw serialization used for unrecognized raised values when no fallback
/// handler is configured.
///
/// ```json
/// {"statusCode": 500, "error": "Internal Server Error", "message": "<display>"}
/// ```
pub fn last_resort_response(message: &str) -> Response {
    json_response(
        StatusCode::INTERNAL_SERVER_ERROR,
        &serde_json::json!({
            "statusCode": 500,
            "error": "Internal Server Error",
            "message": message,
        }),
    )
}

fn empty_response(status: StatusCode) -> Response {
    let mut response = Response::new(Body::empty());
    *response.status_mut() = status;
    response.extensions_mut().insert(Rendered);
    response
}

fn json_response<T: Serialize + ?Sized>(status: StatusCode, body: &T) -> Response {
    let bytes = match serde_json::to_vec(body) {
        Ok(bytes) => bytes,
        Err(err) => {
            tracing::error!(%err, "failed to serialize response body");
            return internal_error_response();
        }
    };
    let mut response = Response::builder()
        .status(status)
        .header(header::CONTENT_TYPE, HeaderValue::from_static("application/json"))
        .body(Body::from(bytes))
        .unwrap_or_else(|_| internal_error_response());
    response.extensions_mut().insert(Rendered);
    response
}

/// Create a safe 500 response that cannot fail.
pub(crate) fn internal_error_response() -> Response {
    // Hardcoded JSON that cannot fail - no dynamic content
    const ERROR_BODY: &[u8] = br#"{"error":"Internal Server Error"}"#;

    let mut response = Response::builder()
        .status(StatusCode::INTERNAL_SERVER_ERROR)
        .header(header::CONTENT_TYPE, HeaderValue::from_static("application/json"))
        .body(Body::from(ERROR_BODY))
        .unwrap_or_else(|_| {
            // Ultimate fallback - empty 500 response
            let mut response = Response::new(Body::empty());
            *response.status_mut() = StatusCode::INTERNAL_SERVER_ERROR;
            response
        });
    response.extensions_mut().insert(Rendered);
    response
}

/// An [`HttpResponse`] returned from a handler.
///
/// Renders directly through [`respond`]. Handlers can also return
/// `Json(HttpResponse)`, which the shaping hook recognizes and renders the
/// same way.
///
/// ```rust,ignore
/// async fn delete_user() -> Reply {
///     Reply(HttpResponse::no_content())
/// }
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct Reply<T = Value>(pub HttpResponse<T>);

impl<T> From<HttpResponse<T>> for Reply<T> {
    fn from(outcome: HttpResponse<T>) -> Self {
        Self(outcome)
    }
}

impl<T: Serialize> IntoResponse for Reply<T> {
    fn into_response(self) -> Response {
        respond(self.0)
    }
}
