//! Mapping from raised failures to outcome values.

use crate::exception::{ExceptionKind, HttpException};
use crate::response::HttpResponse;

/// Translate a failure into the outcome that represents it on the wire.
///
/// Redirects keep their own status and URL. Every registered error-bearing
/// status is kept unchanged with the exception's message as `error`. Anything
/// else becomes a 500 with the same message.
pub fn translate<T>(exception: &HttpException) -> HttpResponse<T> {
    match exception.kind() {
        ExceptionKind::TemporaryRedirect => {
            HttpResponse::Redirect(exception.redirect_url().unwrap_or_default().to_owned())
        }
        ExceptionKind::PermanentRedirect => {
            HttpResponse::PermanentRedirect(exception.redirect_url().unwrap_or_default().to_owned())
        }
        kind => HttpResponse::error(kind.status_code(), exception.message()),
    }
}

impl<T> From<HttpException> for HttpResponse<T> {
    fn from(exception: HttpException) -> Self {
        translate(&exception)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::response::ErrorBody;
    use crate::status;
    use http::StatusCode;
    use serde_json::Value;

    fn outcome(exception: HttpException) -> HttpResponse<Value> {
        translate(&exception)
    }

    #[test]
    fn test_named_shapes() {
        assert_eq!(
            outcome(HttpException::bad_request("Invalid user id")),
            HttpResponse::BadRequest(ErrorBody::new("Invalid user id"))
        );
        assert_eq!(
            outcome(HttpException::unauthorized("Not authenticated")),
            HttpResponse::Unauthorized(ErrorBody::new("Not authenticated"))
        );
        assert_eq!(
            outcome(HttpException::forbidden_with_reason("user", "not in org")),
            HttpResponse::Forbidden(ErrorBody::new("Access denied to user: not in org"))
        );
        assert_eq!(
            outcome(HttpException::not_found("user")),
            HttpResponse::NotFound(ErrorBody::new("user not found"))
        );
        assert_eq!(
            outcome(HttpException::internal_server_error("boom")),
            HttpResponse::InternalServerError(ErrorBody::new("boom"))
        );
    }

    #[test]
    fn test_every_error_bearing_status_is_preserved() {
        for code in status::error_status_codes() {
            let translated = outcome(HttpException::from_status(code, "m"));
            assert_eq!(translated.status_code(), code);
            assert_eq!(translated.error_body(), Some(&ErrorBody::new("m")));
        }
    }

    #[test]
    fn test_teapot_passes_through() {
        assert_eq!(
            outcome(HttpException::im_a_teapot("short and stout")),
            HttpResponse::Error(StatusCode::IM_A_TEAPOT, ErrorBody::new("short and stout"))
        );
    }

    #[test]
    fn test_redirects() {
        assert_eq!(
            outcome(HttpException::temporary_redirect("https://example.com/x")),
            HttpResponse::Redirect("https://example.com/x".into())
        );
        assert_eq!(
            outcome(HttpException::permanent_redirect("https://example.com/y")),
            HttpResponse::PermanentRedirect("https://example.com/y".into())
        );
    }

    #[test]
    fn test_unregistered_becomes_internal_server_error() {
        assert_eq!(
            outcome(HttpException::from_status(499, "client closed")),
            HttpResponse::InternalServerError(ErrorBody::new("client closed"))
        );
    }

    #[test]
    fn test_from_exception() {
        let response: HttpResponse = HttpException::gone("expired").into();
        assert_eq!(response.status_code(), 410);
    }
}
