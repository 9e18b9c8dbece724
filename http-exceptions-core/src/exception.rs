//! The raise-able failure taxonomy.
//!
//! [`HttpException`] is the single error type a handler raises to end a request
//! with a well-known HTTP outcome. Its [`ExceptionKind`] fixes the status code;
//! the message is what the client sees in `{"error": "<message>"}`.
//!
//! ```
//! use http_exceptions_core::{ExceptionKind, HttpException};
//!
//! let err = HttpException::not_found_with_reason("user", "deleted");
//! assert_eq!(err.kind(), ExceptionKind::NotFound);
//! assert_eq!(err.status_code(), 404);
//! assert_eq!(err.message(), "user not found: deleted");
//! ```

use std::fmt::Display;
use std::panic::Location;

use serde::{Serialize, Serializer};

use crate::status;

/// Name of the marker field carried by the portable JSON form of an exception.
pub const MARKER_FIELD: &str = "isHttpException";

macro_rules! exception_kinds {
    ($( $(#[$meta:meta])* $kind:ident => $status:literal, $name:literal; )*) => {
        /// Closed set of failure variants, each bound to one HTTP status code.
        #[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
        pub enum ExceptionKind {
            $( $(#[$meta])* $kind, )*
            /// A failure recognized through the marker field whose status code
            /// is not in the registry. Always translated to a 500.
            Unregistered(u16),
        }

        impl ExceptionKind {
            /// Get the HTTP status code of this kind.
            pub fn status_code(&self) -> u16 {
                match self {
                    $( Self::$kind => $status, )*
                    Self::Unregistered(code) => *code,
                }
            }

            /// Get the snake_case name of this kind, used in logs.
            pub fn as_str(&self) -> &'static str {
                match self {
                    $( Self::$kind => $name, )*
                    Self::Unregistered(_) => "unregistered",
                }
            }

            /// Get the kind bound to a status code.
            ///
            /// 302 maps to [`TemporaryRedirect`](Self::TemporaryRedirect) and
            /// 301 to [`PermanentRedirect`](Self::PermanentRedirect). Codes that
            /// no kind is bound to map to [`Unregistered`](Self::Unregistered).
            pub fn from_status(code: u16) -> Self {
                match code {
                    $( $status => Self::$kind, )*
                    other => Self::Unregistered(other),
                }
            }
        }
    };
}

exception_kinds! {
    BadRequest => 400, "bad_request";
    Unauthorized => 401, "unauthorized";
    PaymentRequired => 402, "payment_required";
    Forbidden => 403, "forbidden";
    NotFound => 404, "not_found";
    MethodNotAllowed => 405, "method_not_allowed";
    NotAcceptable => 406, "not_acceptable";
    ProxyAuthenticationRequired => 407, "proxy_authentication_required";
    RequestTimeout => 408, "request_timeout";
    Conflict => 409, "conflict";
    Gone => 410, "gone";
    LengthRequired => 411, "length_required";
    PreconditionFailed => 412, "precondition_failed";
    PayloadTooLarge => 413, "payload_too_large";
    UriTooLong => 414, "uri_too_long";
    UnsupportedMediaType => 415, "unsupported_media_type";
    RangeNotSatisfiable => 416, "range_not_satisfiable";
    ExpectationFailed => 417, "expectation_failed";
    ImATeapot => 418, "im_a_teapot";
    MisdirectedRequest => 421, "misdirected_request";
    UnprocessableEntity => 422, "unprocessable_entity";
    Locked => 423, "locked";
    FailedDependency => 424, "failed_dependency";
    TooEarly => 425, "too_early";
    UpgradeRequired => 426, "upgrade_required";
    PreconditionRequired => 428, "precondition_required";
    TooManyRequests => 429, "too_many_requests";
    RequestHeaderFieldsTooLarge => 431, "request_header_fields_too_large";
    UnavailableForLegalReasons => 451, "unavailable_for_legal_reasons";
    InternalServerError => 500, "internal_server_error";
    NotImplemented => 501, "not_implemented";
    BadGateway => 502, "bad_gateway";
    ServiceUnavailable => 503, "service_unavailable";
    GatewayTimeout => 504, "gateway_timeout";
    HttpVersionNotSupported => 505, "http_version_not_supported";
    VariantAlsoNegotiates => 506, "variant_also_negotiates";
    InsufficientStorage => 507, "insufficient_storage";
    LoopDetected => 508, "loop_detected";
    NotExtended => 510, "not_extended";
    NetworkAuthenticationRequired => 511, "network_authentication_required";
    /// 302 redirect, carries a redirect URL.
    TemporaryRedirect => 302, "temporary_redirect";
    /// 301 redirect, carries a redirect URL.
    PermanentRedirect => 301, "permanent_redirect";
}

impl ExceptionKind {
    /// Whether this kind is one of the redirects.
    pub fn is_redirect(&self) -> bool {
        matches!(self, Self::TemporaryRedirect | Self::PermanentRedirect)
    }

    /// Reason phrase of the status code, used when no message is given.
    pub fn reason_phrase(&self) -> &'static str {
        status::reason_phrase(self.status_code()).unwrap_or("Unknown Error")
    }
}

impl Display for ExceptionKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Format the message of a 403: `Access denied to {resource}[: {reason}]`.
pub fn format_forbidden_message(resource: impl Display, reason: Option<&str>) -> String {
    match reason.filter(|r| !r.is_empty()) {
        Some(reason) => format!("Access denied to {resource}: {reason}"),
        None => format!("Access denied to {resource}"),
    }
}

/// Format the message of a 404: `{resource} not found[: {reason}]`.
pub fn format_not_found_message(resource: impl Display, reason: Option<&str>) -> String {
    match reason.filter(|r| !r.is_empty()) {
        Some(reason) => format!("{resource} not found: {reason}"),
        None => format!("{resource} not found"),
    }
}

/// A raised HTTP failure: a kind, a client-facing message, an optional
/// redirect URL and the source location it was constructed at.
///
/// Exceptions are immutable once built. The location is captured with
/// `#[track_caller]` and is only ever logged, never sent to the client.
#[derive(Clone, Debug, thiserror::Error)]
#[error("{message}")]
pub struct HttpException {
    kind: ExceptionKind,
    message: String,
    redirect_url: Option<String>,
    location: &'static Location<'static>,
}

impl HttpException {
    /// Create a new exception with a kind and message.
    ///
    /// An empty message is replaced by the reason phrase of the status code.
    /// Prefer the redirect constructors for redirect kinds, since this one
    /// does not set a redirect URL.
    #[track_caller]
    pub fn new<S: Into<String>>(kind: ExceptionKind, message: S) -> Self {
        let message = message.into();
        let message = if message.is_empty() {
            kind.reason_phrase().to_string()
        } else {
            message
        };
        Self {
            kind,
            message,
            redirect_url: None,
            location: Location::caller(),
        }
    }

    /// Create an exception from a raw status code.
    #[track_caller]
    pub fn from_status<S: Into<String>>(code: u16, message: S) -> Self {
        Self::new(ExceptionKind::from_status(code), message)
    }

    /// Create a 403 for a resource: `Access denied to {resource}`.
    #[track_caller]
    pub fn forbidden(resource: impl Display) -> Self {
        Self::new(
            ExceptionKind::Forbidden,
            format_forbidden_message(resource, None),
        )
    }

    /// Create a 403 for a resource with a reason:
    /// `Access denied to {resource}: {reason}`.
    #[track_caller]
    pub fn forbidden_with_reason(resource: impl Display, reason: &str) -> Self {
        Self::new(
            ExceptionKind::Forbidden,
            format_forbidden_message(resource, Some(reason)),
        )
    }

    /// Create a 404 for a resource: `{resource} not found`.
    #[track_caller]
    pub fn not_found(resource: impl Display) -> Self {
        Self::new(
            ExceptionKind::NotFound,
            format_not_found_message(resource, None),
        )
    }

    /// Create a 404 for a resource with a reason:
    /// `{resource} not found: {reason}`.
    #[track_caller]
    pub fn not_found_with_reason(resource: impl Display, reason: &str) -> Self {
        Self::new(
            ExceptionKind::NotFound,
            format_not_found_message(resource, Some(reason)),
        )
    }

    /// Create a 302 redirect to `url`.
    #[track_caller]
    pub fn temporary_redirect<S: Into<String>>(url: S) -> Self {
        Self::redirect_with_kind(ExceptionKind::TemporaryRedirect, url.into())
    }

    /// Create a 301 redirect to `url`.
    #[track_caller]
    pub fn permanent_redirect<S: Into<String>>(url: S) -> Self {
        Self::redirect_with_kind(ExceptionKind::PermanentRedirect, url.into())
    }

    /// Alias of [`temporary_redirect`](Self::temporary_redirect).
    #[track_caller]
    pub fn redirect<S: Into<String>>(url: S) -> Self {
        Self::temporary_redirect(url)
    }

    #[track_caller]
    fn redirect_with_kind(kind: ExceptionKind, url: String) -> Self {
        Self {
            kind,
            message: format!("Redirect to {url}"),
            redirect_url: Some(url),
            location: Location::caller(),
        }
    }

    /// Replace the message. Empty messages are ignored.
    pub fn with_message<S: Into<String>>(mut self, message: S) -> Self {
        let message = message.into();
        if !message.is_empty() {
            self.message = message;
        }
        self
    }

    /// Set the redirect URL. Used when rebuilding a redirect from its JSON form.
    pub(crate) fn with_redirect_url(mut self, url: Option<String>) -> Self {
        self.redirect_url = url;
        self
    }

    /// Get the kind.
    pub fn kind(&self) -> ExceptionKind {
        self.kind
    }

    /// Get the HTTP status code.
    pub fn status_code(&self) -> u16 {
        self.kind.status_code()
    }

    /// Get the client-facing message.
    pub fn message(&self) -> &str {
        &self.message
    }

    /// Get the redirect URL, for redirect kinds.
    pub fn redirect_url(&self) -> Option<&str> {
        self.redirect_url.as_deref()
    }

    /// Get the source location the exception was constructed at.
    pub fn location(&self) -> &'static Location<'static> {
        self.location
    }

    /// Whether this is a redirect.
    pub fn is_redirect(&self) -> bool {
        self.kind.is_redirect()
    }
}

macro_rules! message_constructors {
    ($( $ctor:ident => $kind:ident; )*) => {
        impl HttpException {
            $(
                #[doc = concat!("Create a `", stringify!($kind), "` exception with a message.")]
                #[track_caller]
                pub fn $ctor<S: Into<String>>(message: S) -> Self {
                    Self::new(ExceptionKind::$kind, message)
                }
            )*
        }
    };
}

message_constructors! {
    bad_request => BadRequest;
    unauthorized => Unauthorized;
    payment_required => PaymentRequired;
    method_not_allowed => MethodNotAllowed;
    not_acceptable => NotAcceptable;
    proxy_authentication_required => ProxyAuthenticationRequired;
    request_timeout => RequestTimeout;
    conflict => Conflict;
    gone => Gone;
    length_required => LengthRequired;
    precondition_failed => PreconditionFailed;
    payload_too_large => PayloadTooLarge;
    uri_too_long => UriTooLong;
    unsupported_media_type => UnsupportedMediaType;
    range_not_satisfiable => RangeNotSatisfiable;
    expectation_failed => ExpectationFailed;
    im_a_teapot => ImATeapot;
    misdirected_request => MisdirectedRequest;
    unprocessable_entity => UnprocessableEntity;
    locked => Locked;
    failed_dependency => FailedDependency;
    too_early => TooEarly;
    upgrade_required => UpgradeRequired;
    precondition_required => PreconditionRequired;
    too_many_requests => TooManyRequests;
    request_header_fields_too_large => RequestHeaderFieldsTooLarge;
    unavailable_for_legal_reasons => UnavailableForLegalReasons;
    internal_server_error => InternalServerError;
    not_implemented => NotImplemented;
    bad_gateway => BadGateway;
    service_unavailable => ServiceUnavailable;
    gateway_timeout => GatewayTimeout;
    http_version_not_supported => HttpVersionNotSupported;
    variant_also_negotiates => VariantAlsoNegotiates;
    insufficient_storage => InsufficientStorage;
    loop_detected => LoopDetected;
    not_extended => NotExtended;
    network_authentication_required => NetworkAuthenticationRequired;
}

/// The portable form of an exception.
///
/// ```json
/// {"statusCode": 404, "message": "user not found", "isHttpException": true}
/// ```
///
/// Redirects add `"redirectUrl"`. This is the form recognized by
/// [`HttpException::from_json`] after crossing a thread or process boundary.
impl Serialize for HttpException {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        use serde::ser::SerializeStruct;

        let len = if self.redirect_url.is_some() { 4 } else { 3 };
        let mut s = serializer.serialize_struct("HttpException", len)?;
        s.serialize_field("statusCode", &self.status_code())?;
        s.serialize_field("message", &self.message)?;
        s.serialize_field(MARKER_FIELD, &true)?;
        if let Some(url) = &self.redirect_url {
            s.serialize_field("redirectUrl", url)?;
        }
        s.end()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_message_constructors() {
        let err = HttpException::bad_request("Invalid input");
        assert_eq!(err.kind(), ExceptionKind::BadRequest);
        assert_eq!(err.status_code(), 400);
        assert_eq!(err.message(), "Invalid input");
        assert_eq!(err.to_string(), "Invalid input");

        let err = HttpException::unauthorized("Not authenticated");
        assert_eq!(err.status_code(), 401);

        let err = HttpException::internal_server_error("Server error");
        assert_eq!(err.kind(), ExceptionKind::InternalServerError);
        assert_eq!(err.status_code(), 500);

        let err = HttpException::conflict("duplicate");
        assert_eq!(err.status_code(), 409);

        let err = HttpException::too_many_requests("slow down");
        assert_eq!(err.status_code(), 429);

        let err = HttpException::network_authentication_required("login first");
        assert_eq!(err.status_code(), 511);
    }

    #[test]
    fn test_empty_message_falls_back_to_reason_phrase() {
        assert_eq!(HttpException::gone("").message(), "Gone");
        assert_eq!(
            HttpException::from_status(999, "").message(),
            "Unknown Error"
        );
    }

    #[test]
    fn test_forbidden_messages() {
        assert_eq!(
            HttpException::forbidden("user").message(),
            "Access denied to user"
        );
        let err = HttpException::forbidden_with_reason("project", "insufficient permissions");
        assert_eq!(err.status_code(), 403);
        assert_eq!(
            err.message(),
            "Access denied to project: insufficient permissions"
        );
    }

    #[test]
    fn test_not_found_messages() {
        assert_eq!(HttpException::not_found("asset").message(), "asset not found");
        let err = HttpException::not_found_with_reason("org", "deleted");
        assert_eq!(err.status_code(), 404);
        assert_eq!(err.message(), "org not found: deleted");
    }

    #[test]
    fn test_empty_reason_is_treated_as_absent() {
        assert_eq!(format_forbidden_message("user", Some("")), "Access denied to user");
        assert_eq!(format_not_found_message("user", Some("")), "user not found");
    }

    #[test]
    fn test_redirects() {
        let err = HttpException::temporary_redirect("https://example.com");
        assert_eq!(err.status_code(), 302);
        assert_eq!(err.redirect_url(), Some("https://example.com"));
        assert_eq!(err.message(), "Redirect to https://example.com");
        assert!(err.is_redirect());

        let err = HttpException::permanent_redirect("https://example.com/y")
            .with_message("Custom redirect message");
        assert_eq!(err.kind(), ExceptionKind::PermanentRedirect);
        assert_eq!(err.status_code(), 301);
        assert_eq!(err.message(), "Custom redirect message");

        assert_eq!(HttpException::redirect("/x").status_code(), 302);
    }

    #[test]
    fn test_from_status_round_trips_through_kind() {
        for code in crate::status::error_status_codes() {
            let kind = ExceptionKind::from_status(code);
            assert!(!matches!(kind, ExceptionKind::Unregistered(_)), "{code}");
            assert_eq!(kind.status_code(), code);
        }
        assert_eq!(ExceptionKind::from_status(302), ExceptionKind::TemporaryRedirect);
        assert_eq!(ExceptionKind::from_status(301), ExceptionKind::PermanentRedirect);
        assert_eq!(ExceptionKind::from_status(999), ExceptionKind::Unregistered(999));
    }

    #[test]
    fn test_location_points_at_caller() {
        let line = line!() + 1;
        let err = HttpException::not_found("user");
        assert_eq!(err.location().file(), file!());
        assert_eq!(err.location().line(), line);
    }

    #[test]
    fn test_serialize_portable_form() {
        let value = serde_json::to_value(HttpException::not_found("user")).unwrap();
        assert_eq!(
            value,
            json!({"statusCode": 404, "message": "user not found", "isHttpException": true})
        );

        let value = serde_json::to_value(HttpException::permanent_redirect("/y")).unwrap();
        assert_eq!(value["statusCode"], 301);
        assert_eq!(value["redirectUrl"], "/y");
    }
}
