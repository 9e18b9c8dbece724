//! Return-able outcome values.
//!
//! [`HttpResponse`] is a tagged union keyed by status code. Each variant
//! populates exactly one of {body, redirect URL, nothing}, so a well-typed
//! outcome cannot carry a body on a 204 or miss the `Location` of a 302.
//!
//! [`RawOutcome`] is the untyped envelope form of the same value,
//! `{"statusCode": .., "body": .., "redirectUrl": ..}`, which is what a
//! serialized [`HttpResponse`] looks like on its way to the shaping hook.

use http::StatusCode;
use serde::ser::SerializeStruct;
use serde::{Deserialize, Serialize, Serializer};
use serde_json::Value;

use crate::status::{self, StatusClass};

/// Body of every error-bearing response: `{"error": "<message>"}`.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorBody {
    pub error: String,
}

impl ErrorBody {
    pub fn new<S: Into<String>>(error: S) -> Self {
        Self {
            error: error.into(),
        }
    }
}

/// A typed HTTP outcome.
#[derive(Clone, Debug, PartialEq)]
pub enum HttpResponse<T = Value> {
    /// 200 with a JSON body.
    Ok(T),
    /// 201 with a JSON body.
    Created(T),
    /// 204, no body.
    NoContent,
    /// 302 with a `Location` header.
    Redirect(String),
    /// 301 with a `Location` header.
    PermanentRedirect(String),
    /// 304, no body.
    NotModified,
    BadRequest(ErrorBody),
    Unauthorized(ErrorBody),
    Forbidden(ErrorBody),
    NotFound(ErrorBody),
    InternalServerError(ErrorBody),
    /// Any other registered error-bearing status.
    Error(StatusCode, ErrorBody),
}

impl<T> HttpResponse<T> {
    pub fn ok(body: T) -> Self {
        Self::Ok(body)
    }

    pub fn created(body: T) -> Self {
        Self::Created(body)
    }

    pub fn no_content() -> Self {
        Self::NoContent
    }

    pub fn not_modified() -> Self {
        Self::NotModified
    }

    pub fn redirect<S: Into<String>>(url: S) -> Self {
        Self::Redirect(url.into())
    }

    pub fn permanent_redirect<S: Into<String>>(url: S) -> Self {
        Self::PermanentRedirect(url.into())
    }

    pub fn bad_request<S: Into<String>>(message: S) -> Self {
        Self::BadRequest(ErrorBody::new(message))
    }

    pub fn unauthorized<S: Into<String>>(message: S) -> Self {
        Self::Unauthorized(ErrorBody::new(message))
    }

    pub fn forbidden<S: Into<String>>(message: S) -> Self {
        Self::Forbidden(ErrorBody::new(message))
    }

    pub fn not_found<S: Into<String>>(message: S) -> Self {
        Self::NotFound(ErrorBody::new(message))
    }

    pub fn internal_server_error<S: Into<String>>(message: S) -> Self {
        Self::InternalServerError(ErrorBody::new(message))
    }

    /// Create an error-bearing outcome for any status code.
    ///
    /// 400/401/403/404/500 produce their named variants, other registered
    /// error-bearing codes produce [`Error`](Self::Error), and anything else
    /// produces an [`InternalServerError`](Self::InternalServerError) with the
    /// same message.
    pub fn error<S: Into<String>>(code: u16, message: S) -> Self {
        let body = ErrorBody::new(message);
        match code {
            400 => Self::BadRequest(body),
            401 => Self::Unauthorized(body),
            403 => Self::Forbidden(body),
            404 => Self::NotFound(body),
            500 => Self::InternalServerError(body),
            code if status::is_error_bearing(code) => match StatusCode::from_u16(code) {
                Ok(status) => Self::Error(status, body),
                Err(_) => Self::InternalServerError(body),
            },
            _ => Self::InternalServerError(body),
        }
    }

    /// Get the status code of this outcome.
    pub fn status_code(&self) -> u16 {
        match self {
            Self::Ok(_) => 200,
            Self::Created(_) => 201,
            Self::NoContent => 204,
            Self::PermanentRedirect(_) => 301,
            Self::Redirect(_) => 302,
            Self::NotModified => 304,
            Self::BadRequest(_) => 400,
            Self::Unauthorized(_) => 401,
            Self::Forbidden(_) => 403,
            Self::NotFound(_) => 404,
            Self::InternalServerError(_) => 500,
            Self::Error(status, _) => status.as_u16(),
        }
    }

    /// Get the error body, for error-bearing outcomes.
    pub fn error_body(&self) -> Option<&ErrorBody> {
        match self {
            Self::BadRequest(body)
            | Self::Unauthorized(body)
            | Self::Forbidden(body)
            | Self::NotFound(body)
            | Self::InternalServerError(body)
            | Self::Error(_, body) => Some(body),
            _ => None,
        }
    }

    /// Get the redirect URL, for redirect outcomes.
    pub fn redirect_url(&self) -> Option<&str> {
        match self {
            Self::Redirect(url) | Self::PermanentRedirect(url) => Some(url),
            _ => None,
        }
    }
}

impl<T: Serialize> HttpResponse<T> {
    /// Serialize the body and check every shape rule that the type system
    /// does not already enforce.
    ///
    /// On success the outcome is ready to be written to the wire: success
    /// bodies are a JSON object, a JSON array or `null` (rendered empty),
    /// redirect URLs are non-empty and [`Error`](Self::Error) carries an
    /// error-bearing status.
    pub fn normalize(self) -> Result<HttpResponse<Value>, ShapeViolation> {
        let status = self.status_code();
        Ok(match self {
            Self::Ok(body) => HttpResponse::Ok(success_body(status, &body)?),
            Self::Created(body) => HttpResponse::Created(success_body(status, &body)?),
            Self::NoContent => HttpResponse::NoContent,
            Self::NotModified => HttpResponse::NotModified,
            Self::Redirect(url) => HttpResponse::Redirect(redirect_url(status, url)?),
            Self::PermanentRedirect(url) => {
                HttpResponse::PermanentRedirect(redirect_url(status, url)?)
            }
            Self::BadRequest(body) => HttpResponse::BadRequest(body),
            Self::Unauthorized(body) => HttpResponse::Unauthorized(body),
            Self::Forbidden(body) => HttpResponse::Forbidden(body),
            Self::NotFound(body) => HttpResponse::NotFound(body),
            Self::InternalServerError(body) => HttpResponse::InternalServerError(body),
            Self::Error(code, body) => {
                if !status::is_error_bearing(code.as_u16()) {
                    return Err(ShapeViolation::NotErrorBearing(code.as_u16()));
                }
                HttpResponse::Error(code, body)
            }
        })
    }
}

/// Serialize a success body, requiring a JSON object, array or `null`.
pub fn success_body<T: Serialize>(status: u16, body: &T) -> Result<Value, ShapeViolation> {
    let value =
        serde_json::to_value(body).map_err(|e| ShapeViolation::Serialize(e.to_string()))?;
    match value {
        Value::Null | Value::Object(_) | Value::Array(_) => Ok(value),
        other => Err(ShapeViolation::BodyNotStructured {
            status,
            found: json_type_name(&other),
        }),
    }
}

fn redirect_url(status: u16, url: String) -> Result<String, ShapeViolation> {
    if url.is_empty() {
        Err(ShapeViolation::MissingRedirectUrl(status))
    } else {
        Ok(url)
    }
}

/// Name of a JSON value's type, for violation messages.
pub fn json_type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

/// A returned value that claims to be an outcome but breaks its tag's rules.
#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
pub enum ShapeViolation {
    #[error("unknown status code {0}")]
    UnknownStatus(u16),

    #[error("status {status} requires a JSON object or array body, found {found}")]
    BodyNotStructured { status: u16, found: &'static str },

    #[error("status {0} must not carry a body")]
    UnexpectedBody(u16),

    #[error("status {0} requires a body with a string `error` field")]
    MissingErrorField(u16),

    #[error("status {0} requires a non-empty redirect URL")]
    MissingRedirectUrl(u16),

    #[error("status {0} must not carry a redirect URL")]
    UnexpectedRedirectUrl(u16),

    #[error("invalid redirect URL: {0}")]
    InvalidRedirectUrl(String),

    #[error("status {0} is not an error-bearing status")]
    NotErrorBearing(u16),

    #[error("failed to serialize body: {0}")]
    Serialize(String),
}

/// The untyped envelope form of an outcome.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawOutcome {
    pub status_code: u16,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub body: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub redirect_url: Option<String>,
}

const ENVELOPE_KEYS: [&str; 3] = ["statusCode", "body", "redirectUrl"];

impl RawOutcome {
    /// Recognize an outcome envelope in a JSON value.
    ///
    /// The value must be an object with a registered numeric `statusCode`,
    /// no keys outside the envelope, and a string `redirectUrl` if one is
    /// present. Whether the fields suit the status is checked later, when
    /// converting into an [`HttpResponse`].
    pub fn from_json(value: &Value) -> Option<Self> {
        let object = value.as_object()?;
        if object.keys().any(|key| !ENVELOPE_KEYS.contains(&key.as_str())) {
            return None;
        }
        let status_code = object
            .get("statusCode")?
            .as_u64()
            .and_then(|code| u16::try_from(code).ok())
            .filter(|code| status::is_known(*code))?;
        let redirect_url = match object.get("redirectUrl") {
            None | Some(Value::Null) => None,
            Some(Value::String(url)) => Some(url.clone()),
            Some(_) => return None,
        };
        Some(Self {
            status_code,
            body: object.get("body").cloned(),
            redirect_url,
        })
    }
}

impl TryFrom<RawOutcome> for HttpResponse<Value> {
    type Error = ShapeViolation;

    fn try_from(raw: RawOutcome) -> Result<Self, ShapeViolation> {
        let RawOutcome {
            status_code,
            body,
            redirect_url,
        } = raw;
        let body = body.filter(|body| !body.is_null());
        let class =
            status::class_of(status_code).ok_or(ShapeViolation::UnknownStatus(status_code))?;

        if class != StatusClass::Redirect && redirect_url.is_some() {
            return Err(ShapeViolation::UnexpectedRedirectUrl(status_code));
        }

        match class {
            StatusClass::Body => {
                let body = match body {
                    None => Value::Null,
                    Some(body) => success_body(status_code, &body)?,
                };
                Ok(if status_code == 201 {
                    HttpResponse::Created(body)
                } else {
                    HttpResponse::Ok(body)
                })
            }
            StatusClass::Empty => {
                if body.is_some() {
                    return Err(ShapeViolation::UnexpectedBody(status_code));
                }
                Ok(if status_code == 304 {
                    HttpResponse::NotModified
                } else {
                    HttpResponse::NoContent
                })
            }
            StatusClass::Redirect => {
                if body.is_some() {
                    return Err(ShapeViolation::UnexpectedBody(status_code));
                }
                let url = redirect_url
                    .filter(|url| !url.is_empty())
                    .ok_or(ShapeViolation::MissingRedirectUrl(status_code))?;
                Ok(if status_code == 301 {
                    HttpResponse::PermanentRedirect(url)
                } else {
                    HttpResponse::Redirect(url)
                })
            }
            StatusClass::Error => {
                let message = body
                    .as_ref()
                    .and_then(|body| body.get("error"))
                    .and_then(Value::as_str)
                    .ok_or(ShapeViolation::MissingErrorField(status_code))?;
                Ok(HttpResponse::error(status_code, message))
            }
        }
    }
}

/// Serializes to the envelope form recognized by [`RawOutcome::from_json`].
///
/// ```
/// use http_exceptions_core::HttpResponse;
///
/// let value = serde_json::to_value(HttpResponse::<()>::not_found("user not found")).unwrap();
/// assert_eq!(value["statusCode"], 404);
/// assert_eq!(value["body"]["error"], "user not found");
/// ```
impl<T: Serialize> Serialize for HttpResponse<T> {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        let mut s = serializer.serialize_struct("HttpResponse", 2)?;
        s.serialize_field("statusCode", &self.status_code())?;
        match self {
            Self::Ok(body) | Self::Created(body) => s.serialize_field("body", body)?,
            Self::Redirect(url) | Self::PermanentRedirect(url) => {
                s.serialize_field("redirectUrl", url)?
            }
            Self::NoContent | Self::NotModified => {}
            Self::BadRequest(body)
            | Self::Unauthorized(body)
            | Self::Forbidden(body)
            | Self::NotFound(body)
            | Self::InternalServerError(body)
            | Self::Error(_, body) => s.serialize_field("body", body)?,
        }
        s.end()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn raw(value: Value) -> RawOutcome {
        RawOutcome::from_json(&value).expect("envelope should be recognized")
    }

    fn shape(raw: RawOutcome) -> Result<HttpResponse, ShapeViolation> {
        HttpResponse::try_from(raw)
    }

    #[test]
    fn test_error_normalizes_named_codes() {
        assert_eq!(
            HttpResponse::<()>::error(404, "x"),
            HttpResponse::NotFound(ErrorBody::new("x"))
        );
        assert_eq!(
            HttpResponse::<()>::error(409, "dup"),
            HttpResponse::Error(StatusCode::CONFLICT, ErrorBody::new("dup"))
        );
        assert_eq!(
            HttpResponse::<()>::error(418, "teapot").status_code(),
            418
        );
        assert_eq!(
            HttpResponse::<()>::error(499, "x"),
            HttpResponse::InternalServerError(ErrorBody::new("x"))
        );
    }

    #[test]
    fn test_status_codes() {
        assert_eq!(HttpResponse::ok(json!({})).status_code(), 200);
        assert_eq!(HttpResponse::created(json!({})).status_code(), 201);
        assert_eq!(HttpResponse::<()>::no_content().status_code(), 204);
        assert_eq!(HttpResponse::<()>::redirect("/a").status_code(), 302);
        assert_eq!(HttpResponse::<()>::permanent_redirect("/a").status_code(), 301);
        assert_eq!(HttpResponse::<()>::not_modified().status_code(), 304);
        assert_eq!(HttpResponse::<()>::unauthorized("x").status_code(), 401);
    }

    #[test]
    fn test_normalize_rejects_scalar_bodies() {
        let err = HttpResponse::ok("just a string").normalize().unwrap_err();
        assert_eq!(
            err,
            ShapeViolation::BodyNotStructured {
                status: 200,
                found: "string"
            }
        );
        assert!(HttpResponse::ok(json!([1, 2])).normalize().is_ok());
        assert!(HttpResponse::ok(()).normalize().is_ok());
    }

    #[test]
    fn test_normalize_rejects_empty_redirect() {
        let err = HttpResponse::<()>::redirect("").normalize().unwrap_err();
        assert_eq!(err, ShapeViolation::MissingRedirectUrl(302));
    }

    #[test]
    fn test_normalize_rejects_non_error_status_in_error_variant() {
        let outcome = HttpResponse::<()>::Error(StatusCode::OK, ErrorBody::new("x"));
        assert_eq!(
            outcome.normalize().unwrap_err(),
            ShapeViolation::NotErrorBearing(200)
        );
    }

    #[test]
    fn test_envelope_recognition() {
        assert!(RawOutcome::from_json(&json!({"statusCode": 204})).is_some());
        assert!(RawOutcome::from_json(&json!({"statusCode": 999})).is_none());
        assert!(RawOutcome::from_json(&json!({"statusCode": "200"})).is_none());
        assert!(RawOutcome::from_json(&json!({"statusCode": 200, "name": "x"})).is_none());
        assert!(RawOutcome::from_json(&json!({"id": 1})).is_none());
        assert!(RawOutcome::from_json(&json!([1])).is_none());
    }

    #[test]
    fn test_try_from_success() {
        let outcome = shape(raw(json!({"statusCode": 201, "body": {"id": 1}})));
        assert_eq!(outcome, Ok(HttpResponse::Created(json!({"id": 1}))));

        let outcome = shape(raw(json!({"statusCode": 200})));
        assert_eq!(outcome, Ok(HttpResponse::Ok(Value::Null)));
    }

    #[test]
    fn test_try_from_special_codes() {
        assert_eq!(
            shape(raw(json!({"statusCode": 304}))),
            Ok(HttpResponse::NotModified)
        );
        assert_eq!(
            shape(raw(json!({"statusCode": 204, "body": {"a": 1}}))),
            Err(ShapeViolation::UnexpectedBody(204))
        );
        assert_eq!(
            shape(raw(json!({"statusCode": 301, "redirectUrl": "/new"}))),
            Ok(HttpResponse::PermanentRedirect("/new".into()))
        );
        assert_eq!(
            shape(raw(json!({"statusCode": 302}))),
            Err(ShapeViolation::MissingRedirectUrl(302))
        );
        assert_eq!(
            shape(raw(json!({"statusCode": 200, "redirectUrl": "/x"}))),
            Err(ShapeViolation::UnexpectedRedirectUrl(200))
        );
    }

    #[test]
    fn test_try_from_error_codes() {
        assert_eq!(
            shape(raw(json!({"statusCode": 404, "body": {"error": "gone"}}))),
            Ok(HttpResponse::NotFound(ErrorBody::new("gone")))
        );
        assert_eq!(
            shape(raw(json!({"statusCode": 404, "body": {"error": 1}}))),
            Err(ShapeViolation::MissingErrorField(404))
        );
        assert_eq!(
            shape(raw(json!({"statusCode": 503}))),
            Err(ShapeViolation::MissingErrorField(503))
        );
    }

    #[test]
    fn test_serialize_envelope_round_trips() {
        let outcome = HttpResponse::created(json!({"id": 7}));
        let value = serde_json::to_value(&outcome).unwrap();
        assert_eq!(value, json!({"statusCode": 201, "body": {"id": 7}}));
        assert_eq!(shape(raw(value)), Ok(outcome));

        let value = serde_json::to_value(HttpResponse::<()>::redirect("/r")).unwrap();
        assert_eq!(value, json!({"statusCode": 302, "redirectUrl": "/r"}));

        let value = serde_json::to_value(HttpResponse::<()>::no_content()).unwrap();
        assert_eq!(value, json!({"statusCode": 204}));
    }
}
