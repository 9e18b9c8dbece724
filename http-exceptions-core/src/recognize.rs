//! Recognition of failures that lost their concrete type.
//!
//! A raised value reaches the recovery hook either as a typed
//! [`HttpException`], wrapped inside another error's `source()` chain, or as
//! JSON after crossing a thread or process boundary. These functions decide
//! whether such a value is an HTTP failure and rebuild the exception if so.

use std::any::Any;
use std::error::Error;

use serde::{Deserialize, Deserializer};
use serde_json::{Map, Value};

use crate::exception::{ExceptionKind, HttpException, MARKER_FIELD};
use crate::status;

/// Recognize an arbitrary raised value.
///
/// Accepts an [`HttpException`], a [`serde_json::Value`], or a boxed error
/// whose source chain contains an [`HttpException`]. Pass `&*payload` for a
/// panic payload, not the box itself.
pub fn recognize(value: &dyn Any) -> Option<HttpException> {
    if let Some(exception) = value.downcast_ref::<HttpException>() {
        return Some(exception.clone());
    }
    if let Some(json) = value.downcast_ref::<Value>() {
        return HttpException::from_json(json);
    }
    if let Some(err) = value.downcast_ref::<Box<dyn Error + Send + Sync>>() {
        return from_error(err.as_ref());
    }
    None
}

/// Whether an arbitrary raised value is an HTTP failure.
pub fn is_failure(value: &dyn Any) -> bool {
    recognize(value).is_some()
}

/// Find an [`HttpException`] in an error or its source chain.
pub fn from_error(err: &(dyn Error + 'static)) -> Option<HttpException> {
    let mut current = Some(err);
    while let Some(err) = current {
        if let Some(exception) = err.downcast_ref::<HttpException>() {
            return Some(exception.clone());
        }
        current = err.source();
    }
    None
}

impl HttpException {
    /// Rebuild an exception from its portable JSON form.
    ///
    /// The `isHttpException` marker takes precedence over everything else. A
    /// present but falsy marker rejects the object. A truthy marker always
    /// yields an exception: a missing or invalid `statusCode` becomes 500 and
    /// a missing `message` becomes the reason phrase. Without the marker the
    /// object needs a registered failure `statusCode` and a string `message`.
    #[track_caller]
    pub fn from_json(value: &Value) -> Option<Self> {
        let object = value.as_object()?;

        match object.get(MARKER_FIELD) {
            Some(marker) if !is_truthy(marker) => None,
            Some(_) => {
                let code = status_code(object)
                    .filter(|code| (300..600).contains(code))
                    .unwrap_or(500);
                let message = object
                    .get("message")
                    .and_then(Value::as_str)
                    .unwrap_or_default();
                Some(build(code, message, object))
            }
            None => {
                let code = status_code(object).filter(|code| status::is_failure_status(*code))?;
                let message = object.get("message")?.as_str()?;
                Some(build(code, message, object))
            }
        }
    }
}

#[track_caller]
fn build(code: u16, message: &str, object: &Map<String, Value>) -> HttpException {
    let redirect_url = object
        .get("redirectUrl")
        .and_then(Value::as_str)
        .map(str::to_owned);
    let kind = ExceptionKind::from_status(code);
    match kind {
        ExceptionKind::TemporaryRedirect | ExceptionKind::PermanentRedirect => {
            let url = redirect_url.unwrap_or_default();
            let exception = if kind == ExceptionKind::PermanentRedirect {
                HttpException::permanent_redirect(url)
            } else {
                HttpException::temporary_redirect(url)
            };
            exception.with_message(message)
        }
        _ => HttpException::new(kind, message).with_redirect_url(redirect_url),
    }
}

fn status_code(object: &Map<String, Value>) -> Option<u16> {
    object
        .get("statusCode")
        .and_then(Value::as_u64)
        .and_then(|code| u16::try_from(code).ok())
}

fn is_truthy(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Bool(b) => *b,
        Value::Number(n) => n.as_f64().is_some_and(|n| n != 0.0 && !n.is_nan()),
        Value::String(s) => !s.is_empty(),
        Value::Array(_) | Value::Object(_) => true,
    }
}

impl<'de> Deserialize<'de> for HttpException {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let value = Value::deserialize(deserializer)?;
        HttpException::from_json(&value)
            .ok_or_else(|| serde::de::Error::custom("value is not an HTTP exception"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[derive(Debug, thiserror::Error)]
    #[error("loading user failed")]
    struct Wrapper(#[source] HttpException);

    #[test]
    fn test_non_objects_are_not_failures() {
        assert!(!is_failure(&Value::Null));
        assert!(!is_failure(&json!("string")));
        assert!(!is_failure(&json!({})));
        assert!(!is_failure(&"plain str"));
        assert!(!is_failure(&42_u32));
    }

    #[test]
    fn test_typed_exception_is_recognized() {
        let exception = HttpException::not_found("user");
        let recognized = recognize(&exception).unwrap();
        assert_eq!(recognized.status_code(), 404);
        assert_eq!(recognized.message(), "user not found");
    }

    #[test]
    fn test_shaped_object_is_recognized() {
        assert!(is_failure(&json!({"statusCode": 400, "message": "x"})));

        let exception = HttpException::from_json(&json!({"statusCode": 409, "message": "dup"})).unwrap();
        assert_eq!(exception.kind(), ExceptionKind::Conflict);
        assert_eq!(exception.message(), "dup");
    }

    #[test]
    fn test_unknown_status_without_marker_is_not_a_failure() {
        assert!(!is_failure(&json!({"statusCode": 999, "message": "x"})));
        assert!(!is_failure(&json!({"statusCode": 200, "message": "ok"})));
        assert!(!is_failure(&json!({"statusCode": 400})));
        assert!(!is_failure(&json!({"statusCode": "400", "message": "x"})));
    }

    #[test]
    fn test_marker_false_overrides_shape() {
        assert!(!is_failure(&json!({
            "statusCode": 400,
            "message": "x",
            "isHttpException": false
        })));
        assert!(!is_failure(&json!({
            "statusCode": 400,
            "message": "x",
            "isHttpException": 0
        })));
    }

    #[test]
    fn test_marker_true_fills_defaults() {
        let exception = HttpException::from_json(&json!({"isHttpException": true})).unwrap();
        assert_eq!(exception.status_code(), 500);
        assert_eq!(exception.message(), "Internal Server Error");

        let exception =
            HttpException::from_json(&json!({"isHttpException": true, "statusCode": 12})).unwrap();
        assert_eq!(exception.status_code(), 500);

        let exception = HttpException::from_json(&json!({
            "isHttpException": true,
            "statusCode": 499,
            "message": "client closed"
        }))
        .unwrap();
        assert_eq!(exception.kind(), ExceptionKind::Unregistered(499));
        assert_eq!(exception.message(), "client closed");
    }

    #[test]
    fn test_redirect_round_trip_through_json() {
        let original = HttpException::permanent_redirect("/new").with_message("moved");
        let value = serde_json::to_value(&original).unwrap();
        let rebuilt = HttpException::from_json(&value).unwrap();
        assert_eq!(rebuilt.kind(), ExceptionKind::PermanentRedirect);
        assert_eq!(rebuilt.redirect_url(), Some("/new"));
        assert_eq!(rebuilt.message(), "moved");
    }

    #[test]
    fn test_deserialize() {
        let exception: HttpException =
            serde_json::from_str(r#"{"statusCode":403,"message":"nope","isHttpException":true}"#)
                .unwrap();
        assert_eq!(exception.kind(), ExceptionKind::Forbidden);

        let err = serde_json::from_str::<HttpException>(r#"{"statusCode":200}"#).unwrap_err();
        assert!(err.to_string().contains("not an HTTP exception"));
    }

    #[test]
    fn test_source_chain_is_walked() {
        let boxed: Box<dyn Error + Send + Sync> =
            Box::new(Wrapper(HttpException::forbidden("project")));
        let recognized = recognize(&boxed).unwrap();
        assert_eq!(recognized.status_code(), 403);
        assert_eq!(recognized.message(), "Access denied to project");

        let plain: Box<dyn Error + Send + Sync> = "io failed".into();
        assert!(!is_failure(&plain));
    }

    #[test]
    fn test_panic_payload_is_recognized() {
        let payload = std::panic::catch_unwind(|| {
            std::panic::panic_any(HttpException::unauthorized("Not authenticated"))
        })
        .unwrap_err();
        let recognized = recognize(&*payload).unwrap();
        assert_eq!(recognized.status_code(), 401);
    }
}
