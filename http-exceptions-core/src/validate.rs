//! Schema validation adapter.
//!
//! Converts a schema's pass/fail result into either the parsed value or a
//! raised [`HttpException`]: [`validate_input`] fails with a 400 because the
//! client sent bad data, [`validate_output`] fails with a 500 because the
//! server produced data that breaks its own contract.
//!
//! Any type implementing [`Schema`] can be used. [`TypedSchema`] covers the
//! common case of a `serde` + `validator` struct:
//!
//! ```
//! use http_exceptions_core::{validate_input, TypedSchema};
//! use serde::Deserialize;
//! use validator::Validate;
//!
//! #[derive(Deserialize, Validate)]
//! struct CreateUser {
//!     #[validate(length(min = 1, message = "must not be empty"))]
//!     name: String,
//! }
//!
//! let err = validate_input(&TypedSchema::<CreateUser>::new(), serde_json::json!({"name": ""}))
//!     .err()
//!     .unwrap();
//! assert_eq!(err.status_code(), 400);
//! assert_eq!(err.message(), "name: must not be empty");
//! ```

use std::fmt::{self, Display};
use std::marker::PhantomData;

use serde::Serialize;
use serde::de::DeserializeOwned;
use serde_json::Value;
use validator::{Validate, ValidationError, ValidationErrors, ValidationErrorsKind};

use crate::exception::HttpException;

/// Prefix of every output validation failure message.
pub const OUTPUT_FAILURE_PREFIX: &str = "Failed to validate output";

/// A single field-level violation.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Violation {
    /// Dotted path to the offending field (`items[0].name`); empty for the
    /// value itself.
    pub path: String,
    pub message: String,
}

impl Violation {
    pub fn new<P: Into<String>, M: Into<String>>(path: P, message: M) -> Self {
        Self {
            path: path.into(),
            message: message.into(),
        }
    }
}

impl Display for Violation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.path.is_empty() {
            f.write_str(&self.message)
        } else {
            write!(f, "{}: {}", self.path, self.message)
        }
    }
}

/// Join violations into one message: `"{path}: {message}"` separated by `"; "`.
pub fn join_violations(violations: &[Violation]) -> String {
    violations
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join("; ")
}

/// A schema that parses a JSON value into a typed output, or reports every
/// violation it found.
pub trait Schema {
    type Output;

    fn parse(&self, value: Value) -> Result<Self::Output, Vec<Violation>>;
}

impl<F, T> Schema for F
where
    F: Fn(Value) -> Result<T, Vec<Violation>>,
{
    type Output = T;

    fn parse(&self, value: Value) -> Result<T, Vec<Violation>> {
        self(value)
    }
}

/// Schema for a type that deserializes with `serde` and validates with
/// `validator`.
///
/// Parsing runs in two phases. Type errors are located with
/// `serde_path_to_error`, and serde aborts deserialization at the first one,
/// so a value with type errors yields exactly one violation and its rule
/// errors are not checked. Once the value deserializes, every `validator`
/// rule error is collected.
pub struct TypedSchema<T>(PhantomData<fn() -> T>);

impl<T> TypedSchema<T> {
    pub fn new() -> Self {
        Self(PhantomData)
    }
}

impl<T> Default for TypedSchema<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> Clone for TypedSchema<T> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<T> Copy for TypedSchema<T> {}

impl<T> fmt::Debug for TypedSchema<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("TypedSchema")
            .field(&std::any::type_name::<T>())
            .finish()
    }
}

impl<T> Schema for TypedSchema<T>
where
    T: DeserializeOwned + Validate,
{
    type Output = T;

    fn parse(&self, value: Value) -> Result<T, Vec<Violation>> {
        let parsed: T = serde_path_to_error::deserialize(value).map_err(|err| {
            let path = err.path().to_string();
            let path = if path == "." { String::new() } else { path };
            vec![Violation::new(path, err.into_inner().to_string())]
        })?;
        parsed.validate().map_err(|errors| violations(&errors))?;
        Ok(parsed)
    }
}

/// Flatten `validator` errors into violations sorted by path.
pub fn violations(errors: &ValidationErrors) -> Vec<Violation> {
    let mut out = Vec::new();
    collect(errors, "", &mut out);
    out.sort_by(|a, b| a.path.cmp(&b.path));
    out
}

fn collect(errors: &ValidationErrors, prefix: &str, out: &mut Vec<Violation>) {
    for (field, kind) in errors.errors() {
        let field = field.to_string();
        // struct-level rules are reported under the struct's own path
        let path = if field == "__all__" {
            prefix.to_owned()
        } else if prefix.is_empty() {
            field
        } else {
            format!("{prefix}.{field}")
        };
        match kind {
            ValidationErrorsKind::Field(errs) => {
                out.extend(errs.iter().map(|err| Violation::new(path.clone(), describe(err))));
            }
            ValidationErrorsKind::Struct(inner) => collect(inner, &path, out),
            ValidationErrorsKind::List(items) => {
                for (index, inner) in items {
                    collect(inner, &format!("{path}[{index}]"), out);
                }
            }
        }
    }
}

fn describe(err: &ValidationError) -> String {
    match &err.message {
        Some(message) => message.to_string(),
        None => format!("failed {} validation", err.code),
    }
}

/// Validate client input. Fails with a 400 listing every violation.
#[track_caller]
pub fn validate_input<S: Schema>(schema: &S, raw: Value) -> Result<S::Output, HttpException> {
    schema
        .parse(raw)
        .map_err(|violations| HttpException::bad_request(join_violations(&violations)))
}

/// Validate server output. Fails with a 500 whose message starts with
/// `Failed to validate output` followed by every violation.
#[track_caller]
pub fn validate_output<S, V>(schema: &S, value: &V) -> Result<S::Output, HttpException>
where
    S: Schema,
    V: Serialize + ?Sized,
{
    let detail = match serde_json::to_value(value) {
        Ok(raw) => match schema.parse(raw) {
            Ok(output) => return Ok(output),
            Err(violations) => join_violations(&violations),
        },
        Err(err) => err.to_string(),
    };
    Err(HttpException::internal_server_error(format!(
        "{OUTPUT_FAILURE_PREFIX}: {detail}"
    )))
}
