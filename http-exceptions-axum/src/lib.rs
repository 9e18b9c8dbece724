//! # http-exceptions for axum
//!
//! Uniform HTTP failure and outcome handling for [axum](https://github.com/tokio-rs/axum)
//! routers.
//!
//! Handlers express what happened as typed values: they raise an
//! [`HttpException`] ("not found", "forbidden", "redirect") or return an
//! [`HttpResponse`] ("ok with body", "no content"). This crate guarantees that
//! every one of those becomes a correctly shaped HTTP response:
//!
//! | status | body |
//! |---|---|
//! | 200/201 | the JSON value |
//! | 204/304 | none |
//! | 301/302 | none, `Location` header |
//! | 4xx/5xx | `{"error": "<message>"}` |
//!
//! ## Features
//!
//! - **Raised failures:** use [`Raised`] as the handler error type and `?`
//!   any error; a panic carrying an [`HttpException`] works too.
//! - **Returned outcomes:** return [`Reply`], or `Json(HttpResponse)` and let
//!   the shaping layer render it.
//! - **Two installation modes:** [`HttpExceptions::apply`] layers a whole
//!   router; [`guard`] wraps a single handler.
//! - **Validation:** [`validate_input`] and [`validate_output`] raise a 400 or
//!   a 500 listing every violation.
//!
//! ## Getting Started
//!
//! ```rust,ignore
//! use axum::{Json, Router, extract::Path, routing::get};
//! use http_exceptions_axum::prelude::*;
//!
//! async fn get_user(Path(id): Path<u32>) -> Result<Json<User>, Raised> {
//!     if id == 0 {
//!         return Err(HttpException::bad_request("Invalid user id").into());
//!     }
//!     let user = find_user(id).ok_or_else(|| HttpException::not_found("user"))?;
//!     Ok(Json(user))
//! }
//!
//! let app = HttpExceptions::new()
//!     .log_unhandled(true)
//!     .apply(Router::new().route("/users/{id}", get(get_user)));
//! ```

pub mod builder;
pub mod guard;
pub mod layer;
pub mod raised;
pub mod respond;

pub use builder::HttpExceptions;
pub use guard::{Guarded, guard};
pub use layer::{
    DEFAULT_MAX_INSPECT_BYTES, FallbackHandler, RecoveryLayer, RecoveryService, ShapingLayer,
    ShapingService,
};
pub use raised::Raised;
pub use respond::{
    Rendered, Reply, last_resort_response, render_exception, respond, respond_raw,
    violation_response,
};

// Re-export the framework-independent types
pub use http_exceptions_core;
pub use http_exceptions_core::{
    ErrorBody, ExceptionKind, HttpException, HttpResponse, RawOutcome, Schema, ShapeViolation,
    TypedSchema, Violation, is_failure, recognize, translate, validate_input, validate_output,
};

pub mod prelude {
    //! A prelude providing the most common types.
    pub use crate::builder::HttpExceptions;
    pub use crate::guard::guard;
    pub use crate::raised::Raised;
    pub use crate::respond::Reply;
    pub use http_exceptions_core::{
        ExceptionKind, HttpException, HttpResponse, Schema, TypedSchema, validate_input,
        validate_output,
    };
}
