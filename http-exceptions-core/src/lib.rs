//! Core types for http-exceptions.
//!
//! This crate holds everything that does not depend on a web framework and is
//! shared by the axum binding (`http-exceptions-axum`).
//!
//! ## Modules
//!
//! - [`status`]: Status registry and status classifications
//! - [`exception`]: The raise-able failure taxonomy ([`HttpException`])
//! - [`recognize`]: Recognition of failures that lost their concrete type
//! - [`response`]: The return-able outcome values ([`HttpResponse`])
//! - [`translate`]: Mapping from failures to outcomes
//! - [`validate`]: Schema validation adapter

pub mod exception;
pub mod recognize;
pub mod response;
pub mod status;
pub mod translate;
pub mod validate;

pub use exception::*;
pub use recognize::*;
pub use response::*;
pub use status::StatusClass;
pub use translate::*;
pub use validate::*;
