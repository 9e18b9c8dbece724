//! Middleware layers for HTTP exception handling.
//!
//! - [`RecoveryLayer`]: Intercepts raised failures (handler errors converted
//!   through [`Raised`](crate::Raised) and panics) and renders them.
//! - [`ShapingLayer`]: Intercepts returned JSON outcome envelopes and renders
//!   them.
//!
//! ## Layer Stack Order
//!
//! The recovery layer must wrap the shaping layer so that a raised failure
//! always wins over whatever the shaping layer would have done:
//!
//! ```rust,ignore
//! use http_exceptions_axum::{RecoveryLayer, ShapingLayer};
//!
//! let app = Router::new()
//!     .route("/users/{id}", get(get_user))
//!     .layer(ShapingLayer::new())     // Inner: returned outcomes
//!     .layer(RecoveryLayer::new());   // Outer: raised failures
//! ```
//!
//! [`HttpExceptions::apply`](crate::HttpExceptions::apply) installs both in
//! this order.

mod recovery;
mod shaping;

pub use recovery::{FallbackHandler, RecoveryLayer, RecoveryService};
pub use shaping::{DEFAULT_MAX_INSPECT_BYTES, ShapingLayer, ShapingService};

pub(crate) use shaping::shape;
