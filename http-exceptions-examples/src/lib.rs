use std::net::SocketAddr;

use axum::extract::Path;
use axum::routing::get;
use axum::{Json, Router};
use http_exceptions_axum::prelude::*;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use validator::Validate;

/// Returns the server address from the HOST and PORT env vars, defaulting to
/// `0.0.0.0:3000`.
///
/// # Example
///
/// ```ignore
/// let addr = http_exceptions_examples::server_addr()?;
/// let listener = tokio::net::TcpListener::bind(addr).await?;
/// ```
pub fn server_addr() -> anyhow::Result<SocketAddr> {
    let host = std::env::var("HOST").unwrap_or_else(|_| "0.0.0.0".into());
    let port = std::env::var("PORT").unwrap_or_else(|_| "3000".into());
    Ok(format!("{host}:{port}").parse()?)
}

#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct User {
    #[validate(length(min = 1, message = "must not be empty"))]
    pub id: String,
    #[validate(length(min = 1, message = "must not be empty"))]
    pub name: String,
}

#[derive(Debug, Deserialize, Validate)]
pub struct CreateUser {
    #[validate(length(min = 1, message = "must not be empty"))]
    pub name: String,
    #[validate(email(message = "must be a valid email"))]
    pub email: String,
}

#[derive(Debug, Serialize)]
pub struct UserRef {
    pub id: String,
}

/// Id that never resolves to a user.
const MISSING_USER_ID: u32 = 404;

async fn get_user(Path(id): Path<u32>) -> Result<Json<User>, Raised> {
    if id == 0 {
        return Err(HttpException::bad_request("Invalid user id").into());
    }
    if id == MISSING_USER_ID {
        return Err(HttpException::not_found("user").into());
    }
    let user = User {
        id: id.to_string(),
        name: "Demo User".to_string(),
    };
    let user = validate_output(&TypedSchema::<User>::new(), &user)?;
    Ok(Json(user))
}

async fn get_user_ref(Path(id): Path<u32>) -> Json<HttpResponse<UserRef>> {
    Json(HttpResponse::ok(UserRef { id: id.to_string() }))
}

async fn delete_user(Path(_id): Path<u32>) -> Reply {
    Reply(HttpResponse::no_content())
}

async fn create_user(Json(body): Json<Value>) -> Result<Json<HttpResponse<User>>, Raised> {
    let input = validate_input(&TypedSchema::<CreateUser>::new(), body)?;
    tracing::info!(email = %input.email, "creating user");
    Ok(Json(HttpResponse::created(User {
        id: "42".to_string(),
        name: input.name,
    })))
}

async fn unauthorized() -> Result<Json<Value>, Raised> {
    Err(HttpException::unauthorized("Not authenticated").into())
}

async fn forbidden() -> Result<Json<Value>, Raised> {
    Err(HttpException::forbidden_with_reason("user", "not in org").into())
}

async fn server_error() -> Result<Json<Value>, Raised> {
    Err(HttpException::internal_server_error("Something went wrong").into())
}

async fn temporary_redirect() -> Result<Json<Value>, Raised> {
    Err(HttpException::temporary_redirect("https://example.com/x").into())
}

async fn permanent_redirect() -> Json<Value> {
    // Panicking with an exception is recovered the same way as returning it.
    std::panic::panic_any(HttpException::permanent_redirect("https://example.com/y"))
}

/// Build the demo router with both exception layers installed.
pub fn build_router() -> Router {
    let routes = Router::new()
        .route("/users", axum::routing::post(create_user))
        .route("/users/{id}", get(get_user).delete(delete_user))
        .route("/users/{id}/ref", get(get_user_ref))
        .route("/auth/unauthorized", get(unauthorized))
        .route("/auth/forbidden", get(forbidden))
        .route("/server-error", get(server_error))
        .route("/redirect/temporary", get(temporary_redirect))
        .route("/redirect/permanent", get(permanent_redirect));

    HttpExceptions::new().log_unhandled(true).apply(routes)
}
