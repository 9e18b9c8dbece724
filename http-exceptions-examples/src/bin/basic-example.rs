//! Example: every outcome shape behind the exception layers
//!
//! Run with: cargo run --bin basic-example
//! Logging is controlled with RUST_LOG (default `info`).

use http_exceptions_examples::{build_router, server_addr};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()))
        .init();

    let app = build_router();

    let addr = server_addr()?;
    let listener = tokio::net::TcpListener::bind(addr).await?;

    println!("=== Example: http-exceptions ===");
    println!("Server listening on http://{}", addr);
    println!();
    println!("Endpoints:");
    println!("  GET    /users/{{id}}         - 200 user, 400 for id 0, 404 for id 404");
    println!("  GET    /users/{{id}}/ref     - 200 returned outcome envelope");
    println!("  DELETE /users/{{id}}         - 204");
    println!("  POST   /users              - 201, or 400 listing every violation");
    println!("  GET    /auth/unauthorized  - 401");
    println!("  GET    /auth/forbidden     - 403");
    println!("  GET    /server-error       - 500");
    println!("  GET    /redirect/temporary - 302");
    println!("  GET    /redirect/permanent - 301");
    println!();
    println!("Test with:");
    println!("  curl -i http://localhost:{}/users/404", addr.port());

    axum::serve(listener, app).await?;
    Ok(())
}
