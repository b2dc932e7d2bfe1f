//! Request Context Middleware

use axum::{extract::Request, middleware::Next, response::Response};
use tracing::debug;

use crate::registry::RequestContext;

/// Runs the rest of the request inside a fresh `RequestContext`, so every
/// context-local cache touched while serving it starts empty and is dropped
/// with the request.
pub async fn request_context(request: Request, next: Next) -> Response {
    let context = RequestContext::new();
    debug!(
        request_id = context.id(),
        method = %request.method(),
        uri = %request.uri(),
        "request context opened"
    );
    context.scope(next.run(request)).await
}
