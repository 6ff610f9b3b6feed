use axum::{
    extract::{Request, State},
    middleware::Next,
    response::Response,
};

use crate::auth::Session;
use crate::server::AppState;

/// Resolve the caller's session and inject it into request extensions.
///
/// Never rejects: anonymous callers pass through as `Session::Anonymous` and
/// each handler decides whether it needs an identity.
pub async fn session_middleware(
    State(state): State<AppState>,
    mut request: Request,
    next: Next,
) -> Response {
    let session = state.sessions.session(request.headers()).await;

    if let Session::Authenticated { user_id } = &session {
        tracing::debug!(user_id = %user_id, "Session resolved");
    }

    request.extensions_mut().insert(session);
    next.run(request).await
}
