//! Router Assembly

use std::sync::Arc;

use auth::{AuthAppState, CredentialStore, RevocationStore, UserRole, auth_router, gate};
use axum::Router;
use axum::http::{HeaderValue, Method, header};
use content::{ContentAppState, ContentRepository, admin_content_router, content_router};
use tower_http::cors::{AllowHeaders, AllowMethods, CorsLayer};
use tower_http::trace::TraceLayer;

/// Full API router
///
/// - `/api/auth` - sign-in, sessions, identity administration
/// - `/api/content` - published content, no session needed
/// - `/api/admin/content` - content administration, ADMIN only
pub fn build_router<A, C>(
    auth_state: AuthAppState<A>,
    content_repo: Arc<C>,
    frontend_origins: &[String],
) -> Router
where
    A: CredentialStore + RevocationStore + Clone + Send + Sync + 'static,
    C: ContentRepository + Send + Sync + 'static,
{
    let content_state = ContentAppState::new(content_repo, auth_state.audit.clone());
    let admin_gate = gate(&auth_state, UserRole::Admin);

    Router::new()
        .nest("/api/auth", auth_router(auth_state))
        .nest("/api/content", content_router(content_state.clone()))
        .nest(
            "/api/admin/content",
            admin_content_router(content_state, admin_gate),
        )
        .layer(TraceLayer::new_for_http())
        .layer(cors_layer(frontend_origins))
}

fn cors_layer(frontend_origins: &[String]) -> CorsLayer {
    let allowed_origins: Vec<HeaderValue> = frontend_origins
        .iter()
        .filter_map(|origin| origin.parse().ok())
        .collect();

    CorsLayer::new()
        .allow_origin(allowed_origins)
        .allow_methods(AllowMethods::list([
            Method::GET,
            Method::POST,
            Method::PUT,
            Method::PATCH,
            Method::DELETE,
            Method::OPTIONS,
        ]))
        .allow_headers(AllowHeaders::list([
            header::CONTENT_TYPE,
            header::AUTHORIZATION,
            header::ACCEPT,
        ]))
        .allow_credentials(true)
}
