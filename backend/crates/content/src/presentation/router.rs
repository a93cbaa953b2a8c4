//! Content Routers

use auth::{CredentialStore, GateState, RevocationStore, require_role};
use axum::{
    Router, middleware,
    routing::{get, put},
};

use crate::domain::repository::ContentRepository;
use crate::presentation::handlers::{self, ContentAppState};

/// Public read-only router
///
/// Mount under `/api/content`. Only published items are visible.
pub fn content_router<C>(state: ContentAppState<C>) -> Router
where
    C: ContentRepository + Send + Sync + 'static,
{
    Router::new()
        .route("/{kind}", get(handlers::list_published::<C>))
        .route("/{kind}/{key}", get(handlers::get_published::<C>))
        .with_state(state)
}

/// Administration router
///
/// Mount under `/api/admin/content`. Every route sits behind `gate`, which
/// should require the ADMIN role.
pub fn admin_content_router<C, A>(state: ContentAppState<C>, gate: GateState<A>) -> Router
where
    C: ContentRepository + Send + Sync + 'static,
    A: CredentialStore + RevocationStore + Send + Sync + 'static,
{
    Router::new()
        .route(
            "/{kind}",
            get(handlers::list_all::<C>).post(handlers::create::<C>),
        )
        .route(
            "/{kind}/{id}",
            put(handlers::update::<C>).delete(handlers::delete::<C>),
        )
        .route_layer(middleware::from_fn_with_state(gate, require_role::<A>))
        .with_state(state)
}
