//! Auth Router

use axum::{
    Router, middleware,
    routing::{delete, get, patch, post},
};

use crate::domain::repository::{CredentialStore, RevocationStore};
use crate::domain::value_object::user_role::UserRole;
use crate::presentation::handlers::{self, AuthAppState};
use crate::presentation::middleware::{GateState, require_role};

/// Create the Auth router for any repository implementation
///
/// Mount under `/api/auth`.
pub fn auth_router<R>(state: AuthAppState<R>) -> Router
where
    R: CredentialStore + RevocationStore + Clone + Send + Sync + 'static,
{
    let public = Router::new()
        .route("/signin", post(handlers::sign_in::<R>))
        .route("/signout", post(handlers::sign_out::<R>))
        .route("/signout/all", post(handlers::sign_out_all::<R>))
        .route("/session", get(handlers::session_status::<R>))
        .route("/signup", post(handlers::sign_up::<R>));

    let user = Router::new()
        .route("/password", post(handlers::change_password::<R>))
        .route_layer(middleware::from_fn_with_state(
            gate(&state, UserRole::User),
            require_role::<R>,
        ));

    let admin = Router::new()
        .route(
            "/users",
            get(handlers::list_users::<R>).post(handlers::create_user::<R>),
        )
        .route("/users/{id}/role", patch(handlers::change_role::<R>))
        .route("/users/{id}", delete(handlers::delete_user::<R>))
        .route_layer(middleware::from_fn_with_state(
            gate(&state, UserRole::Admin),
            require_role::<R>,
        ));

    public.merge(user).merge(admin).with_state(state)
}

/// Gate state sharing the router's repository and configuration
pub fn gate<R>(state: &AuthAppState<R>, required: UserRole) -> GateState<R>
where
    R: CredentialStore + RevocationStore + Clone + Send + Sync + 'static,
{
    GateState::new(state.repo.clone(), state.config.clone(), required)
}
