//! Server library - exposes the modules and the router for the integration tests

pub mod core;
pub mod dtos;
pub mod entities;
pub mod repositories;
pub mod services;
pub mod storage;

pub use crate::core::{AppError, AppState, Config, auth, config};
pub use services::health;

use axum::{
    Router,
    extract::DefaultBodyLimit,
    middleware,
    routing::{get, post, put},
};
use std::sync::Arc;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

const MAX_IMAGE_BYTES: usize = 10 * 1024 * 1024;

/// Builds the application router
pub fn create_router(state: Arc<AppState>) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route("/health", get(health))
        .merge(configure_home_route(state.clone()))
        .nest("/auth", configure_auth_routes())
        .nest("/users", configure_user_routes(state.clone()))
        .nest("/properties", configure_property_routes(state.clone()))
        .nest("/dashboard", configure_dashboard_routes(state.clone()))
        .nest("/inbox", configure_inbox_routes(state.clone()))
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .with_state(state)
}

/// Home page: open to everyone, personalised when a token is present
fn configure_home_route(state: Arc<AppState>) -> Router<Arc<AppState>> {
    use crate::core::identity_middleware;
    use services::home;

    Router::new()
        .route("/", get(home))
        .route_layer(middleware::from_fn_with_state(state, identity_middleware))
}

/// Account routes (register, login, logout, password reset)
fn configure_auth_routes() -> Router<Arc<AppState>> {
    use services::*;

    Router::new()
        .route("/register", post(register_user))
        .route("/login", post(login_user))
        .route("/logout", post(logout_user))
        .route("/password-reset/verify", post(password_reset_verify))
        .route("/password-reset/confirm", post(password_reset_confirm))
}

/// Settings of the authenticated user
fn configure_user_routes(state: Arc<AppState>) -> Router<Arc<AppState>> {
    use crate::core::authentication_middleware;
    use services::*;

    Router::new()
        .route("/me", get(get_settings).put(update_settings))
        .route("/me/password", put(change_password))
        .layer(middleware::from_fn_with_state(
            state,
            authentication_middleware,
        ))
}

/// Catalogue routes: the detail page is public, everything else needs a login
fn configure_property_routes(state: Arc<AppState>) -> Router<Arc<AppState>> {
    use crate::core::authentication_middleware;
    use services::*;

    let public_routes = Router::new().route("/{property_id}", get(property_detail));

    let private_routes = Router::new()
        .route("/", get(property_list))
        .route("/{property_id}/messages", post(send_inquiry))
        .route("/{property_id}/favorite", post(toggle_favorite))
        .layer(middleware::from_fn_with_state(
            state,
            authentication_middleware,
        ));

    public_routes.merge(private_routes)
}

/// Seller-only routes (authentication + seller guard)
fn configure_dashboard_routes(state: Arc<AppState>) -> Router<Arc<AppState>> {
    use crate::core::{authentication_middleware, seller_guard_middleware};
    use services::*;

    Router::new()
        .route("/", get(seller_dashboard))
        .route("/properties", post(add_property))
        .route(
            "/properties/{property_id}",
            put(edit_property).delete(delete_property),
        )
        .route(
            "/images",
            post(upload_image).layer(DefaultBodyLimit::max(MAX_IMAGE_BYTES)),
        )
        .layer(middleware::from_fn(seller_guard_middleware))
        .layer(middleware::from_fn_with_state(
            state,
            authentication_middleware,
        ))
}

/// Conversations of the authenticated user
fn configure_inbox_routes(state: Arc<AppState>) -> Router<Arc<AppState>> {
    use crate::core::authentication_middleware;
    use services::*;

    Router::new()
        .route("/", get(list_conversations))
        .route(
            "/{user_id}",
            get(get_conversation).post(reply_in_conversation),
        )
        .layer(middleware::from_fn_with_state(
            state,
            authentication_middleware,
        ))
}
