use axum::http::HeaderValue;
use axum::middleware::{from_fn, from_fn_with_state};
use axum::routing::get;
use axum::Router;
use tower_http::cors::{AllowOrigin, Any, CorsLayer};
use tower_http::trace::TraceLayer;

use crate::config;
use crate::handlers::{admin, journal, public, user};
use crate::middleware::{authenticate, require_admin, require_user};
use crate::state::AppState;

/// Assemble the full application router. The authenticator wraps everything
/// (outermost layer, so it runs first); the per-tier guards are route layers
/// and run after it, which is where anonymous requests to protected routes
/// get rejected.
pub fn app(state: AppState) -> Router {
    Router::new()
        // Public
        .route("/", get(public::root))
        .route("/health", get(public::health))
        .merge(public_routes())
        // Authenticated
        .merge(journal_routes())
        .merge(user_routes())
        // Admin only
        .merge(admin_routes())
        // Global middleware
        .layer(from_fn_with_state(state.clone(), authenticate))
        .layer(cors_layer())
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

fn public_routes() -> Router<AppState> {
    use axum::routing::post;

    Router::new()
        .route("/api/v1/signup", post(public::signup))
        .route("/api/v1/login", post(public::login))
}

fn journal_routes() -> Router<AppState> {
    Router::new()
        .route(
            "/api/v1/journal",
            get(journal::list_mine).post(journal::create),
        )
        .route("/api/v1/journal/all", get(journal::list_all))
        .route(
            "/api/v1/journal/id/:id",
            get(journal::get_by_id)
                .put(journal::update)
                .delete(journal::delete),
        )
        .route_layer(from_fn(require_user))
}

fn user_routes() -> Router<AppState> {
    Router::new()
        .route("/api/v1/user", get(user::profile).put(user::update))
        .route_layer(from_fn(require_user))
}

fn admin_routes() -> Router<AppState> {
    Router::new()
        .route("/api/v1/admin/all-users", get(admin::list_users))
        .route_layer(from_fn(require_admin))
}

fn cors_layer() -> CorsLayer {
    let origins = &config::config().security.cors_origins;

    if origins.iter().any(|o| o == "*") {
        CorsLayer::permissive()
    } else {
        let allowed: Vec<HeaderValue> = origins.iter().filter_map(|o| o.parse().ok()).collect();
        CorsLayer::new()
            .allow_origin(AllowOrigin::list(allowed))
            .allow_methods(Any)
            .allow_headers(Any)
    }
}
