//! Rutas de la API
//!
//! `/health`, `/metrics` y `/chat` cuelgan de la raíz; el resto vive bajo
//! `/api`. Las rutas protegidas pasan por `auth_middleware` y las del
//! admin además por `admin_only_middleware`.

pub mod admin_routes;
pub mod auth_routes;
pub mod chat_routes;
pub mod health_routes;
pub mod owner_routes;
pub mod reservation_routes;
pub mod spot_routes;

use axum::{middleware::from_fn_with_state, Router};

use crate::middleware::auth_middleware;
use crate::state::AppState;

pub fn create_router(state: AppState) -> Router {
    let public_api = Router::new()
        .merge(auth_routes::create_auth_router(state.auth_limiter.clone()))
        .merge(spot_routes::create_spot_router());

    let protected_api = Router::new()
        .merge(auth_routes::create_me_router())
        .merge(owner_routes::create_owner_router())
        .nest("/reservations", reservation_routes::create_reservation_router())
        .nest("/admin", admin_routes::create_admin_router())
        .route_layer(from_fn_with_state(state.clone(), auth_middleware));

    Router::new()
        .merge(health_routes::create_health_router())
        .merge(chat_routes::create_chat_router(state.chat_limiter.clone()))
        .nest("/api", public_api.merge(protected_api))
        .with_state(state)
}
