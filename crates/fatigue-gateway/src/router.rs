//! Axum router wiring.
//!
//! Exposes `/health` and `/api/submit`, wrapped in CORS and request tracing.

use axum::{
    http::{HeaderValue, Method},
    routing::{get, post},
    Router,
};
use tower_http::cors::{AllowOrigin, Any, CorsLayer};
use tower_http::trace::TraceLayer;

use crate::{api, app_state::AppState, config::CorsSection, ops};

pub fn build_router(state: AppState) -> Router {
    let cors = cors_layer(&state.cfg().cors);

    Router::new()
        .route("/health", get(ops::health))
        .route("/api/submit", post(api::submit))
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

fn cors_layer(cfg: &CorsSection) -> CorsLayer {
    let origin = match cfg {
        CorsSection::Any => AllowOrigin::any(),
        CorsSection::Origins(list) => AllowOrigin::list(list.iter().filter_map(|o| {
            HeaderValue::from_str(o)
                .map_err(|_| tracing::warn!(origin = %o, "ignoring invalid CORS origin"))
                .ok()
        })),
    };

    CorsLayer::new()
        .allow_origin(origin)
        .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
        .allow_headers(Any)
}
