use axum::{
    http::Method,
    routing::{get, post},
    Router,
};
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

pub mod error;
pub mod middleware;
pub mod runs;
pub mod state;

pub use state::AppState;

pub fn app(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(tower_http::cors::Any)
        .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
        .allow_headers([
            axum::http::header::AUTHORIZATION,
            axum::http::header::CONTENT_TYPE,
        ]);

    // run triggers sit behind the scheduler token; health does not
    let triggers = Router::new()
        .route("/v1/runs/curation", post(runs::run_curation))
        .route("/v1/runs/archive", post(runs::run_archive))
        .layer(axum::middleware::from_fn_with_state(
            state.clone(),
            middleware::auth::trigger_auth_middleware,
        ));

    Router::new()
        .route("/health", get(runs::health))
        .merge(triggers)
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
