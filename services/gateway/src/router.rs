use crate::handlers::{health, records};
use crate::state::AppState;
use axum::{
    http::{header, HeaderValue},
    routing::{get, post},
    Router,
};
use tower_http::set_header::SetResponseHeaderLayer;
use tower_http::trace::TraceLayer;

pub fn create_router(state: AppState) -> Router {
    // `get` would also answer HEAD; OPTIONS reaches the fallback since no
    // preflight layer intercepts it.
    let read = get(records::list_records)
        .head(records::get_only)
        .fallback(records::get_only);

    Router::new()
        .route("/", read.clone())
        .route("/api", read)
        .route("/add", post(records::add_record).fallback(records::post_only))
        .route("/health", get(health::health))
        .layer(SetResponseHeaderLayer::overriding(
            header::ACCESS_CONTROL_ALLOW_ORIGIN,
            HeaderValue::from_static("*"),
        ))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
