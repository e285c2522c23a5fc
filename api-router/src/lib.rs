use api_state::ApiState;
use axum::{
    extract::{DefaultBodyLimit, FromRef},
    routing::{get, post},
    Router,
};
use routes::{
    ask::ask_question,
    documents::{get_pdf, get_pdf_names},
    liveness::live,
    readiness::ready,
    upload::upload_documents,
};
use tower_http::cors::CorsLayer;

pub mod api_state;
pub mod error;
mod routes;

/// Router for the document upload and question-answering surface.
pub fn api_routes<S>(app_state: &ApiState) -> Router<S>
where
    S: Clone + Send + Sync + 'static,
    ApiState: FromRef<S>,
{
    Router::new()
        .route(
            "/upload",
            post(upload_documents).layer(DefaultBodyLimit::max(
                app_state.config.upload_max_body_bytes,
            )),
        )
        .route("/ask", post(ask_question))
        .route("/get-pdf/{pdf_name}", get(get_pdf))
        .route("/get-pdf-names", get(get_pdf_names))
        .route("/live", get(live))
        .route("/ready", get(ready))
        .layer(CorsLayer::permissive())
}
