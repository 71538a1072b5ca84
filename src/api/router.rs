//! Router construction.

use axum::extract::DefaultBodyLimit;
use axum::routing::{get, post};
use axum::Router;

use crate::analyze::Analyzer;
use crate::api::endpoints;
use crate::api::types::ApiContext;

/// Build the API router around an analyzer.
///
/// The upload route gets its own body limit from
/// [`crate::AnalyzerConfig::max_upload_bytes`]; everything else keeps
/// axum's default.
pub fn api_router(analyzer: Analyzer) -> Router {
    let upload_limit = analyzer.config().max_upload_bytes;
    let ctx = ApiContext::new(analyzer);

    let uploads = Router::new()
        .route("/analyze", post(endpoints::analysis::analyze))
        .layer(DefaultBodyLimit::max(upload_limit));

    // NOTE: Path params use `:param` syntax (matchit 0.7 / axum 0.7).
    Router::new()
        .route("/", get(endpoints::health::root))
        .route("/create-user", post(endpoints::users::create))
        .route("/result/:job_id", get(endpoints::analysis::result))
        .merge(uploads)
        .with_state(ctx)
}
