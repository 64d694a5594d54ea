//! Federated journal search endpoint

use axum::{
    extract::{rejection::JsonRejection, State},
    Json,
};
use jfed_common::types::{SearchRequest, SearchResponse};
use tracing::{error, info, Instrument};
use uuid::Uuid;

use crate::error::{ApiError, SearchError};
use crate::AppState;

/// POST /api/journals/search
///
/// Body: `{ "filters": {...}, "sorting": {"field", "order"} }`. The search
/// runs on its own task so a panic inside it becomes a 500 instead of
/// tearing down the connection.
pub async fn search_journals(
    State(state): State<AppState>,
    body: Result<Json<SearchRequest>, JsonRejection>,
) -> Result<Json<SearchResponse>, ApiError> {
    let environment = state.environment;
    let Json(request) =
        body.map_err(|rejection| ApiError::new(SearchError::BadRequest(rejection.body_text()), environment))?;

    let request_id = Uuid::new_v4();
    let span = tracing::info_span!("search", request_id = %request_id);

    info!(
        parent: &span,
        search_text = request.filters.search_text().unwrap_or(""),
        fields = ?request.filters.search_fields,
        databases = ?request.filters.databases,
        publishers = ?request.filters.publishers,
        "Search request"
    );

    let engine = state.engine.clone();
    let task = tokio::spawn(
        async move {
            engine
                .search(&request.filters, request.sorting.as_ref())
                .await
        }
        .instrument(span.clone()),
    );

    let outcome = match task.await {
        Ok(result) => result,
        Err(e) => {
            error!(parent: &span, error = %e, "Search task failed");
            Err(SearchError::Internal(format!("search task failed: {}", e)))
        }
    }
    .map_err(|e| ApiError::new(e, environment))?;

    Ok(Json(outcome.into_response()))
}
