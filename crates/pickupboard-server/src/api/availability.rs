use axum::{
    extract::{Query, State},
    http::{header, HeaderName, HeaderValue, Uri},
    response::{IntoResponse, Response},
    Extension,
};

use super::{map_coordinator_error, ApiError, AppState};
use crate::cache::Served;
use crate::middleware::RequestId;

/// Which coordinator branch produced the response.
const X_CACHE: HeaderName = HeaderName::from_static("x-cache");

pub(super) async fn get_availability(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
    uri: Uri,
    Query(params): Query<Vec<(String, String)>>,
) -> Result<Response, ApiError> {
    let served = state
        .coordinator
        .read(uri.path(), &params)
        .await
        .map_err(|e| map_coordinator_error(&req_id.0, &e))?;

    tracing::debug!(
        state = served.state.as_str(),
        source = %served.response.source,
        "availability served"
    );
    Ok(availability_response(served))
}

/// Any background rebuild handle in `served` is dropped here; the task runs on.
fn availability_response(served: Served) -> Response {
    let cache_control = HeaderValue::from_str(&served.response.cache_control())
        .unwrap_or_else(|_| HeaderValue::from_static("no-store"));
    (
        [
            (
                header::CONTENT_TYPE,
                HeaderValue::from_static("application/json; charset=utf-8"),
            ),
            (header::CACHE_CONTROL, cache_control),
            (X_CACHE, HeaderValue::from_static(served.state.as_str())),
        ],
        served.response.body,
    )
        .into_response()
}
