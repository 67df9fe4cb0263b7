use axum::{
    http::header,
    response::{Html, IntoResponse},
};

use crate::cache::DASHBOARD_CACHE_CONTROL;

const DASHBOARD_HTML: &str = include_str!("../../assets/dashboard.html");

pub(super) async fn dashboard() -> impl IntoResponse {
    (
        [(header::CACHE_CONTROL, DASHBOARD_CACHE_CONTROL)],
        Html(DASHBOARD_HTML),
    )
}
