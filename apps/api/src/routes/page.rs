use axum::response::Html;

/// The single interactive page; it talks to the JSON API below `/api/v1/study`.
const INDEX_HTML: &str = include_str!("../../static/index.html");

/// GET /
pub async fn index_handler() -> Html<&'static str> {
    Html(INDEX_HTML)
}
