//! 内置页面

use axum::response::Html;

const CHAT_PAGE: &str = include_str!("../../assets/chat.html");
const DEMO_PAGE: &str = include_str!("../../assets/demo.html");

/// `GET /`
pub async fn index() -> Html<&'static str> {
    Html(CHAT_PAGE)
}

/// `GET /demo/`
pub async fn demo() -> Html<&'static str> {
    Html(DEMO_PAGE)
}
