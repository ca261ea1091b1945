//! HTTP Server - 提供聊天接口、SSE 和 WebSocket 支持

use std::net::SocketAddr;
use std::sync::Arc;

use axum::{
    response::{IntoResponse, Json},
    routing::{get, post},
    Router,
};
use serde_json::json;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

use crate::handlers::{chat, pages};
use crate::state::AppState;
use crate::websocket;

/// 运行 HTTP 服务器，收到 Ctrl-C 后优雅退出
pub async fn run_server(state: AppState) -> anyhow::Result<()> {
    let addr: SocketAddr = format!("{}:{}", state.config.server.host, state.config.server.port)
        .parse()
        .map_err(|e| anyhow::anyhow!("Invalid address: {}", e))?;

    let app = create_router(Arc::new(state));

    let listener = tokio::net::TcpListener::bind(addr).await?;

    tracing::info!("Pegpo server starting on http://{}", addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    tracing::info!("Pegpo server stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!("Failed to listen for shutdown signal: {}", e);
        std::future::pending::<()>().await;
    }
    tracing::info!("Shutdown signal received");
}

/// 创建路由
///
/// 所有路由同时挂载在根路径和 `/api` 下。
pub fn create_router(state: Arc<AppState>) -> Router {
    let routes = Router::new()
        // 页面
        .route("/", get(pages::index))
        .route("/demo/", get(pages::demo))
        // 健康检查
        .route("/health", get(health_handler))
        // 聊天
        .route("/chat/", post(chat::handler).fallback(chat::post_required))
        // WebSocket
        .route("/ws/chat/", get(websocket::handler));

    let app = Router::new()
        .merge(routes.clone())
        .nest("/api", routes)
        // nest 只把 "/" 映射到 "/api"
        .route("/api/", get(pages::index))
        // 中间件
        .layer(TraceLayer::new_for_http());

    let app = if state.config.server.cors {
        app.layer(CorsLayer::permissive())
    } else {
        app
    };

    app.with_state(state)
}

/// 健康检查处理器
async fn health_handler() -> impl IntoResponse {
    Json(json!({
        "status": "healthy",
        "timestamp": chrono::Utc::now().to_rfc3339(),
    }))
}
