//! `POST /chat/`

use std::sync::Arc;

use axum::{
    body::Bytes,
    extract::State,
    http::{header, HeaderMap},
    response::{IntoResponse, Json, Response},
};
use pegpo_core::parse_http_chat;
use pegpo_llm::GenerationMode;
use serde_json::json;

use super::stream::{relay_events, sse_response};
use crate::error::ChatError;
use crate::state::AppState;

/// 聊天处理器
///
/// 请求体按原始字节读取，JSON 解析失败返回 400 而不是框架默认的错误。
pub async fn handler(State(state): State<Arc<AppState>>, headers: HeaderMap, body: Bytes) -> Response {
    let expose_detail = state.expose_error_detail();

    let chat = match parse_http_chat(&body) {
        Ok(chat) => chat,
        Err(e) => {
            tracing::debug!("Rejected chat request: {}", e);
            return ChatError::from(e).to_response(expose_detail);
        }
    };

    // 前置条件失败时流式请求也返回 JSON 错误
    if let Err(e) = state.gateway.check() {
        return ChatError::from(e).to_response(expose_detail);
    }

    let mode = generation_mode(&headers, chat.stream, state.stream_by_default());
    tracing::info!("Chat request ({:?}), prompt length {}", mode, chat.request.prompt().len());

    match mode {
        GenerationMode::Streaming => sse_response(relay_events(state.gateway.clone(), chat.request, expose_detail)),
        GenerationMode::Single => match state.gateway.generate(&chat.request).await {
            Ok(fragment) => Json(json!({ "response": fragment.into_text() })).into_response(),
            Err(e) => ChatError::from(e).to_response(expose_detail),
        },
    }
}

/// 非 POST 请求
pub async fn post_required() -> Response {
    ChatError::PostRequired.into_response()
}

/// 选择单次或流式响应
///
/// 请求体 `"stream": true`、`Accept: text/event-stream`，或默认开启流式且
/// 请求体没有 `"stream": false`。
pub fn generation_mode(headers: &HeaderMap, stream: Option<bool>, stream_by_default: bool) -> GenerationMode {
    let accepts_sse = headers
        .get(header::ACCEPT)
        .and_then(|value| value.to_str().ok())
        .is_some_and(|value| value.contains("text/event-stream"));

    let streaming = stream == Some(true) || accepts_sse || (stream_by_default && stream != Some(false));
    GenerationMode::from_stream_flag(streaming)
}
