//! SSE 流式响应
//!
//! 每个 relay 事件写成一个 `data:` 帧。

use std::convert::Infallible;
use std::sync::Arc;

use axum::{
    body::{Body, Bytes},
    http::header,
    response::{IntoResponse, Response},
};
use futures::StreamExt;
use pegpo_core::{relay, ChatRequest, RelayEvent, RelayStream};
use pegpo_llm::{LLMError, ProviderGateway};

use crate::error::ChatError;

/// 结束标记
pub const DONE_MARKER: &str = "[DONE]";
/// 错误前缀
pub const ERROR_PREFIX: &str = "[ERROR]";

/// 为一次请求启动 relay
///
/// HTTP 流和 WebSocket 共用，错误信息按 `expose_detail` 处理。
pub fn relay_events(gateway: Arc<ProviderGateway>, request: ChatRequest, expose_detail: bool) -> RelayStream {
    relay(async move { gateway.stream(&request).await }, move |e: &LLMError| {
        ChatError::from_llm(e).client_message(expose_detail)
    })
}

/// 编码一个 SSE 帧
///
/// 多行内容拆成多个 `data:` 行，客户端按换行拼回。
pub fn encode_sse(event: &RelayEvent) -> String {
    match event {
        RelayEvent::Partial { delta } => data_frame(delta),
        RelayEvent::Done => data_frame(DONE_MARKER),
        RelayEvent::Error { message } => data_frame(&format!("{} {}", ERROR_PREFIX, message)),
    }
}

fn data_frame(payload: &str) -> String {
    let normalized = payload.replace("\r\n", "\n");
    let mut frame = String::with_capacity(normalized.len() + 8);
    for line in normalized.split(['\n', '\r']) {
        frame.push_str("data: ");
        frame.push_str(line);
        frame.push('\n');
    }
    frame.push('\n');
    frame
}

/// 把 relay 事件流包装成 SSE 响应
pub fn sse_response(events: RelayStream) -> Response {
    let body = events.map(|event| {
        if let RelayEvent::Error { message } = &event {
            tracing::debug!("SSE stream ended with error: {}", message);
        }
        Ok::<_, Infallible>(Bytes::from(encode_sse(&event)))
    });

    (
        [
            (header::CONTENT_TYPE, "text/event-stream"),
            (header::CACHE_CONTROL, "no-cache"),
            (header::HeaderName::from_static("x-accel-buffering"), "no"),
        ],
        Body::from_stream(body),
    )
        .into_response()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_encode_partial() {
        assert_eq!(encode_sse(&RelayEvent::partial("Hel")), "data: Hel\n\n");
    }

    #[test]
    fn test_encode_multiline_partial() {
        assert_eq!(
            encode_sse(&RelayEvent::partial("line one\nline two\r\n")),
            "data: line one\ndata: line two\ndata: \n\n"
        );
    }

    #[test]
    fn test_encode_terminal_events() {
        assert_eq!(encode_sse(&RelayEvent::Done), "data: [DONE]\n\n");
        assert_eq!(
            encode_sse(&RelayEvent::error("Provider request failed")),
            "data: [ERROR] Provider request failed\n\n"
        );
    }

    #[tokio::test]
    async fn test_sse_response_headers() {
        let events: RelayStream = Box::pin(futures::stream::iter(vec![RelayEvent::Done]));
        let response = sse_response(events);

        assert_eq!(response.headers()[header::CONTENT_TYPE], "text/event-stream");
        assert_eq!(response.headers()[header::CACHE_CONTROL], "no-cache");
        assert_eq!(response.headers()["x-accel-buffering"], "no");

        let body = axum::body::to_bytes(response.into_body(), usize::MAX).await.unwrap();
        assert_eq!(&body[..], b"data: [DONE]\n\n");
    }
}
