// src/doh/handlers.rs

use crate::codec;
use crate::doh::decoder::extract_dns_bytes;
use crate::doh::state::AppState;
use crate::error::GatewayError;
use crate::metrics::METRICS;
use crate::r#const::http_headers;
use axum::{
    body::Body,
    extract::{Query, State},
    http::{header, Method},
    response::{IntoResponse, Response},
};
use std::collections::HashMap;
use std::time::Instant;
use tracing::{debug, error, warn};

/// 处理 RFC 8484 DoH 请求
///
/// 依次执行：提取字节 → 解析消息 → 上游交换 → 组装响应。
/// 任一步骤失败都只终止当前请求，并映射为对应的 HTTP 状态码。
pub async fn handle_dns_query(
    State(state): State<AppState>,
    method: Method,
    Query(params): Query<HashMap<String, String>>,
    body: Body,
) -> Response {
    // 记录请求开始时间
    let start_time = Instant::now();

    METRICS
        .doh_requests_total()
        .with_label_values(&[method.as_str()])
        .inc();

    // 提取 DNS 消息字节
    let dns_bytes =
        match extract_dns_bytes(&method, &params, body, state.max_message_size).await {
            Ok(bytes) => bytes,
            Err(e) => return reject(&method, 0, e),
        };

    // 解析 DNS 消息
    let dns_message = match codec::unpack(&dns_bytes) {
        Ok(msg) => msg,
        Err(e) => return reject(&method, dns_bytes.len(), e),
    };

    debug!("DoH request received: {:?}", dns_message);

    // 转发并组装响应
    let response_bytes = match state.handler.handle_request(&dns_message).await {
        Ok(bytes) => bytes,
        Err(e) => return reject(&method, dns_bytes.len(), e),
    };

    // 记录处理时间
    let duration = start_time.elapsed();
    METRICS
        .doh_request_duration_seconds()
        .with_label_values(&[method.as_str()])
        .observe(duration.as_secs_f64());

    debug!(
        "DoH {} request id {} processed in {:?}, {} byte response",
        method,
        dns_message.id(),
        duration,
        response_bytes.len()
    );

    (
        [(
            header::CONTENT_TYPE,
            http_headers::content_types::DNS_MESSAGE,
        )],
        response_bytes,
    )
        .into_response()
}

// 记录失败请求并转换为 HTTP 响应
fn reject(method: &Method, message_len: usize, err: GatewayError) -> Response {
    METRICS
        .doh_request_errors_total()
        .with_label_values(&[err.label()])
        .inc();

    if err.status_code().is_server_error() {
        error!(
            "DoH {} request failed (message length {}): {}, cause: {}",
            method,
            message_len,
            err,
            err.cause_chain()
        );
    } else {
        warn!(
            "DoH {} request rejected (message length {}): {}, cause: {}",
            method,
            message_len,
            err,
            err.cause_chain()
        );
    }

    err.into_response()
}
