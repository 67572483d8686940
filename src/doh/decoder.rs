// src/doh/decoder.rs
//
// 从 HTTP 请求中提取 DNS 线路格式字节:
// - GET: `dns` 查询参数，base64url 编码（无填充）
// - POST: 请求体原样读取，受最大消息大小限制

use crate::error::GatewayError;
use crate::r#const::http_headers;
use axum::body::{self, Body};
use axum::http::Method;
use base64::{
    alphabet,
    engine::{DecodePaddingMode, GeneralPurpose, GeneralPurposeConfig},
    Engine as _,
};
use bytes::Bytes;
use std::collections::HashMap;

// base64url 无填充，允许末字符带非零尾部比特
const DNS_PARAM_ENGINE: GeneralPurpose = GeneralPurpose::new(
    &alphabet::URL_SAFE,
    GeneralPurposeConfig::new()
        .with_encode_padding(false)
        .with_decode_padding_mode(DecodePaddingMode::RequireNone)
        .with_decode_allow_trailing_bits(true),
);

/// 按请求方法提取 DNS 消息字节
///
/// 非 GET/POST 方法直接返回 `MethodNotAllowed`，不读取请求体
pub async fn extract_dns_bytes(
    method: &Method,
    params: &HashMap<String, String>,
    body: Body,
    max_message_size: usize,
) -> Result<Bytes, GatewayError> {
    match *method {
        Method::GET => decode_get_param(
            params
                .get(http_headers::DNS_QUERY_PARAM)
                .map(String::as_str),
        ),
        Method::POST => read_post_body(body, max_message_size).await,
        _ => Err(GatewayError::method_not_allowed(method.as_str())),
    }
}

/// 解码 GET 请求的 `dns` 参数
pub fn decode_get_param(param: Option<&str>) -> Result<Bytes, GatewayError> {
    let dns_param = match param {
        Some(param) if !param.is_empty() => param,
        _ => return Err(GatewayError::missing_dns_param()),
    };

    DNS_PARAM_ENGINE
        .decode(dns_param)
        .map(Bytes::from)
        .map_err(GatewayError::invalid_dns_param)
}

/// 读取 POST 请求体，超过 `max_message_size` 视为读取失败
pub async fn read_post_body(body: Body, max_message_size: usize) -> Result<Bytes, GatewayError> {
    body::to_bytes(body, max_message_size)
        .await
        .map_err(GatewayError::body_read)
}
