// src/codec.rs
//
// DNS 线路格式编解码，基于 hickory-proto 的 Message 实现
// 编码时使用标签压缩，与常规解析器互通

use crate::error::GatewayError;
use hickory_proto::op::Message;

/// 将线路格式字节解析为 DNS 消息
///
/// 头部截断、计数字段非法、域名或压缩指针格式错误都会失败
pub fn unpack(bytes: &[u8]) -> Result<Message, GatewayError> {
    Message::from_vec(bytes).map_err(GatewayError::parse)
}

/// 将 DNS 消息序列化为线路格式字节
pub fn pack(message: &Message) -> Result<Vec<u8>, GatewayError> {
    message.to_vec().map_err(GatewayError::serialize)
}
