use crate::codec;
use crate::error::GatewayError;
use crate::upstream::{UdpExchangeClient, UpstreamTarget};
use hickory_proto::op::{Message, MessageType};
use tracing::debug;

// DNS 请求处理器
pub struct RequestHandler {
    // 上游交换客户端
    client: UdpExchangeClient,
    // 启动时选定的上游
    target: UpstreamTarget,
}

impl RequestHandler {
    // 创建 DNS 请求处理器
    pub fn new(client: UdpExchangeClient, target: UpstreamTarget) -> Self {
        Self { client, target }
    }

    /// 转发查询到上游并返回打包后的响应
    ///
    /// 交换失败映射为 `UpstreamExchange`，打包失败映射为 `Serialize`。
    pub async fn handle_request(&self, request: &Message) -> Result<Vec<u8>, GatewayError> {
        debug!(
            "Forwarding query id {} ({} questions) to {}",
            request.id(),
            request.queries().len(),
            self.target
        );

        let response = self
            .client
            .exchange(request, &self.target)
            .await
            .map_err(GatewayError::upstream)?;

        assemble_response(response)
    }
}

/// 将上游回复标记为响应（QR 位）并序列化
pub fn assemble_response(mut response: Message) -> Result<Vec<u8>, GatewayError> {
    response.set_message_type(MessageType::Response);
    codec::pack(&response)
}
