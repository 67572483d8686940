use crate::config::validate_socket_addr;
use crate::r#const::{message_limits, server_defaults};
use serde::{Deserialize, Serialize};
use validator::Validate;

// 服务器配置
#[derive(Debug, Deserialize, Serialize, Clone, PartialEq, Eq, Validate)]
pub struct ServerConfig {
    // HTTP监听地址
    #[serde(default = "default_listen_http")]
    #[validate(custom(
        function = "validate_socket_addr",
        message = "Invalid HTTP listen address"
    ))]
    pub listen_http: String,
    // 最大接受的 DNS 消息大小（字节）
    #[serde(default = "default_max_message_size")]
    #[validate(range(
        min = message_limits::MIN_SIZE,
        max = message_limits::MAX_SIZE,
        message = "Max message size must be between 512 and 65535 bytes"
    ))]
    pub max_message_size: usize,
}

fn default_listen_http() -> String {
    server_defaults::DEFAULT_HTTP_LISTEN.to_string()
}

fn default_max_message_size() -> usize {
    message_limits::DEFAULT_MAX_SIZE
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            listen_http: default_listen_http(),
            max_message_size: default_max_message_size(),
        }
    }
}

// 管理服务器配置
#[derive(Debug, Deserialize, Serialize, Clone, PartialEq, Eq, Validate)]
pub struct AdminConfig {
    // 管理服务器监听地址
    #[validate(custom(
        function = "validate_socket_addr",
        message = "Invalid admin listen address"
    ))]
    pub listen: String,
}
