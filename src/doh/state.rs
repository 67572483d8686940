// src/doh/state.rs

use crate::handler::RequestHandler;
use std::sync::Arc;

/// 应用程序状态结构体
#[derive(Clone)]
pub struct AppState {
    /// DNS 请求处理器
    pub handler: Arc<RequestHandler>,
    /// POST 请求体最大字节数
    pub max_message_size: usize,
}
