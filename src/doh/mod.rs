// src/doh/mod.rs
//
// DoH (DNS over HTTPS) 服务器模块实现，支持 RFC 8484 的 GET 和 POST 方法，
// 查询通过单次 UDP 交换转发到上游解析器

// 子模块定义
pub mod decoder;
pub mod handlers;
pub mod server;
pub mod state;

// 公开导出
pub use server::DoHServer;
pub use state::AppState;
