pub mod admin;
pub mod args;
pub mod codec;
pub mod config;
pub mod r#const;
pub mod doh;
pub mod error;
pub mod handler;
pub mod metrics;
pub mod upstream;

// 重导出常用组件
pub use admin::AdminServer;
pub use args::Args;
pub use config::Config;
pub use doh::DoHServer;
pub use error::{AppError, ConfigError, ExchangeError, GatewayError};
pub use handler::RequestHandler;
pub use metrics::GatewayMetrics;
pub use r#const::subsystem_names;
pub use upstream::{UdpExchangeClient, UpstreamTarget};
