// 声明子模块
mod target;
mod udp;

// 重导出公共API
pub use target::{parse_resolv_conf, read_resolv_conf, UpstreamTarget};
pub use udp::UdpExchangeClient;
