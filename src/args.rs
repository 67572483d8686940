use crate::error::AppError;
use crate::r#const::{shutdown_timeout, upstream_defaults};
use clap::{ArgAction, Parser};
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

// DNS over HTTPS 到 UDP 的网关服务
#[derive(Parser, Debug, Clone)]
#[command(
    name = "doh-gateway",
    author,
    version,
    about = "A lightweight DNS-over-HTTPS gateway forwarding queries to a UDP resolver\n\n\
             Key Features:\n\
             - Protocol Conversion: RFC 8484 GET and POST requests to DNS over UDP/53\n\
             - Single Exchange: one bounded UDP round trip per request, no retries\n\
             - Upstream Selection: DNS_SERVER environment variable, YAML config, or /etc/resolv.conf\n\
             - Observability: structured logging, Prometheus metrics and health endpoint"
)]
pub struct Args {
    // 配置文件路径（可选，未指定时使用默认配置）
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    // 上游 DNS 服务器地址
    #[arg(
        short = 'u',
        long = "upstream",
        env = upstream_defaults::ADDRESS_ENV,
        help = "Upstream DNS resolver host or IP (port is always 53)"
    )]
    pub upstream: Option<String>,

    // 测试配置
    #[arg(
        short = 't',
        long = "test",
        action = ArgAction::SetTrue,
        help = "Test configuration file for validity and exit"
    )]
    pub test_config: bool,

    // 启用调试日志
    #[arg(
        short = 'd',
        long = "debug",
        action = ArgAction::SetTrue,
        help = "Enable debug level logging for detailed output"
    )]
    pub debug: bool,

    // 关闭超时
    #[arg(
        long = "shutdown-timeout",
        help = "Maximum time in seconds to wait for complete shutdown",
        default_value_t = shutdown_timeout::DEFAULT
    )]
    pub shutdown_timeout: u64,
}

impl Args {
    // 解析命令行参数
    pub fn parse_args() -> Self {
        Args::parse()
    }

    // 验证参数
    pub fn validation(&self) -> Result<(), AppError> {
        if self.shutdown_timeout < shutdown_timeout::MIN
            || self.shutdown_timeout > shutdown_timeout::MAX
        {
            return Err(AppError::InvalidShutdownTimeout {
                min: shutdown_timeout::MIN,
                max: shutdown_timeout::MAX,
            });
        }
        Ok(())
    }

    // 日志过滤器：优先使用 RUST_LOG，无效或未设置时按 --debug 选择级别
    pub fn log_filter(&self, rust_log: Option<&str>) -> EnvFilter {
        let fallback = if self.debug { "debug" } else { "info" };
        rust_log
            .filter(|directives| !directives.trim().is_empty())
            .and_then(|directives| EnvFilter::try_new(directives).ok())
            .unwrap_or_else(|| EnvFilter::new(fallback))
    }
}
