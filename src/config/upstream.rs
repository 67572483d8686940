use crate::r#const::{upstream_defaults, upstream_limits};
use serde::{Deserialize, Serialize};
use std::time::Duration;
use validator::Validate;

// 上游地址来源
#[derive(Debug, Deserialize, Serialize, Clone, Copy, PartialEq, Eq, Default)]
#[serde(rename_all = "snake_case")]
pub enum UpstreamSource {
    // 环境变量 / 配置文件 / 内置默认地址
    #[default]
    Static,
    // 系统 resolv.conf 中的第一个 nameserver
    ResolvConf,
}

// 上游配置
#[derive(Debug, Deserialize, Serialize, Clone, PartialEq, Eq, Validate)]
pub struct UpstreamConfig {
    // 地址来源
    #[serde(default)]
    pub source: UpstreamSource,
    // 上游地址（主机名或 IP，不含端口）（可选）
    #[serde(default)]
    pub address: Option<String>,
    // resolv.conf 路径
    #[serde(default = "default_resolv_conf")]
    pub resolv_conf: String,
    // 交换超时（秒）
    #[serde(default = "default_timeout")]
    #[validate(range(
        min = upstream_limits::MIN_TIMEOUT,
        max = upstream_limits::MAX_TIMEOUT,
        message = "Upstream timeout must be between 1 and 60 seconds"
    ))]
    pub timeout: u64,
    // 最大并发交换数
    #[serde(default = "default_max_inflight")]
    #[validate(range(
        min = upstream_limits::MIN_MAX_INFLIGHT,
        max = upstream_limits::MAX_MAX_INFLIGHT,
        message = "Max in-flight exchanges must be between 1 and 65535"
    ))]
    pub max_inflight: usize,
}

fn default_resolv_conf() -> String {
    upstream_defaults::DEFAULT_RESOLV_CONF.to_string()
}

fn default_timeout() -> u64 {
    upstream_limits::DEFAULT_TIMEOUT
}

fn default_max_inflight() -> usize {
    upstream_limits::DEFAULT_MAX_INFLIGHT
}

impl UpstreamConfig {
    // 交换超时
    pub fn timeout_duration(&self) -> Duration {
        Duration::from_secs(self.timeout)
    }
}

impl Default for UpstreamConfig {
    fn default() -> Self {
        Self {
            source: UpstreamSource::default(),
            address: None,
            resolv_conf: default_resolv_conf(),
            timeout: default_timeout(),
            max_inflight: default_max_inflight(),
        }
    }
}
