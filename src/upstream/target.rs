use crate::config::{UpstreamConfig, UpstreamSource};
use crate::error::{ConfigError, ExchangeError};
use crate::r#const::upstream_defaults;
use std::fmt;
use std::fs;
use std::net::{IpAddr, SocketAddr};
use tracing::{debug, info};

/// 上游解析器地址
///
/// 进程启动时选定，之后只读。端口固定为 53，传输固定为 UDP。
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UpstreamTarget {
    host: String,
    port: u16,
}

impl UpstreamTarget {
    // 创建端口为 53 的上游目标
    pub fn new(host: impl Into<String>) -> Self {
        Self::with_port(host, upstream_defaults::DNS_PORT)
    }

    // 创建指定端口的上游目标，用于本地测试桩
    pub fn with_port(host: impl Into<String>, port: u16) -> Self {
        let host = host.into();
        let host = host
            .trim()
            .trim_start_matches('[')
            .trim_end_matches(']')
            .to_string();
        Self { host, port }
    }

    /// 根据配置选择上游
    ///
    /// `env_address` 是来自环境变量或命令行的地址，空字符串视为未设置。
    pub fn select(
        config: &UpstreamConfig,
        env_address: Option<&str>,
    ) -> Result<Self, ConfigError> {
        let target = match config.source {
            UpstreamSource::Static => {
                let address = non_empty(env_address)
                    .or_else(|| non_empty(config.address.as_deref()))
                    .unwrap_or(upstream_defaults::DEFAULT_ADDRESS);
                Self::new(address)
            }
            UpstreamSource::ResolvConf => Self::new(read_resolv_conf(&config.resolv_conf)?),
        };

        info!(
            "Selected upstream DNS server {} (source: {:?})",
            target, config.source
        );
        Ok(target)
    }

    pub fn host(&self) -> &str {
        &self.host
    }

    pub fn port(&self) -> u16 {
        self.port
    }

    /// 解析为套接字地址，IP 字面量直接使用，主机名通过系统解析
    pub async fn socket_addr(&self) -> Result<SocketAddr, ExchangeError> {
        if let Ok(ip) = self.host.parse::<IpAddr>() {
            return Ok(SocketAddr::new(ip, self.port));
        }

        let mut addrs = tokio::net::lookup_host((self.host.as_str(), self.port)).await?;
        let addr = addrs
            .next()
            .ok_or_else(|| ExchangeError::Unresolvable(self.host.clone()))?;
        debug!("Resolved upstream host {} to {}", self.host, addr);
        Ok(addr)
    }
}

impl fmt::Display for UpstreamTarget {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.host.contains(':') {
            write!(f, "[{}]:{}", self.host, self.port)
        } else {
            write!(f, "{}:{}", self.host, self.port)
        }
    }
}

fn non_empty(value: Option<&str>) -> Option<&str> {
    value.map(str::trim).filter(|v| !v.is_empty())
}

// 读取 resolv.conf 中的第一个 nameserver
pub fn read_resolv_conf(path: &str) -> Result<String, ConfigError> {
    let content = fs::read_to_string(path).map_err(|source| ConfigError::ResolvConf {
        path: path.to_string(),
        source,
    })?;
    parse_resolv_conf(&content).ok_or_else(|| ConfigError::NoNameserver(path.to_string()))
}

// 解析 resolv.conf 内容，返回第一个 nameserver 地址
pub fn parse_resolv_conf(content: &str) -> Option<String> {
    content
        .lines()
        .map(str::trim)
        .filter(|line| !line.starts_with('#') && !line.starts_with(';'))
        .find_map(|line| {
            let mut fields = line.split_whitespace();
            match (fields.next(), fields.next()) {
                (Some(upstream_defaults::NAMESERVER_KEYWORD), Some(addr)) => Some(addr.to_string()),
                _ => None,
            }
        })
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;
    use std::io::Write;
    use std::net::Ipv4Addr;
    use tempfile::NamedTempFile;

    #[test]
    fn test_default_address_when_unset() {
        let config = UpstreamConfig::default();
        let target = UpstreamTarget::select(&config, None).unwrap();
        assert_eq!(target.host(), "203.201.60.12");
        assert_eq!(target.port(), 53);
        assert_eq!(target.to_string(), "203.201.60.12:53");

        // 空字符串等同于未设置
        let target = UpstreamTarget::select(&config, Some("  ")).unwrap();
        assert_eq!(target.host(), "203.201.60.12");
    }

    #[test]
    fn test_env_overrides_config() {
        let config = UpstreamConfig {
            address: Some("9.9.9.9".to_string()),
            ..Default::default()
        };
        assert_eq!(
            UpstreamTarget::select(&config, None).unwrap().host(),
            "9.9.9.9"
        );
        assert_eq!(
            UpstreamTarget::select(&config, Some("1.1.1.1")).unwrap().host(),
            "1.1.1.1"
        );
    }

    #[test]
    fn test_ipv6_target_display() {
        let target = UpstreamTarget::new("[2001:db8::1]");
        assert_eq!(target.host(), "2001:db8::1");
        assert_eq!(target.to_string(), "[2001:db8::1]:53");
    }

    #[test]
    fn test_parse_resolv_conf() {
        let content = "# generated\n; comment\nsearch example.com\nnameserver 10.0.0.2\nnameserver 10.0.0.3\n";
        assert_eq!(parse_resolv_conf(content), Some("10.0.0.2".to_string()));
        assert_eq!(parse_resolv_conf("search example.com\n"), None);
        assert_eq!(parse_resolv_conf("nameserver\n"), None);
    }

    #[test]
    fn test_select_from_resolv_conf() {
        let mut file = NamedTempFile::new().unwrap();
        file.write_all(b"options edns0\nnameserver 192.0.2.53\n")
            .unwrap();
        file.flush().unwrap();

        let config = UpstreamConfig {
            source: UpstreamSource::ResolvConf,
            resolv_conf: file.path().to_string_lossy().to_string(),
            ..Default::default()
        };
        // resolv.conf 来源忽略环境变量
        let target = UpstreamTarget::select(&config, Some("1.1.1.1")).unwrap();
        assert_eq!(target, UpstreamTarget::new("192.0.2.53"));
    }

    #[test]
    fn test_resolv_conf_errors() {
        let config = UpstreamConfig {
            source: UpstreamSource::ResolvConf,
            resolv_conf: "/nonexistent/resolv.conf".to_string(),
            ..Default::default()
        };
        assert_matches!(
            UpstreamTarget::select(&config, None),
            Err(ConfigError::ResolvConf { .. })
        );

        let file = NamedTempFile::new().unwrap();
        let config = UpstreamConfig {
            source: UpstreamSource::ResolvConf,
            resolv_conf: file.path().to_string_lossy().to_string(),
            ..Default::default()
        };
        assert_matches!(
            UpstreamTarget::select(&config, None),
            Err(ConfigError::NoNameserver(_))
        );
    }

    #[tokio::test]
    async fn test_socket_addr_from_ip_literal() {
        let target = UpstreamTarget::new("203.201.60.12");
        assert_eq!(
            target.socket_addr().await.unwrap(),
            SocketAddr::new(IpAddr::V4(Ipv4Addr::new(203, 201, 60, 12)), 53)
        );
    }

    #[tokio::test]
    async fn test_socket_addr_from_hostname() {
        let target = UpstreamTarget::with_port("localhost", 5353);
        let addr = target.socket_addr().await.unwrap();
        assert!(addr.ip().is_loopback());
        assert_eq!(addr.port(), 5353);
    }
}
