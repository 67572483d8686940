use doh_gateway::config::{Config, UpstreamSource};
use doh_gateway::UpstreamTarget;
use std::io::Write;
use tempfile::NamedTempFile;

// 辅助函数：创建临时配置文件
fn create_temp_config_file(content: &str) -> NamedTempFile {
    let mut file = NamedTempFile::new().unwrap();
    file.write_all(content.as_bytes()).unwrap();
    file.flush().unwrap();
    file
}

#[test]
fn test_basic_config_loading() {
    let config_content = r#"
server:
  listen_http: "127.0.0.1:8053"
admin:
  listen: "127.0.0.1:9053"
upstream:
  address: "9.9.9.9"
  timeout: 3
"#;

    let file = create_temp_config_file(config_content);
    let result = Config::from_file(file.path());

    assert!(
        result.is_ok(),
        "Failed to load valid config: {:?}",
        result.err()
    );
    let config = result.unwrap();

    // 验证基本配置值
    assert_eq!(config.server.listen_http, "127.0.0.1:8053");
    assert_eq!(config.admin.as_ref().unwrap().listen, "127.0.0.1:9053");
    assert_eq!(config.upstream.address.as_deref(), Some("9.9.9.9"));
    assert_eq!(config.upstream.timeout, 3);

    // 验证默认值
    assert_eq!(config.server.max_message_size, 65535);
    assert_eq!(config.upstream.source, UpstreamSource::Static);
    assert_eq!(config.upstream.max_inflight, 1024);
}

#[test]
fn test_defaults_select_fixed_upstream() {
    let config = Config::from_yaml("{}").unwrap();

    assert_eq!(config, Config::default());
    assert_eq!(config.server.listen_http, "0.0.0.0:8080");
    assert!(config.admin.is_none());

    // 未配置上游地址时使用固定默认地址，端口 53
    let target = UpstreamTarget::select(&config.upstream, None).unwrap();
    assert_eq!(target.to_string(), "203.201.60.12:53");
}

#[test]
fn test_resolv_conf_source() {
    let config_content = r#"
upstream:
  source: resolv_conf
  resolv_conf: "/etc/custom-resolv.conf"
"#;

    let config = Config::from_yaml(config_content).unwrap();
    assert_eq!(config.upstream.source, UpstreamSource::ResolvConf);
    assert_eq!(config.upstream.resolv_conf, "/etc/custom-resolv.conf");
}

#[test]
fn test_invalid_listen_address() {
    let config_content = r#"
server:
  listen_http: "not-an-address"
"#;

    let result = Config::from_yaml(config_content);
    assert!(result.is_err());
    assert!(result
        .unwrap_err()
        .to_string()
        .contains("Invalid HTTP listen address"));
}

#[test]
fn test_limits_validation() {
    for config_content in [
        "server:\n  max_message_size: 100\n",
        "server:\n  max_message_size: 70000\n",
        "upstream:\n  timeout: 0\n",
        "upstream:\n  timeout: 61\n",
        "upstream:\n  max_inflight: 0\n",
    ] {
        assert!(
            Config::from_yaml(config_content).is_err(),
            "config should be rejected: {}",
            config_content
        );
    }
}

#[test]
fn test_upstream_address_validation() {
    // 地址不能带端口，端口固定为 53
    assert!(Config::from_yaml("upstream:\n  address: \"8.8.8.8:5353\"\n").is_err());
    assert!(Config::from_yaml("upstream:\n  address: \"\"\n").is_err());
    assert!(Config::from_yaml("upstream:\n  address: \"dns.example.net\"\n").is_ok());
    assert!(Config::from_yaml("upstream:\n  address: \"2001:db8::53\"\n").is_ok());
}

#[test]
fn test_unknown_source_rejected() {
    assert!(Config::from_yaml("upstream:\n  source: dot\n").is_err());
}

#[test]
fn test_missing_file() {
    assert!(Config::from_file("/nonexistent/doh-gateway.yaml").is_err());
}
