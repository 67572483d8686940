// 应用常量定义

//
// 配置参数限制常量
//

// 应用关闭等待时间限制
pub mod shutdown_timeout {
    // 默认值
    pub const DEFAULT: u64 = 30;
    // 最小值
    pub const MIN: u64 = 1;
    // 最大值
    pub const MAX: u64 = 120;
}

// DoH 消息大小限制
pub mod message_limits {
    // 默认最大消息大小（字节），DNS 消息长度字段为 16 位
    pub const DEFAULT_MAX_SIZE: usize = 65535;
    // 最小消息大小（字节），经典 UDP DNS 上限
    pub const MIN_SIZE: usize = 512;
    // 最大消息大小（字节）
    pub const MAX_SIZE: usize = 65535;
}

// 上游交换限制
pub mod upstream_limits {
    // 默认交换超时（秒）
    pub const DEFAULT_TIMEOUT: u64 = 5;
    // 最小交换超时（秒）
    pub const MIN_TIMEOUT: u64 = 1;
    // 最大交换超时（秒）
    pub const MAX_TIMEOUT: u64 = 60;
    // 默认最大并发交换数
    pub const DEFAULT_MAX_INFLIGHT: usize = 1024;
    // 最小并发交换数
    pub const MIN_MAX_INFLIGHT: usize = 1;
    // 最大并发交换数
    pub const MAX_MAX_INFLIGHT: usize = 65535;
    // UDP 接收缓冲区大小
    pub const RECV_BUFFER_SIZE: usize = 65535;
}

//
// 指标标签常量
//

// DoH 错误类型标签
pub mod error_labels {
    // base64 参数错误
    pub const DECODE_ERROR: &str = "decode_error";
    // 请求体读取错误
    pub const BODY_READ_ERROR: &str = "body_read_error";
    // 不支持的方法
    pub const METHOD_NOT_ALLOWED: &str = "method_not_allowed";
    // DNS 消息解析错误
    pub const PARSE_ERROR: &str = "parse_error";
    // 上游错误
    pub const UPSTREAM_ERROR: &str = "upstream_error";
    // 消息编码错误
    pub const SERIALIZE_ERROR: &str = "serialize_error";
}

// 上游交换错误类型标签
pub mod exchange_labels {
    // 网络错误
    pub const IO: &str = "io";
    // 超时
    pub const TIMEOUT: &str = "timeout";
    // 事务 ID 不匹配
    pub const ID_MISMATCH: &str = "id_mismatch";
    // 响应格式错误
    pub const MALFORMED_REPLY: &str = "malformed_reply";
    // 查询编码错误
    pub const ENCODE: &str = "encode";
    // 上游地址无法解析
    pub const UNRESOLVABLE: &str = "unresolvable";
    // 并发限制器关闭
    pub const LIMITER_CLOSED: &str = "limiter_closed";
}

// 子系统名称
pub mod subsystem_names {
    // 管理服务器子系统
    pub const ADMIN_SERVER: &str = "admin_server";
    // DoH服务器子系统
    pub const DOH_SERVER: &str = "doh_server";
}

// 服务器默认值
pub mod server_defaults {
    // 默认HTTP监听地址
    pub const DEFAULT_HTTP_LISTEN: &str = "0.0.0.0:8080";
    // DoH 查询路径
    pub const DOH_QUERY_PATH: &str = "/dns-query";
}

// 上游默认值
pub mod upstream_defaults {
    // 默认上游 DNS 服务器地址
    pub const DEFAULT_ADDRESS: &str = "203.201.60.12";
    // DNS 端口，固定为 53
    pub const DNS_PORT: u16 = 53;
    // 上游地址环境变量
    pub const ADDRESS_ENV: &str = "DNS_SERVER";
    // 默认 resolv.conf 路径
    pub const DEFAULT_RESOLV_CONF: &str = "/etc/resolv.conf";
    // resolv.conf 中的名称服务器关键字
    pub const NAMESERVER_KEYWORD: &str = "nameserver";
}

// HTTP头常量
pub mod http_headers {
    // 内容类型常量
    pub mod content_types {
        // DNS消息内容类型
        pub const DNS_MESSAGE: &str = "application/dns-message";
        // 纯文本错误响应
        pub const TEXT_PLAIN: &str = "text/plain; charset=utf-8";
    }

    // DoH 查询参数名
    pub const DNS_QUERY_PARAM: &str = "dns";
}

// 错误响应消息
pub mod error_messages {
    pub const MISSING_DNS_PARAM: &str = "Missing 'dns' query parameter";
    pub const INVALID_DNS_PARAM: &str = "Failed to decode DNS message";
    pub const BODY_READ_FAILED: &str = "Failed to read request body";
    pub const METHOD_NOT_ALLOWED: &str = "Method not allowed";
    pub const UNPACK_FAILED: &str = "Failed to unpack DNS message";
    pub const RESOLVE_FAILED: &str = "Failed to resolve DNS query";
    pub const PACK_FAILED: &str = "Failed to pack DNS response";
}
