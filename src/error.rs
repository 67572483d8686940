use crate::r#const::{error_labels, error_messages, exchange_labels, http_headers};
use axum::http::{header, StatusCode};
use axum::response::{IntoResponse, Response};
use hickory_proto::error::ProtoError;
use std::error::Error as StdError;
use std::io;
use std::net::AddrParseError;
use std::time::Duration;
use thiserror::Error;

// Unified error type
#[derive(Error, Debug)]
pub enum AppError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("IO error: {0}")]
    Io(#[from] io::Error),

    #[error("Invalid shutdown timeout, must be between {min} and {max} seconds")]
    InvalidShutdownTimeout { min: u64, max: u64 },
}

impl From<AddrParseError> for AppError {
    fn from(err: AddrParseError) -> Self {
        Self::Config(ConfigError::InvalidListenAddress(err.to_string()))
    }
}

// Configuration error type
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to load configuration file: {0}")]
    LoadError(#[from] io::Error),

    #[error("YAML parsing error: {0}")]
    ParseError(#[from] serde_yaml::Error),

    #[error("Invalid server listen address: {0}")]
    InvalidListenAddress(String),

    #[error("Failed to read resolver configuration {path}: {source}")]
    ResolvConf {
        path: String,
        #[source]
        source: io::Error,
    },

    #[error("No nameserver entry found in {0}")]
    NoNameserver(String),

    #[error("Configuration validation error: {0}")]
    ValidationError(String),
}

// 单次上游交换失败的原因
#[derive(Error, Debug)]
pub enum ExchangeError {
    #[error("network error: {0}")]
    Io(#[from] io::Error),

    #[error("no reply within {0:?}")]
    Timeout(Duration),

    #[error("transaction ID mismatch: expected {expected}, got {actual}")]
    IdMismatch { expected: u16, actual: u16 },

    #[error("malformed reply: {0}")]
    MalformedReply(#[source] ProtoError),

    #[error("failed to encode query: {0}")]
    Encode(#[source] ProtoError),

    #[error("could not resolve upstream host {0}")]
    Unresolvable(String),

    #[error("exchange limiter closed")]
    LimiterClosed,
}

impl ExchangeError {
    // 指标标签
    pub fn label(&self) -> &'static str {
        match self {
            Self::Io(_) => exchange_labels::IO,
            Self::Timeout(_) => exchange_labels::TIMEOUT,
            Self::IdMismatch { .. } => exchange_labels::ID_MISMATCH,
            Self::MalformedReply(_) => exchange_labels::MALFORMED_REPLY,
            Self::Encode(_) => exchange_labels::ENCODE,
            Self::Unresolvable(_) => exchange_labels::UNRESOLVABLE,
            Self::LimiterClosed => exchange_labels::LIMITER_CLOSED,
        }
    }
}

/// 单个 DoH 请求的错误类型
///
/// 每个变体携带返回给客户端的简短消息，以及可选的底层原因。
/// 错误只终止当前请求，不影响后续请求。
#[derive(Error, Debug)]
pub enum GatewayError {
    #[error("{message}")]
    Decode {
        message: &'static str,
        #[source]
        source: Option<base64::DecodeError>,
    },

    #[error("{message}")]
    BodyRead {
        message: &'static str,
        #[source]
        source: axum::Error,
    },

    #[error("{message}: {method}")]
    MethodNotAllowed {
        message: &'static str,
        method: String,
    },

    #[error("{message}")]
    Parse {
        message: &'static str,
        #[source]
        source: ProtoError,
    },

    #[error("{message}")]
    UpstreamExchange {
        message: &'static str,
        #[source]
        source: ExchangeError,
    },

    #[error("{message}")]
    Serialize {
        message: &'static str,
        #[source]
        source: ProtoError,
    },
}

impl GatewayError {
    pub fn missing_dns_param() -> Self {
        Self::Decode {
            message: error_messages::MISSING_DNS_PARAM,
            source: None,
        }
    }

    pub fn invalid_dns_param(source: base64::DecodeError) -> Self {
        Self::Decode {
            message: error_messages::INVALID_DNS_PARAM,
            source: Some(source),
        }
    }

    pub fn body_read(source: axum::Error) -> Self {
        Self::BodyRead {
            message: error_messages::BODY_READ_FAILED,
            source,
        }
    }

    pub fn method_not_allowed(method: impl Into<String>) -> Self {
        Self::MethodNotAllowed {
            message: error_messages::METHOD_NOT_ALLOWED,
            method: method.into(),
        }
    }

    pub fn parse(source: ProtoError) -> Self {
        Self::Parse {
            message: error_messages::UNPACK_FAILED,
            source,
        }
    }

    pub fn upstream(source: ExchangeError) -> Self {
        Self::UpstreamExchange {
            message: error_messages::RESOLVE_FAILED,
            source,
        }
    }

    pub fn serialize(source: ProtoError) -> Self {
        Self::Serialize {
            message: error_messages::PACK_FAILED,
            source,
        }
    }

    /// 错误对应的 HTTP 状态码
    pub fn status_code(&self) -> StatusCode {
        match self {
            Self::Decode { .. } | Self::BodyRead { .. } | Self::Parse { .. } => {
                StatusCode::BAD_REQUEST
            }
            Self::MethodNotAllowed { .. } => StatusCode::METHOD_NOT_ALLOWED,
            Self::UpstreamExchange { .. } | Self::Serialize { .. } => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }

    /// 返回给客户端的响应体
    pub fn message(&self) -> &'static str {
        match self {
            Self::Decode { message, .. }
            | Self::BodyRead { message, .. }
            | Self::MethodNotAllowed { message, .. }
            | Self::Parse { message, .. }
            | Self::UpstreamExchange { message, .. }
            | Self::Serialize { message, .. } => *message,
        }
    }

    // 指标标签
    pub fn label(&self) -> &'static str {
        match self {
            Self::Decode { .. } => error_labels::DECODE_ERROR,
            Self::BodyRead { .. } => error_labels::BODY_READ_ERROR,
            Self::MethodNotAllowed { .. } => error_labels::METHOD_NOT_ALLOWED,
            Self::Parse { .. } => error_labels::PARSE_ERROR,
            Self::UpstreamExchange { .. } => error_labels::UPSTREAM_ERROR,
            Self::Serialize { .. } => error_labels::SERIALIZE_ERROR,
        }
    }

    /// 拼接完整的原因链，用于日志
    pub fn cause_chain(&self) -> String {
        let mut chain = String::new();
        let mut cause = self.source();
        while let Some(err) = cause {
            if !chain.is_empty() {
                chain.push_str(": ");
            }
            chain.push_str(&err.to_string());
            cause = err.source();
        }
        if chain.is_empty() {
            chain.push_str("none");
        }
        chain
    }
}

impl IntoResponse for GatewayError {
    fn into_response(self) -> Response {
        (
            self.status_code(),
            [(header::CONTENT_TYPE, http_headers::content_types::TEXT_PLAIN)],
            self.message(),
        )
            .into_response()
    }
}
