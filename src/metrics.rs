use axum::http::{header, StatusCode};
use axum::{routing::get, Router};
use once_cell::sync::Lazy;
use prometheus::{opts, HistogramVec, IntCounterVec, IntGauge, Registry};

// 全局静态指标实例
pub static METRICS: Lazy<GatewayMetrics> = Lazy::new(GatewayMetrics::new);

// DoH 网关性能指标
pub struct GatewayMetrics {
    registry: Registry,

    // 1. DoH 请求处理指标
    doh_requests_total: IntCounterVec,
    doh_request_duration_seconds: HistogramVec,
    doh_request_errors_total: IntCounterVec,

    // 2. 上游 UDP 交换指标
    upstream_exchanges_total: IntCounterVec,
    upstream_errors_total: IntCounterVec,
    upstream_duration_seconds: HistogramVec,
    upstream_inflight: IntGauge,
}

impl Default for GatewayMetrics {
    fn default() -> Self {
        Self::new()
    }
}

impl GatewayMetrics {
    // 创建新的指标收集器
    pub fn new() -> Self {
        let registry = Registry::new();

        // 1. DoH 请求处理指标
        let doh_requests_total = IntCounterVec::new(
            opts!(
                "dohgw_requests_total",
                "Total DoH requests received by the gateway, classified by HTTP method"
            ),
            &["method"],
        )
        .unwrap();

        let doh_request_duration_seconds = HistogramVec::new(
            prometheus::histogram_opts!(
                "dohgw_request_duration_seconds",
                "DoH request processing duration in seconds, classified by HTTP method",
                vec![0.001, 0.005, 0.01, 0.025, 0.05, 0.1, 0.25, 0.5, 1.0, 2.5, 5.0]
            ),
            &["method"],
        )
        .unwrap();

        let doh_request_errors_total = IntCounterVec::new(
            opts!(
                "dohgw_request_errors_total",
                "Total DoH request failures, classified by error type"
            ),
            &["error_type"],
        )
        .unwrap();

        // 2. 上游 UDP 交换指标
        let upstream_exchanges_total = IntCounterVec::new(
            opts!(
                "dohgw_upstream_exchanges_total",
                "Total UDP exchanges attempted against the upstream resolver"
            ),
            &["upstream"],
        )
        .unwrap();

        let upstream_errors_total = IntCounterVec::new(
            opts!(
                "dohgw_upstream_errors_total",
                "Total failed upstream exchanges, classified by failure kind and upstream"
            ),
            &["error_type", "upstream"],
        )
        .unwrap();

        let upstream_duration_seconds = HistogramVec::new(
            prometheus::histogram_opts!(
                "dohgw_upstream_duration_seconds",
                "Upstream UDP exchange duration in seconds",
                vec![0.001, 0.005, 0.01, 0.025, 0.05, 0.1, 0.25, 0.5, 1.0, 2.5, 5.0, 10.0]
            ),
            &["upstream"],
        )
        .unwrap();

        let upstream_inflight = IntGauge::new(
            "dohgw_upstream_inflight",
            "Current number of in-flight upstream exchanges",
        )
        .unwrap();

        // 创建指标实例
        let metrics = GatewayMetrics {
            registry,
            doh_requests_total,
            doh_request_duration_seconds,
            doh_request_errors_total,
            upstream_exchanges_total,
            upstream_errors_total,
            upstream_duration_seconds,
            upstream_inflight,
        };

        // 注册所有指标
        metrics.register_all_metrics();

        metrics
    }

    // 注册所有指标
    fn register_all_metrics(&self) {
        // 1. DoH 请求处理指标
        self.registry
            .register(Box::new(self.doh_requests_total.clone()))
            .unwrap();
        self.registry
            .register(Box::new(self.doh_request_duration_seconds.clone()))
            .unwrap();
        self.registry
            .register(Box::new(self.doh_request_errors_total.clone()))
            .unwrap();

        // 2. 上游 UDP 交换指标
        self.registry
            .register(Box::new(self.upstream_exchanges_total.clone()))
            .unwrap();
        self.registry
            .register(Box::new(self.upstream_errors_total.clone()))
            .unwrap();
        self.registry
            .register(Box::new(self.upstream_duration_seconds.clone()))
            .unwrap();
        self.registry
            .register(Box::new(self.upstream_inflight.clone()))
            .unwrap();
    }

    // 导出所有指标为文本格式
    pub fn export_metrics(&self) -> Result<String, prometheus::Error> {
        let encoder = prometheus::TextEncoder::new();
        let metric_families = self.registry.gather();
        let mut buffer = String::new();
        encoder.encode_utf8(&metric_families, &mut buffer)?;
        Ok(buffer)
    }

    // 下面是各个指标的getter方法，用于其他模块增加计数或设置值

    // 1. DoH 请求处理指标
    pub fn doh_requests_total(&self) -> &IntCounterVec {
        &self.doh_requests_total
    }

    pub fn doh_request_duration_seconds(&self) -> &HistogramVec {
        &self.doh_request_duration_seconds
    }

    pub fn doh_request_errors_total(&self) -> &IntCounterVec {
        &self.doh_request_errors_total
    }

    // 2. 上游 UDP 交换指标
    pub fn upstream_exchanges_total(&self) -> &IntCounterVec {
        &self.upstream_exchanges_total
    }

    pub fn upstream_errors_total(&self) -> &IntCounterVec {
        &self.upstream_errors_total
    }

    pub fn upstream_duration_seconds(&self) -> &HistogramVec {
        &self.upstream_duration_seconds
    }

    pub fn upstream_inflight(&self) -> &IntGauge {
        &self.upstream_inflight
    }
}

// 提供指标导出路由
pub fn metrics_routes() -> Router {
    Router::new().route(
        "/metrics",
        get(|| async {
            match METRICS.export_metrics() {
                Ok(buffer) => (
                    StatusCode::OK,
                    [(header::CONTENT_TYPE, prometheus::TEXT_FORMAT)],
                    buffer,
                ),
                Err(e) => (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    [(header::CONTENT_TYPE, "text/plain; charset=utf-8")],
                    e.to_string(),
                ),
            }
        }),
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_export_contains_registered_metrics() {
        METRICS
            .doh_requests_total()
            .with_label_values(&["GET"])
            .inc();
        let output = METRICS.export_metrics().unwrap();
        assert!(output.contains("dohgw_requests_total"));
    }
}
