use crate::error::ExchangeError;
use crate::metrics::METRICS;
use crate::r#const::upstream_limits;
use crate::upstream::UpstreamTarget;
use hickory_proto::op::Message;
use prometheus::IntGauge;
use std::net::{Ipv4Addr, Ipv6Addr, SocketAddr};
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::net::UdpSocket;
use tokio::sync::Semaphore;
use tracing::{debug, warn};

/// 单次 UDP 查询/响应交换客户端
///
/// 每次交换使用一个临时套接字，发送一个数据报并等待一个响应数据报。
/// 不重试，不扇出。整个交换（含等待并发许可）受超时限制。
pub struct UdpExchangeClient {
    // 交换超时
    timeout: Duration,
    // 并发交换限制
    limiter: Arc<Semaphore>,
    // 进行中交换计数
    inflight: IntGauge,
}

impl UdpExchangeClient {
    // 创建交换客户端
    pub fn new(timeout: Duration, max_inflight: usize) -> Self {
        Self {
            timeout,
            limiter: Arc::new(Semaphore::new(max_inflight)),
            inflight: METRICS.upstream_inflight().clone(),
        }
    }

    /// 与上游执行一次交换
    ///
    /// 仅接受事务 ID 与查询一致的响应。套接字与并发许可在任何
    /// 退出路径上都会释放，包括调用方放弃该 future 的情况。
    pub async fn exchange(
        &self,
        query: &Message,
        target: &UpstreamTarget,
    ) -> Result<Message, ExchangeError> {
        let start_time = Instant::now();
        let upstream = target.to_string();

        let result = match tokio::time::timeout(self.timeout, self.exchange_inner(query, target))
            .await
        {
            Ok(result) => result,
            Err(_) => Err(ExchangeError::Timeout(self.timeout)),
        };

        let duration = start_time.elapsed();
        METRICS
            .upstream_exchanges_total()
            .with_label_values(&[&upstream])
            .inc();
        METRICS
            .upstream_duration_seconds()
            .with_label_values(&[&upstream])
            .observe(duration.as_secs_f64());

        if let Err(e) = &result {
            warn!("Upstream exchange with {} failed: {}", upstream, e);
            METRICS
                .upstream_errors_total()
                .with_label_values(&[e.label(), &upstream])
                .inc();
        } else {
            debug!("Upstream exchange with {} completed in {:?}", upstream, duration);
        }

        result
    }

    async fn exchange_inner(
        &self,
        query: &Message,
        target: &UpstreamTarget,
    ) -> Result<Message, ExchangeError> {
        let _permit = self
            .limiter
            .acquire()
            .await
            .map_err(|_| ExchangeError::LimiterClosed)?;
        let _inflight = InflightGuard::new(&self.inflight);

        let query_bytes = query.to_vec().map_err(ExchangeError::Encode)?;
        let server_addr = target.socket_addr().await?;

        // 绑定临时端口，连接后内核只交付来自上游的数据报
        let bind_addr = if server_addr.is_ipv4() {
            SocketAddr::from((Ipv4Addr::UNSPECIFIED, 0))
        } else {
            SocketAddr::from((Ipv6Addr::UNSPECIFIED, 0))
        };
        let socket = UdpSocket::bind(bind_addr).await?;
        socket.connect(server_addr).await?;

        let bytes_sent = socket.send(&query_bytes).await?;
        debug!(
            "Sent {} byte query (id {}) to {}",
            bytes_sent,
            query.id(),
            server_addr
        );

        let mut recv_buf = vec![0u8; upstream_limits::RECV_BUFFER_SIZE];
        let bytes_received = socket.recv(&mut recv_buf).await?;
        recv_buf.truncate(bytes_received);

        let reply = Message::from_vec(&recv_buf).map_err(ExchangeError::MalformedReply)?;
        if reply.id() != query.id() {
            return Err(ExchangeError::IdMismatch {
                expected: query.id(),
                actual: reply.id(),
            });
        }

        debug!(
            "Received {} byte reply (id {}) from {}",
            bytes_received,
            reply.id(),
            server_addr
        );
        Ok(reply)
    }
}

// 进行中交换计数，drop 时递减
struct InflightGuard(IntGauge);

impl InflightGuard {
    fn new(gauge: &IntGauge) -> Self {
        gauge.inc();
        Self(gauge.clone())
    }
}

impl Drop for InflightGuard {
    fn drop(&mut self) {
        self.0.dec();
    }
}
