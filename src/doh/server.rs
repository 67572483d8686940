// src/doh/server.rs

use crate::doh::handlers::handle_dns_query;
use crate::doh::state::AppState;
use crate::error::AppError;
use crate::handler::RequestHandler;
use crate::r#const::server_defaults::DOH_QUERY_PATH;
use axum::{routing::any, Router};
use std::future::IntoFuture;
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::net::TcpListener;
use tokio::sync::oneshot;
use tokio_graceful_shutdown::SubsystemHandle;
use tracing::{error, info};

/// DoH 服务器结构体
pub struct DoHServer {
    /// 监听地址
    bind_addr: SocketAddr,
    /// 请求共享的只读状态
    state: AppState,
    /// 关闭信号发送端
    shutdown_tx: oneshot::Sender<()>,
    /// 关闭信号接收端
    shutdown_rx: oneshot::Receiver<()>,
}

impl DoHServer {
    /// 创建新的 DoH 服务器
    pub fn new(
        bind_addr: SocketAddr,
        max_message_size: usize,
        handler: Arc<RequestHandler>,
    ) -> Self {
        let (shutdown_tx, shutdown_rx) = oneshot::channel::<()>();

        Self {
            bind_addr,
            state: AppState {
                handler,
                max_message_size,
            },
            shutdown_tx,
            shutdown_rx,
        }
    }

    /// 创建应用路由
    ///
    /// 所有方法都交给处理函数，由它返回带响应体的 405
    pub fn create_router(&self) -> Router {
        Router::new()
            .route(DOH_QUERY_PATH, any(handle_dns_query))
            .with_state(self.state.clone())
    }

    /// 启动 DoH 服务器
    pub async fn run(self, subsys: SubsystemHandle) -> Result<(), AppError> {
        // 创建路由
        let app = self.create_router();

        // 创建 TCP 监听器
        let listener = match TcpListener::bind(self.bind_addr).await {
            Ok(listener) => {
                info!("DoH server listening on {}", self.bind_addr);
                listener
            }
            Err(e) => {
                error!("Failed to bind DoH server: {}", e);
                return Err(AppError::Io(e));
            }
        };

        // 获取关闭信号接收端
        let shutdown_rx = self.shutdown_rx;

        // 启动 HTTP 服务器
        let server = axum::serve(listener, app)
            .with_graceful_shutdown(async {
                let _ = shutdown_rx.await;
                info!("DoH server received shutdown signal");
            })
            .into_future();
        tokio::pin!(server);

        let result = tokio::select! {
            result = &mut server => result,
            _ = subsys.on_shutdown_requested() => {
                info!("Shutdown requested, draining in-flight DoH requests");
                let _ = self.shutdown_tx.send(());
                // 继续驱动服务器，直到进行中的请求完成
                server.await
            }
        };

        if let Err(e) = result {
            error!("DoH server error: {}", e);
            return Err(AppError::Io(e));
        }
        info!("DoH server stopped");
        Ok(())
    }
}
