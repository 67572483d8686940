// src/admin.rs

use crate::error::AppError;
use crate::metrics;
use axum::{routing::get, Router};
use std::future::IntoFuture;
use std::net::SocketAddr;
use tokio::net::TcpListener;
use tokio::sync::oneshot;
use tokio_graceful_shutdown::SubsystemHandle;
use tracing::{error, info};

// 管理服务器，提供健康检查和指标导出
pub struct AdminServer {
    // 监听地址
    listen_addr: SocketAddr,
    // 停止信号接收端
    shutdown_rx: oneshot::Receiver<()>,
    // 停止信号发送端
    shutdown_tx: oneshot::Sender<()>,
}

impl AdminServer {
    // 创建新的管理服务器
    pub fn new(listen_addr: SocketAddr) -> Self {
        let (shutdown_tx, shutdown_rx) = oneshot::channel();

        Self {
            listen_addr,
            shutdown_rx,
            shutdown_tx,
        }
    }

    // 创建管理路由
    pub fn create_router() -> Router {
        Router::new()
            .route("/health", get(health_handler))
            .merge(metrics::metrics_routes())
    }

    // 作为子系统运行，关闭请求到达后等待进行中的请求完成
    pub async fn run(self, subsys: SubsystemHandle) -> Result<(), AppError> {
        let Self {
            listen_addr,
            shutdown_rx,
            shutdown_tx,
        } = self;

        let listener = match TcpListener::bind(listen_addr).await {
            Ok(listener) => {
                info!("Admin server listening on {}", listen_addr);
                listener
            }
            Err(e) => {
                error!("Failed to bind admin server: {}", e);
                return Err(AppError::Io(e));
            }
        };

        let server = axum::serve(listener, Self::create_router())
            .with_graceful_shutdown(async {
                let _ = shutdown_rx.await;
                info!("Admin server received shutdown signal");
            })
            .into_future();
        tokio::pin!(server);

        let result = tokio::select! {
            result = &mut server => result,
            _ = subsys.on_shutdown_requested() => {
                info!("Received subsystem shutdown request, admin server is stopping");
                let _ = shutdown_tx.send(());
                server.await
            }
        };

        if let Err(err) = result {
            error!("Admin server error: {}", err);
            return Err(AppError::Io(err));
        }
        info!("Admin server stopped");
        Ok(())
    }
}

// 健康检查处理程序
async fn health_handler() -> &'static str {
    "OK"
}
