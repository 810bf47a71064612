//! HTTP 服务（RequestHandler）
//!
//! ## 路由
//!
//! - `POST /api/v1/essay` - 分析一段文本，返回合并后的报告
//! - `GET /health` - 存活检查
//! - `GET /api/v1/providers/reachability` - 显式的可达性探测

pub mod handlers;

use crate::config::Config;
use crate::error::{AppError, AppResult};
use crate::infrastructure::HttpExecutor;
use crate::orchestrator::AnalysisOrchestrator;
use axum::routing::{get, post};
use axum::Router;
use std::future::Future;
use std::sync::Arc;
use tokio::net::TcpListener;
use tokio::signal;
use tokio::sync::oneshot;
use tokio::task::JoinHandle;
use tracing::{error, info};

pub use handlers::HandlerError;

/// 请求间共享的状态
#[derive(Clone)]
pub struct AppState {
    pub orchestrator: Arc<AnalysisOrchestrator>,
    pub executor: Arc<HttpExecutor>,
}

impl AppState {
    pub fn new(orchestrator: Arc<AnalysisOrchestrator>, executor: Arc<HttpExecutor>) -> Self {
        Self {
            orchestrator,
            executor,
        }
    }
}

/// 构建路由
pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(handlers::health))
        .route("/api/v1/essay", post(handlers::analyze_essay))
        .route(
            "/api/v1/providers/reachability",
            get(handlers::reachability),
        )
        .with_state(state)
}

/// 后台运行的服务句柄，持有端口与关闭触发器
pub struct ServeHandle {
    pub port: u16,
    shutdown_tx: Option<oneshot::Sender<()>>,
    join: Option<JoinHandle<std::io::Result<()>>>,
}

impl ServeHandle {
    /// 触发优雅关闭并等待服务退出
    pub async fn shutdown(mut self) -> AppResult<()> {
        if let Some(tx) = self.shutdown_tx.take() {
            let _ = tx.send(());
        }
        if let Some(join) = self.join.take() {
            join.await
                .map_err(|e| AppError::Other(format!("服务任务异常结束: {}", e)))??;
        }
        Ok(())
    }
}

/// 在后台任务中启动服务
pub async fn spawn(bind_address: &str, state: AppState) -> AppResult<ServeHandle> {
    let listener = bind(bind_address).await?;
    let port = listener.local_addr()?.port();

    let (shutdown_tx, shutdown_rx) = oneshot::channel();
    let join = tokio::spawn(run(listener, state, async {
        let _ = shutdown_rx.await;
    }));

    Ok(ServeHandle {
        port,
        shutdown_tx: Some(shutdown_tx),
        join: Some(join),
    })
}

/// 前台运行服务，直到收到 ctrl-c
pub async fn serve(config: &Config, state: AppState) -> AppResult<()> {
    let listener = bind(&config.bind_address).await?;
    run(listener, state, shutdown_signal()).await?;
    info!("👋 服务已关闭");
    Ok(())
}

async fn bind(bind_address: &str) -> AppResult<TcpListener> {
    let listener = TcpListener::bind(bind_address)
        .await
        .map_err(|e| AppError::bind_failed(bind_address, e))?;
    info!("🌐 监听 http://{}", listener.local_addr()?);
    Ok(listener)
}

async fn run(
    listener: TcpListener,
    state: AppState,
    shutdown: impl Future<Output = ()> + Send + 'static,
) -> std::io::Result<()> {
    axum::serve(listener, router(state))
        .with_graceful_shutdown(shutdown)
        .await
}

/// 等待 ctrl-c
async fn shutdown_signal() {
    match signal::ctrl_c().await {
        Ok(()) => info!("收到关闭信号"),
        Err(e) => {
            error!("无法监听 ctrl-c: {}", e);
            std::future::pending::<()>().await;
        }
    }
}
