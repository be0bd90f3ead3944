//! # HTTP API
//!
//! 事件接入层。
//!
//! 负责：
//! - `POST /events`: 接收事件数组，返回分发结果
//! - `GET /protected/health`: 存活探针
//! - 请求体无法解析时整体拒绝 (400)，不进入分发核心
//! - 请求体超过 `server.max_body_bytes` 时整体拒绝 (413)

mod error;
mod handlers;

use std::future::Future;
use std::sync::Arc;

use axum::extract::DefaultBodyLimit;
use axum::routing::{get, post};
use axum::Router;
use tokio::net::TcpListener;
use tower_http::trace::TraceLayer;
use tracing::info;

use contracts::MessageBroker;
use dispatcher::EventDispatcher;

pub use error::ApiError;

/// Build the service router over a shared dispatcher
///
/// Request bodies larger than `max_body_bytes` are answered with 413.
pub fn router<B>(dispatcher: Arc<EventDispatcher<B>>, max_body_bytes: usize) -> Router
where
    B: MessageBroker + Send + Sync + 'static,
{
    Router::new()
        .route("/events", post(handlers::handle_events::<B>))
        .route("/protected/health", get(handlers::handle_health))
        .with_state(dispatcher)
        .layer(DefaultBodyLimit::max(max_body_bytes))
        .layer(
            TraceLayer::new_for_http().make_span_with(|request: &axum::http::Request<_>| {
                tracing::info_span!(
                    "http_request",
                    method = %request.method(),
                    path = %request.uri().path(),
                )
            }),
        )
}

/// Serve `router` on `listener` until `shutdown` resolves
pub async fn serve<F>(listener: TcpListener, router: Router, shutdown: F) -> Result<(), ApiError>
where
    F: Future<Output = ()> + Send + 'static,
{
    let addr = listener.local_addr()?;
    info!(addr = %addr, "HTTP server listening");

    axum::serve(listener, router)
        .with_graceful_shutdown(shutdown)
        .await?;

    info!("HTTP server stopped");
    Ok(())
}
