use std::sync::Arc;

use axum::Router;
use log::info;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

use crate::api::create_api_router;
use crate::backend::BackendClient;
use crate::config::{AppConfig, ServerConfig};
use crate::countdown::{Clock, LiveClock};

/// 서버 상태
#[derive(Clone)]
pub struct ServerState {
    pub backend: Arc<dyn BackendClient>,
    pub app: Arc<AppConfig>,
    pub config: Arc<ServerConfig>,
    pub clock: Arc<dyn Clock>,
    /// 화면 헤더의 시스템 시계
    pub live_clock: Arc<LiveClock>,
}

impl ServerState {
    /// 상태 생성 (시스템 시계 틱 시작)
    pub fn new(
        backend: Arc<dyn BackendClient>,
        app: AppConfig,
        config: ServerConfig,
        clock: Arc<dyn Clock>,
    ) -> Self {
        let live_clock = LiveClock::start(app.system_time, clock.clone());
        Self {
            backend,
            app: Arc::new(app),
            config: Arc::new(config),
            clock,
            live_clock: Arc::new(live_clock),
        }
    }
}

/// 라우터 생성 (CORS/추적 레이어 포함)
pub fn build_router(state: ServerState) -> Router {
    create_api_router()
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// 서버 시작
pub async fn start_server(state: ServerState) -> std::io::Result<()> {
    let port = state.config.rest_port;
    info!("🚀 BITFUSE 서버 시작 중...");

    let router = build_router(state);
    let listener = tokio::net::TcpListener::bind(format!("0.0.0.0:{}", port)).await?;

    info!("✅ 서버가 성공적으로 시작되었습니다");
    info!("📡 REST API: http://localhost:{}/api/v1", port);
    info!("🔌 WebSocket: ws://localhost:{}/ws", port);

    axum::serve(listener, router).await
}
