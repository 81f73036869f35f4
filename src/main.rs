use std::sync::Arc;

use log::{info, warn};

use bitfuse::backend::{connect, BackendClient, InMemoryBackend, DEMO_EMAIL, DEMO_PASSWORD};
use bitfuse::config::{AppConfig, ServerConfig};
use bitfuse::countdown::SystemClock;
use bitfuse::server::{start_server, ServerState};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // .env 로드 후 로깅 초기화 (RUST_LOG 미설정 시 info)
    dotenv::dotenv().ok();
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    info!("🚀 BITFUSE 지갑 대시보드 시작");

    // 설정 로드
    let app = AppConfig::from_env()?;
    let config = ServerConfig::from_env()?;

    // 백엔드 연결 (설정이 없으면 데모 백엔드)
    let backend: Arc<dyn BackendClient> = match connect(&config.backend) {
        Ok(rest) => Arc::new(rest),
        Err(e) => {
            warn!("⚠️ 원격 백엔드 사용 불가 ({}), 데모 백엔드로 실행합니다", e);
            info!("🧪 데모 로그인: {} / {}", DEMO_EMAIL, DEMO_PASSWORD);
            Arc::new(InMemoryBackend::seeded(&app))
        }
    };

    let state = ServerState::new(backend, app, config, Arc::new(SystemClock));
    start_server(state).await?;

    Ok(())
}
