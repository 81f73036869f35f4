use axum::{
    routing::{get, post},
    Router,
};

use crate::api::handlers::*;
use crate::api::websocket::websocket_handler;
use crate::server::ServerState;

/// API 라우터 생성
pub fn create_api_router() -> Router<ServerState> {
    Router::new()
        // 인증 API
        .route("/api/v1/auth/login", post(login))
        .route("/api/v1/auth/register", post(register))
        .route("/api/v1/auth/logout", post(logout))

        // 대시보드 / 투자 API
        .route("/api/v1/dashboard", get(get_dashboard))
        .route("/api/v1/plans", get(get_plans))
        .route("/api/v1/plans/:plan_id/projection", get(get_projection))

        // 입금 흐름
        .route("/api/v1/deposit/quote", get(get_deposit_quote))
        .route("/api/v1/deposit", post(submit_deposit))
        .route("/api/v1/deposit/details", get(get_deposit_details))

        // 출금 흐름
        .route("/api/v1/withdrawal", post(submit_withdrawal))
        .route("/api/v1/withdrawal/confirm", get(get_withdrawal_confirmation))

        // 추천 / 고객지원 / 시계
        .route("/api/v1/referral", get(get_referral))
        .route("/api/v1/support", get(get_support))
        .route("/api/v1/clock", get(get_clock))

        // 실시간 구독
        .route("/ws", get(websocket_handler))
}
