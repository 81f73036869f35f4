use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::backend::RealtimeEvent;
use crate::countdown::TimeRemaining;
use crate::domain::{Account, Session};
use crate::forms::{FieldErrors, WithdrawalDestination};

/// 로그인/회원가입 응답
#[derive(Debug, Serialize, Deserialize)]
pub struct AuthResponse {
    pub access_token: String,
    pub account: Account,
    pub is_admin: bool,
}

impl From<Session> for AuthResponse {
    fn from(session: Session) -> Self {
        Self {
            access_token: session.access_token,
            account: session.account,
            is_admin: session.is_admin,
        }
    }
}

/// 단순 메시지 응답
#[derive(Debug, Serialize, Deserialize)]
pub struct MessageResponse {
    pub message: String,
}

/// 금액 쿼리 (`?amount=`)
#[derive(Debug, Default, Deserialize)]
pub struct AmountQuery {
    pub amount: Option<String>,
}

/// 고객지원 쿼리 (`?message=`)
#[derive(Debug, Default, Deserialize)]
pub struct SupportQuery {
    pub message: Option<String>,
}

/// 입금 접수 응답 (상세 화면 경로 포함)
#[derive(Debug, Serialize, Deserialize)]
pub struct DepositAccepted {
    pub amount: f64,
    pub next: String,
}

/// 출금 접수 응답 (확인 화면 경로 포함)
#[derive(Debug, Serialize, Deserialize)]
pub struct WithdrawalAccepted {
    pub amount: f64,
    pub destination: WithdrawalDestination,
    pub destination_display: String,
    pub next: String,
}

/// 시스템 시계 응답
#[derive(Debug, Serialize, Deserialize)]
pub struct ClockResponse {
    pub system_time: DateTime<Utc>,
    pub display: String,
}

/// WebSocket 메시지 타입
#[derive(Debug, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum WebSocketMessage {
    /// 잔고/거래/투자 변경
    Event { event: RealtimeEvent },
    /// 시스템 시계 틱
    Clock { system_time: DateTime<Utc>, display: String },
    /// 입금 만료 카운트다운 틱
    Countdown {
        expires_at: DateTime<Utc>,
        remaining: TimeRemaining,
        display: String,
    },
    /// 에러 메시지
    Error { message: String },
}

/// 클라이언트 -> 서버 WebSocket 명령
#[derive(Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum ClientMessage {
    /// 입금 상세 화면의 만료 시각 구독
    WatchDeposit { expires_at: DateTime<Utc> },
    /// 카운트다운 해제
    UnwatchDeposit,
}

/// API 오류 응답
#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub error: String,
    pub message: String,
    /// 필드별 검증 오류
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fields: Option<FieldErrors>,
}
