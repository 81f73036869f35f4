/**
* filename : mod
* author : HAMA
* date: 2025. 8. 14.
* description: 외부 백엔드(인증 + 사용자 데이터) 접근 계층
**/

pub mod memory;
pub mod rest;
pub mod subscription;

use async_trait::async_trait;

use crate::config::BackendConfig;
use crate::domain::{Account, Balance, Investment, InvestmentPlan, Referral, Session, Transaction};
use crate::forms::Registration;

pub use memory::{InMemoryBackend, DEMO_EMAIL, DEMO_PASSWORD, DEMO_USER_ID};
pub use rest::RestBackend;
pub use subscription::{RealtimeEvent, Subscription};

/// 백엔드 에러 타입
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum BackendError {
    #[error("백엔드가 설정되지 않음")]
    Unavailable,
    #[error("이메일 또는 비밀번호가 올바르지 않음")]
    InvalidCredentials,
    #[error("인증되지 않은 세션")]
    Unauthorized,
    #[error("찾을 수 없음: {0}")]
    NotFound(String),
    #[error("이미 존재함: {0}")]
    AlreadyExists(String),
    #[error("요청 실패: {0}")]
    Request(String),
    #[error("응답 해석 실패: {0}")]
    Decode(String),
}

impl From<reqwest::Error> for BackendError {
    fn from(error: reqwest::Error) -> Self {
        if error.is_decode() {
            BackendError::Decode(error.to_string())
        } else {
            BackendError::Request(error.to_string())
        }
    }
}

/// 인증과 사용자 데이터 제공자
///
/// 모든 조회는 명시적으로 전달된 사용자 ID 기준이며 전역 세션을 읽지 않습니다.
#[async_trait]
pub trait BackendClient: Send + Sync {
    /// 이메일/비밀번호 로그인
    async fn sign_in(&self, email: &str, password: &str) -> Result<Session, BackendError>;

    /// 회원가입 후 바로 로그인된 세션 반환
    async fn sign_up(&self, registration: &Registration) -> Result<Session, BackendError>;

    /// 액세스 토큰으로 세션 복원
    async fn session(&self, access_token: &str) -> Result<Session, BackendError>;

    async fn sign_out(&self, access_token: &str) -> Result<(), BackendError>;

    async fn profile(&self, user_id: &str) -> Result<Account, BackendError>;

    /// 잔고 (행이 없으면 0 잔고)
    async fn balance(&self, user_id: &str) -> Result<Balance, BackendError>;

    /// 거래 내역 (최신순, `limit` 가 있으면 최대 개수)
    async fn transactions(&self, user_id: &str, limit: Option<usize>) -> Result<Vec<Transaction>, BackendError>;

    /// 투자 목록 (최신순)
    async fn investments(&self, user_id: &str) -> Result<Vec<Investment>, BackendError>;

    /// 활성 플랜 (최소 금액 오름차순)
    async fn investment_plans(&self) -> Result<Vec<InvestmentPlan>, BackendError>;

    /// 추천 관계 (최신순)
    async fn referrals(&self, user_id: &str) -> Result<Vec<Referral>, BackendError>;

    async fn is_admin(&self, user_id: &str) -> Result<bool, BackendError>;

    /// 잔고/거래/투자 변경 구독
    async fn subscribe(&self, user_id: &str) -> Result<Subscription, BackendError>;
}

/// 설정으로 원격 백엔드 연결
///
/// URL 이나 키가 자리표시자이면 `Unavailable` 을 반환합니다.
pub fn connect(config: &BackendConfig) -> Result<RestBackend, BackendError> {
    if !config.is_configured() {
        return Err(BackendError::Unavailable);
    }
    RestBackend::new(config)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_connect_requires_configuration() {
        assert!(matches!(connect(&BackendConfig::default()), Err(BackendError::Unavailable)));

        let config = BackendConfig {
            url: "https://abc.supabase.co".to_string(),
            anon_key: "anon".to_string(),
            poll_interval_secs: 5,
        };
        assert!(connect(&config).is_ok());
    }
}
