//! 애플리케이션 설정
//!
//! 비즈니스 상수(환율, 수수료, 최소 입금액, 플랜 카탈로그 등)와
//! 서버 실행 설정을 정의합니다. 값은 `.env` 파일과 환경 변수로 덮어쓸 수 있습니다.

use std::env;
use std::str::FromStr;

use chrono::{DateTime, Duration, Utc};
use log::warn;
use serde::{Deserialize, Serialize};

use crate::domain::InvestmentPlan;
use crate::finance::format_currency;

/// 대체 공개 주소 (브라우저 컨텍스트가 없을 때 사용)
pub const FALLBACK_ORIGIN: &str = "https://bitfuse.com";

/// 설정 오류 타입
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("환경 변수 {name} 값이 올바르지 않음: {value}")]
    InvalidValue { name: String, value: String },
    #[error("시스템 시간 형식 오류: {0}")]
    InvalidSystemTime(#[from] chrono::ParseError),
}

/// 비즈니스 설정 (정적 설정 객체)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    /// 기본 통화 코드 (금액 표시 형식 결정)
    pub currency: String,
    /// 1 USDT 당 BRL 환율
    pub usdt_rate: f64,
    /// 최소 입금액 (BRL)
    pub min_deposit_amount: f64,
    /// 출금 수수료율 (0.02 = 2%)
    pub withdrawal_fee: f64,
    /// 추천 깊이별 커미션 비율 (1단계부터)
    pub referral_levels: Vec<f64>,
    /// 고객지원 연락처
    pub support_phone: String,
    /// 투자 플랜 카탈로그
    pub investment_plans: Vec<InvestmentPlan>,
    /// 입금 대기 시간 (분)
    pub deposit_window_minutes: i64,
    /// 입금 수신 지갑 주소
    pub deposit_wallet_address: String,
    /// 입금 수신 PIX 키
    pub deposit_pix_key: String,
    /// 시스템 시계 기준 시각
    pub system_time: DateTime<Utc>,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            currency: "BRL".to_string(),
            usdt_rate: 5.45,
            min_deposit_amount: 200.0,
            withdrawal_fee: 0.02,
            referral_levels: vec![0.1, 0.05, 0.03, 0.02, 0.01],
            support_phone: "+5511999999999".to_string(),
            investment_plans: vec![
                InvestmentPlan::new("miner-start", "Miner Start", 0.015, 200.0, 5000.0, 30),
                InvestmentPlan::new("miner-cosmico", "Miner Cósmico", 0.025, 5000.0, 50000.0, 60),
                InvestmentPlan::new("miner-cosmico-plus", "Miner Cósmico Plus", 0.035, 50000.0, 500000.0, 90),
            ],
            deposit_window_minutes: 90,
            deposit_wallet_address: "9WzDXwBbmkg8ZTbNMqUxvQRAyrZzDsGYdLVL9zYtAWWM".to_string(),
            deposit_pix_key: "bitfuse@pix.com.br".to_string(),
            system_time: DateTime::parse_from_rfc3339("2025-08-14T20:18:00Z")
                .map(|t| t.with_timezone(&Utc))
                .unwrap_or_else(|_| Utc::now()),
        }
    }
}

impl AppConfig {
    /// 환경 변수로 기본값 덮어쓰기
    pub fn from_env() -> Result<Self, ConfigError> {
        let mut config = Self::default();

        if let Some(rate) = read_var::<f64>("BITFUSE_USDT_RATE")? {
            config.usdt_rate = rate;
        }
        if let Some(fee) = read_var::<f64>("BITFUSE_WITHDRAWAL_FEE")? {
            config.withdrawal_fee = fee;
        }
        if let Some(min) = read_var::<f64>("BITFUSE_MIN_DEPOSIT")? {
            config.min_deposit_amount = min;
        }
        if let Ok(currency) = env::var("BITFUSE_CURRENCY") {
            config.currency = currency.trim().to_ascii_uppercase();
        }
        if let Ok(phone) = env::var("BITFUSE_SUPPORT_PHONE") {
            config.support_phone = phone;
        }
        if let Ok(raw) = env::var("BITFUSE_SYSTEM_TIME") {
            config.system_time = DateTime::parse_from_rfc3339(&raw)?.with_timezone(&Utc);
        }

        Ok(config)
    }

    /// ID로 플랜 조회
    pub fn plan(&self, plan_id: &str) -> Option<&InvestmentPlan> {
        self.investment_plans.iter().find(|plan| plan.id == plan_id)
    }

    /// 기본 통화로 금액 표시
    pub fn format_money(&self, value: f64) -> String {
        format_currency(value, &self.currency)
    }

    /// 입금 대기 시간
    pub fn deposit_window(&self) -> Duration {
        Duration::minutes(self.deposit_window_minutes)
    }
}

/// 외부 백엔드 접속 설정
#[derive(Debug, Clone)]
pub struct BackendConfig {
    pub url: String,
    pub anon_key: String,
    /// 구독 폴링 간격 (초)
    pub poll_interval_secs: u64,
}

impl BackendConfig {
    /// 자리표시자 값이면 백엔드를 사용할 수 없는 상태로 봅니다
    pub fn is_configured(&self) -> bool {
        !self.url.is_empty()
            && !self.anon_key.is_empty()
            && !self.url.contains("placeholder")
            && !self.anon_key.contains("placeholder")
    }
}

impl Default for BackendConfig {
    fn default() -> Self {
        Self {
            url: "https://placeholder.supabase.co".to_string(),
            anon_key: "placeholder-key".to_string(),
            poll_interval_secs: 5,
        }
    }
}

/// 서버 설정
#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub rest_port: u16,
    /// 추천 링크 등에 쓰이는 공개 주소
    pub public_origin: Option<String>,
    pub backend: BackendConfig,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            rest_port: 7000,
            public_origin: None,
            backend: BackendConfig::default(),
        }
    }
}

impl ServerConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        let mut config = Self::default();

        if let Some(port) = read_var::<u16>("BITFUSE_PORT")? {
            config.rest_port = port;
        }
        config.public_origin = env::var("BITFUSE_PUBLIC_ORIGIN").ok().filter(|o| !o.is_empty());

        if let Ok(url) = env::var("SUPABASE_URL") {
            config.backend.url = url;
        }
        if let Ok(key) = env::var("SUPABASE_ANON_KEY") {
            config.backend.anon_key = key;
        }
        if let Some(secs) = read_var::<u64>("BITFUSE_POLL_INTERVAL_SECS")? {
            config.backend.poll_interval_secs = secs.max(1);
        }

        if !config.backend.is_configured() {
            warn!("⚠️ 백엔드 환경 변수가 설정되지 않았습니다. SUPABASE_URL, SUPABASE_ANON_KEY 를 설정하세요");
        }

        Ok(config)
    }

    /// 공개 주소 (미설정 시 대체 주소)
    pub fn origin(&self) -> &str {
        self.public_origin.as_deref().unwrap_or(FALLBACK_ORIGIN)
    }
}

fn read_var<T: FromStr>(name: &str) -> Result<Option<T>, ConfigError> {
    match env::var(name) {
        Ok(raw) => raw
            .trim()
            .parse::<T>()
            .map(Some)
            .map_err(|_| ConfigError::InvalidValue { name: name.to_string(), value: raw }),
        Err(_) => Ok(None),
    }
}
