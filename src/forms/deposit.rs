//! 입금 흐름
//!
//! 금액 입력 -> 검증 -> 상세 화면(수신 지갑, PIX 키, 90분 카운트다운, WhatsApp 확인 링크).

use chrono::{DateTime, Utc};
use log::debug;
use serde::{Deserialize, Serialize};
use url::form_urlencoded;

use crate::config::AppConfig;
use crate::countdown::{format_countdown, time_remaining_at, TimeRemaining};
use crate::finance::{convert_brl_to_usdt, support_link};
use crate::finance::calculator::to_fixed_2;
use crate::forms::errors::FieldErrors;
use crate::forms::query::{parse_amount, reference_id, sanitize_amount_input, DepositQuery, FlowState};

/// 입금 입력 폼
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct DepositForm {
    /// 사용자가 입력한 금액 문자열 ("1.500,50" 등)
    pub amount: String,
}

/// 검증을 통과한 입금 요청
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DepositRequest {
    pub amount: f64,
}

impl DepositRequest {
    /// 상세 화면으로 넘길 쿼리 문자열 (`amount=5000`)
    pub fn details_query(&self) -> String {
        form_urlencoded::Serializer::new(String::new())
            .append_pair("amount", &self.amount.to_string())
            .finish()
    }
}

/// 입금 견적 (입력 중 실시간 환산)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DepositQuote {
    pub amount: f64,
    pub amount_display: String,
    pub usdt_amount: f64,
    pub usdt_display: String,
    pub usdt_rate: f64,
    pub min_amount: f64,
    pub meets_minimum: bool,
}

/// 입금 상세 화면
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DepositDetails {
    pub deposit_id: String,
    pub amount: f64,
    pub amount_display: String,
    pub usdt_amount: f64,
    pub usdt_display: String,
    pub wallet_address: String,
    pub pix_key: String,
    pub expires_at: DateTime<Utc>,
    pub time_remaining: TimeRemaining,
    pub countdown: String,
    pub confirmation_message: String,
    pub confirmation_link: String,
}

impl DepositDetails {
    /// 주어진 시각 기준으로 남은 시간 갱신
    pub fn refresh(&mut self, now: DateTime<Utc>) {
        self.time_remaining = time_remaining_at(self.expires_at, now);
        self.countdown = format_countdown(&self.time_remaining);
    }

    pub fn is_expired(&self) -> bool {
        self.time_remaining.is_zero()
    }
}

/// 입금 폼 검증
pub fn validate_deposit(form: &DepositForm, config: &AppConfig) -> Result<DepositRequest, FieldErrors> {
    let amount = parse_amount(Some(&sanitize_amount_input(&form.amount)));

    let mut errors = FieldErrors::new();
    if amount < config.min_deposit_amount {
        errors.insert("amount", format!("Valor mínimo: {}", config.format_money(config.min_deposit_amount)));
    }

    errors.into_result(DepositRequest { amount })
}

/// BRL 금액의 USDT 환산 견적
pub fn quote_deposit(amount: f64, config: &AppConfig) -> DepositQuote {
    let usdt_amount = convert_brl_to_usdt(amount, config.usdt_rate);
    DepositQuote {
        amount,
        amount_display: config.format_money(amount),
        usdt_amount,
        usdt_display: to_fixed_2(usdt_amount),
        usdt_rate: config.usdt_rate,
        min_amount: config.min_deposit_amount,
        meets_minimum: amount >= config.min_deposit_amount,
    }
}

/// 상세 화면 구성
///
/// 금액이 없거나 0 이하이면 `Incomplete` 상태를 반환합니다.
pub fn deposit_details(query: &DepositQuery, config: &AppConfig, now: DateTime<Utc>) -> FlowState<DepositDetails> {
    let amount = query.amount();
    if amount <= 0.0 {
        return FlowState::incomplete(
            "Valor não especificado",
            "Por favor, volte e selecione um valor para depósito.",
        );
    }

    let deposit_id = reference_id("DEP", now);
    let usdt_amount = convert_brl_to_usdt(amount, config.usdt_rate);
    let usdt_display = to_fixed_2(usdt_amount);
    let expires_at = now + config.deposit_window();
    let time_remaining = time_remaining_at(expires_at, now);

    let confirmation_message = format!(
        "Olá! Realizei um depósito de {} ({} USDT) - ID: {}. Por favor, confirme o recebimento.",
        config.format_money(amount),
        usdt_display,
        deposit_id
    );
    let confirmation_link = support_link(&config.support_phone, &confirmation_message);

    debug!("💰 입금 상세 생성: id={} amount={} expires_at={}", deposit_id, amount, expires_at);

    FlowState::Ready(DepositDetails {
        deposit_id,
        amount,
        amount_display: config.format_money(amount),
        usdt_amount,
        usdt_display,
        wallet_address: config.deposit_wallet_address.clone(),
        pix_key: config.deposit_pix_key.clone(),
        expires_at,
        time_remaining,
        countdown: format_countdown(&time_remaining),
        confirmation_message,
        confirmation_link,
    })
}
