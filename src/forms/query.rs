//! 페이지 간 쿼리 파라미터 계약
//!
//! 입력 화면과 확인 화면 사이에 금액, 결제 수단, 수신 계정 정보를
//! 문자열 쿼리 파라미터로 주고받습니다. 금액을 해석할 수 없으면 0 으로 취급합니다.

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// 출금 수단
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum WithdrawalMethod {
    /// USDT 지갑
    Crypto,
    /// PIX 송금
    Pix,
}

impl WithdrawalMethod {
    pub fn as_str(&self) -> &'static str {
        match self {
            WithdrawalMethod::Crypto => "crypto",
            WithdrawalMethod::Pix => "pix",
        }
    }
}

impl fmt::Display for WithdrawalMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for WithdrawalMethod {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "crypto" => Ok(WithdrawalMethod::Crypto),
            "pix" => Ok(WithdrawalMethod::Pix),
            _ => Err(()),
        }
    }
}

/// PIX 키 유형
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PixKeyType {
    #[default]
    Cpf,
    Email,
    Phone,
    Random,
}

impl PixKeyType {
    pub fn as_str(&self) -> &'static str {
        match self {
            PixKeyType::Cpf => "cpf",
            PixKeyType::Email => "email",
            PixKeyType::Phone => "phone",
            PixKeyType::Random => "random",
        }
    }
}

impl FromStr for PixKeyType {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "cpf" => Ok(PixKeyType::Cpf),
            "email" => Ok(PixKeyType::Email),
            "phone" => Ok(PixKeyType::Phone),
            "random" => Ok(PixKeyType::Random),
            _ => Err(()),
        }
    }
}

/// 입금 확인 화면 쿼리
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct DepositQuery {
    pub amount: Option<String>,
}

impl DepositQuery {
    pub fn amount(&self) -> f64 {
        parse_amount(self.amount.as_deref())
    }
}

/// 출금 확인 화면 쿼리
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct WithdrawalQuery {
    pub method: Option<String>,
    pub amount: Option<String>,
    pub wallet: Option<String>,
    #[serde(rename = "pixKey")]
    pub pix_key: Option<String>,
    #[serde(rename = "pixKeyType")]
    pub pix_key_type: Option<String>,
}

impl WithdrawalQuery {
    pub fn amount(&self) -> f64 {
        parse_amount(self.amount.as_deref())
    }

    pub fn method(&self) -> Option<WithdrawalMethod> {
        self.method.as_deref().and_then(|m| m.parse().ok())
    }

    pub fn pix_key_type(&self) -> Option<PixKeyType> {
        self.pix_key_type.as_deref().and_then(|t| t.parse().ok())
    }
}

/// 확인 화면 상태
///
/// 금액이 0 이하이면(누락/해석 불가 포함) 확인 화면은 `Incomplete` 로 표시됩니다.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "state", rename_all = "lowercase")]
pub enum FlowState<T> {
    Ready(T),
    Incomplete { title: String, message: String },
}

impl<T> FlowState<T> {
    pub fn incomplete(title: &str, message: &str) -> Self {
        FlowState::Incomplete {
            title: title.to_string(),
            message: message.to_string(),
        }
    }

    pub fn ready(self) -> Option<T> {
        match self {
            FlowState::Ready(value) => Some(value),
            FlowState::Incomplete { .. } => None,
        }
    }

    pub fn is_ready(&self) -> bool {
        matches!(self, FlowState::Ready(_))
    }
}

/// 금액 입력 정리
///
/// 숫자, `.`, `,` 만 남기고 첫 번째 `,` 를 `.` 로 바꿉니다.
pub fn sanitize_amount_input(raw: &str) -> String {
    let kept: String = raw
        .chars()
        .filter(|c| c.is_ascii_digit() || *c == '.' || *c == ',')
        .collect();
    kept.replacen(',', ".", 1)
}

/// 금액 해석 (없거나 해석 불가, 음수/비유한 값은 0)
pub fn parse_amount(raw: Option<&str>) -> f64 {
    let Some(raw) = raw else {
        return 0.0;
    };
    match leading_number(raw.trim()).parse::<f64>() {
        Ok(value) if value.is_finite() && value > 0.0 => value,
        _ => 0.0,
    }
}

/// 참조 ID (접두어 + 밀리초 타임스탬프 끝 8자리)
pub fn reference_id(prefix: &str, now: DateTime<Utc>) -> String {
    format!("{}-{:08}", prefix, now.timestamp_millis().rem_euclid(100_000_000))
}

/// 앞쪽의 숫자 부분만 취함 ("12.5abc" -> "12.5", "1.2.3" -> "1.2")
fn leading_number(raw: &str) -> &str {
    let bytes = raw.as_bytes();
    let mut end = 0;
    let mut seen_dot = false;
    let mut seen_digit = false;

    while end < bytes.len() {
        match bytes[end] {
            b'0'..=b'9' => seen_digit = true,
            b'.' if !seen_dot => seen_dot = true,
            b'-' | b'+' if end == 0 => {}
            _ => break,
        }
        end += 1;
    }

    if seen_digit {
        &raw[..end]
    } else {
        ""
    }
}
