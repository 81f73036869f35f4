//! 지갑 대시보드의 기본 모델
//!
//! 이 모듈은 계정, 잔고, 거래, 투자, 투자 플랜 등
//! 외부 백엔드가 소유하고 코어가 읽기만 하는 데이터 모델을 정의합니다.
//! 필드 별칭은 호스팅 백엔드의 행(row) 이름을 그대로 받기 위한 것입니다.

use chrono::{DateTime, NaiveDate, TimeZone, Utc};
use serde::{Deserialize, Deserializer, Serialize};

/// 계정 상태
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AccountStatus {
  Active,
  Suspended,
  Banned,
}

/// KYC 인증 상태
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum KycStatus {
  Pending,
  Verified,
  Rejected,
}

/// 계정 정보
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Account {
  /// 사용자 고유 ID
  #[serde(alias = "user_id")]
  pub id: String,
  pub name: String,
  pub email: String,
  pub username: String,
  /// 전화번호 (선택)
  #[serde(default)]
  pub phone: Option<String>,
  /// 국가 신분번호 (CPF, 선택)
  #[serde(default)]
  pub cpf: Option<String>,
  /// 국가 코드 (예: "BR")
  pub country: String,
  pub status: AccountStatus,
  pub kyc_status: KycStatus,
  /// 가입일
  #[serde(deserialize_with = "lenient_date")]
  pub member_since: NaiveDate,
  /// USDT 출금 지갑 주소 (선택)
  #[serde(default)]
  pub usdt_wallet: Option<String>,
}

/// 잔고 정보
///
/// total = available + invested (+ 미실현 수익) 관계는 백엔드가 보장한다고 가정할 뿐
/// 코어에서 강제하지 않습니다.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Balance {
  #[serde(alias = "total_balance")]
  pub total: f64,
  #[serde(alias = "available_balance")]
  pub available: f64,
  #[serde(alias = "invested_balance")]
  pub invested: f64,
  pub referral_earnings: f64,
}

/// 거래 유형
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TransactionType {
  Deposit,
  Withdrawal,
  Return,
  Commission,
  Adjustment,
  Investment,
}

/// 거래 상태
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TransactionStatus {
  Pending,
  Completed,
  Failed,
  Cancelled,
}

/// 거래 내역 (생성 후 불변)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Transaction {
  pub id: String,
  #[serde(rename = "type")]
  pub kind: TransactionType,
  pub amount: f64,
  pub currency: String,
  pub status: TransactionStatus,
  pub description: String,
  pub created_at: DateTime<Utc>,
}

impl TransactionType {
  /// 화면 표시용 라벨
  pub fn label(&self) -> &'static str {
    match self {
      TransactionType::Deposit => "Depósito",
      TransactionType::Withdrawal => "Saque",
      TransactionType::Return => "Retorno",
      TransactionType::Commission => "Comissão",
      TransactionType::Adjustment => "Ajuste",
      TransactionType::Investment => "Investimento",
    }
  }

  /// 잔고를 늘리는 거래인지 여부
  pub fn is_credit(&self) -> bool {
    matches!(
      self,
      TransactionType::Deposit | TransactionType::Return | TransactionType::Commission
    )
  }
}

/// 투자 상태
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum InvestmentStatus {
  Active,
  Completed,
  Cancelled,
}

/// 투자 정보
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Investment {
  pub id: String,
  pub plan_id: String,
  /// 투자 원금
  pub amount: f64,
  /// 일일 수익률 (예: 0.025 = 2.5%)
  pub daily_return_rate: f64,
  #[serde(deserialize_with = "lenient_date")]
  pub start_date: NaiveDate,
  #[serde(deserialize_with = "lenient_date")]
  pub end_date: NaiveDate,
  pub status: InvestmentStatus,
  /// 지금까지 누적된 수익 (백엔드 계산)
  #[serde(default)]
  pub total_returns: f64,
}

impl Investment {
  pub fn is_active(&self) -> bool {
    self.status == InvestmentStatus::Active
  }

  /// 종료일 자정(UTC) 시각
  pub fn ends_at(&self) -> DateTime<Utc> {
    Utc.from_utc_datetime(&self.end_date.and_time(chrono::NaiveTime::MIN))
  }
}

/// 투자 플랜 (정적 카탈로그)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InvestmentPlan {
  pub id: String,
  pub name: String,
  /// 일일 수익률
  pub daily_return: f64,
  pub min_amount: f64,
  pub max_amount: f64,
  pub duration_days: u32,
}

impl InvestmentPlan {
  pub fn new(id: &str, name: &str, daily_return: f64, min_amount: f64, max_amount: f64, duration_days: u32) -> Self {
    Self {
      id: id.to_string(),
      name: name.to_string(),
      daily_return,
      min_amount,
      max_amount,
      duration_days,
    }
  }

  /// 금액이 플랜 허용 범위 안에 있는지 확인
  pub fn accepts(&self, amount: f64) -> bool {
    amount >= self.min_amount && amount <= self.max_amount
  }
}

/// 추천받은 사용자의 공개 프로필
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReferredProfile {
  pub username: String,
  pub name: String,
  pub status: AccountStatus,
}

/// 추천(레퍼럴) 관계
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Referral {
  pub id: String,
  /// 추천 깊이 (1 = 직접 추천)
  pub level: u32,
  pub commission_percentage: f64,
  pub total_commission: f64,
  pub created_at: DateTime<Utc>,
  #[serde(default)]
  pub referred_profile: Option<ReferredProfile>,
}

/// 인증된 세션
///
/// 전역 컨텍스트 대신 필요한 곳에 값으로 전달합니다.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Session {
  pub access_token: String,
  pub account: Account,
  pub is_admin: bool,
}

impl Session {
  pub fn user_id(&self) -> &str {
    &self.account.id
  }
}

/// "2025-08-10" 과 "2025-08-10T00:00:00Z" 형식을 모두 받는 날짜 역직렬화
fn lenient_date<'de, D>(deserializer: D) -> Result<NaiveDate, D::Error>
where
  D: Deserializer<'de>,
{
  let raw = String::deserialize(deserializer)?;
  let date_part = raw.get(..10).unwrap_or(&raw);
  NaiveDate::parse_from_str(date_part, "%Y-%m-%d").map_err(serde::de::Error::custom)
}
