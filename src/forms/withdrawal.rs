//! 출금 흐름
//!
//! 출금 폼 검증 -> 확인 화면 쿼리 -> 확인 화면(수수료, 실수령액, 출금 ID).

use chrono::{DateTime, Utc};
use log::debug;
use serde::{Deserialize, Serialize};
use url::form_urlencoded;

use crate::config::AppConfig;
use crate::domain::{Balance, Investment};
use crate::finance::{calculate_withdrawal_fee, format_cpf, format_percentage, truncate_address};
use crate::forms::errors::FieldErrors;
use crate::forms::query::{
    parse_amount,
    reference_id,
    sanitize_amount_input,
    FlowState,
    PixKeyType,
    WithdrawalMethod,
    WithdrawalQuery,
};

/// 처리 예상 기간
pub const PROCESSING_TIME: &str = "1-3 dias úteis";

/// 출금 입력 폼
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct WithdrawalForm {
    pub method: WithdrawalMethod,
    pub amount: String,
    #[serde(default)]
    pub wallet_address: String,
    #[serde(default)]
    pub pix_key: String,
    #[serde(default)]
    pub pix_key_type: PixKeyType,
}

/// 출금 수신처
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "method", rename_all = "lowercase")]
pub enum WithdrawalDestination {
    Crypto {
        wallet: String,
    },
    Pix {
        #[serde(rename = "pixKey")]
        key: String,
        #[serde(rename = "pixKeyType")]
        key_type: PixKeyType,
    },
}

impl WithdrawalDestination {
    pub fn method(&self) -> WithdrawalMethod {
        match self {
            WithdrawalDestination::Crypto { .. } => WithdrawalMethod::Crypto,
            WithdrawalDestination::Pix { .. } => WithdrawalMethod::Pix,
        }
    }

    /// 화면 표시용 (지갑 주소는 축약)
    pub fn display(&self) -> String {
        match self {
            WithdrawalDestination::Crypto { wallet } => truncate_address(wallet, 6, 4),
            WithdrawalDestination::Pix { key, .. } => key.clone(),
        }
    }
}

/// 검증을 통과한 출금 요청
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WithdrawalRequest {
    pub amount: f64,
    pub destination: WithdrawalDestination,
}

impl WithdrawalRequest {
    /// 확인 화면으로 넘길 쿼리 문자열
    pub fn confirmation_query(&self) -> String {
        let mut query = form_urlencoded::Serializer::new(String::new());
        query.append_pair("method", self.destination.method().as_str());
        query.append_pair("amount", &self.amount.to_string());

        match &self.destination {
            WithdrawalDestination::Crypto { wallet } => {
                query.append_pair("wallet", wallet);
            }
            WithdrawalDestination::Pix { key, key_type } => {
                query.append_pair("pixKey", key);
                query.append_pair("pixKeyType", key_type.as_str());
            }
        }

        query.finish()
    }
}

/// 출금 확인 화면
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WithdrawalConfirmation {
    pub withdrawal_id: String,
    pub method: WithdrawalMethod,
    pub amount: f64,
    pub fee: f64,
    pub final_amount: f64,
    pub amount_display: String,
    pub fee_display: String,
    pub final_amount_display: String,
    pub fee_rate_display: String,
    pub wallet: Option<String>,
    pub pix_key: Option<String>,
    pub pix_key_type: Option<PixKeyType>,
    pub destination_display: String,
    pub processing_time: String,
}

/// 출금 폼 검증
///
/// `amount` 오류는 활성 투자 -> 0 이하 -> 잔고 부족 순으로 검사하며 나중 검사가 메시지를 덮어씁니다.
/// 잔고가 아직 로드되지 않았으면 잔고 부족 검사는 건너뜁니다.
pub fn validate_withdrawal(
    form: &WithdrawalForm,
    balance: Option<&Balance>,
    investments: &[Investment],
    config: &AppConfig,
) -> Result<WithdrawalRequest, FieldErrors> {
    let amount = parse_amount(Some(&sanitize_amount_input(&form.amount)));
    let mut errors = FieldErrors::new();

    if investments.iter().any(Investment::is_active) {
        errors.insert("amount", "Não é possível sacar com investimentos ativos");
    }
    if amount <= 0.0 {
        errors.insert("amount", "Valor deve ser maior que zero");
    }
    if let Some(balance) = balance {
        if amount > balance.available {
            errors.insert("amount", format!("Saldo insuficiente. Disponível: {}", config.format_money(balance.available)));
        }
    }

    let destination = match form.method {
        WithdrawalMethod::Crypto => {
            let wallet = form.wallet_address.trim();
            if wallet.is_empty() {
                errors.insert("walletAddress", "Endereço da carteira é obrigatório");
            }
            WithdrawalDestination::Crypto { wallet: wallet.to_string() }
        }
        WithdrawalMethod::Pix => {
            let key = form.pix_key.trim();
            if key.is_empty() {
                errors.insert("pixKey", "Chave PIX é obrigatória");
            }
            let key = match form.pix_key_type {
                PixKeyType::Cpf => format_cpf(key),
                _ => key.to_string(),
            };
            WithdrawalDestination::Pix { key, key_type: form.pix_key_type }
        }
    };

    errors.into_result(WithdrawalRequest { amount, destination })
}

/// 확인 화면 구성
///
/// 금액이 0 이하이거나 수단을 알 수 없으면 `Incomplete` 상태를 반환합니다.
pub fn confirm_withdrawal(
    query: &WithdrawalQuery,
    config: &AppConfig,
    now: DateTime<Utc>,
) -> FlowState<WithdrawalConfirmation> {
    let amount = query.amount();
    let method = match query.method() {
        Some(method) if amount > 0.0 => method,
        _ => {
            return FlowState::incomplete(
                "Dados incompletos",
                "Por favor, volte e preencha todos os dados necessários.",
            )
        }
    };

    let fee = calculate_withdrawal_fee(amount, config.withdrawal_fee);
    let withdrawal_id = reference_id("WTH", now);

    let (wallet, pix_key, pix_key_type, destination_display) = match method {
        WithdrawalMethod::Crypto => {
            let wallet = query.wallet.clone().unwrap_or_default();
            let shown = truncate_address(&wallet, 6, 4);
            (Some(wallet), None, None, shown)
        }
        WithdrawalMethod::Pix => {
            let key = query.pix_key.clone().unwrap_or_default();
            (None, Some(key.clone()), query.pix_key_type(), key)
        }
    };

    debug!("💸 출금 확인 생성: id={} method={} amount={}", withdrawal_id, method, amount);

    FlowState::Ready(WithdrawalConfirmation {
        withdrawal_id,
        method,
        amount,
        fee: fee.fee,
        final_amount: fee.final_amount,
        amount_display: config.format_money(amount),
        fee_display: config.format_money(fee.fee),
        final_amount_display: config.format_money(fee.final_amount),
        fee_rate_display: format_percentage(config.withdrawal_fee, 1),
        wallet,
        pix_key,
        pix_key_type,
        destination_display,
        processing_time: PROCESSING_TIME.to_string(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::InvestmentStatus;
    use chrono::{NaiveDate, TimeZone};

    fn balance(available: f64) -> Balance {
        Balance { total: available, available, invested: 0.0, referral_earnings: 0.0 }
    }

    fn active_investment() -> Investment {
        Investment {
            id: "inv-001".to_string(),
            plan_id: "miner-cosmico".to_string(),
            amount: 7100.0,
            daily_return_rate: 0.025,
            start_date: NaiveDate::from_ymd_opt(2025, 8, 10).unwrap(),
            end_date: NaiveDate::from_ymd_opt(2025, 10, 9).unwrap(),
            status: InvestmentStatus::Active,
            total_returns: 0.0,
        }
    }

    fn crypto_form(amount: &str, wallet: &str) -> WithdrawalForm {
        WithdrawalForm {
            method: WithdrawalMethod::Crypto,
            amount: amount.to_string(),
            wallet_address: wallet.to_string(),
            pix_key: String::new(),
            pix_key_type: PixKeyType::Cpf,
        }
    }

    #[test]
    fn test_valid_crypto_withdrawal() {
        let form = crypto_form("1000", "3J98t1WpEZ73CNmQviecrnyiWrnqRhWNLy");
        let request = validate_withdrawal(&form, Some(&balance(8320.5)), &[], &AppConfig::default()).unwrap();

        assert_eq!(request.amount, 1000.0);
        assert_eq!(
            request.confirmation_query(),
            "method=crypto&amount=1000&wallet=3J98t1WpEZ73CNmQviecrnyiWrnqRhWNLy"
        );
    }

    #[test]
    fn test_amount_error_precedence() {
        // 활성 투자만 있으면 투자 메시지
        let form = crypto_form("100", "wallet");
        let errors = validate_withdrawal(&form, Some(&balance(500.0)), &[active_investment()], &AppConfig::default()).unwrap_err();
        assert_eq!(errors.get("amount"), Some("Não é possível sacar com investimentos ativos"));

        // 0 이하가 투자 메시지를 덮어씀
        let form = crypto_form("0", "wallet");
        let errors = validate_withdrawal(&form, Some(&balance(500.0)), &[active_investment()], &AppConfig::default()).unwrap_err();
        assert_eq!(errors.get("amount"), Some("Valor deve ser maior que zero"));

        // 잔고 부족이 마지막
        let form = crypto_form("900", "wallet");
        let errors = validate_withdrawal(&form, Some(&balance(500.0)), &[active_investment()], &AppConfig::default()).unwrap_err();
        assert_eq!(errors.get("amount"), Some("Saldo insuficiente. Disponível: R$\u{a0}500,00"));
    }

    #[test]
    fn test_balance_not_loaded_skips_balance_check() {
        let form = crypto_form("900", "wallet");
        assert!(validate_withdrawal(&form, None, &[], &AppConfig::default()).is_ok());
    }

    #[test]
    fn test_destination_required() {
        let errors = validate_withdrawal(&crypto_form("100", "   "), None, &[], &AppConfig::default()).unwrap_err();
        assert_eq!(errors.get("walletAddress"), Some("Endereço da carteira é obrigatório"));

        let form = WithdrawalForm {
            method: WithdrawalMethod::Pix,
            amount: "100".to_string(),
            wallet_address: String::new(),
            pix_key: String::new(),
            pix_key_type: PixKeyType::Email,
        };
        let errors = validate_withdrawal(&form, None, &[], &AppConfig::default()).unwrap_err();
        assert_eq!(errors.get("pixKey"), Some("Chave PIX é obrigatória"));
        assert!(!errors.contains("walletAddress"));
    }

    #[test]
    fn test_pix_cpf_key_is_formatted() {
        let form = WithdrawalForm {
            method: WithdrawalMethod::Pix,
            amount: "250,50".to_string(),
            wallet_address: String::new(),
            pix_key: "12345678900".to_string(),
            pix_key_type: PixKeyType::Cpf,
        };
        let request = validate_withdrawal(&form, Some(&balance(1000.0)), &[], &AppConfig::default()).unwrap();
        assert_eq!(
            request.confirmation_query(),
            "method=pix&amount=250.5&pixKey=123.456.789-00&pixKeyType=cpf"
        );
    }

    #[test]
    fn test_confirmation_from_query() {
        let now = Utc.with_ymd_and_hms(2025, 8, 14, 20, 18, 0).unwrap();
        let query = WithdrawalQuery {
            method: Some("crypto".to_string()),
            amount: Some("1000".to_string()),
            wallet: Some("3J98t1WpEZ73CNmQviecrnyiWrnqRhWNLy".to_string()),
            pix_key: None,
            pix_key_type: None,
        };

        let confirmation = confirm_withdrawal(&query, &AppConfig::default(), now).ready().unwrap();
        assert_eq!(confirmation.fee, 20.0);
        assert_eq!(confirmation.final_amount, 980.0);
        assert_eq!(confirmation.final_amount_display, "R$\u{a0}980,00");
        assert_eq!(confirmation.fee_rate_display, "2.0%");
        assert_eq!(confirmation.destination_display, "3J98t1...WNLy");
        assert!(confirmation.withdrawal_id.starts_with("WTH-"));
        assert_eq!(confirmation.processing_time, PROCESSING_TIME);
    }

    #[test]
    fn test_incomplete_confirmation() {
        let now = Utc.with_ymd_and_hms(2025, 8, 14, 20, 18, 0).unwrap();
        let config = AppConfig::default();

        let missing_amount = WithdrawalQuery { method: Some("pix".to_string()), ..Default::default() };
        assert!(!confirm_withdrawal(&missing_amount, &config, now).is_ready());

        let missing_method = WithdrawalQuery { amount: Some("100".to_string()), ..Default::default() };
        assert!(!confirm_withdrawal(&missing_method, &config, now).is_ready());
    }

    #[test]
    fn test_non_positive_amount_confirmation_is_incomplete() {
        let now = Utc.with_ymd_and_hms(2025, 8, 14, 20, 18, 0).unwrap();
        let config = AppConfig::default();

        for raw in ["-1000", "+0"] {
            let query = WithdrawalQuery {
                method: Some("crypto".to_string()),
                amount: Some(raw.to_string()),
                wallet: Some("3J98t1WpEZ73CNmQviecrnyiWrnqRhWNLy".to_string()),
                pix_key: None,
                pix_key_type: None,
            };
            match confirm_withdrawal(&query, &config, now) {
                FlowState::Incomplete { title, .. } => assert_eq!(title, "Dados incompletos"),
                FlowState::Ready(confirmation) => panic!("{} produced withdrawal {}", raw, confirmation.withdrawal_id),
            }
        }
    }
}
