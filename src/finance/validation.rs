//! 입력 형식 변환 및 검증
//!
//! 전화번호, CPF(국가 신분번호), 이메일, 지갑 주소 표시용 변환과 검증.

use once_cell::sync::Lazy;
use regex::Regex;

/// 의도적으로 느슨한 이메일 패턴 (RFC 완전 준수 아님)
static EMAIL_PATTERN: Lazy<Option<Regex>> = Lazy::new(|| Regex::new(r"^[^\s@]+@[^\s@]+\.[^\s@]+$").ok());

/// 숫자만 추출
pub fn digits_only(raw: &str) -> String {
    raw.chars().filter(|c| c.is_ascii_digit()).collect()
}

/// 전화번호 형식
///
/// 11자리 `(XX) XXXXX-XXXX`, 10자리 `(XX) XXXX-XXXX`, 그 외에는 입력 그대로.
pub fn format_phone(phone: &str) -> String {
    let digits = digits_only(phone);
    match digits.len() {
        11 => format!("({}) {}-{}", &digits[..2], &digits[2..7], &digits[7..]),
        10 => format!("({}) {}-{}", &digits[..2], &digits[2..6], &digits[6..]),
        _ => phone.to_string(),
    }
}

/// CPF 형식 (`XXX.XXX.XXX-XX`)
pub fn format_cpf(cpf: &str) -> String {
    let digits = digits_only(cpf);
    if digits.len() != 11 {
        return cpf.to_string();
    }
    format!("{}.{}.{}-{}", &digits[..3], &digits[3..6], &digits[6..9], &digits[9..])
}

/// CPF 검증 (기본 검사)
///
/// 11자리이면서 모든 숫자가 같지 않은지만 확인합니다.
/// 검증 숫자(체크섬)는 확인하지 않는 알려진 약한 검사입니다.
pub fn is_valid_cpf(cpf: &str) -> bool {
    let digits = digits_only(cpf);
    if digits.len() != 11 {
        return false;
    }
    let first = digits.as_bytes()[0];
    !digits.bytes().all(|b| b == first)
}

/// 이메일 검증
pub fn is_valid_email(email: &str) -> bool {
    EMAIL_PATTERN
        .as_ref()
        .map(|pattern| pattern.is_match(email))
        .unwrap_or(false)
}

/// 전화번호 검증 (10자리 또는 11자리)
pub fn is_valid_phone(phone: &str) -> bool {
    matches!(digits_only(phone).len(), 10 | 11)
}

/// 지갑 주소 표시용 축약 (`head...tail`)
pub fn truncate_address(address: &str, start_chars: usize, end_chars: usize) -> String {
    let total = address.chars().count();
    if total <= start_chars + end_chars {
        return address.to_string();
    }
    let head: String = address.chars().take(start_chars).collect();
    let tail: String = address.chars().skip(total - end_chars).collect();
    format!("{}...{}", head, tail)
}
