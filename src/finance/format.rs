//! 통화/숫자/날짜 표시 형식
//!
//! BRL 은 브라질 포르투갈어(pt-BR) 규칙을, 그 외 통화는 일반(en-US) 규칙을 따릅니다.
//! 날짜는 일/월/년 순서와 24시간제를 사용하며 브라질리아 시간(UTC-03:00)으로 표시합니다.

use chrono::{DateTime, FixedOffset, NaiveDate, NaiveDateTime, Offset, TimeZone, Utc};

/// 브라질리아 표시 오프셋 (초)
pub const BRASILIA_OFFSET_SECS: i32 = -3 * 3600;

/// 통화 기호와 금액 사이의 공백 (NBSP)
const NBSP: char = '\u{a0}';

/// 형식 변환 에러 타입
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum FormatError {
    #[error("날짜를 해석할 수 없음: {0}")]
    InvalidDate(String),
}

/// 날짜 입력 (문자열 또는 시각)
#[derive(Debug, Clone, Copy)]
pub enum DateInput<'a> {
    Text(&'a str),
    Instant(DateTime<Utc>),
}

impl<'a> From<&'a str> for DateInput<'a> {
    fn from(value: &'a str) -> Self {
        DateInput::Text(value)
    }
}

impl<'a> From<&'a String> for DateInput<'a> {
    fn from(value: &'a String) -> Self {
        DateInput::Text(value.as_str())
    }
}

impl From<DateTime<Utc>> for DateInput<'_> {
    fn from(value: DateTime<Utc>) -> Self {
        DateInput::Instant(value)
    }
}

impl From<NaiveDate> for DateInput<'_> {
    fn from(value: NaiveDate) -> Self {
        let local = value.and_time(chrono::NaiveTime::MIN);
        match display_zone().from_local_datetime(&local).single() {
            Some(at) => DateInput::Instant(at.with_timezone(&Utc)),
            None => DateInput::Instant(Utc.from_utc_datetime(&local)),
        }
    }
}

/// 표시용 시간대
pub fn display_zone() -> FixedOffset {
    FixedOffset::east_opt(BRASILIA_OFFSET_SECS).unwrap_or_else(|| Utc.fix())
}

/// 통화 형식 (소수점 2자리)
///
/// `format_currency(1234.56, "BRL") == "R$\u{a0}1.234,56"`
pub fn format_currency(value: f64, currency: &str) -> String {
    let value = if value.is_finite() { value } else { 0.0 };
    let fixed = format!("{:.2}", value.abs());
    let (int_part, frac_part) = fixed.split_once('.').unwrap_or((fixed.as_str(), "00"));
    let sign = if value < 0.0 && fixed != "0.00" { "-" } else { "" };

    if currency.eq_ignore_ascii_case("BRL") {
        return format!("{}R${}{},{}", sign, NBSP, group_digits(int_part, '.'), frac_part);
    }

    let amount = format!("{}.{}", group_digits(int_part, ','), frac_part);
    match currency.to_ascii_uppercase().as_str() {
        "USD" => format!("{}${}", sign, amount),
        "EUR" => format!("{}€{}", sign, amount),
        "GBP" => format!("{}£{}", sign, amount),
        code => format!("{}{}{}{}", sign, code, NBSP, amount),
    }
}

/// 비율 형식 (0.025 -> "2.50%")
pub fn format_percentage(value: f64, decimals: usize) -> String {
    format!("{:.*}%", decimals, value * 100.0)
}

/// 날짜 형식 (dd/mm/yyyy)
pub fn format_date<'a>(input: impl Into<DateInput<'a>>) -> Result<String, FormatError> {
    Ok(to_display(input.into())?.format("%d/%m/%Y").to_string())
}

/// 날짜+시간 형식 (dd/mm/yyyy, HH:MM)
pub fn format_date_time<'a>(input: impl Into<DateInput<'a>>) -> Result<String, FormatError> {
    Ok(to_display(input.into())?.format("%d/%m/%Y, %H:%M").to_string())
}

/// 시간 형식 (HH:MM:SS)
pub fn format_time<'a>(input: impl Into<DateInput<'a>>) -> Result<String, FormatError> {
    Ok(to_display(input.into())?.format("%H:%M:%S").to_string())
}

/// 날짜 문자열 해석
///
/// 오프셋이 없는 문자열은 표시 시간대의 현지 시각으로,
/// 날짜만 있는 문자열은 표시 시간대의 자정으로 해석합니다.
pub fn parse_date(raw: &str) -> Result<DateTime<Utc>, FormatError> {
    let raw = raw.trim();

    if let Ok(at) = DateTime::parse_from_rfc3339(raw) {
        return Ok(at.with_timezone(&Utc));
    }

    const NAIVE_FORMATS: [&str; 4] = [
        "%Y-%m-%dT%H:%M:%S%.f",
        "%Y-%m-%dT%H:%M",
        "%Y-%m-%d %H:%M:%S%.f",
        "%Y-%m-%d %H:%M",
    ];
    let naive = NAIVE_FORMATS
        .iter()
        .find_map(|fmt| NaiveDateTime::parse_from_str(raw, fmt).ok())
        .or_else(|| {
            NaiveDate::parse_from_str(raw, "%Y-%m-%d")
                .ok()
                .map(|date| date.and_time(chrono::NaiveTime::MIN))
        })
        .ok_or_else(|| FormatError::InvalidDate(raw.to_string()))?;

    display_zone()
        .from_local_datetime(&naive)
        .single()
        .map(|at| at.with_timezone(&Utc))
        .ok_or_else(|| FormatError::InvalidDate(raw.to_string()))
}

/// 이름 이니셜 (최대 2자)
pub fn initials(name: &str) -> String {
    name.split(' ')
        .filter_map(|word| word.chars().next())
        .flat_map(|c| c.to_uppercase())
        .take(2)
        .collect()
}

fn to_display(input: DateInput<'_>) -> Result<DateTime<FixedOffset>, FormatError> {
    let instant = match input {
        DateInput::Text(raw) => parse_date(raw)?,
        DateInput::Instant(at) => at,
    };
    Ok(instant.with_timezone(&display_zone()))
}

/// 정수부 자릿수 구분 (3자리)
fn group_digits(digits: &str, separator: char) -> String {
    let len = digits.len();
    let mut grouped = String::with_capacity(len + len / 3);
    for (i, c) in digits.chars().enumerate() {
        if i > 0 && (len - i) % 3 == 0 {
            grouped.push(separator);
        }
        grouped.push(c);
    }
    grouped
}
