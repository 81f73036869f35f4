//! 금융 계산기
//!
//! 출금 수수료, BRL/USDT 환산, 투자 수익 예측, 추천 커미션 계산.
//! 모든 함수는 순수 함수이며 반올림은 표시 단계에서만 합니다.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

const MILLIS_PER_DAY: i64 = 24 * 60 * 60 * 1000;

/// 출금 수수료 계산 결과
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct WithdrawalFee {
    /// 수수료
    pub fee: f64,
    /// 실수령액 (요청액 - 수수료)
    pub final_amount: f64,
}

/// 투자 수익 예측 결과
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ReturnProjection {
    pub daily_return: f64,
    pub total_return: f64,
    /// 원금 + 총 수익
    pub total_amount: f64,
}

/// BRL -> USDT 환산
pub fn convert_brl_to_usdt(brl_amount: f64, usdt_rate: f64) -> f64 {
    if usdt_rate <= 0.0 {
        return 0.0;
    }
    brl_amount / usdt_rate
}

/// USDT -> BRL 환산
pub fn convert_usdt_to_brl(usdt_amount: f64, usdt_rate: f64) -> f64 {
    usdt_amount * usdt_rate
}

/// 출금 수수료 계산
///
/// 수수료를 따로 반올림하지 않고 그대로 차감하므로 `fee + final_amount == amount` 입니다.
pub fn calculate_withdrawal_fee(amount: f64, fee_rate: f64) -> WithdrawalFee {
    let fee = amount * fee_rate;
    WithdrawalFee {
        fee,
        final_amount: amount - fee,
    }
}

/// 투자 수익 계산
pub fn calculate_returns(amount: f64, daily_rate: f64, days: u32) -> ReturnProjection {
    let daily_return = amount * daily_rate;
    let total_return = daily_return * f64::from(days);
    ReturnProjection {
        daily_return,
        total_return,
        total_amount: amount + total_return,
    }
}

/// 추천 깊이별 커미션 (1단계부터, 마지막 단계 이후는 없음)
pub fn commission_for_level(levels: &[f64], level: u32, amount: f64) -> Option<f64> {
    let index = usize::try_from(level).ok()?.checked_sub(1)?;
    levels.get(index).map(|rate| amount * rate)
}

/// 남은 일수 (올림, 0 미만 없음)
pub fn days_remaining(end: DateTime<Utc>, now: DateTime<Utc>) -> i64 {
    let millis = (end - now).num_milliseconds();
    if millis <= 0 {
        return 0;
    }
    (millis + MILLIS_PER_DAY - 1) / MILLIS_PER_DAY
}

/// 표시용 소수점 2자리 문자열 (예: "917.43")
pub fn to_fixed_2(value: f64) -> String {
    format!("{:.2}", value)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, TimeZone};

    #[test]
    fn test_withdrawal_fee_scenario() {
        let result = calculate_withdrawal_fee(1000.0, 0.02);
        assert_eq!(to_fixed_2(result.fee), "20.00");
        assert_eq!(to_fixed_2(result.final_amount), "980.00");
    }

    #[test]
    fn test_withdrawal_fee_sums_back_to_amount() {
        for amount in [0.0, 0.01, 1.0, 33.33, 199.99, 1000.0, 12345.67, 1e9] {
            let result = calculate_withdrawal_fee(amount, 0.02);
            assert!(result.fee >= 0.0);
            assert!((result.fee + result.final_amount - amount).abs() <= 4.0 * f64::EPSILON * amount.max(1.0));
        }
    }

    #[test]
    fn test_conversion_round_trip() {
        let usdt = convert_brl_to_usdt(1000.0, 5.45);
        let back = convert_usdt_to_brl(usdt, 5.45);
        assert!(((back - 1000.0) / 1000.0).abs() < 1e-9);
    }

    #[test]
    fn test_deposit_conversion_scenario() {
        let usdt = convert_brl_to_usdt(5000.0, 5.45);
        assert!((usdt - 917.4311926605504).abs() < 1e-9);
        assert_eq!(to_fixed_2(usdt), "917.43");
    }

    #[test]
    fn test_conversion_zero_rate_guard() {
        assert_eq!(convert_brl_to_usdt(100.0, 0.0), 0.0);
    }

    #[test]
    fn test_calculate_returns() {
        let projection = calculate_returns(7100.0, 0.025, 60);
        assert!((projection.daily_return - 177.5).abs() < 1e-9);
        assert!((projection.total_return - 10650.0).abs() < 1e-9);
        assert!((projection.total_amount - 17750.0).abs() < 1e-9);

        let none = calculate_returns(5000.0, 0.015, 0);
        assert_eq!(none.total_return, 0.0);
        assert_eq!(none.total_amount, 5000.0);
    }

    #[test]
    fn test_commission_tiers() {
        let levels = [0.1, 0.05, 0.03, 0.02, 0.01];
        assert_eq!(commission_for_level(&levels, 1, 500.0), Some(50.0));
        assert_eq!(commission_for_level(&levels, 2, 500.0), Some(25.0));
        assert_eq!(commission_for_level(&levels, 0, 500.0), None);
        assert_eq!(commission_for_level(&levels, 6, 500.0), None);
    }

    #[test]
    fn test_days_remaining_rounds_up() {
        let now = Utc.with_ymd_and_hms(2025, 8, 14, 20, 18, 0).unwrap();
        let end = Utc.with_ymd_and_hms(2025, 10, 9, 0, 0, 0).unwrap();
        assert_eq!(days_remaining(end, now), 56);
        assert_eq!(days_remaining(now + Duration::hours(1), now), 1);
        assert_eq!(days_remaining(now + Duration::days(2), now), 2);
        assert_eq!(days_remaining(now - Duration::days(3), now), 0);
    }
}
