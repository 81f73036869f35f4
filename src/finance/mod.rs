/**
* filename : mod
* author : HAMA
* date: 2025. 8. 14.
* description: 금융 계산 및 표시 형식 모듈
**/

pub mod calculator;
pub mod format;
pub mod links;
pub mod validation;

pub use calculator::{
    calculate_returns,
    calculate_withdrawal_fee,
    commission_for_level,
    convert_brl_to_usdt,
    convert_usdt_to_brl,
    days_remaining,
    ReturnProjection,
    WithdrawalFee,
};
pub use format::{
    format_currency,
    format_date,
    format_date_time,
    format_percentage,
    format_time,
    DateInput,
    FormatError,
};
pub use links::{generate_referral_link, support_link, SUPPORT_GREETING};
pub use validation::{
    format_cpf,
    format_phone,
    is_valid_cpf,
    is_valid_email,
    is_valid_phone,
    truncate_address,
};
