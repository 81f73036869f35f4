/**
* filename : mod
* author : HAMA
* date: 2025. 8. 14.
* description: 입금/출금/회원가입 폼 검증과 화면 간 쿼리 계약
**/

pub mod deposit;
pub mod errors;
pub mod query;
pub mod registration;
pub mod withdrawal;

pub use deposit::{deposit_details, quote_deposit, validate_deposit, DepositDetails, DepositForm, DepositQuote, DepositRequest};
pub use errors::FieldErrors;
pub use query::{
    parse_amount,
    reference_id,
    sanitize_amount_input,
    DepositQuery,
    FlowState,
    PixKeyType,
    WithdrawalMethod,
    WithdrawalQuery,
};
pub use registration::{validate_login, validate_registration, LoginForm, Registration, RegistrationForm};
pub use withdrawal::{
    confirm_withdrawal,
    validate_withdrawal,
    WithdrawalConfirmation,
    WithdrawalDestination,
    WithdrawalForm,
    WithdrawalRequest,
    PROCESSING_TIME,
};
