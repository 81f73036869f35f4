/**
* filename : mod
* author : HAMA
* date: 2025. 8. 14.
* description: 대시보드/플랜/추천 화면 모델
**/

pub mod plans;
pub mod referral;
pub mod snapshot;
pub mod view;

pub use plans::{plan_view, project_returns, PlanView, ProjectionView};
pub use referral::{build_referral_program, build_support, ReferralProgramView, ReferralView, SupportView, TierView};
pub use snapshot::{DashboardSnapshot, RECENT_TRANSACTIONS};
pub use view::{
    account_view,
    build_dashboard,
    investment_view,
    transaction_view,
    AccountView,
    BalanceView,
    Dashboard,
    DashboardView,
    InvestmentView,
    TransactionView,
};
