//! 대시보드 화면 모델
//!
//! 세션과 스냅샷으로 표시용 값을 만듭니다. 스냅샷이 아직 없으면 `Loading` 상태입니다.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::config::AppConfig;
use crate::dashboard::snapshot::DashboardSnapshot;
use crate::domain::{Account, Investment, KycStatus, Session, Transaction, TransactionStatus, TransactionType};
use crate::finance::format::initials;
use crate::finance::{days_remaining, format_currency, format_date, format_date_time, format_percentage, generate_referral_link};

/// 계정 요약
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AccountView {
    pub name: String,
    pub initials: String,
    pub username: String,
    pub email: String,
    pub kyc_status: KycStatus,
    pub member_since: String,
    pub is_admin: bool,
    pub referral_link: String,
}

/// 잔고 카드
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BalanceView {
    pub total: String,
    pub available: String,
    pub invested: String,
    pub referral_earnings: String,
    pub total_returns: String,
    pub active_investments: usize,
}

/// 거래 한 줄
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TransactionView {
    pub id: String,
    pub kind: TransactionType,
    pub label: String,
    pub amount: f64,
    pub amount_display: String,
    pub is_credit: bool,
    pub status: TransactionStatus,
    pub description: String,
    pub created_at: String,
}

/// 활성 투자 카드
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InvestmentView {
    pub id: String,
    pub plan_id: String,
    pub plan_name: String,
    pub amount: String,
    pub daily_return: f64,
    pub daily_return_display: String,
    pub daily_rate: String,
    pub total_returns: String,
    pub start_date: String,
    pub end_date: String,
    pub days_remaining: i64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Dashboard {
    pub account: AccountView,
    pub balance: BalanceView,
    pub recent_transactions: Vec<TransactionView>,
    pub active_investments: Vec<InvestmentView>,
}

/// 대시보드 상태
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "state", rename_all = "lowercase")]
pub enum DashboardView {
    Loading,
    Ready(Box<Dashboard>),
}

pub fn account_view(session: &Session, origin: Option<&str>) -> AccountView {
    let Account { name, username, email, kyc_status, member_since, .. } = &session.account;
    AccountView {
        name: name.clone(),
        initials: initials(name),
        username: username.clone(),
        email: email.clone(),
        kyc_status: *kyc_status,
        member_since: format_date(*member_since).unwrap_or_default(),
        is_admin: session.is_admin,
        referral_link: generate_referral_link(origin, username),
    }
}

pub fn transaction_view(txn: &Transaction) -> TransactionView {
    TransactionView {
        id: txn.id.clone(),
        kind: txn.kind,
        label: txn.kind.label().to_string(),
        amount: txn.amount,
        amount_display: format_currency(txn.amount, &txn.currency),
        is_credit: txn.kind.is_credit(),
        status: txn.status,
        description: txn.description.clone(),
        created_at: format_date_time(txn.created_at).unwrap_or_default(),
    }
}

pub fn investment_view(investment: &Investment, config: &AppConfig, now: DateTime<Utc>) -> InvestmentView {
    let plan_name = config
        .plan(&investment.plan_id)
        .map(|plan| plan.name.clone())
        .unwrap_or_else(|| investment.plan_id.clone());
    let daily_return = investment.amount * investment.daily_return_rate;

    InvestmentView {
        id: investment.id.clone(),
        plan_id: investment.plan_id.clone(),
        plan_name,
        amount: config.format_money(investment.amount),
        daily_return,
        daily_return_display: config.format_money(daily_return),
        daily_rate: format_percentage(investment.daily_return_rate, 1),
        total_returns: config.format_money(investment.total_returns),
        start_date: format_date(investment.start_date).unwrap_or_default(),
        end_date: format_date(investment.end_date).unwrap_or_default(),
        days_remaining: days_remaining(investment.ends_at(), now),
    }
}

/// 대시보드 구성
pub fn build_dashboard(
    session: &Session,
    snapshot: Option<&DashboardSnapshot>,
    config: &AppConfig,
    origin: Option<&str>,
    now: DateTime<Utc>,
) -> DashboardView {
    let Some(snapshot) = snapshot else {
        return DashboardView::Loading;
    };

    let active: Vec<InvestmentView> = snapshot
        .active_investments()
        .map(|investment| investment_view(investment, config, now))
        .collect();
    let balance = &snapshot.balance;

    DashboardView::Ready(Box::new(Dashboard {
        account: account_view(session, origin),
        balance: BalanceView {
            total: config.format_money(balance.total),
            available: config.format_money(balance.available),
            invested: config.format_money(balance.invested),
            referral_earnings: config.format_money(balance.referral_earnings),
            total_returns: config.format_money(snapshot.total_returns()),
            active_investments: active.len(),
        },
        recent_transactions: snapshot.transactions.iter().map(transaction_view).collect(),
        active_investments: active,
    }))
}
