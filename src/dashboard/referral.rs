//! 추천 프로그램 / 고객지원 화면

use serde::{Deserialize, Serialize};

use crate::config::AppConfig;
use crate::domain::{AccountStatus, Balance, Referral, Session};
use crate::finance::{commission_for_level, format_date, format_percentage, format_phone, generate_referral_link, support_link, SUPPORT_GREETING};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TierView {
    pub level: u32,
    pub rate: String,
    /// 최소 입금액 기준 예상 커미션
    pub commission_on_min_deposit: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReferralView {
    pub id: String,
    pub username: Option<String>,
    pub name: Option<String>,
    pub status: Option<AccountStatus>,
    pub level: u32,
    pub commission_rate: String,
    pub total_commission: String,
    pub joined: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReferralProgramView {
    pub link: String,
    pub tiers: Vec<TierView>,
    pub total_referrals: usize,
    pub direct_referrals: usize,
    pub total_commission: String,
    pub referral_earnings: String,
    pub referrals: Vec<ReferralView>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SupportView {
    pub phone: String,
    pub message: String,
    pub link: String,
}

pub fn referral_view(referral: &Referral, config: &AppConfig) -> ReferralView {
    let profile = referral.referred_profile.as_ref();
    ReferralView {
        id: referral.id.clone(),
        username: profile.map(|p| p.username.clone()),
        name: profile.map(|p| p.name.clone()),
        status: profile.map(|p| p.status),
        level: referral.level,
        commission_rate: format_percentage(referral.commission_percentage, 0),
        total_commission: config.format_money(referral.total_commission),
        joined: format_date(referral.created_at).unwrap_or_default(),
    }
}

pub fn build_referral_program(
    session: &Session,
    referrals: &[Referral],
    balance: &Balance,
    config: &AppConfig,
    origin: Option<&str>,
) -> ReferralProgramView {
    let levels = &config.referral_levels;
    let tiers = levels
        .iter()
        .zip(1u32..)
        .map(|(rate, level)| TierView {
            level,
            rate: format_percentage(*rate, 0),
            commission_on_min_deposit: config
                .format_money(commission_for_level(levels, level, config.min_deposit_amount).unwrap_or_default()),
        })
        .collect();

    ReferralProgramView {
        link: generate_referral_link(origin, &session.account.username),
        tiers,
        total_referrals: referrals.len(),
        direct_referrals: referrals.iter().filter(|r| r.level == 1).count(),
        total_commission: config.format_money(referrals.iter().map(|r| r.total_commission).sum()),
        referral_earnings: config.format_money(balance.referral_earnings),
        referrals: referrals.iter().map(|referral| referral_view(referral, config)).collect(),
    }
}

/// 고객지원 연락 화면 (메시지가 없으면 기본 인사말)
pub fn build_support(config: &AppConfig, message: Option<&str>) -> SupportView {
    let message = message.filter(|m| !m.trim().is_empty()).unwrap_or(SUPPORT_GREETING);
    SupportView {
        phone: format_phone(&config.support_phone),
        message: message.to_string(),
        link: support_link(&config.support_phone, message),
    }
}
