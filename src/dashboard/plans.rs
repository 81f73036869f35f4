//! 투자 플랜 카탈로그와 수익 예측 화면

use serde::{Deserialize, Serialize};

use crate::config::AppConfig;
use crate::domain::InvestmentPlan;
use crate::finance::{calculate_returns, format_percentage};
use crate::forms::FieldErrors;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlanView {
    pub id: String,
    pub name: String,
    pub daily_return: f64,
    pub daily_rate: String,
    /// 기간 전체 수익률 (일일 수익률 x 기간)
    pub total_rate: String,
    pub min_amount: String,
    pub max_amount: String,
    pub duration_days: u32,
}

/// 금액별 수익 예측
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProjectionView {
    pub plan_id: String,
    pub amount: f64,
    pub daily_return: f64,
    pub total_return: f64,
    pub total_amount: f64,
    pub daily_return_display: String,
    pub total_return_display: String,
    pub total_amount_display: String,
}

pub fn plan_view(plan: &InvestmentPlan, config: &AppConfig) -> PlanView {
    PlanView {
        id: plan.id.clone(),
        name: plan.name.clone(),
        daily_return: plan.daily_return,
        daily_rate: format_percentage(plan.daily_return, 1),
        total_rate: format_percentage(plan.daily_return * f64::from(plan.duration_days), 1),
        min_amount: config.format_money(plan.min_amount),
        max_amount: config.format_money(plan.max_amount),
        duration_days: plan.duration_days,
    }
}

/// 수익 예측
///
/// 플랜 허용 범위 밖 금액은 계산하지 않고 `amount` 필드 오류를 반환합니다.
pub fn project_returns(plan: &InvestmentPlan, amount: f64, config: &AppConfig) -> Result<ProjectionView, FieldErrors> {
    let mut errors = FieldErrors::new();
    if !plan.accepts(amount) {
        errors.insert(
            "amount",
            format!(
                "Valor deve estar entre {} e {}",
                config.format_money(plan.min_amount),
                config.format_money(plan.max_amount)
            ),
        );
        return Err(errors);
    }

    let projection = calculate_returns(amount, plan.daily_return, plan.duration_days);
    Ok(ProjectionView {
        plan_id: plan.id.clone(),
        amount,
        daily_return: projection.daily_return,
        total_return: projection.total_return,
        total_amount: projection.total_amount,
        daily_return_display: config.format_money(projection.daily_return),
        total_return_display: config.format_money(projection.total_return),
        total_amount_display: config.format_money(projection.total_amount),
    })
}
