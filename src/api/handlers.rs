use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::Json,
};
use log::{debug, info};

use crate::api::auth::AuthSession;
use crate::api::error::ApiError;
use crate::api::models::*;
use crate::dashboard::{
    build_dashboard,
    build_referral_program,
    build_support,
    plan_view,
    project_returns,
    DashboardSnapshot,
    DashboardView,
    PlanView,
    ProjectionView,
    ReferralProgramView,
    SupportView,
    RECENT_TRANSACTIONS,
};
use crate::domain::InvestmentPlan;
use crate::forms::{
    confirm_withdrawal,
    deposit_details,
    parse_amount,
    quote_deposit,
    validate_deposit,
    validate_login,
    validate_registration,
    validate_withdrawal,
    DepositDetails,
    DepositForm,
    DepositQuery,
    DepositQuote,
    FlowState,
    LoginForm,
    RegistrationForm,
    WithdrawalConfirmation,
    WithdrawalForm,
    WithdrawalQuery,
};
use crate::server::ServerState;

/// 로그인 핸들러
pub async fn login(
    State(state): State<ServerState>,
    Json(form): Json<LoginForm>,
) -> Result<Json<AuthResponse>, ApiError> {
    validate_login(&form).map_err(ApiError::Validation)?;

    let session = state.backend.sign_in(form.email.trim(), &form.password).await?;
    info!("🔑 로그인 성공: user={}", session.user_id());
    Ok(Json(session.into()))
}

/// 회원가입 핸들러
pub async fn register(
    State(state): State<ServerState>,
    Json(form): Json<RegistrationForm>,
) -> Result<(StatusCode, Json<AuthResponse>), ApiError> {
    let registration = validate_registration(&form).map_err(ApiError::Validation)?;

    let session = state.backend.sign_up(&registration).await?;
    Ok((StatusCode::CREATED, Json(session.into())))
}

/// 로그아웃 핸들러
pub async fn logout(
    State(state): State<ServerState>,
    AuthSession(session): AuthSession,
) -> Result<Json<MessageResponse>, ApiError> {
    state.backend.sign_out(&session.access_token).await?;
    info!("👋 로그아웃: user={}", session.user_id());
    Ok(Json(MessageResponse {
        message: "Sessão encerrada".to_string(),
    }))
}

/// 대시보드 조회 핸들러
pub async fn get_dashboard(
    State(state): State<ServerState>,
    AuthSession(session): AuthSession,
) -> Result<Json<DashboardView>, ApiError> {
    let snapshot = DashboardSnapshot::load(state.backend.as_ref(), session.user_id(), RECENT_TRANSACTIONS).await?;
    Ok(Json(build_dashboard(
        &session,
        Some(&snapshot),
        &state.app,
        Some(state.config.origin()),
        state.live_clock.now(),
    )))
}

/// 백엔드 플랜 목록 (비어 있으면 설정 카탈로그)
async fn load_plans(state: &ServerState) -> Result<Vec<InvestmentPlan>, ApiError> {
    let plans = state.backend.investment_plans().await?;
    if plans.is_empty() {
        return Ok(state.app.investment_plans.clone());
    }
    Ok(plans)
}

/// 투자 플랜 목록 핸들러
pub async fn get_plans(State(state): State<ServerState>) -> Result<Json<Vec<PlanView>>, ApiError> {
    let plans = load_plans(&state).await?;
    Ok(Json(plans.iter().map(|plan| plan_view(plan, &state.app)).collect()))
}

/// 수익 예측 핸들러
pub async fn get_projection(
    State(state): State<ServerState>,
    Path(plan_id): Path<String>,
    Query(query): Query<AmountQuery>,
) -> Result<Json<ProjectionView>, ApiError> {
    let plans = load_plans(&state).await?;
    let plan = plans
        .iter()
        .find(|plan| plan.id == plan_id)
        .ok_or_else(|| ApiError::PlanNotFound(plan_id.clone()))?;

    let projection =
        project_returns(plan, parse_amount(query.amount.as_deref()), &state.app).map_err(ApiError::Validation)?;
    Ok(Json(projection))
}

/// 입금 견적 핸들러
pub async fn get_deposit_quote(
    State(state): State<ServerState>,
    Query(query): Query<AmountQuery>,
) -> Json<DepositQuote> {
    Json(quote_deposit(parse_amount(query.amount.as_deref()), &state.app))
}

/// 입금 요청 핸들러
pub async fn submit_deposit(
    State(state): State<ServerState>,
    AuthSession(session): AuthSession,
    Json(form): Json<DepositForm>,
) -> Result<Json<DepositAccepted>, ApiError> {
    let request = validate_deposit(&form, &state.app).map_err(ApiError::Validation)?;
    debug!("💰 입금 요청: user={} amount={}", session.user_id(), request.amount);

    Ok(Json(DepositAccepted {
        amount: request.amount,
        next: format!("/deposit/details?{}", request.details_query()),
    }))
}

/// 입금 상세 핸들러
pub async fn get_deposit_details(
    State(state): State<ServerState>,
    AuthSession(_session): AuthSession,
    Query(query): Query<DepositQuery>,
) -> Json<FlowState<DepositDetails>> {
    Json(deposit_details(&query, &state.app, state.clock.now()))
}

/// 출금 요청 핸들러
pub async fn submit_withdrawal(
    State(state): State<ServerState>,
    AuthSession(session): AuthSession,
    Json(form): Json<WithdrawalForm>,
) -> Result<Json<WithdrawalAccepted>, ApiError> {
    let user_id = session.user_id();
    let (balance, investments) = tokio::try_join!(state.backend.balance(user_id), state.backend.investments(user_id))?;

    let request = validate_withdrawal(&form, Some(&balance), &investments, &state.app).map_err(ApiError::Validation)?;
    debug!("💸 출금 요청: user={} amount={} method={}", user_id, request.amount, request.destination.method());

    Ok(Json(WithdrawalAccepted {
        amount: request.amount,
        destination_display: request.destination.display(),
        next: format!("/withdrawal/confirm?{}", request.confirmation_query()),
        destination: request.destination,
    }))
}

/// 출금 확인 핸들러
pub async fn get_withdrawal_confirmation(
    State(state): State<ServerState>,
    AuthSession(_session): AuthSession,
    Query(query): Query<WithdrawalQuery>,
) -> Json<FlowState<WithdrawalConfirmation>> {
    Json(confirm_withdrawal(&query, &state.app, state.clock.now()))
}

/// 추천 프로그램 핸들러
pub async fn get_referral(
    State(state): State<ServerState>,
    AuthSession(session): AuthSession,
) -> Result<Json<ReferralProgramView>, ApiError> {
    let user_id = session.user_id();
    let (referrals, balance) = tokio::try_join!(state.backend.referrals(user_id), state.backend.balance(user_id))?;

    Ok(Json(build_referral_program(
        &session,
        &referrals,
        &balance,
        &state.app,
        Some(state.config.origin()),
    )))
}

/// 고객지원 링크 핸들러
pub async fn get_support(
    State(state): State<ServerState>,
    Query(query): Query<SupportQuery>,
) -> Json<SupportView> {
    Json(build_support(&state.app, query.message.as_deref()))
}

/// 시스템 시계 핸들러
pub async fn get_clock(State(state): State<ServerState>) -> Json<ClockResponse> {
    Json(ClockResponse {
        system_time: state.live_clock.now(),
        display: state.live_clock.display(),
    })
}
