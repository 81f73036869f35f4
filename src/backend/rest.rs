//! 호스팅 백엔드(PostgREST + 인증 API) HTTP 클라이언트
//!
//! 테이블 조회는 `/rest/v1/<table>`, 인증은 `/auth/v1/*` 를 사용합니다.
//! 실시간 구독은 주기적 폴링으로 잔고/거래/투자 변화를 감지해 이벤트로 내보냅니다.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use log::{debug, error, info, warn};
use reqwest::{Client, RequestBuilder, Response, StatusCode};
use serde::de::DeserializeOwned;
use serde::Deserialize;
use serde_json::json;
use tokio::sync::{mpsc, RwLock};
use tokio::time::MissedTickBehavior;
use url::Url;

use crate::backend::subscription::{RealtimeEvent, Subscription, SUBSCRIPTION_BUFFER};
use crate::backend::{BackendClient, BackendError};
use crate::config::BackendConfig;
use crate::domain::{Account, Balance, Investment, InvestmentPlan, Referral, Session, Transaction};
use crate::forms::Registration;

/// 폴링 시 비교할 최근 거래 수
const POLL_TRANSACTION_WINDOW: usize = 20;

const PROFILE_SELECT: &str = "user_id,name,email,username,phone,cpf,country,status,kyc_status,member_since,usdt_wallet";
const BALANCE_SELECT: &str = "total,available,invested,referral_earnings";
const REFERRAL_SELECT: &str = "*,referred_profile:profiles!referrals_referred_user_id_fkey(username,name,status)";

#[derive(Debug, Deserialize)]
struct AuthUser {
    id: String,
}

#[derive(Debug, Deserialize)]
struct TokenResponse {
    access_token: Option<String>,
    user: Option<AuthUser>,
}

#[derive(Debug, Deserialize)]
struct AdminRole {
    role: String,
}

/// 폴링 스냅샷
#[derive(Debug, Clone, Default, PartialEq)]
pub(crate) struct PollSnapshot {
    pub balance: Option<Balance>,
    pub transactions: Vec<Transaction>,
    pub investments: Vec<Investment>,
}

/// 두 스냅샷 사이의 변화를 이벤트로 변환
pub(crate) fn diff_snapshots(previous: &PollSnapshot, next: &PollSnapshot) -> Vec<RealtimeEvent> {
    let mut events = Vec::new();

    if let Some(balance) = &next.balance {
        if previous.balance.as_ref() != Some(balance) {
            events.push(RealtimeEvent::BalanceUpdated(balance.clone()));
        }
    }

    // 오래된 것부터 내보냄
    for txn in next.transactions.iter().rev() {
        if !previous.transactions.iter().any(|seen| seen.id == txn.id) {
            events.push(RealtimeEvent::TransactionInserted(txn.clone()));
        }
    }

    for investment in next.investments.iter().rev() {
        match previous.investments.iter().find(|seen| seen.id == investment.id) {
            None => events.push(RealtimeEvent::InvestmentInserted(investment.clone())),
            Some(seen) if seen != investment => events.push(RealtimeEvent::InvestmentUpdated(investment.clone())),
            Some(_) => {}
        }
    }

    events
}

/// REST 백엔드 클라이언트
#[derive(Clone)]
pub struct RestBackend {
    http: Client,
    base_url: String,
    anon_key: String,
    poll_interval: Duration,
    /// 사용자 ID -> 마지막 액세스 토큰 (행 단위 보안 정책용)
    tokens: Arc<RwLock<HashMap<String, String>>>,
}

impl RestBackend {
    pub fn new(config: &BackendConfig) -> Result<Self, BackendError> {
        let http = Client::builder()
            .timeout(Duration::from_secs(10))
            .build()
            .map_err(|e| BackendError::Request(format!("HTTP 클라이언트 생성 실패: {}", e)))?;

        info!("🌐 원격 백엔드 사용: {}", config.url);
        Ok(Self {
            http,
            base_url: config.url.trim_end_matches('/').to_string(),
            anon_key: config.anon_key.clone(),
            poll_interval: Duration::from_secs(config.poll_interval_secs.max(1)),
            tokens: Arc::new(RwLock::new(HashMap::new())),
        })
    }

    pub(crate) fn table_url(&self, table: &str, params: &[(&str, &str)]) -> Result<Url, BackendError> {
        let mut url = Url::parse(&format!("{}/rest/v1/{}", self.base_url, table))
            .map_err(|e| BackendError::Request(format!("잘못된 백엔드 URL: {}", e)))?;
        url.query_pairs_mut().extend_pairs(params.iter().copied());
        Ok(url)
    }

    fn auth_url(&self, path: &str) -> String {
        format!("{}/auth/v1/{}", self.base_url, path)
    }

    async fn bearer_for(&self, user_id: &str) -> String {
        self.tokens
            .read()
            .await
            .get(user_id)
            .cloned()
            .unwrap_or_else(|| self.anon_key.clone())
    }

    fn with_keys(&self, request: RequestBuilder, bearer: &str) -> RequestBuilder {
        request.header("apikey", &self.anon_key).bearer_auth(bearer)
    }

    /// 사용자 권한으로 테이블 행 조회
    async fn select<T: DeserializeOwned>(
        &self,
        user_id: &str,
        table: &str,
        params: &[(&str, &str)],
    ) -> Result<Vec<T>, BackendError> {
        let url = self.table_url(table, params)?;
        let bearer = self.bearer_for(user_id).await;
        debug!("📡 GET {}", url);

        let response = self.with_keys(self.http.get(url), &bearer).send().await?;
        let response = check_status(response).await?;
        Ok(response.json::<Vec<T>>().await?)
    }

    async fn remember(&self, user_id: &str, access_token: &str) {
        self.tokens.write().await.insert(user_id.to_string(), access_token.to_string());
    }

    async fn forget(&self, access_token: &str) {
        self.tokens.write().await.retain(|_, token| token != access_token);
    }

    async fn open_session(&self, user_id: &str, access_token: &str) -> Result<Session, BackendError> {
        self.remember(user_id, access_token).await;
        let account = self.profile(user_id).await?;
        let is_admin = self.is_admin(user_id).await.unwrap_or_else(|e| {
            warn!("⚠️ 관리자 권한 확인 실패: user={} error={}", user_id, e);
            false
        });
        Ok(Session {
            access_token: access_token.to_string(),
            account,
            is_admin,
        })
    }

    async fn snapshot(&self, user_id: &str) -> Result<PollSnapshot, BackendError> {
        Ok(PollSnapshot {
            balance: Some(self.balance(user_id).await?),
            transactions: self.transactions(user_id, Some(POLL_TRANSACTION_WINDOW)).await?,
            investments: self.investments(user_id).await?,
        })
    }
}

async fn check_status(response: Response) -> Result<Response, BackendError> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }

    let body = response.text().await.unwrap_or_else(|_| "응답 본문 없음".to_string());
    Err(match status {
        StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => BackendError::Unauthorized,
        StatusCode::NOT_FOUND => BackendError::NotFound(body),
        StatusCode::CONFLICT | StatusCode::UNPROCESSABLE_ENTITY => BackendError::AlreadyExists(body),
        _ => BackendError::Request(format!("{} - {}", status, body)),
    })
}

#[async_trait]
impl BackendClient for RestBackend {
    async fn sign_in(&self, email: &str, password: &str) -> Result<Session, BackendError> {
        let response = self
            .http
            .post(self.auth_url("token?grant_type=password"))
            .header("apikey", &self.anon_key)
            .json(&json!({ "email": email, "password": password }))
            .send()
            .await?;

        if response.status() == StatusCode::BAD_REQUEST {
            return Err(BackendError::InvalidCredentials);
        }
        let token: TokenResponse = check_status(response).await?.json().await?;
        match (token.access_token, token.user) {
            (Some(access_token), Some(user)) => self.open_session(&user.id, &access_token).await,
            _ => Err(BackendError::InvalidCredentials),
        }
    }

    async fn sign_up(&self, registration: &Registration) -> Result<Session, BackendError> {
        let response = self
            .http
            .post(self.auth_url("signup"))
            .header("apikey", &self.anon_key)
            .json(&json!({
                "email": registration.email,
                "password": registration.password,
                "data": {
                    "name": registration.name,
                    "username": registration.username,
                    "phone": registration.phone,
                    "cpf": registration.cpf,
                    "referrer": registration.referrer,
                }
            }))
            .send()
            .await?;

        let token: TokenResponse = check_status(response).await?.json().await?;
        info!("✅ 원격 회원가입 완료: username={}", registration.username);

        match (token.access_token, token.user) {
            (Some(access_token), Some(user)) => self.open_session(&user.id, &access_token).await,
            // 이메일 확인이 꺼져 있지 않으면 토큰 없이 사용자만 돌아옴
            _ => self.sign_in(&registration.email, &registration.password).await,
        }
    }

    async fn session(&self, access_token: &str) -> Result<Session, BackendError> {
        let response = self
            .with_keys(self.http.get(self.auth_url("user")), access_token)
            .send()
            .await?;
        let user: AuthUser = match check_status(response).await {
            Ok(response) => response.json().await?,
            Err(BackendError::Unauthorized) => {
                // 만료/폐기된 토큰은 캐시에서 제거
                self.forget(access_token).await;
                return Err(BackendError::Unauthorized);
            }
            Err(e) => return Err(e),
        };
        self.open_session(&user.id, access_token).await
    }

    async fn sign_out(&self, access_token: &str) -> Result<(), BackendError> {
        let response = self
            .with_keys(self.http.post(self.auth_url("logout")), access_token)
            .send()
            .await?;
        check_status(response).await?;
        self.forget(access_token).await;
        Ok(())
    }

    async fn profile(&self, user_id: &str) -> Result<Account, BackendError> {
        let filter = format!("eq.{}", user_id);
        let rows: Vec<Account> = self
            .select(user_id, "profiles", &[("select", PROFILE_SELECT), ("user_id", &filter)])
            .await?;
        rows.into_iter()
            .next()
            .ok_or_else(|| BackendError::NotFound(format!("profile {}", user_id)))
    }

    async fn balance(&self, user_id: &str) -> Result<Balance, BackendError> {
        let filter = format!("eq.{}", user_id);
        let rows: Vec<Balance> = self
            .select(user_id, "balances", &[("select", BALANCE_SELECT), ("user_id", &filter)])
            .await?;
        Ok(rows.into_iter().next().unwrap_or_default())
    }

    async fn transactions(&self, user_id: &str, limit: Option<usize>) -> Result<Vec<Transaction>, BackendError> {
        let filter = format!("eq.{}", user_id);
        let limit = limit.map(|l| l.to_string());
        let mut params = vec![("select", "*"), ("user_id", filter.as_str()), ("order", "created_at.desc")];
        if let Some(limit) = limit.as_deref() {
            params.push(("limit", limit));
        }
        self.select(user_id, "transactions", &params).await
    }

    async fn investments(&self, user_id: &str) -> Result<Vec<Investment>, BackendError> {
        let filter = format!("eq.{}", user_id);
        self.select(
            user_id,
            "investments",
            &[("select", "*"), ("user_id", &filter), ("order", "created_at.desc")],
        )
        .await
    }

    async fn investment_plans(&self) -> Result<Vec<InvestmentPlan>, BackendError> {
        let url = self.table_url(
            "investment_plans",
            &[("select", "*"), ("is_active", "eq.true"), ("order", "min_amount.asc")],
        )?;
        let response = self.with_keys(self.http.get(url), &self.anon_key).send().await?;
        Ok(check_status(response).await?.json().await?)
    }

    async fn referrals(&self, user_id: &str) -> Result<Vec<Referral>, BackendError> {
        let filter = format!("eq.{}", user_id);
        self.select(
            user_id,
            "referrals",
            &[("select", REFERRAL_SELECT), ("user_id", &filter), ("order", "created_at.desc")],
        )
        .await
    }

    async fn is_admin(&self, user_id: &str) -> Result<bool, BackendError> {
        let filter = format!("eq.{}", user_id);
        let rows: Vec<AdminRole> = self
            .select(user_id, "admin_roles", &[("select", "role"), ("user_id", &filter)])
            .await?;
        Ok(rows.iter().any(|row| row.role == "admin"))
    }

    async fn subscribe(&self, user_id: &str) -> Result<Subscription, BackendError> {
        let initial = self.snapshot(user_id).await?;
        let (tx, rx) = mpsc::channel(SUBSCRIPTION_BUFFER);
        let backend = self.clone();
        let owner = user_id.to_string();

        let task = tokio::spawn(async move {
            let mut previous = initial;
            let mut ticker = tokio::time::interval(backend.poll_interval);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);
            ticker.tick().await;

            loop {
                ticker.tick().await;
                let next = match backend.snapshot(&owner).await {
                    Ok(next) => next,
                    Err(e) => {
                        error!("❌ 구독 폴링 실패: user={} error={}", owner, e);
                        continue;
                    }
                };

                for event in diff_snapshots(&previous, &next) {
                    if tx.send(event).await.is_err() {
                        debug!("🔌 폴링 구독 종료: user={}", owner);
                        return;
                    }
                }
                previous = next;
            }
        });

        Ok(Subscription::new(user_id, rx, task))
    }
}
