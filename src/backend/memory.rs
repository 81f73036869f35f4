//! 메모리 백엔드
//!
//! 외부 백엔드가 설정되지 않았을 때 쓰는 데모 데이터 저장소입니다.
//! 변경 헬퍼는 호스팅 백엔드의 실시간 푸시처럼 구독자에게 이벤트를 브로드캐스트합니다.

use std::collections::HashMap;

use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, TimeZone, Utc};
use log::{debug, info};
use tokio::sync::{broadcast, RwLock};
use uuid::Uuid;

use crate::backend::subscription::{RealtimeEvent, Subscription, UserEvent};
use crate::backend::{BackendClient, BackendError};
use crate::config::AppConfig;
use crate::domain::{
    Account,
    AccountStatus,
    Balance,
    Investment,
    InvestmentPlan,
    InvestmentStatus,
    KycStatus,
    Referral,
    ReferredProfile,
    Session,
    Transaction,
    TransactionStatus,
    TransactionType,
};
use crate::forms::Registration;

/// 데모 사용자 ID
pub const DEMO_USER_ID: &str = "default-user-id";
/// 데모 사용자 이메일
pub const DEMO_EMAIL: &str = "skiddylnx@gmail.com";
/// 데모 사용자 비밀번호
pub const DEMO_PASSWORD: &str = "bitfuse123";

const EVENT_CAPACITY: usize = 256;

struct UserRecord {
    account: Account,
    password: String,
    balance: Option<Balance>,
    transactions: Vec<Transaction>,
    investments: Vec<Investment>,
    referrals: Vec<Referral>,
    is_admin: bool,
}

impl UserRecord {
    fn new(account: Account, password: &str) -> Self {
        Self {
            account,
            password: password.to_string(),
            balance: None,
            transactions: Vec::new(),
            investments: Vec::new(),
            referrals: Vec::new(),
            is_admin: false,
        }
    }
}

#[derive(Default)]
struct Store {
    users: HashMap<String, UserRecord>,
    /// 액세스 토큰 -> 사용자 ID
    sessions: HashMap<String, String>,
}

impl Store {
    fn user(&self, user_id: &str) -> Result<&UserRecord, BackendError> {
        self.users
            .get(user_id)
            .ok_or_else(|| BackendError::NotFound(format!("user {}", user_id)))
    }

    fn user_mut(&mut self, user_id: &str) -> Result<&mut UserRecord, BackendError> {
        self.users
            .get_mut(user_id)
            .ok_or_else(|| BackendError::NotFound(format!("user {}", user_id)))
    }

    fn find_by_email(&self, email: &str) -> Option<&UserRecord> {
        self.users.values().find(|u| u.account.email.eq_ignore_ascii_case(email))
    }

    fn open_session(&mut self, user_id: &str) -> Result<Session, BackendError> {
        let record = self.user(user_id)?;
        let session = Session {
            access_token: Uuid::new_v4().to_string(),
            account: record.account.clone(),
            is_admin: record.is_admin,
        };
        self.sessions.insert(session.access_token.clone(), user_id.to_string());
        Ok(session)
    }
}

/// 메모리 기반 백엔드
pub struct InMemoryBackend {
    store: RwLock<Store>,
    plans: Vec<InvestmentPlan>,
    referral_levels: Vec<f64>,
    events: broadcast::Sender<UserEvent>,
}

impl InMemoryBackend {
    /// 빈 저장소
    pub fn new(config: &AppConfig) -> Self {
        Self::with_store(config, Store::default())
    }

    /// 데모 사용자가 들어 있는 저장소
    pub fn seeded(config: &AppConfig) -> Self {
        let mut store = Store::default();
        let record = demo_user();
        store.users.insert(record.account.id.clone(), record);

        info!("🧪 데모 데이터 로드 완료: user={}", DEMO_USER_ID);
        Self::with_store(config, store)
    }

    fn with_store(config: &AppConfig, store: Store) -> Self {
        let (events, _) = broadcast::channel(EVENT_CAPACITY);
        Self {
            store: RwLock::new(store),
            plans: config.investment_plans.clone(),
            referral_levels: config.referral_levels.clone(),
            events,
        }
    }

    /// 사용자 추가 (테스트/관리용)
    pub async fn insert_user(&self, account: Account, password: &str, balance: Option<Balance>) {
        let mut record = UserRecord::new(account, password);
        record.balance = balance;
        let mut store = self.store.write().await;
        store.users.insert(record.account.id.clone(), record);
    }

    /// 잔고 변경
    pub async fn set_balance(&self, user_id: &str, balance: Balance) -> Result<(), BackendError> {
        {
            let mut store = self.store.write().await;
            store.user_mut(user_id)?.balance = Some(balance.clone());
        }
        self.publish(user_id, RealtimeEvent::BalanceUpdated(balance));
        Ok(())
    }

    /// 거래 추가
    pub async fn record_transaction(&self, user_id: &str, transaction: Transaction) -> Result<(), BackendError> {
        {
            let mut store = self.store.write().await;
            store.user_mut(user_id)?.transactions.push(transaction.clone());
        }
        self.publish(user_id, RealtimeEvent::TransactionInserted(transaction));
        Ok(())
    }

    /// 투자 추가
    pub async fn open_investment(&self, user_id: &str, investment: Investment) -> Result<(), BackendError> {
        {
            let mut store = self.store.write().await;
            store.user_mut(user_id)?.investments.push(investment.clone());
        }
        self.publish(user_id, RealtimeEvent::InvestmentInserted(investment));
        Ok(())
    }

    /// 투자 갱신 (ID 기준 교체)
    pub async fn update_investment(&self, user_id: &str, investment: Investment) -> Result<(), BackendError> {
        {
            let mut store = self.store.write().await;
            let record = store.user_mut(user_id)?;
            let slot = record
                .investments
                .iter_mut()
                .find(|i| i.id == investment.id)
                .ok_or_else(|| BackendError::NotFound(format!("investment {}", investment.id)))?;
            *slot = investment.clone();
        }
        self.publish(user_id, RealtimeEvent::InvestmentUpdated(investment));
        Ok(())
    }

    pub async fn set_admin(&self, user_id: &str, is_admin: bool) -> Result<(), BackendError> {
        let mut store = self.store.write().await;
        store.user_mut(user_id)?.is_admin = is_admin;
        Ok(())
    }

    fn publish(&self, user_id: &str, event: RealtimeEvent) {
        // 구독자가 없으면 전송 실패는 무시
        let _ = self.events.send((user_id.to_string(), event));
    }
}

#[async_trait]
impl BackendClient for InMemoryBackend {
    async fn sign_in(&self, email: &str, password: &str) -> Result<Session, BackendError> {
        let mut store = self.store.write().await;
        let user_id = match store.find_by_email(email) {
            Some(record) if record.password == password => record.account.id.clone(),
            _ => return Err(BackendError::InvalidCredentials),
        };
        debug!("🔑 로그인: user={}", user_id);
        store.open_session(&user_id)
    }

    async fn sign_up(&self, registration: &Registration) -> Result<Session, BackendError> {
        let mut store = self.store.write().await;

        if store.find_by_email(&registration.email).is_some() {
            return Err(BackendError::AlreadyExists(format!("email {}", registration.email)));
        }
        if store.users.values().any(|u| u.account.username == registration.username) {
            return Err(BackendError::AlreadyExists(format!("username {}", registration.username)));
        }

        let account = Account {
            id: Uuid::new_v4().to_string(),
            name: registration.name.clone(),
            email: registration.email.clone(),
            username: registration.username.clone(),
            phone: Some(registration.phone.clone()),
            cpf: Some(registration.cpf.clone()),
            country: "BR".to_string(),
            status: AccountStatus::Active,
            kyc_status: KycStatus::Pending,
            member_since: Utc::now().date_naive(),
            usdt_wallet: None,
        };
        let user_id = account.id.clone();
        let referred = ReferredProfile {
            username: account.username.clone(),
            name: account.name.clone(),
            status: account.status,
        };
        store.users.insert(user_id.clone(), UserRecord::new(account, &registration.password));

        // 추천인이 있으면 1단계 추천 관계 기록
        if let Some(referrer) = registration.referrer.as_deref() {
            let commission_percentage = self.referral_levels.first().copied().unwrap_or_default();
            if let Some(parent) = store.users.values_mut().find(|u| u.account.username == referrer) {
                parent.referrals.push(Referral {
                    id: Uuid::new_v4().to_string(),
                    level: 1,
                    commission_percentage,
                    total_commission: 0.0,
                    created_at: Utc::now(),
                    referred_profile: Some(referred),
                });
            }
        }

        info!("✅ 회원가입 완료: user={} username={}", user_id, registration.username);
        store.open_session(&user_id)
    }

    async fn session(&self, access_token: &str) -> Result<Session, BackendError> {
        let store = self.store.read().await;
        let user_id = store.sessions.get(access_token).ok_or(BackendError::Unauthorized)?;
        let record = store.user(user_id)?;
        Ok(Session {
            access_token: access_token.to_string(),
            account: record.account.clone(),
            is_admin: record.is_admin,
        })
    }

    async fn sign_out(&self, access_token: &str) -> Result<(), BackendError> {
        let mut store = self.store.write().await;
        store.sessions.remove(access_token).map(|_| ()).ok_or(BackendError::Unauthorized)
    }

    async fn profile(&self, user_id: &str) -> Result<Account, BackendError> {
        let store = self.store.read().await;
        Ok(store.user(user_id)?.account.clone())
    }

    async fn balance(&self, user_id: &str) -> Result<Balance, BackendError> {
        let store = self.store.read().await;
        Ok(store.user(user_id)?.balance.clone().unwrap_or_default())
    }

    async fn transactions(&self, user_id: &str, limit: Option<usize>) -> Result<Vec<Transaction>, BackendError> {
        let store = self.store.read().await;
        let mut transactions = store.user(user_id)?.transactions.clone();
        transactions.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        if let Some(limit) = limit {
            transactions.truncate(limit);
        }
        Ok(transactions)
    }

    async fn investments(&self, user_id: &str) -> Result<Vec<Investment>, BackendError> {
        let store = self.store.read().await;
        let mut investments = store.user(user_id)?.investments.clone();
        investments.sort_by(|a, b| b.start_date.cmp(&a.start_date));
        Ok(investments)
    }

    async fn investment_plans(&self) -> Result<Vec<InvestmentPlan>, BackendError> {
        let mut plans = self.plans.clone();
        plans.sort_by(|a, b| a.min_amount.total_cmp(&b.min_amount));
        Ok(plans)
    }

    async fn referrals(&self, user_id: &str) -> Result<Vec<Referral>, BackendError> {
        let store = self.store.read().await;
        let mut referrals = store.user(user_id)?.referrals.clone();
        referrals.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(referrals)
    }

    async fn is_admin(&self, user_id: &str) -> Result<bool, BackendError> {
        let store = self.store.read().await;
        Ok(store.users.get(user_id).map(|u| u.is_admin).unwrap_or(false))
    }

    async fn subscribe(&self, user_id: &str) -> Result<Subscription, BackendError> {
        self.store.read().await.user(user_id)?;
        debug!("📡 구독 시작: user={}", user_id);
        Ok(Subscription::from_broadcast(user_id, self.events.subscribe()))
    }
}

fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap_or_default()
}

fn at(y: i32, m: u32, d: u32, h: u32, min: u32) -> DateTime<Utc> {
    Utc.with_ymd_and_hms(y, m, d, h, min, 0).single().unwrap_or_default()
}

fn transaction(id: &str, kind: TransactionType, amount: f64, created_at: DateTime<Utc>, description: &str) -> Transaction {
    Transaction {
        id: id.to_string(),
        kind,
        amount,
        currency: "BRL".to_string(),
        status: TransactionStatus::Completed,
        description: description.to_string(),
        created_at,
    }
}

fn referral(id: &str, username: &str, level: u32, rate: f64, earnings: f64, created_at: DateTime<Utc>) -> Referral {
    Referral {
        id: id.to_string(),
        level,
        commission_percentage: rate,
        total_commission: earnings,
        created_at,
        referred_profile: Some(ReferredProfile {
            username: username.to_string(),
            name: username.to_string(),
            status: AccountStatus::Active,
        }),
    }
}

fn demo_user() -> UserRecord {
    let account = Account {
        id: DEMO_USER_ID.to_string(),
        name: "Paul Stephen".to_string(),
        email: DEMO_EMAIL.to_string(),
        username: "bybitearnusdt-web".to_string(),
        phone: Some("+5511987654321".to_string()),
        cpf: Some("123.456.789-00".to_string()),
        country: "BR".to_string(),
        status: AccountStatus::Active,
        kyc_status: KycStatus::Verified,
        member_since: date(2025, 8, 3),
        usdt_wallet: Some("3J98t1WpEZ73CNmQviecrnyiWrnqRhWNLy".to_string()),
    };

    let mut record = UserRecord::new(account, DEMO_PASSWORD);
    record.balance = Some(Balance {
        total: 15420.50,
        available: 8320.50,
        invested: 7100.00,
        referral_earnings: 450.25,
    });
    record.transactions = vec![
        transaction("txn-001", TransactionType::Return, 177.50, at(2025, 8, 14, 10, 0), "Retorno diário - Miner Cósmico"),
        transaction("txn-002", TransactionType::Deposit, 5000.00, at(2025, 8, 13, 15, 30), "Depósito via PIX"),
        transaction("txn-003", TransactionType::Commission, 50.00, at(2025, 8, 12, 9, 15), "Comissão de indicação - Nível 1"),
    ];
    record.investments = vec![Investment {
        id: "inv-001".to_string(),
        plan_id: "miner-cosmico".to_string(),
        amount: 7100.00,
        daily_return_rate: 0.025,
        start_date: date(2025, 8, 10),
        end_date: date(2025, 10, 9),
        status: InvestmentStatus::Active,
        total_returns: 710.00,
    }];
    record.referrals = vec![
        referral("ref-001", "user123", 1, 0.10, 250.00, at(2025, 8, 5, 0, 0)),
        referral("ref-002", "investor456", 2, 0.05, 125.00, at(2025, 8, 8, 0, 0)),
    ];
    record
}
