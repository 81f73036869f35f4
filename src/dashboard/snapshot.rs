//! 대시보드 데이터 스냅샷
//!
//! 백엔드에서 한 번에 읽어 온 잔고/거래/투자 묶음과 실시간 이벤트 반영.

use log::debug;
use serde::{Deserialize, Serialize};

use crate::backend::{BackendClient, BackendError, RealtimeEvent};
use crate::domain::{Balance, Investment, Transaction};

/// 대시보드에 표시할 최근 거래 수
pub const RECENT_TRANSACTIONS: usize = 5;

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DashboardSnapshot {
    pub balance: Balance,
    /// 최신순
    pub transactions: Vec<Transaction>,
    /// 최신순
    pub investments: Vec<Investment>,
}

impl DashboardSnapshot {
    /// 백엔드에서 병렬로 읽기
    pub async fn load(backend: &dyn BackendClient, user_id: &str, recent: usize) -> Result<Self, BackendError> {
        let (balance, transactions, investments) = tokio::try_join!(
            backend.balance(user_id),
            backend.transactions(user_id, Some(recent)),
            backend.investments(user_id),
        )?;
        Ok(Self { balance, transactions, investments })
    }

    /// 실시간 이벤트 반영
    pub fn apply(&mut self, event: &RealtimeEvent) {
        match event {
            RealtimeEvent::BalanceUpdated(balance) => self.balance = balance.clone(),
            RealtimeEvent::TransactionInserted(txn) => {
                if !self.transactions.iter().any(|t| t.id == txn.id) {
                    self.transactions.insert(0, txn.clone());
                    self.transactions.sort_by(|a, b| b.created_at.cmp(&a.created_at));
                }
            }
            RealtimeEvent::InvestmentInserted(investment) => {
                if !self.investments.iter().any(|i| i.id == investment.id) {
                    self.investments.insert(0, investment.clone());
                }
            }
            RealtimeEvent::InvestmentUpdated(investment) => {
                match self.investments.iter_mut().find(|i| i.id == investment.id) {
                    Some(slot) => *slot = investment.clone(),
                    None => self.investments.insert(0, investment.clone()),
                }
            }
        }
        debug!("🔄 스냅샷 갱신: {:?}", std::mem::discriminant(event));
    }

    pub fn active_investments(&self) -> impl Iterator<Item = &Investment> {
        self.investments.iter().filter(|i| i.is_active())
    }

    /// 활성 투자의 누적 수익 합계
    pub fn total_returns(&self) -> f64 {
        self.active_investments().map(|i| i.total_returns).sum()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backend::{InMemoryBackend, DEMO_USER_ID};
    use crate::config::AppConfig;
    use crate::domain::{InvestmentStatus, TransactionStatus, TransactionType};
    use chrono::{TimeZone, Utc};

    #[tokio::test]
    async fn test_load_from_backend() {
        let backend = InMemoryBackend::seeded(&AppConfig::default());
        let snapshot = DashboardSnapshot::load(&backend, DEMO_USER_ID, 2).await.unwrap();

        assert_eq!(snapshot.balance.available, 8320.50);
        assert_eq!(snapshot.transactions.len(), 2);
        assert_eq!(snapshot.active_investments().count(), 1);
        assert_eq!(snapshot.total_returns(), 710.0);
    }

    #[tokio::test]
    async fn test_load_unknown_user_fails() {
        let backend = InMemoryBackend::seeded(&AppConfig::default());
        assert!(DashboardSnapshot::load(&backend, "nobody", 5).await.is_err());
    }

    #[test]
    fn test_apply_events() {
        let mut snapshot = DashboardSnapshot::default();
        let txn = Transaction {
            id: "txn-9".to_string(),
            kind: TransactionType::Deposit,
            amount: 250.0,
            currency: "BRL".to_string(),
            status: TransactionStatus::Pending,
            description: "Depósito via PIX".to_string(),
            created_at: Utc.with_ymd_and_hms(2025, 8, 14, 12, 0, 0).unwrap(),
        };

        snapshot.apply(&RealtimeEvent::TransactionInserted(txn.clone()));
        snapshot.apply(&RealtimeEvent::TransactionInserted(txn));
        assert_eq!(snapshot.transactions.len(), 1);

        let balance = Balance { total: 250.0, available: 250.0, invested: 0.0, referral_earnings: 0.0 };
        snapshot.apply(&RealtimeEvent::BalanceUpdated(balance.clone()));
        assert_eq!(snapshot.balance, balance);
        assert_eq!(snapshot.total_returns(), 0.0);
        assert_eq!(snapshot.active_investments().count(), 0);
        assert!(snapshot.investments.iter().all(|i| i.status != InvestmentStatus::Active));
    }
}
