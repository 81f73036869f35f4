//! 실시간 변경 구독
//!
//! `Subscription` 은 이벤트 스트림이면서 전달 태스크의 소유자입니다.
//! 드롭하면 전달 태스크가 중단되어 구독이 해제됩니다.

use std::pin::Pin;
use std::task::{Context, Poll};

use futures::Stream;
use log::{debug, warn};
use serde::{Deserialize, Serialize};
use tokio::sync::{broadcast, mpsc};
use tokio::task::JoinHandle;
use tokio_stream::wrappers::errors::BroadcastStreamRecvError;
use tokio_stream::wrappers::BroadcastStream;
use tokio_stream::StreamExt;

use crate::domain::{Balance, Investment, Transaction};

/// 구독 버퍼 크기
pub const SUBSCRIPTION_BUFFER: usize = 64;

/// 사용자 데이터 변경 이벤트
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", content = "data")]
pub enum RealtimeEvent {
    BalanceUpdated(Balance),
    TransactionInserted(Transaction),
    InvestmentInserted(Investment),
    InvestmentUpdated(Investment),
}

/// 사용자 ID 가 붙은 이벤트 (백엔드 내부 브로드캐스트용)
pub type UserEvent = (String, RealtimeEvent);

/// 이벤트 구독 핸들
pub struct Subscription {
    user_id: String,
    rx: mpsc::Receiver<RealtimeEvent>,
    task: JoinHandle<()>,
}

impl Subscription {
    /// 이미 실행 중인 생산자 태스크로 구독 생성
    pub fn new(user_id: &str, rx: mpsc::Receiver<RealtimeEvent>, task: JoinHandle<()>) -> Self {
        Self {
            user_id: user_id.to_string(),
            rx,
            task,
        }
    }

    /// 전체 사용자 브로드캐스트에서 한 사용자의 이벤트만 걸러 구독
    pub fn from_broadcast(user_id: &str, events: broadcast::Receiver<UserEvent>) -> Self {
        let (tx, rx) = mpsc::channel(SUBSCRIPTION_BUFFER);
        let owner = user_id.to_string();

        let task = tokio::spawn(async move {
            let mut stream = BroadcastStream::new(events);
            while let Some(item) = stream.next().await {
                match item {
                    Ok((target, event)) if target == owner => {
                        if tx.send(event).await.is_err() {
                            break;
                        }
                    }
                    Ok(_) => {}
                    Err(BroadcastStreamRecvError::Lagged(skipped)) => {
                        warn!("⚠️ 구독 지연으로 이벤트 {}건 누락: user={}", skipped, owner);
                    }
                }
            }
            debug!("🔌 구독 전달 종료: user={}", owner);
        });

        Self::new(user_id, rx, task)
    }

    pub fn user_id(&self) -> &str {
        &self.user_id
    }

    /// 다음 이벤트 (생산자가 끝나면 None)
    pub async fn recv(&mut self) -> Option<RealtimeEvent> {
        self.rx.recv().await
    }

    /// 구독 해제
    pub fn unsubscribe(self) {}
}

impl Stream for Subscription {
    type Item = RealtimeEvent;

    fn poll_next(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<Self::Item>> {
        self.rx.poll_recv(cx)
    }
}

impl Drop for Subscription {
    fn drop(&mut self) {
        self.task.abort();
    }
}
