//! 1초 주기 카운트다운 / 라이브 시계
//!
//! 두 타이머 모두 tokio 태스크로 실행되며 핸들이 소유합니다.
//! 핸들을 `stop` 하거나 드롭하면 태스크가 중단되어 타이머가 남지 않습니다.

use std::sync::Arc;
use std::time::Duration as StdDuration;

use chrono::{DateTime, Duration, Utc};
use log::{debug, info};
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio::time::{interval_at, Instant, MissedTickBehavior};

use crate::countdown::clock::Clock;
use crate::countdown::time_remaining::{format_countdown, time_remaining_at, TimeRemaining};
use crate::finance::format::format_time;

/// 기본 갱신 주기
pub const TICK: StdDuration = StdDuration::from_secs(1);

/// 고정 목표 시각까지의 카운트다운
///
/// 만료되면 0 값을 한 번 발행한 뒤 멈추고, `retarget` 으로 새 목표가 오면 다시 동작합니다.
pub struct Countdown {
    target_tx: watch::Sender<DateTime<Utc>>,
    remaining_rx: watch::Receiver<TimeRemaining>,
    task: JoinHandle<()>,
}

impl Countdown {
    /// 카운트다운 시작 (tokio 런타임 안에서 호출)
    pub fn start(target: DateTime<Utc>, clock: Arc<dyn Clock>) -> Self {
        Self::with_period(target, clock, TICK)
    }

    pub fn with_period(target: DateTime<Utc>, clock: Arc<dyn Clock>, period: StdDuration) -> Self {
        let initial = time_remaining_at(target, clock.now());
        let (target_tx, target_rx) = watch::channel(target);
        let (remaining_tx, remaining_rx) = watch::channel(initial);

        debug!("⏱️ 카운트다운 시작: 목표={} 남은시간={}", target, format_countdown(&initial));
        let task = tokio::spawn(run_countdown(target_rx, remaining_tx, clock, period));

        Self { target_tx, remaining_rx, task }
    }

    /// 마지막으로 계산된 남은 시간
    pub fn remaining(&self) -> TimeRemaining {
        *self.remaining_rx.borrow()
    }

    /// 표시 문자열
    pub fn display(&self) -> String {
        format_countdown(&self.remaining())
    }

    pub fn target(&self) -> DateTime<Utc> {
        *self.target_tx.borrow()
    }

    pub fn is_expired(&self) -> bool {
        self.remaining().is_zero()
    }

    /// 갱신 알림 수신자
    pub fn subscribe(&self) -> watch::Receiver<TimeRemaining> {
        self.remaining_rx.clone()
    }

    /// 목표 시각 변경 (만료 후에도 재시작)
    pub fn retarget(&self, target: DateTime<Utc>) {
        self.target_tx.send_replace(target);
    }

    /// 타이머 중단
    pub fn stop(self) {
        // Drop 에서 태스크 중단
    }
}

impl Drop for Countdown {
    fn drop(&mut self) {
        self.task.abort();
    }
}

/// 교체 가능한 카운트다운 자리
///
/// 연결마다 하나의 입금 만료 타이머를 두고, 새 목표가 오면 같은 타이머를 재설정합니다.
/// 비우거나 드롭하면 타이머 태스크도 중단됩니다.
#[derive(Default)]
pub struct CountdownSlot {
    active: Option<(Countdown, watch::Receiver<TimeRemaining>)>,
}

impl CountdownSlot {
    pub fn new() -> Self {
        Self::default()
    }

    /// 목표 설정 (동작 중이면 재설정) 후 지금 시점의 남은 시간 반환
    pub fn watch(&mut self, target: DateTime<Utc>, clock: Arc<dyn Clock>) -> TimeRemaining {
        let now = clock.now();
        match &self.active {
            Some((countdown, _)) => countdown.retarget(target),
            None => {
                let countdown = Countdown::start(target, clock);
                let rx = countdown.subscribe();
                self.active = Some((countdown, rx));
            }
        }
        time_remaining_at(target, now)
    }

    pub fn clear(&mut self) {
        if let Some((countdown, _)) = self.active.take() {
            countdown.stop();
        }
    }

    pub fn is_active(&self) -> bool {
        self.active.is_some()
    }

    pub fn target(&self) -> Option<DateTime<Utc>> {
        self.active.as_ref().map(|(countdown, _)| countdown.target())
    }

    /// 다음 갱신 대기 (비어 있으면 계속 대기)
    pub async fn changed(&mut self) -> Option<TimeRemaining> {
        let Some((_, rx)) = self.active.as_mut() else {
            return std::future::pending().await;
        };
        if rx.changed().await.is_err() {
            return None;
        }
        let remaining = *rx.borrow_and_update();
        Some(remaining)
    }
}

async fn run_countdown(
    mut target_rx: watch::Receiver<DateTime<Utc>>,
    remaining_tx: watch::Sender<TimeRemaining>,
    clock: Arc<dyn Clock>,
    period: StdDuration,
) {
    let mut ticker = interval_at(Instant::now() + period, period);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

    loop {
        let expired = remaining_tx.borrow().is_zero();
        let retargeted = if expired {
            // 만료 상태에서는 새 목표가 올 때까지 멈춤
            if target_rx.changed().await.is_err() {
                break;
            }
            true
        } else {
            tokio::select! {
                _ = ticker.tick() => false,
                changed = target_rx.changed() => {
                    if changed.is_err() {
                        break;
                    }
                    true
                }
            }
        };

        if retargeted {
            ticker.reset();
        }

        let target = *target_rx.borrow_and_update();
        let remaining = time_remaining_at(target, clock.now());
        remaining_tx.send_replace(remaining);

        if remaining.is_zero() {
            info!("⏱️ 카운트다운 만료: 목표={}", target);
        }
    }

    debug!("⏱️ 카운트다운 태스크 종료");
}

/// 라이브 시스템 시계
///
/// 설정된 시스템 시각에서 시작해 실제 시계와 같은 속도로 흐릅니다.
pub struct LiveClock {
    offset: Duration,
    clock: Arc<dyn Clock>,
    current_rx: watch::Receiver<DateTime<Utc>>,
    task: JoinHandle<()>,
}

impl LiveClock {
    pub fn start(system_time: DateTime<Utc>, clock: Arc<dyn Clock>) -> Self {
        Self::with_period(system_time, clock, TICK)
    }

    pub fn with_period(system_time: DateTime<Utc>, clock: Arc<dyn Clock>, period: StdDuration) -> Self {
        let offset = system_time - clock.now();
        let (current_tx, current_rx) = watch::channel(system_time);

        let task = {
            let clock = clock.clone();
            tokio::spawn(async move {
                let mut ticker = interval_at(Instant::now() + period, period);
                ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);
                loop {
                    ticker.tick().await;
                    if current_tx.send(clock.now() + offset).is_err() {
                        break;
                    }
                }
            })
        };

        info!("🕒 라이브 시계 시작: 시스템 시각={}", system_time);
        Self { offset, clock, current_rx, task }
    }

    /// 마지막 틱의 시스템 시각
    pub fn current(&self) -> DateTime<Utc> {
        *self.current_rx.borrow()
    }

    /// 지금 이 순간의 시스템 시각 (틱을 기다리지 않음)
    pub fn now(&self) -> DateTime<Utc> {
        self.clock.now() + self.offset
    }

    /// 표시 문자열 (HH:MM:SS)
    pub fn display(&self) -> String {
        format_time(self.current()).unwrap_or_default()
    }

    pub fn subscribe(&self) -> watch::Receiver<DateTime<Utc>> {
        self.current_rx.clone()
    }
}

impl Drop for LiveClock {
    fn drop(&mut self) {
        self.task.abort();
    }
}
