//! 남은 시간 계산 및 카운트다운 표시

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// 분해된 남은 시간
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TimeRemaining {
    pub days: i64,
    pub hours: i64,
    pub minutes: i64,
    pub seconds: i64,
    /// 전체 남은 시간 (밀리초)
    pub total: i64,
}

impl TimeRemaining {
    /// 모든 필드가 0 인지 (만료)
    pub fn is_zero(&self) -> bool {
        self.total <= 0
    }
}

/// 현재 시각 기준 남은 시간
pub fn get_time_remaining(target: DateTime<Utc>) -> TimeRemaining {
    time_remaining_at(target, Utc::now())
}

/// 주어진 시각 기준 남은 시간 (이미 지났으면 모두 0)
pub fn time_remaining_at(target: DateTime<Utc>, now: DateTime<Utc>) -> TimeRemaining {
    let total = (target - now).num_milliseconds();
    if total <= 0 {
        return TimeRemaining::default();
    }

    let total_secs = total / 1000;
    TimeRemaining {
        days: total_secs / 86_400,
        hours: (total_secs / 3_600) % 24,
        minutes: (total_secs / 60) % 60,
        seconds: total_secs % 60,
        total,
    }
}

/// 카운트다운 표시
///
/// 일 단위가 있으면 `"Nd Nh Nm"`, 시간 단위가 있으면 `"Nh Nm Ns"`, 그 외 `"Nm Ns"`.
pub fn format_countdown(remaining: &TimeRemaining) -> String {
    let TimeRemaining { days, hours, minutes, seconds, .. } = *remaining;

    if days > 0 {
        format!("{}d {}h {}m", days, hours, minutes)
    } else if hours > 0 {
        format!("{}h {}m {}s", hours, minutes, seconds)
    } else {
        format!("{}m {}s", minutes, seconds)
    }
}
