/**
* filename : mod
* author : HAMA
* date: 2025. 8. 14.
* description: 남은 시간 계산 및 1초 주기 타이머 모듈
**/

pub mod clock;
pub mod ticker;
pub mod time_remaining;

pub use clock::{Clock, ManualClock, SystemClock};
pub use ticker::{Countdown, CountdownSlot, LiveClock};
pub use time_remaining::{format_countdown, get_time_remaining, time_remaining_at, TimeRemaining};
