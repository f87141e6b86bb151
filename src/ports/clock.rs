//! Clock Port - Wall-clock Source
//!
//! Order expiry is computed from the time of submission, so the
//! builder reads the clock through this trait to keep tests exact.

use chrono::Utc;

pub trait Clock: Send + Sync + 'static {
  /// Current Unix time in milliseconds.
  fn now_ms(&self) -> u64;
}

/// System wall clock.
#[derive(Debug, Default, Clone, Copy)]
pub struct SystemClock;

impl Clock for SystemClock {
  fn now_ms(&self) -> u64 {
    u64::try_from(Utc::now().timestamp_millis()).unwrap_or_default()
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn test_system_clock_is_recent() {
    // 2024-01-01T00:00:00Z
    assert!(SystemClock.now_ms() > 1_704_067_200_000);
  }
}
