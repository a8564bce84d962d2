//! Injectable clock
//!
//! Window computation never reads the system time directly. The current
//! time is taken from a [`Clock`] once per stream read and threaded through
//! explicitly, so tests can pin it with [`FixedClock`].

use chrono::{DateTime, Utc};
use std::fmt::Debug;
use std::sync::Arc;

/// Source of the current time
pub trait Clock: Send + Sync + Debug {
    /// Current UTC time
    fn now(&self) -> DateTime<Utc>;
}

/// Wall clock
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}

/// Clock that always returns the same instant
#[derive(Debug, Clone, Copy)]
pub struct FixedClock {
    now: DateTime<Utc>,
}

impl FixedClock {
    /// Create a clock pinned to `now`
    pub fn new(now: DateTime<Utc>) -> Self {
        Self { now }
    }
}

impl Clock for FixedClock {
    fn now(&self) -> DateTime<Utc> {
        self.now
    }
}

/// Shared clock handle
pub type SharedClock = Arc<dyn Clock>;

/// The default shared clock
pub fn system_clock() -> SharedClock {
    Arc::new(SystemClock)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_fixed_clock() {
        let instant = Utc.with_ymd_and_hms(2023, 2, 15, 0, 0, 0).unwrap();
        let clock = FixedClock::new(instant);
        assert_eq!(clock.now(), instant);
        assert_eq!(clock.now(), clock.now());
    }

    #[test]
    fn test_system_clock_moves_forward() {
        let clock = SystemClock;
        let first = clock.now();
        let second = clock.now();
        assert!(second >= first);
    }
}
