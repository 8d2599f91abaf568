/// Source of "now" for entry timestamps and custom action ids.
pub trait Clock {
    fn now_millis(&self) -> i64;
}

#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now_millis(&self) -> i64 {
        chrono::Utc::now().timestamp_millis()
    }
}

#[cfg(test)]
pub use manual::ManualClock;

#[cfg(test)]
mod manual {
    use super::Clock;
    use std::cell::Cell;

    /// Deterministic clock; every read advances by `step` milliseconds.
    #[derive(Debug)]
    pub struct ManualClock {
        now: Cell<i64>,
        step: i64,
    }

    impl ManualClock {
        pub fn starting_at(now: i64) -> Self {
            Self::stepping(now, 0)
        }

        pub fn stepping(now: i64, step: i64) -> Self {
            Self {
                now: Cell::new(now),
                step,
            }
        }
    }

    impl Clock for ManualClock {
        fn now_millis(&self) -> i64 {
            let now = self.now.get();
            self.now.set(now + self.step);
            now
        }
    }
}
