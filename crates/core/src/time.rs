use chrono::{DateTime, Duration, Utc};

/// Seconds on the countdown at the start of every question.
pub const QUESTION_TIME_LIMIT_SECS: u32 = 30;

/// Delay between locking in an answer and revealing whether it was correct.
pub const REVEAL_DELAY_MS: i64 = 1_500;

/// Delay between the reveal and moving on (next question, win or loss).
pub const RESOLVE_DELAY_MS: i64 = 2_500;

/// Time the audience takes to vote.
pub const AUDIENCE_POLL_DELAY_MS: i64 = 2_000;

#[must_use]
pub fn reveal_delay() -> Duration {
    Duration::milliseconds(REVEAL_DELAY_MS)
}

#[must_use]
pub fn resolve_delay() -> Duration {
    Duration::milliseconds(RESOLVE_DELAY_MS)
}

#[must_use]
pub fn audience_poll_delay() -> Duration {
    Duration::milliseconds(AUDIENCE_POLL_DELAY_MS)
}

/// One countdown step.
#[must_use]
pub fn timer_tick() -> Duration {
    Duration::seconds(1)
}

/// Time source for game sessions.
///
/// Sessions never read the system clock themselves; callers pass `now` in,
/// which keeps every timed transition reproducible under a fixed clock.
#[derive(Debug, Clone, Copy, Default)]
pub enum Clock {
    #[default]
    Default,
    Fixed(DateTime<Utc>),
}

impl Clock {
    #[must_use]
    pub fn default_clock() -> Self {
        Self::Default
    }

    #[must_use]
    pub fn fixed(at: DateTime<Utc>) -> Self {
        Self::Fixed(at)
    }

    #[must_use]
    pub fn now(&self) -> DateTime<Utc> {
        match self {
            Clock::Default => Utc::now(),
            Clock::Fixed(t) => *t,
        }
    }

    /// Moves a fixed clock forward. No effect on `Clock::Default`.
    pub fn advance(&mut self, delta: Duration) {
        if let Clock::Fixed(t) = self {
            *t += delta;
        }
    }

    #[must_use]
    pub fn is_fixed(&self) -> bool {
        matches!(self, Clock::Fixed(_))
    }
}

/// Deterministic timestamp for tests (2023-11-14T22:13:20Z).
pub const FIXED_TEST_TIMESTAMP: i64 = 1_700_000_000;

/// Returns a deterministic `DateTime<Utc>` for tests.
///
/// # Panics
///
/// Panics if the fixed timestamp cannot be represented.
#[must_use]
pub fn fixed_now() -> DateTime<Utc> {
    DateTime::<Utc>::from_timestamp(FIXED_TEST_TIMESTAMP, 0)
        .expect("fixed timestamp should be valid")
}

#[must_use]
pub fn fixed_clock() -> Clock {
    Clock::fixed(fixed_now())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fixed_clock_advances_and_default_ignores_it() {
        let mut clock = fixed_clock();
        clock.advance(reveal_delay() + resolve_delay());
        assert_eq!(clock.now(), fixed_now() + Duration::seconds(4));

        let mut real = Clock::default_clock();
        real.advance(Duration::days(1));
        assert!(!real.is_fixed());
    }
}
