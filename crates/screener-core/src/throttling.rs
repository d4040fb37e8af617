use std::num::NonZeroU32;
use std::sync::Arc;
use std::time::Duration;

use governor::clock::{Clock, DefaultClock};
use governor::state::direct::NotKeyed;
use governor::state::InMemoryState;
use governor::{InsufficientCapacity, Quota, RateLimiter};
use serde::Serialize;

type DirectRateLimiter = RateLimiter<NotKeyed, InMemoryState, DefaultClock>;

const SECONDS_PER_DAY: f64 = 86_400.0;

/// Client-side request allowance. A zero field means no limit on that window.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct RateLimit {
    pub per_minute: u32,
    pub per_day: u32,
}

impl RateLimit {
    /// Twelve Data free plan: 8 calls per minute, 800 per day.
    pub const fn free_tier() -> Self {
        Self {
            per_minute: 8,
            per_day: 800,
        }
    }
}

/// Shared draw-down budget for outbound requests.
///
/// Every HTTP call draws one cell from each configured window. An empty window
/// rejects immediately with the wait until the next cell; callers never sleep here.
#[derive(Clone)]
pub struct RequestBudget {
    per_minute: Option<Window>,
    per_day: Option<Window>,
    clock: DefaultClock,
}

#[derive(Clone)]
struct Window {
    limiter: Arc<DirectRateLimiter>,
    span: Duration,
}

impl RequestBudget {
    pub fn new(limit: RateLimit) -> Self {
        Self {
            per_minute: NonZeroU32::new(limit.per_minute).map(|burst| Window {
                limiter: Arc::new(RateLimiter::direct(Quota::per_minute(burst))),
                span: Duration::from_secs(60),
            }),
            per_day: NonZeroU32::new(limit.per_day)
                .and_then(daily_quota)
                .map(|quota| Window {
                    limiter: Arc::new(RateLimiter::direct(quota)),
                    span: Duration::from_secs_f64(SECONDS_PER_DAY),
                }),
            clock: DefaultClock::default(),
        }
    }

    /// Takes one request from every window, or returns how long until one frees up.
    pub fn acquire(&self) -> Result<(), Duration> {
        self.acquire_n(1)
    }

    /// Takes `cells` requests from every window as one reservation.
    ///
    /// Either the whole batch is granted or the caller sends nothing. The minute
    /// window is drawn first: a rejection there leaves the daily allowance intact.
    /// A request larger than a window's burst is rejected with that window's span.
    pub fn acquire_n(&self, cells: u32) -> Result<(), Duration> {
        let Some(cells) = NonZeroU32::new(cells) else {
            return Ok(());
        };
        for window in [&self.per_minute, &self.per_day].into_iter().flatten() {
            match window.limiter.check_n(cells) {
                Ok(Ok(())) => {}
                Ok(Err(not_until)) => return Err(not_until.wait_time_from(self.clock.now())),
                Err(InsufficientCapacity(_)) => return Err(window.span),
            }
        }
        Ok(())
    }
}

impl std::fmt::Debug for RequestBudget {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RequestBudget")
            .field("per_minute", &self.per_minute.is_some())
            .field("per_day", &self.per_day.is_some())
            .finish()
    }
}

fn daily_quota(burst: NonZeroU32) -> Option<Quota> {
    let period = Duration::from_secs_f64(SECONDS_PER_DAY / f64::from(burst.get()));
    Quota::with_period(period).map(|quota| quota.allow_burst(burst))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn minute_window_rejects_after_burst() {
        let budget = RequestBudget::new(RateLimit {
            per_minute: 2,
            per_day: 0,
        });

        assert!(budget.acquire().is_ok());
        assert!(budget.acquire().is_ok());
        let wait = budget.acquire().expect_err("third call exceeds burst");
        assert!(wait > Duration::ZERO);
        assert!(wait <= Duration::from_secs(30));
    }

    #[test]
    fn daily_window_applies_independently() {
        let budget = RequestBudget::new(RateLimit {
            per_minute: 0,
            per_day: 1,
        });

        assert!(budget.acquire().is_ok());
        let wait = budget.acquire().expect_err("daily budget is spent");
        assert!(wait > Duration::from_secs(3_600));
    }

    #[test]
    fn zero_limits_mean_unlimited() {
        let budget = RequestBudget::new(RateLimit {
            per_minute: 0,
            per_day: 0,
        });
        for _ in 0..100 {
            assert!(budget.acquire().is_ok());
        }
    }

    #[test]
    fn free_tier_allows_eight_calls_per_minute() {
        let budget = RequestBudget::new(RateLimit::free_tier());
        for _ in 0..8 {
            assert!(budget.acquire().is_ok());
        }
        assert!(budget.acquire().is_err());
    }

    #[test]
    fn batch_reservation_is_all_or_nothing() {
        let budget = RequestBudget::new(RateLimit {
            per_minute: 4,
            per_day: 0,
        });

        assert!(budget.acquire_n(3).is_ok());
        assert!(budget.acquire_n(3).is_err());
        // The rejected batch took nothing, so a single call still fits.
        assert!(budget.acquire().is_ok());
        assert!(budget.acquire().is_err());
    }

    #[test]
    fn batch_larger_than_burst_is_rejected_with_window_span() {
        let budget = RequestBudget::new(RateLimit {
            per_minute: 2,
            per_day: 0,
        });

        assert_eq!(budget.acquire_n(3), Err(Duration::from_secs(60)));
        assert!(budget.acquire_n(2).is_ok());
    }

    #[test]
    fn minute_rejection_leaves_daily_allowance_untouched() {
        let budget = RequestBudget::new(RateLimit {
            per_minute: 3,
            per_day: 6,
        });

        assert!(budget.acquire_n(3).is_ok());
        assert!(budget.acquire_n(3).is_err());
        assert!(budget.acquire_n(3).is_err());
        // Only the granted batch counted against the day.
        let day = &budget.per_day.as_ref().expect("daily window configured").limiter;
        let three = NonZeroU32::new(3).expect("non-zero");
        assert!(matches!(day.check_n(three), Ok(Ok(()))));
        assert!(matches!(day.check_n(NonZeroU32::MIN), Ok(Err(_))));
    }
}
