use std::time::Duration;

/// Frame-rate ceiling for a single frame loop.
///
/// A tick is accepted when at least one frame interval has elapsed since the
/// last accepted tick. Rejected ticks are simply dropped: there is no frame
/// debt, and the accepted timestamp becomes the new baseline as-is (no
/// snapping to the interval grid).
#[derive(Debug, Clone)]
pub struct FrameLimiter {
    interval: Duration,
    last: Option<Duration>,
}

impl FrameLimiter {
    /// Creates a limiter targeting `fps` frames per second (minimum 1).
    pub fn from_fps(fps: u32) -> Self {
        Self::with_interval(Duration::from_secs_f64(1.0 / fps.max(1) as f64))
    }

    pub fn with_interval(interval: Duration) -> Self {
        Self { interval, last: None }
    }

    #[inline]
    pub fn interval(&self) -> Duration {
        self.interval
    }

    /// Timestamp of the last accepted tick, if any.
    #[inline]
    pub fn last_accepted(&self) -> Option<Duration> {
        self.last
    }

    /// Decides whether the tick at `now` should render.
    ///
    /// The first tick is always accepted.
    pub fn accept(&mut self, now: Duration) -> bool {
        match self.last {
            Some(last) if now.saturating_sub(last) < self.interval => false,
            _ => {
                self.last = Some(now);
                true
            }
        }
    }

    /// Forgets the baseline so the next tick renders immediately.
    pub fn reset(&mut self) {
        self.last = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ms(v: u64) -> Duration {
        Duration::from_millis(v)
    }

    #[test]
    fn first_tick_is_accepted() {
        let mut limiter = FrameLimiter::from_fps(30);
        assert!(limiter.accept(ms(0)));
        assert_eq!(limiter.last_accepted(), Some(ms(0)));
    }

    #[test]
    fn ticks_inside_interval_are_rejected() {
        let mut limiter = FrameLimiter::from_fps(30);
        assert!(limiter.accept(ms(0)));
        assert!(!limiter.accept(ms(20)));
        assert!(limiter.accept(ms(40)));
        assert!(!limiter.accept(ms(60)));
        assert!(limiter.accept(ms(80)));
    }

    #[test]
    fn no_catch_up_after_a_long_gap() {
        // A 500 ms stall yields one frame, not fifteen.
        let mut limiter = FrameLimiter::from_fps(30);
        assert!(limiter.accept(ms(0)));
        assert!(limiter.accept(ms(500)));
        assert!(!limiter.accept(ms(510)));
    }

    #[test]
    fn baseline_is_the_accepted_timestamp() {
        let mut limiter = FrameLimiter::with_interval(ms(30));
        assert!(limiter.accept(ms(0)));
        assert!(limiter.accept(ms(45)));
        // 45 + 30 = 75; a grid-snapped limiter would accept at 60.
        assert!(!limiter.accept(ms(60)));
        assert!(limiter.accept(ms(75)));
    }

    #[test]
    fn zero_fps_is_treated_as_one() {
        assert_eq!(FrameLimiter::from_fps(0).interval(), Duration::from_secs(1));
    }

    #[test]
    fn reset_accepts_next_tick() {
        let mut limiter = FrameLimiter::with_interval(ms(30));
        assert!(limiter.accept(ms(0)));
        limiter.reset();
        assert!(limiter.accept(ms(1)));
    }
}
