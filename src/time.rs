use std::time::Duration;

/// Frame clock handed down by the external driver loop.
#[derive(Clone, Copy, Debug, Default)]
pub struct Time {
    /// Time covered by the current frame.
    pub elapsed: Duration,
    /// Time since the session started.
    pub total: Duration,
}

impl Time {
    /// Advance by one frame.
    pub fn tick(&mut self, frame: Duration) {
        self.elapsed = frame;
        self.total += frame;
    }

    /// A single frame of `dt` seconds. Convenient for tests and
    /// fixed-step drivers.
    pub fn from_seconds(dt: f32) -> Self {
        let frame = Duration::from_secs_f32(dt.max(0.0));
        Time {
            elapsed: frame,
            total: frame,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tick_accumulates_total() {
        let mut time = Time::default();
        time.tick(Duration::from_millis(16));
        time.tick(Duration::from_millis(16));
        assert_eq!(time.elapsed, Duration::from_millis(16));
        assert_eq!(time.total, Duration::from_millis(32));
    }
}
