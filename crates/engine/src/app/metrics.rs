use std::time::{Duration, Instant};

#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct LoopMetricsSnapshot {
    pub fps: f32,
    pub tps: f32,
    pub frame_time_ms: f32,
}

/// Counts frames and ticks over a fixed wall-clock window.
#[derive(Debug)]
pub(crate) struct MetricsAccumulator {
    interval_start: Instant,
    interval: Duration,
    frames: u32,
    ticks: u32,
    frame_time_sum: Duration,
}

impl MetricsAccumulator {
    pub(crate) fn new(interval: Duration) -> Self {
        Self::starting_at(Instant::now(), interval)
    }

    fn starting_at(interval_start: Instant, interval: Duration) -> Self {
        Self {
            interval_start,
            interval,
            frames: 0,
            ticks: 0,
            frame_time_sum: Duration::ZERO,
        }
    }

    pub(crate) fn record_tick(&mut self) {
        self.ticks = self.ticks.saturating_add(1);
    }

    pub(crate) fn record_frame(&mut self, frame_dt: Duration) {
        self.frames = self.frames.saturating_add(1);
        self.frame_time_sum = self.frame_time_sum.saturating_add(frame_dt);
    }

    pub(crate) fn maybe_snapshot(&mut self, now: Instant) -> Option<LoopMetricsSnapshot> {
        let elapsed = now.saturating_duration_since(self.interval_start);
        if elapsed < self.interval {
            return None;
        }

        let elapsed_seconds = elapsed.as_secs_f32().max(f32::EPSILON);
        let frame_time_ms = if self.frames == 0 {
            0.0
        } else {
            self.frame_time_sum.as_secs_f32() * 1000.0 / self.frames as f32
        };
        let snapshot = LoopMetricsSnapshot {
            fps: self.frames as f32 / elapsed_seconds,
            tps: self.ticks as f32 / elapsed_seconds,
            frame_time_ms,
        };
        *self = Self::starting_at(now, self.interval);
        Some(snapshot)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn no_snapshot_before_interval_elapses() {
        let start = Instant::now();
        let mut metrics = MetricsAccumulator::starting_at(start, Duration::from_secs(1));
        metrics.record_frame(Duration::from_millis(16));
        assert!(metrics
            .maybe_snapshot(start + Duration::from_millis(500))
            .is_none());
    }

    #[test]
    fn snapshot_reports_rates_and_resets() {
        let start = Instant::now();
        let mut metrics = MetricsAccumulator::starting_at(start, Duration::from_secs(1));
        for _ in 0..30 {
            metrics.record_frame(Duration::from_millis(20));
        }
        for _ in 0..60 {
            metrics.record_tick();
        }

        let snapshot = metrics
            .maybe_snapshot(start + Duration::from_secs(1))
            .expect("snapshot");
        assert!((snapshot.fps - 30.0).abs() < 0.01);
        assert!((snapshot.tps - 60.0).abs() < 0.01);
        assert!((snapshot.frame_time_ms - 20.0).abs() < 0.01);

        let next = metrics.maybe_snapshot(start + Duration::from_secs(2)).expect("next");
        assert_eq!(next.fps, 0.0);
        assert_eq!(next.frame_time_ms, 0.0);
    }
}
