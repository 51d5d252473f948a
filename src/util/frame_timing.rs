use web_time::{Duration, Instant};

/// Aggregate over one reporting interval.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FrameReport {
    /// Average frames per second over the interval.
    pub fps: f32,
    /// Frames rendered in the interval.
    pub frames: u32,
    /// Longest single frame in the interval.
    pub worst_frame: Duration,
}

/// Frame timing with FPS calculation, optional frame limiting and
/// periodic reports.
pub struct FrameTiming {
    /// Minimum frame duration based on target FPS (zero = unlimited).
    min_frame_duration: Duration,
    /// Last frame timestamp
    last_frame: Instant,
    /// Smoothed FPS using exponential moving average
    smoothed_fps: f32,
    /// Smoothing factor (lower = smoother, 0.0-1.0)
    smoothing: f32,
    since_report: Duration,
    frames_since_report: u32,
    worst_frame: Duration,
}

impl FrameTiming {
    /// Create a new frame timer with the given FPS target (0 = unlimited).
    pub fn new(target_fps: u32) -> Self {
        let min_frame_duration = if target_fps > 0 {
            Duration::from_secs_f64(1.0 / f64::from(target_fps))
        } else {
            Duration::ZERO
        };

        Self {
            min_frame_duration,
            last_frame: Instant::now(),
            smoothed_fps: 60.0,
            smoothing: 0.05,
            since_report: Duration::ZERO,
            frames_since_report: 0,
            worst_frame: Duration::ZERO,
        }
    }

    /// Returns true if enough time has passed since the last frame to
    /// render another.
    pub fn should_render(&self) -> bool {
        self.last_frame.elapsed() >= self.min_frame_duration
    }

    /// Call after rendering to update timing.
    pub fn end_frame(&mut self) {
        let now = Instant::now();
        let elapsed = now.duration_since(self.last_frame);
        self.last_frame = now;
        self.record(elapsed);
    }

    /// Account one frame that took `elapsed`.
    pub fn record(&mut self, elapsed: Duration) {
        let frame_time = elapsed.as_secs_f32();
        if frame_time > 0.0 {
            let instant_fps = 1.0 / frame_time;
            self.smoothed_fps = self.smoothed_fps * (1.0 - self.smoothing)
                + instant_fps * self.smoothing;
        }
        self.since_report += elapsed;
        self.frames_since_report += 1;
        self.worst_frame = self.worst_frame.max(elapsed);
    }

    /// Get the current FPS (smoothed)
    pub fn fps(&self) -> f32 {
        self.smoothed_fps
    }

    /// Once at least `interval` of frame time has accumulated, return the
    /// aggregate and start a new interval.
    pub fn take_report(&mut self, interval: Duration) -> Option<FrameReport> {
        if self.frames_since_report == 0 || self.since_report < interval {
            return None;
        }
        let report = FrameReport {
            fps: self.frames_since_report as f32 / self.since_report.as_secs_f32(),
            frames: self.frames_since_report,
            worst_frame: self.worst_frame,
        };
        self.since_report = Duration::ZERO;
        self.frames_since_report = 0;
        self.worst_frame = Duration::ZERO;
        Some(report)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn report_after_interval() {
        let mut timing = FrameTiming::new(0);
        let frame = Duration::from_millis(20);
        for _ in 0..49 {
            timing.record(frame);
        }
        assert!(timing.take_report(Duration::from_secs(1)).is_none());

        timing.record(Duration::from_millis(20));
        let report = timing.take_report(Duration::from_secs(1)).unwrap();
        assert_eq!(report.frames, 50);
        assert!((report.fps - 50.0).abs() < 0.01);
        assert_eq!(report.worst_frame, frame);

        // The next interval starts empty.
        assert!(timing.take_report(Duration::ZERO).is_none());
    }

    #[test]
    fn smoothed_fps_moves_toward_frame_rate() {
        let mut timing = FrameTiming::new(0);
        for _ in 0..500 {
            timing.record(Duration::from_millis(10));
        }
        assert!((timing.fps() - 100.0).abs() < 1.0);
        assert!(timing.should_render());
    }
}
