//! # Frame Clock
//!
//! The simulation's notion of time. Every subsystem reads the frame delta
//! from here instead of from a global.
//!
//! ## Frame Lifecycle
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────┐
//! │                           FRAME N                               │
//! ├─────────────────────────────────────────────────────────────────┤
//! │  1. INPUT        - Driver writes velocities into bodies          │
//! │  2. CLOCK        - advance() / advance_by(dt)                    │
//! │  3. PHYSICS      - Integrate, sweep, resolve, dispatch handlers  │
//! │  4. ANIMATION    - Advance frame timers                          │
//! │  5. EXPIRY       - Destroy entities whose lifetime ran out       │
//! │  6. RENDER       - Driver reads sprites() and debug boxes        │
//! └─────────────────────────────────────────────────────────────────┘
//! ```

use std::time::Duration;

/// Largest delta a single frame may integrate, in seconds.
pub const MAX_DELTA: f32 = 0.25;

/// Wall-clock budget of one frame at 60 FPS.
pub const TARGET_FRAME_TIME: Duration = Duration::from_micros(16_666);

/// Fixed-rate frame clock.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct FrameClock {
    step: f32,
    delta: f32,
    elapsed: f64,
    frame: u64,
}

impl FrameClock {
    /// Creates a clock ticking at `frame_rate` frames per second.
    ///
    /// A zero rate is treated as 1.
    #[must_use]
    pub fn new(frame_rate: u32) -> Self {
        let step = 1.0 / frame_rate.max(1) as f32;
        Self {
            step,
            delta: step,
            elapsed: 0.0,
            frame: 0,
        }
    }

    /// Advances by one fixed step.
    pub fn advance(&mut self) -> f32 {
        self.advance_by(self.step)
    }

    /// Advances by a variable delta, clamped to `[0, MAX_DELTA]`.
    ///
    /// # Returns
    ///
    /// The delta actually applied.
    pub fn advance_by(&mut self, dt: f32) -> f32 {
        let dt = if dt.is_finite() { dt.clamp(0.0, MAX_DELTA) } else { 0.0 };
        self.delta = dt;
        self.elapsed += f64::from(dt);
        self.frame += 1;
        dt
    }

    /// Fixed step length in seconds.
    #[inline]
    #[must_use]
    pub const fn step(&self) -> f32 {
        self.step
    }

    /// Delta of the most recent frame.
    #[inline]
    #[must_use]
    pub const fn delta(&self) -> f32 {
        self.delta
    }

    /// Seconds simulated so far.
    #[inline]
    #[must_use]
    pub const fn elapsed(&self) -> f64 {
        self.elapsed
    }

    /// Frames advanced so far.
    #[inline]
    #[must_use]
    pub const fn frame(&self) -> u64 {
        self.frame
    }
}

impl Default for FrameClock {
    fn default() -> Self {
        Self::new(60)
    }
}

/// Statistics for one simulation tick.
#[derive(Clone, Copy, Debug, Default)]
pub struct FrameStats {
    /// Frame number.
    pub frame: u64,
    /// Delta integrated this frame.
    pub dt: f32,
    /// Physics step time in microseconds.
    pub physics_us: u64,
    /// Animation update time in microseconds.
    pub animation_us: u64,
    /// Lifetime expiry time in microseconds.
    pub expire_us: u64,
    /// Total tick time in microseconds.
    pub total_us: u64,
    /// Live bodies after the tick.
    pub active_bodies: usize,
    /// Live entities after the tick.
    pub active_entities: usize,
    /// Live animation instances after the tick.
    pub active_animations: usize,
}

/// Running totals over many [`FrameStats`].
#[derive(Clone, Debug)]
pub struct FrameStatsAccumulator {
    /// Total frames recorded.
    pub frames_recorded: u64,
    /// Sum of total tick times.
    pub total_us_sum: u64,
    /// Sum of physics times.
    pub physics_us_sum: u64,
    /// Sum of animation times.
    pub animation_us_sum: u64,
    /// Sum of expiry times.
    pub expire_us_sum: u64,
    /// Min tick time.
    pub min_frame_us: u64,
    /// Max tick time.
    pub max_frame_us: u64,
    /// Ticks that exceeded [`TARGET_FRAME_TIME`].
    pub frames_over_budget: u64,
    /// Highest live body count seen.
    pub peak_bodies: usize,
    /// Highest live entity count seen.
    pub peak_entities: usize,
}

impl FrameStatsAccumulator {
    /// Creates an empty accumulator.
    #[must_use]
    pub fn new() -> Self {
        Self {
            frames_recorded: 0,
            total_us_sum: 0,
            physics_us_sum: 0,
            animation_us_sum: 0,
            expire_us_sum: 0,
            min_frame_us: u64::MAX,
            max_frame_us: 0,
            frames_over_budget: 0,
            peak_bodies: 0,
            peak_entities: 0,
        }
    }

    /// Records one tick.
    pub fn record(&mut self, stats: &FrameStats) {
        self.frames_recorded += 1;
        self.total_us_sum += stats.total_us;
        self.physics_us_sum += stats.physics_us;
        self.animation_us_sum += stats.animation_us;
        self.expire_us_sum += stats.expire_us;
        self.min_frame_us = self.min_frame_us.min(stats.total_us);
        self.max_frame_us = self.max_frame_us.max(stats.total_us);
        self.peak_bodies = self.peak_bodies.max(stats.active_bodies);
        self.peak_entities = self.peak_entities.max(stats.active_entities);

        if u128::from(stats.total_us) > TARGET_FRAME_TIME.as_micros() {
            self.frames_over_budget += 1;
        }
    }

    /// Returns average tick time in milliseconds.
    #[must_use]
    pub fn avg_frame_ms(&self) -> f64 {
        self.avg_ms(self.total_us_sum)
    }

    /// Returns the share of ticks over budget.
    #[must_use]
    pub fn over_budget_ratio(&self) -> f64 {
        if self.frames_recorded == 0 {
            return 0.0;
        }
        self.frames_over_budget as f64 / self.frames_recorded as f64
    }

    fn avg_ms(&self, sum_us: u64) -> f64 {
        if self.frames_recorded == 0 {
            return 0.0;
        }
        (sum_us as f64 / self.frames_recorded as f64) / 1000.0
    }

    /// Prints a summary of the statistics.
    pub fn print_summary(&self) {
        let min_us = if self.frames_recorded == 0 { 0 } else { self.min_frame_us };

        println!("╔══════════════════════════════════════════════════════════════════╗");
        println!("║                    TICK STATISTICS SUMMARY                       ║");
        println!("╚══════════════════════════════════════════════════════════════════╝");
        println!();
        println!("┌─ TIMING ─────────────────────────────────────────────────────────┐");
        println!("│ Ticks Recorded:     {}", self.frames_recorded);
        println!("│ Average Tick:       {:.3} ms", self.avg_frame_ms());
        println!("│ Min Tick:           {:.3} ms", min_us as f64 / 1000.0);
        println!("│ Max Tick:           {:.3} ms", self.max_frame_us as f64 / 1000.0);
        println!(
            "│ Over Budget:        {} ticks ({:.1}%)",
            self.frames_over_budget,
            self.over_budget_ratio() * 100.0
        );
        println!("└──────────────────────────────────────────────────────────────────┘");
        println!();
        println!("┌─ BREAKDOWN ──────────────────────────────────────────────────────┐");
        println!("│ Physics:            {:.3} ms", self.avg_ms(self.physics_us_sum));
        println!("│ Animation:          {:.3} ms", self.avg_ms(self.animation_us_sum));
        println!("│ Expiry:             {:.3} ms", self.avg_ms(self.expire_us_sum));
        println!("│ Peak Bodies:        {}", self.peak_bodies);
        println!("│ Peak Entities:      {}", self.peak_entities);
        println!("└──────────────────────────────────────────────────────────────────┘");
    }
}

impl Default for FrameStatsAccumulator {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fixed_step() {
        let mut clock = FrameClock::new(64);
        assert_eq!(clock.step(), 1.0 / 64.0);

        for _ in 0..64 {
            clock.advance();
        }
        assert_eq!(clock.frame(), 64);
        assert!((clock.elapsed() - 1.0).abs() < 1e-9);
    }

    #[test]
    fn test_variable_step_is_clamped() {
        let mut clock = FrameClock::default();
        assert_eq!(clock.advance_by(3.0), MAX_DELTA);
        assert_eq!(clock.advance_by(-1.0), 0.0);
        assert_eq!(clock.advance_by(f32::NAN), 0.0);
        assert_eq!(clock.frame(), 3);
        assert_eq!(clock.delta(), 0.0);
    }

    #[test]
    fn test_accumulator() {
        let mut acc = FrameStatsAccumulator::new();
        assert_eq!(acc.avg_frame_ms(), 0.0);

        acc.record(&FrameStats { total_us: 1_000, active_bodies: 3, ..Default::default() });
        acc.record(&FrameStats { total_us: 20_000, active_bodies: 5, ..Default::default() });

        assert_eq!(acc.frames_recorded, 2);
        assert!((acc.avg_frame_ms() - 10.5).abs() < 1e-9);
        assert_eq!(acc.min_frame_us, 1_000);
        assert_eq!(acc.max_frame_us, 20_000);
        assert_eq!(acc.frames_over_budget, 1);
        assert_eq!(acc.peak_bodies, 5);
    }
}
