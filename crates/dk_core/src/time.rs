//! Fixed-timestep clock. Wall-clock time feeds an accumulator that is drained
//! in whole `fixed_dt_us` slices, so simulation advances identically no matter
//! how fast frames are presented. All bookkeeping is integer microseconds.

use std::time::Instant;

pub const DEFAULT_FIXED_DT_US: u64 = 16_667;
const MAX_ACCUMULATOR_US: u64 = 250_000;
const FPS_SMOOTHING: f64 = 0.05;

pub struct TimeState {
    pub fixed_dt_us: u64,
    accumulator_us: u64,
    pub total_time_us: u64,
    pub fixed_step_count: u64,
    pub frame_count: u64,
    pub steps_this_frame: u32,
    last_instant: Instant,
    pub smoothed_fps: f64,
}

impl TimeState {
    pub fn new() -> Self {
        Self::with_fixed_dt(DEFAULT_FIXED_DT_US)
    }

    pub fn with_fixed_dt(fixed_dt_us: u64) -> Self {
        Self {
            fixed_dt_us: fixed_dt_us.max(1),
            accumulator_us: 0,
            total_time_us: 0,
            fixed_step_count: 0,
            frame_count: 0,
            steps_this_frame: 0,
            last_instant: Instant::now(),
            smoothed_fps: 60.0,
        }
    }

    pub fn fixed_dt_secs(&self) -> f32 {
        self.fixed_dt_us as f32 / 1_000_000.0
    }

    /// Measures the wall-clock delta since the previous frame and feeds it in.
    pub fn begin_frame(&mut self) {
        let now = Instant::now();
        let real_dt_us = now.duration_since(self.last_instant).as_micros() as u64;
        self.last_instant = now;
        self.advance(real_dt_us);
    }

    /// Feeds an explicit frame delta. `begin_frame` uses this; tests call it
    /// directly to stay independent of the wall clock.
    pub fn advance(&mut self, real_dt_us: u64) {
        let mut real_dt_us = real_dt_us;
        // Spiral-of-death cap
        if real_dt_us > MAX_ACCUMULATOR_US {
            log::warn!(
                "Frame took {:.1}ms, capping to {}ms",
                real_dt_us as f64 / 1000.0,
                MAX_ACCUMULATOR_US / 1000
            );
            real_dt_us = MAX_ACCUMULATOR_US;
        }

        self.accumulator_us += real_dt_us;
        self.steps_this_frame = 0;
        self.frame_count += 1;

        if real_dt_us > 0 {
            let fps = 1_000_000.0 / real_dt_us as f64;
            self.smoothed_fps += (fps - self.smoothed_fps) * FPS_SMOOTHING;
        }
    }

    pub fn should_step(&mut self) -> bool {
        if self.accumulator_us >= self.fixed_dt_us {
            self.accumulator_us -= self.fixed_dt_us;
            self.total_time_us += self.fixed_dt_us;
            self.fixed_step_count += 1;
            self.steps_this_frame += 1;
            true
        } else {
            false
        }
    }
}

impl Default for TimeState {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn drain(time: &mut TimeState) -> u32 {
        let mut steps = 0;
        while time.should_step() {
            steps += 1;
        }
        steps
    }

    #[test]
    fn short_frame_produces_no_step() {
        let mut time = TimeState::with_fixed_dt(10_000);
        time.advance(4_000);
        assert_eq!(drain(&mut time), 0);
        assert_eq!(time.steps_this_frame, 0);
    }

    #[test]
    fn leftover_time_carries_into_next_frame() {
        let mut time = TimeState::with_fixed_dt(10_000);
        time.advance(15_000);
        assert_eq!(drain(&mut time), 1);
        time.advance(5_000);
        assert_eq!(drain(&mut time), 1);
        assert_eq!(time.fixed_step_count, 2);
        assert_eq!(time.total_time_us, 20_000);
    }

    #[test]
    fn long_frame_is_capped() {
        let mut time = TimeState::with_fixed_dt(10_000);
        time.advance(5_000_000);
        assert_eq!(drain(&mut time), (MAX_ACCUMULATOR_US / 10_000) as u32);
    }

    #[test]
    fn fixed_dt_secs_matches_micros() {
        let time = TimeState::with_fixed_dt(20_000);
        assert!((time.fixed_dt_secs() - 0.02).abs() < 1e-6);
    }
}
