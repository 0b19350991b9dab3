//! Fixed-timestep accumulator for the host loop.
//!
//! Game logic speaks milliseconds (the level's `elapsed`/`delta` pair and the
//! scheduler share that unit), so the accumulator does too. The host feeds
//! each frame's duration to `advance()`.

pub struct TimeState {
    pub fixed_dt_ms: f64,
    pub max_accumulator_ms: f64,
    accumulator_ms: f64,
    pub total_time_ms: f64,
    pub fixed_step_count: u64,
    pub frame_count: u64,
    pub steps_this_frame: u32,
    pub real_dt_ms: f64,
}

impl TimeState {
    pub fn new(fixed_dt_ms: f64) -> Self {
        Self {
            fixed_dt_ms,
            max_accumulator_ms: 250.0,
            accumulator_ms: 0.0,
            total_time_ms: 0.0,
            fixed_step_count: 0,
            frame_count: 0,
            steps_this_frame: 0,
            real_dt_ms: 0.0,
        }
    }

    /// Feed one frame's duration.
    pub fn advance(&mut self, real_dt_ms: f64) {
        self.real_dt_ms = real_dt_ms.max(0.0);

        // Spiral-of-death cap
        if self.real_dt_ms > self.max_accumulator_ms {
            log::warn!(
                "Frame took {:.1}ms, capping accumulator to {}ms",
                self.real_dt_ms,
                self.max_accumulator_ms
            );
            self.real_dt_ms = self.max_accumulator_ms;
        }

        self.accumulator_ms += self.real_dt_ms;
        self.steps_this_frame = 0;
        self.frame_count += 1;
    }

    pub fn should_step(&mut self) -> bool {
        // Tolerate float error so a frame of exactly `fixed_dt_ms` always steps.
        if self.accumulator_ms + 1e-9 >= self.fixed_dt_ms {
            self.accumulator_ms = (self.accumulator_ms - self.fixed_dt_ms).max(0.0);
            self.total_time_ms += self.fixed_dt_ms;
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
        Self::new(1000.0 / 60.0)
    }
}
