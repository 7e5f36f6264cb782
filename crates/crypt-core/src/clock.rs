//! Simulation time for crypt runs.
//!
//! The clock counts whole timesteps from a start time. The current time is
//! always derived as `start + steps * dt` rather than accumulated, so
//! rounding error does not drift over long runs.

use crypt_cycle::Clock;

/// Errors that can occur during clock operations.
#[derive(Debug, thiserror::Error)]
pub enum ClockError {
    /// Step counter would overflow.
    #[error("step counter overflow: cannot advance beyond u32::MAX")]
    StepOverflow,

    /// The clock was advanced past its final step.
    #[error("simulation already finished after {total_steps} steps")]
    Finished {
        /// Total steps the clock was configured for.
        total_steps: u32,
    },

    /// Invalid time configuration (e.g. a zero timestep).
    #[error("invalid time configuration: {reason}")]
    InvalidConfig {
        /// Explanation of what is wrong with the configuration.
        reason: String,
    },
}

/// Fixed-step simulation clock.
#[derive(Debug, Clone, PartialEq)]
pub struct SimulationTime {
    /// Time at step 0.
    start_time: f64,

    /// Width of one step, in hours.
    dt: f64,

    /// Number of steps in the run.
    total_steps: u32,

    /// Steps taken so far.
    steps: u32,
}

impl SimulationTime {
    /// Create a clock with an explicit timestep and step count.
    ///
    /// # Errors
    ///
    /// Returns [`ClockError::InvalidConfig`] if `dt` is not finite and
    /// positive, or `start_time` is not finite.
    pub fn new(start_time: f64, dt: f64, total_steps: u32) -> Result<Self, ClockError> {
        if !start_time.is_finite() {
            return Err(ClockError::InvalidConfig {
                reason: format!("start time must be finite, got {start_time}"),
            });
        }
        if !(dt.is_finite() && dt > 0.0) {
            return Err(ClockError::InvalidConfig {
                reason: format!("timestep must be finite and positive, got {dt}"),
            });
        }
        Ok(Self {
            start_time,
            dt,
            total_steps,
            steps: 0,
        })
    }

    /// Create a clock running from `start_time` to `end_time` with
    /// `steps_per_hour` steps per hour.
    ///
    /// # Errors
    ///
    /// Returns [`ClockError::InvalidConfig`] if `steps_per_hour` is 0, the
    /// end precedes the start, or the step count does not fit in `u32`.
    pub fn with_end_time(
        start_time: f64,
        end_time: f64,
        steps_per_hour: u32,
    ) -> Result<Self, ClockError> {
        if steps_per_hour == 0 {
            return Err(ClockError::InvalidConfig {
                reason: "steps_per_hour must be at least 1".to_owned(),
            });
        }
        let hours = end_time - start_time;
        if !(hours.is_finite() && hours >= 0.0) {
            return Err(ClockError::InvalidConfig {
                reason: format!("end time {end_time} precedes start time {start_time}"),
            });
        }
        let steps = (hours * f64::from(steps_per_hour)).round();
        if steps > f64::from(u32::MAX) {
            return Err(ClockError::InvalidConfig {
                reason: format!("{steps} steps exceed the step counter"),
            });
        }
        // Range checked above.
        #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
        let total_steps = steps as u32;
        Self::new(start_time, 1.0 / f64::from(steps_per_hour), total_steps)
    }

    /// Advance the clock by one step. Returns the new step number.
    ///
    /// # Errors
    ///
    /// Returns [`ClockError::Finished`] once every configured step has been
    /// taken.
    pub fn advance(&mut self) -> Result<u32, ClockError> {
        if self.is_finished() {
            return Err(ClockError::Finished {
                total_steps: self.total_steps,
            });
        }
        self.steps = self.steps.checked_add(1).ok_or(ClockError::StepOverflow)?;
        Ok(self.steps)
    }

    /// Whether every configured step has been taken.
    pub const fn is_finished(&self) -> bool {
        self.steps >= self.total_steps
    }

    /// Current simulation time.
    pub fn time(&self) -> f64 {
        self.start_time + f64::from(self.steps) * self.dt
    }

    /// Steps taken so far.
    pub const fn steps(&self) -> u32 {
        self.steps
    }

    /// Number of steps in the run.
    pub const fn total_steps(&self) -> u32 {
        self.total_steps
    }

    /// Time at step 0.
    pub const fn start_time(&self) -> f64 {
        self.start_time
    }

    /// Time at the final step.
    pub fn end_time(&self) -> f64 {
        self.start_time + f64::from(self.total_steps) * self.dt
    }
}

impl Clock for SimulationTime {
    fn now(&self) -> f64 {
        self.time()
    }

    fn timestep(&self) -> f64 {
        self.dt
    }
}
