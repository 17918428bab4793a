//! PID engine
//!
//! Works on errors normalised to the sensor span, so gains are independent
//! of amplifier gain. Output is a burst-fire ratio in `[0, 1]`.
//!
//! - The derivative acts on a first-order low-pass filtered error.
//! - The integral uses back-calculation anti-windup with unit gain and is
//!   clamped so that `ki * integral` stays within the output range.
//! - A zero gain disables its term entirely.

/// Lower output bound
pub const OUTPUT_MIN: f32 = 0.0;

/// Upper output bound
pub const OUTPUT_MAX: f32 = 1.0;

/// Shortest sample interval that produces an update (s)
pub const MIN_DT_S: f32 = 0.001;

/// Back-calculation gain of the anti-windup loop
const ANTI_WINDUP_GAIN: f32 = 1.0;

/// PID tuning
#[derive(Debug, Clone, Copy, PartialEq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct PidGains {
    /// Proportional gain
    pub kp: f32,
    /// Integral gain (1/s)
    pub ki: f32,
    /// Derivative gain (s)
    pub kd: f32,
    /// Derivative filter time constant (s), 0 disables the filter
    pub derivative_tau_s: f32,
}

impl PidGains {
    /// All gains zero
    pub const fn zeroed() -> Self {
        Self {
            kp: 0.0,
            ki: 0.0,
            kd: 0.0,
            derivative_tau_s: 0.0,
        }
    }
}

/// Volatile controller state
#[derive(Debug, Clone, Copy, PartialEq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct PidState {
    /// Integral accumulator (error × s)
    integral: f32,
    /// Previous (filtered) error for the derivative
    previous_error: f32,
    /// Last saturated output
    output: f32,
}

impl PidState {
    /// Fresh controller state
    pub const fn new() -> Self {
        Self {
            integral: 0.0,
            previous_error: 0.0,
            output: 0.0,
        }
    }

    /// Reset the controller
    ///
    /// The derivative memory is seeded with the current error so the first
    /// update after a reset does not see a derivative kick.
    pub fn reset(&mut self, error: f32) {
        self.integral = 0.0;
        self.previous_error = error;
        self.output = 0.0;
    }

    /// Last output ratio
    pub fn output(&self) -> f32 {
        self.output
    }

    /// Integral accumulator
    pub fn integral(&self) -> f32 {
        self.integral
    }

    /// Run one controller update
    ///
    /// # Arguments
    /// - `gains`: current tuning
    /// - `error`: normalised setpoint minus normalised measurement
    /// - `dt`: seconds since the previous sample
    ///
    /// Returns the new output, or `None` if `dt` is shorter than
    /// [`MIN_DT_S`] and the state was left untouched.
    pub fn compute(&mut self, gains: &PidGains, error: f32, dt: f32) -> Option<f32> {
        if !(dt >= MIN_DT_S) {
            return None;
        }

        let p_term = gains.kp * error;

        let mut d_term = 0.0;
        if gains.kd > 0.0 {
            let current = if gains.derivative_tau_s > 0.0 {
                let alpha = dt / (gains.derivative_tau_s + dt);
                alpha * error + (1.0 - alpha) * self.previous_error
            } else {
                error
            };
            let derivative = (current - self.previous_error) / dt;
            self.previous_error = current;
            d_term = gains.kd * derivative;
        }

        let mut i_term = 0.0;
        if gains.ki > 0.0 {
            let unconstrained = p_term + gains.ki * self.integral + d_term;
            let correction = self.output - unconstrained;
            self.integral += (error + ANTI_WINDUP_GAIN * correction) * dt;
            self.integral = self
                .integral
                .clamp(OUTPUT_MIN / gains.ki, OUTPUT_MAX / gains.ki);
            i_term = gains.ki * self.integral;
        }

        let control = p_term + i_term + d_term;
        self.output = if control.is_nan() {
            OUTPUT_MIN
        } else {
            control.clamp(OUTPUT_MIN, OUTPUT_MAX)
        };
        Some(self.output)
    }
}
