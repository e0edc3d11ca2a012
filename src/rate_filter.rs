//! The feedback loop filter used inside the INDI rate-control loop.
//!
//! Combines a discrete first-order low-pass filter with a runtime
//! configurable integer sample delay and an actuator slew-rate limiter. All
//! arithmetic is fixed-point: `alpha` is carried as a Q14 (1/16384-scaled)
//! coefficient, matching the numerics of the original flight-code oracle.

use crate::trace;

/// Size of the delay ring buffer, in samples. Also the maximum delay.
pub const BUFFER_SIZE: usize = 32;

/// The control loop sample period, in seconds (the filter runs at 512 Hz).
pub const SAMPLE_PERIOD_HZ: u32 = 512;

/// Fixed-point scale for `alpha`: a Q14 coefficient in `[0, ALPHA_SCALE]`.
const ALPHA_SCALE: i64 = 1 << 14;
const ALPHA_SHIFT: u32 = 14;

/// The discrete first-order low-pass + delay + slew-rate-limited feedback
/// filter from the INDI rate loop.
///
/// See the module documentation for the governing equations. Every operation
/// is total: there is no failure mode, only silent clamping of out-of-range
/// parameters.
#[cfg_attr(feature = "defmt-log", derive(defmt::Format))]
#[derive(Debug, Clone)]
pub struct RateFilter {
    /// Low-pass bandwidth, in rad/s. Always >= 1.
    omega: u32,
    /// Sample delay, in `[0, BUFFER_SIZE - 1]`.
    delay: usize,
    /// Q14 fixed-point low-pass coefficient, derived from `omega`.
    alpha: i64,
    /// Per-step slew-rate limit on the filter output.
    max_inc: i32,
    /// Circular delay line of past filter outputs.
    buffer: [i32; BUFFER_SIZE],
    /// Write cursor into `buffer`, always `< BUFFER_SIZE`.
    idx: usize,
    /// The filter's running state: the last (slew-limited) output.
    y_prev: i32,
}

impl RateFilter {
    /// Create a filter, computing `alpha` from `omega` and clamping `delay`.
    pub fn initialize(omega: u32, delay: usize, max_inc: u32) -> Self {
        let mut f = RateFilter {
            omega: omega.max(1),
            delay: 0,
            alpha: 0,
            max_inc: max_inc as i32,
            buffer: [0; BUFFER_SIZE],
            idx: 0,
            y_prev: 0,
        };
        f.alpha = Self::compute_alpha(f.omega);
        f.set_delay(delay);
        f
    }

    /// Recompute `alpha` for a new bandwidth. Does not reset the buffer or
    /// running state.
    pub fn set_omega(&mut self, omega: u32) {
        trace!("RateFilter: set_omega({})", omega);
        self.omega = omega.max(1);
        self.alpha = Self::compute_alpha(self.omega);
    }

    /// Set the sample delay, clamped to `[0, BUFFER_SIZE - 1]`. Does not
    /// re-shuffle the delay line contents.
    pub fn set_delay(&mut self, delay: usize) {
        trace!("RateFilter: set_delay({})", delay);
        self.delay = delay.min(BUFFER_SIZE - 1);
    }

    /// The currently configured bandwidth.
    pub fn omega(&self) -> u32 {
        self.omega
    }

    /// The currently configured (clamped) delay.
    pub fn delay(&self) -> usize {
        self.delay
    }

    /// Advance the filter by one sample and return the delayed, slew-limited
    /// output.
    pub fn propagate(&mut self, input: i32) -> i32 {
        let y = self.lpf_step(input);
        let y = self.slew_limit(y);
        self.y_prev = y;
        self.buffer[self.idx] = y;
        self.idx = (self.idx + 1) % BUFFER_SIZE;
        let out_idx = Self::wrap(self.idx as isize - self.delay as isize - 1);
        self.buffer[out_idx]
    }

    /// `y[n] = alpha * y[n-1] + (1 - alpha) * u[n]`, in Q14 fixed point,
    /// rounded toward negative infinity (an arithmetic right shift).
    fn lpf_step(&self, input: i32) -> i32 {
        let num = self.alpha * self.y_prev as i64 + (ALPHA_SCALE - self.alpha) * input as i64;
        (num >> ALPHA_SHIFT) as i32
    }

    /// Clamp `|y - y_prev| <= max_inc`.
    fn slew_limit(&self, y: i32) -> i32 {
        let diff = (y - self.y_prev).clamp(-self.max_inc, self.max_inc);
        self.y_prev + diff
    }

    /// `alpha = 1 / (1 + omega * Ts)`, quantized to Q14 by truncation
    /// (flooring), Ts = 1 / 512 s.
    fn compute_alpha(omega: u32) -> i64 {
        let ts = 1.0_f64 / SAMPLE_PERIOD_HZ as f64;
        let alpha = 1.0_f64 / (1.0 + omega as f64 * ts);
        (alpha * ALPHA_SCALE as f64).floor() as i64
    }

    /// Euclidean remainder modulo `BUFFER_SIZE`, for ring indices that may be
    /// transiently negative.
    fn wrap(i: isize) -> usize {
        i.rem_euclid(BUFFER_SIZE as isize) as usize
    }
}
