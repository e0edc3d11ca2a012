//! Interpreting a raw RC stick/switch input as the logger's on/off switch.
//!
//! The control loop elsewhere in the system represents stick and switch
//! positions as signed values scaled to [`MAX_PPRZ`]. This module owns only
//! the one bit [`SdLogger`](crate::sdlogger::SdLogger) needs: whether the
//! logging switch currently reads ON.

/// Full-scale value for a normalized control input, matching the scale used
/// throughout the rest of the autopilot's control stack.
pub const MAX_PPRZ: i32 = 9600;

/// Whether a raw switch/stick reading should be interpreted as ON. No
/// hysteresis: any positive value is ON.
pub fn switch_is_on(value: i32) -> bool {
    value > 0
}
