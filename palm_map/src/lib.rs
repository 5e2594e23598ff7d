//! # palm_map
//!
//! The pure half of the palm-position light controller: everything that can
//! be computed without touching a sensor or a network.
//!
//! * [`range`] — clamped linear interpolation of one sensed axis into one
//!   light parameter, plus the fixed per-axis constants:
//!
//!   | Axis | Sensed range (mm) | Parameter | Output range |
//!   |---|---|---|---|
//!   | y (height)  | 90 … 400   | brightness | 0 … 254   |
//!   | x (lateral) | −200 … 200 | saturation | 0 … 254   |
//!   | z (depth)   | −200 … 200 | hue        | 0 … 65535 |
//!
//! * [`filter`] — rate limiting and jitter rejection of raw palm samples, so
//!   the downstream bridge sees a trickle of stable values instead of the
//!   sensor's full frame rate.

pub mod filter;
pub mod range;

pub use filter::{MotionFilter, Sample};
pub use range::MappingRange;
