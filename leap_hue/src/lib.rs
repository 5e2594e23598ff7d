//! # leap_hue
//!
//! LeapMotion palm-position controller for Philips Hue lights.
//!
//! ## Axis → Parameter mapping
//!
//! | Axis | Motion | Parameter | Range |
//! |---|---|---|---|
//! | y | raise / lower the palm | brightness | 0–254 |
//! | x | move left / right | saturation | 0–254 |
//! | z | push / pull | hue | 0–65535 |
//!
//! Lowering the palm to the bottom of the working volume drives brightness
//! to 0, which powers the lights off; raising it powers them back on.  Any
//! axis can be disabled with `--no-bri`, `--no-sat` or `--no-hue`.
//!
//! ## Pipeline
//!
//! sensor frame → [`palm_map::MotionFilter`] (rate limit + jitter gate) →
//! [`palm_map::range`] per-axis mapping → [`lights::LightController`] →
//! bridge.
//!
//! ## Feature flags
//!
//! * (default) — **Simulation mode**: a scripted palm sweep drives the
//!   pipeline, no hardware needed.
//! * `leap` — **Hardware mode**: polls a real LeapMotion controller via
//!   LeapC.
//!
//! A note on names: "Hue" the product and `hue` the color parameter are
//! different things; the parameter is always lowercase `hue` in this crate.

pub mod app;
pub mod lights;
pub mod sensor;
