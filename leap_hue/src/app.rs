//! Event wiring — route filtered palm samples into light commands.
//!
//! `Pipeline` owns the `MotionFilter` and the `LightController` and consumes
//! `SensorEvent`s; `run()` connects the bridge, spawns the sensor source and
//! the pipeline thread, and then blocks on stdin until the user presses
//! Enter.

use std::io;
use std::net::IpAddr;
use std::thread;

use tracing::{debug, info, warn};

use palm_map::filter::{MotionFilter, DEFAULT_BUFFER_SIZE, DEFAULT_MAX_JUMP};
use palm_map::range;
use palm_map::Sample;

use crate::lights::{HueApi, LightApi, LightController, LightError};
use crate::sensor::{spawn_sensor_source, SensorEvent};

// ════════════════════════════════════════════════════════════════════════════
// AppConfig
// ════════════════════════════════════════════════════════════════════════════

/// Configuration for the full application, built once from the CLI.
#[derive(Clone, Debug)]
pub struct AppConfig {
    /// Address of the Hue bridge.
    pub bridge_addr: IpAddr,
    /// Lights to control, by bridge id or name.  Empty = all lights the
    /// bridge reports at connect time.
    pub lights: Vec<String>,
    /// Axis-enable flags; each can be switched off independently.
    pub bri: bool,
    pub sat: bool,
    pub hue: bool,
    /// Frames swallowed between filter evaluations.
    pub buffer_size: u32,
    /// Jitter threshold in millimetres.
    pub max_jump: f32,
}

impl AppConfig {
    pub fn new(bridge_addr: IpAddr) -> Self {
        AppConfig {
            bridge_addr,
            lights: Vec::new(),
            bri: true,
            sat: true,
            hue: true,
            buffer_size: DEFAULT_BUFFER_SIZE,
            max_jump: DEFAULT_MAX_JUMP,
        }
    }
}

/// Split a `-l/--lightbulb` argument on commas.
///
/// Empty segments are dropped; if nothing survives the split, the raw string
/// itself is treated as a single light identifier.
pub fn parse_light_list(raw: &str) -> Vec<String> {
    let parts: Vec<String> = raw
        .split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .collect();
    if parts.is_empty() {
        vec![raw.to_string()]
    } else {
        parts
    }
}

// ════════════════════════════════════════════════════════════════════════════
// Pipeline
// ════════════════════════════════════════════════════════════════════════════

/// Per-frame processing: filter → per-axis map → controller.
///
/// All hands in a frame pass through the one shared filter, last write
/// winning, as the original behaved.
pub struct Pipeline<A: LightApi> {
    controller: LightController<A>,
    filter:     MotionFilter,
    bri:        bool,
    sat:        bool,
    hue:        bool,
}

impl<A: LightApi> Pipeline<A> {
    pub fn new(controller: LightController<A>, cfg: &AppConfig) -> Self {
        Pipeline {
            controller,
            filter: MotionFilter::new(cfg.buffer_size, cfg.max_jump),
            bri: cfg.bri,
            sat: cfg.sat,
            hue: cfg.hue,
        }
    }

    pub fn handle_event(&mut self, event: SensorEvent) {
        match event {
            SensorEvent::Connected    => info!("sensor connected"),
            SensorEvent::Disconnected => warn!("sensor disconnected"),
            SensorEvent::Frame(palms) => {
                for palm in palms {
                    self.handle_palm(palm);
                }
            }
        }
    }

    fn handle_palm(&mut self, palm: Sample) {
        let Some(sample) = self.filter.offer(palm) else {
            return;
        };
        debug!(
            "palm accepted at ({:.1}, {:.1}, {:.1})",
            sample.x, sample.y, sample.z
        );

        if self.sat {
            let v = range::SATURATION.map(sample.x) as u8;
            if let Err(e) = self.controller.set_saturation(v) {
                warn!("saturation write failed: {}", e);
            }
        }
        if self.bri {
            let v = range::BRIGHTNESS.map(sample.y) as u8;
            if let Err(e) = self.controller.set_brightness(v) {
                warn!("brightness write failed: {}", e);
            }
        }
        if self.hue {
            let v = range::HUE.map(sample.z) as u16;
            if let Err(e) = self.controller.set_hue(v) {
                warn!("hue write failed: {}", e);
            }
        }
    }
}

// ════════════════════════════════════════════════════════════════════════════
// run() — the main application loop
// ════════════════════════════════════════════════════════════════════════════

/// Run the full application.
///
/// Connects the bridge (fatal on failure), spawns the sensor source
/// (simulation by default, hardware with `--features leap`) and the pipeline
/// thread, then blocks reading a line from stdin as the sole shutdown
/// trigger.  Returning ends the process and with it the worker threads —
/// the subscription teardown the original performed on exit.
pub fn run(cfg: AppConfig) -> Result<(), LightError> {
    println!("  Connecting to Hue bridge at {} …", cfg.bridge_addr);
    let api = HueApi::connect(cfg.bridge_addr)?;
    let controller = LightController::connect(api, &cfg.lights)?;
    println!("  Controlling {} light(s).", controller.targets().len());

    #[cfg(feature = "leap")]
    let rx = spawn_sensor_source(crate::sensor::LeapSensorSource);
    #[cfg(not(feature = "leap"))]
    let rx = spawn_sensor_source(crate::sensor::SweepSensorSource::default());

    let mut pipeline = Pipeline::new(controller, &cfg);
    thread::spawn(move || {
        for event in rx {
            pipeline.handle_event(event);
        }
    });

    println!("  Press Enter to quit…");
    let mut line = String::new();
    io::stdin().read_line(&mut line).ok();
    info!("shutting down");
    Ok(())
}

// ════════════════════════════════════════════════════════════════════════════
// Tests
// ════════════════════════════════════════════════════════════════════════════
