//! Palm-position sources — LeapMotion hardware and a scripted simulation.
//!
//! The public interface is [`SensorEvent`] delivered over an `mpsc` channel.
//! Consumers don't need to know whether frames came from real hardware or
//! the sweep simulator.

use std::sync::mpsc::{self, Receiver, Sender};
use std::thread;
use std::time::Duration;

use palm_map::Sample;

// ════════════════════════════════════════════════════════════════════════════
// SensorEvent
// ════════════════════════════════════════════════════════════════════════════

/// An event emitted by a sensor source.
#[derive(Clone, Debug, PartialEq)]
pub enum SensorEvent {
    /// The source finished its own init and will deliver frames.
    Connected,

    /// The device went away; frames stop until the source reports back.
    Disconnected,

    /// One tracking frame: the palm position of every currently tracked
    /// hand, in delivery order.
    Frame(Vec<Sample>),
}

// ════════════════════════════════════════════════════════════════════════════
// SensorSource trait — unified interface for hw and sim
// ════════════════════════════════════════════════════════════════════════════

/// Anything that can deliver [`SensorEvent`]s over a channel.
pub trait SensorSource: Send + 'static {
    fn run(self: Box<Self>, tx: Sender<SensorEvent>);
}

// ════════════════════════════════════════════════════════════════════════════
// Spawn helper
// ════════════════════════════════════════════════════════════════════════════

/// Spawn a sensor source on its own thread and return the receiving end.
///
/// The source exits when the receiver hangs up.
pub fn spawn_sensor_source<S: SensorSource>(source: S) -> Receiver<SensorEvent> {
    let (tx, rx) = mpsc::channel();
    thread::spawn(move || Box::new(source).run(tx));
    rx
}

// ════════════════════════════════════════════════════════════════════════════
// LeapSensorSource — real hardware (feature = "leap")
// ════════════════════════════════════════════════════════════════════════════

/// Sensor source backed by a real LeapMotion controller.
///
/// Requires the `leap` feature flag and the LeapC shared library installed.
/// Each tracking event becomes one [`SensorEvent::Frame`] carrying the palm
/// position of every hand in the frame.
#[cfg(feature = "leap")]
pub struct LeapSensorSource;

#[cfg(feature = "leap")]
impl SensorSource for LeapSensorSource {
    fn run(self: Box<Self>, tx: Sender<SensorEvent>) {
        use leaprs::*;

        let mut connection = Connection::create(ConnectionConfig::default())
            .expect("Failed to open LeapC connection");
        connection.open().expect("Failed to open LeapMotion device");

        let _ = tx.send(SensorEvent::Connected);

        loop {
            let msg = match connection.poll(100) {
                Ok(m)  => m,
                Err(_) => continue,
            };

            match msg.event() {
                Event::Tracking(frame) => {
                    let palms: Vec<Sample> = frame
                        .hands()
                        .map(|h| {
                            let p = h.palm().position();
                            Sample::new(p.x, p.y, p.z)
                        })
                        .collect();
                    if palms.is_empty() {
                        continue;
                    }
                    if tx.send(SensorEvent::Frame(palms)).is_err() {
                        return;
                    }
                }
                Event::Connection(_) => {
                    if tx.send(SensorEvent::Connected).is_err() {
                        return;
                    }
                }
                Event::ConnectionLost(_) => {
                    if tx.send(SensorEvent::Disconnected).is_err() {
                        return;
                    }
                }
                _ => {}
            }
        }
    }
}

// ════════════════════════════════════════════════════════════════════════════
// SweepSensorSource — scripted simulation (always available)
// ════════════════════════════════════════════════════════════════════════════

/// Scripted palm sweep used when no LeapMotion hardware is attached.
///
/// Emits one single-hand frame per tick, moving the palm smoothly through
/// the working volume so every axis exercises its full mapping range.  The
/// three sine periods are mutually irrational-ish so the sweep doesn't
/// settle into a short loop.
pub struct SweepSensorSource {
    /// Frames per second to synthesise.
    pub frame_rate: u32,
    /// Stop after this many frames; `None` runs until the receiver hangs up.
    pub frames: Option<u64>,
}

impl Default for SweepSensorSource {
    fn default() -> Self {
        SweepSensorSource { frame_rate: 60, frames: None }
    }
}

impl SensorSource for SweepSensorSource {
    fn run(self: Box<Self>, tx: Sender<SensorEvent>) {
        let _ = tx.send(SensorEvent::Connected);

        let dt = Duration::from_millis(1000 / self.frame_rate.max(1) as u64);
        let mut t = 0.0_f32;
        let mut sent = 0_u64;

        loop {
            if let Some(limit) = self.frames {
                if sent >= limit {
                    return;
                }
            }

            let x = 200.0 * (t * 0.17).sin();
            let y = 245.0 + 155.0 * (t * 0.25).sin();
            let z = 200.0 * (t * 0.11).cos();

            if tx.send(SensorEvent::Frame(vec![Sample::new(x, y, z)])).is_err() {
                return;
            }
            sent += 1;
            t += dt.as_secs_f32();
            thread::sleep(dt);
        }
    }
}

// ════════════════════════════════════════════════════════════════════════════
// Tests
// ════════════════════════════════════════════════════════════════════════════
