//! Hue bridge control — power state and color parameter writes.
//!
//! The network protocol (pairing, CLIP over HTTP) lives in `huelib`; this
//! module decides WHICH lights get written and in what order.  The bridge is
//! reached through the narrow [`LightApi`] trait so tests can substitute a
//! recording fake for the real client.

use std::collections::HashMap;
use std::net::IpAddr;

use thiserror::Error;
use tracing::{debug, info, warn};

// ════════════════════════════════════════════════════════════════════════════
// LightError
// ════════════════════════════════════════════════════════════════════════════

/// Errors raised while talking to the bridge.
#[derive(Debug, Error)]
pub enum LightError {
    /// Pairing/handshake with the bridge failed.
    #[error("bridge pairing failed: {0}")]
    Pairing(String),

    /// A read of the bridge's light inventory failed.
    #[error("bridge query failed: {0}")]
    Query(String),

    /// A state write to one or more lights failed.
    #[error("light command failed: {0}")]
    Command(String),
}

// ════════════════════════════════════════════════════════════════════════════
// LightApi — abstraction over huelib / recording fake (for testing)
// ════════════════════════════════════════════════════════════════════════════

/// Descriptor for one light as the bridge reports it.
#[derive(Clone, Debug, PartialEq)]
pub struct LightInfo {
    pub id:   String,
    pub name: String,
    pub on:   bool,
}

/// One batched write applied to a set of lights.
///
/// Unset fields are left untouched on the light.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct StateUpdate {
    pub on:         Option<bool>,
    pub brightness: Option<u8>,
    pub saturation: Option<u8>,
    pub hue:        Option<u16>,
}

impl StateUpdate {
    pub fn power(on: bool) -> Self {
        StateUpdate { on: Some(on), ..Default::default() }
    }
    pub fn brightness(v: u8) -> Self {
        StateUpdate { brightness: Some(v), ..Default::default() }
    }
    pub fn saturation(v: u8) -> Self {
        StateUpdate { saturation: Some(v), ..Default::default() }
    }
    pub fn hue(v: u16) -> Self {
        StateUpdate { hue: Some(v), ..Default::default() }
    }
}

/// Anything that can enumerate lights and apply batched state writes.
pub trait LightApi: Send {
    /// Fresh inventory of every light the bridge knows.
    fn all_lights(&self) -> Result<Vec<LightInfo>, LightError>;

    /// Apply `update` to every id in `ids` as one batched write.
    fn set_state(&mut self, ids: &[String], update: &StateUpdate) -> Result<(), LightError>;
}

// ── huelib backend ────────────────────────────────────────────────────────

/// [`LightApi`] backed by a real Hue bridge via `huelib`.
pub struct HueApi {
    bridge: huelib::bridge::Bridge,
}

impl HueApi {
    /// Pair with the bridge at `addr`.
    ///
    /// The username comes from the `HUE_USERNAME` environment variable when
    /// set; otherwise a new user is registered, which requires the bridge's
    /// link button to have been pressed within the last 30 seconds.
    pub fn connect(addr: IpAddr) -> Result<Self, LightError> {
        let username = match std::env::var("HUE_USERNAME") {
            Ok(u) if !u.trim().is_empty() => u.trim().to_string(),
            _ => {
                info!("no HUE_USERNAME set — registering a new bridge user");
                println!("  Press the link button on the bridge, then hit Enter…");
                let mut line = String::new();
                std::io::stdin().read_line(&mut line).ok();
                huelib::bridge::register_user(addr, "leap_hue")
                    .map_err(|e| LightError::Pairing(e.to_string()))?
            }
        };
        info!(%addr, "paired with Hue bridge");
        Ok(HueApi { bridge: huelib::bridge::Bridge::new(addr, username) })
    }
}

impl LightApi for HueApi {
    fn all_lights(&self) -> Result<Vec<LightInfo>, LightError> {
        let lights = self
            .bridge
            .get_all_lights()
            .map_err(|e| LightError::Query(e.to_string()))?;
        Ok(lights
            .into_iter()
            .map(|l| LightInfo {
                id:   l.id,
                name: l.name,
                on:   l.state.on.unwrap_or(false),
            })
            .collect())
    }

    fn set_state(&mut self, ids: &[String], update: &StateUpdate) -> Result<(), LightError> {
        use huelib::resource::{light, Adjust};

        let mut modifier = light::StateModifier::new();
        if let Some(on) = update.on {
            modifier = modifier.with_on(on);
        }
        if let Some(bri) = update.brightness {
            modifier = modifier.with_brightness(Adjust::Override(bri));
        }
        if let Some(sat) = update.saturation {
            modifier = modifier.with_saturation(Adjust::Override(sat));
        }
        if let Some(hue) = update.hue {
            modifier = modifier.with_hue(Adjust::Override(hue));
        }

        // The CLIP API has no multi-light state endpoint, so the batch fans
        // out into one PUT per light here.
        for id in ids {
            self.bridge
                .set_light_state(id.clone(), &modifier)
                .map_err(|e| LightError::Command(format!("light {}: {}", id, e)))?;
        }
        Ok(())
    }
}

// ════════════════════════════════════════════════════════════════════════════
// LightController
// ════════════════════════════════════════════════════════════════════════════

/// Owns the set of target lights and issues idempotent writes to the bridge.
///
/// Values arriving here are already clamped by the range mapper; every call
/// is an at-least-once write with no last-sent cache, so identical
/// consecutive values are retransmitted.
pub struct LightController<A: LightApi> {
    api:         A,
    targets:     Vec<String>,
    descriptors: HashMap<String, LightInfo>,
}

impl<A: LightApi> LightController<A> {
    /// Resolve the requested lights against the bridge's inventory.
    ///
    /// An empty `requested` list selects every light the bridge reports.
    /// Requested entries match a light's id or name; anything unmatched is
    /// passed through verbatim as an id, with a warning.
    pub fn connect(api: A, requested: &[String]) -> Result<Self, LightError> {
        let lights = api.all_lights()?;
        let descriptors: HashMap<String, LightInfo> =
            lights.iter().map(|l| (l.id.clone(), l.clone())).collect();

        let targets: Vec<String> = if requested.is_empty() {
            let mut ids: Vec<String> = lights.iter().map(|l| l.id.clone()).collect();
            ids.sort();
            ids
        } else {
            requested
                .iter()
                .map(|want| {
                    lights
                        .iter()
                        .find(|l| l.id == *want || l.name == *want)
                        .map(|l| l.id.clone())
                        .unwrap_or_else(|| {
                            warn!("light `{}` not reported by the bridge — using it as a raw id", want);
                            want.clone()
                        })
                })
                .collect()
        };

        for id in &targets {
            match descriptors.get(id) {
                Some(l) => info!("controlling light {} ({})", l.id, l.name),
                None => info!("controlling light {}", id),
            }
        }

        Ok(LightController { api, targets, descriptors })
    }

    pub fn targets(&self) -> &[String] {
        &self.targets
    }

    pub fn descriptor(&self, id: &str) -> Option<&LightInfo> {
        self.descriptors.get(id)
    }

    /// Set brightness on all targets.
    ///
    /// Zero means "off": the targets are powered down and nothing else is
    /// sent.  Non-zero first powers on exactly the targets currently
    /// reporting off, then issues one batched brightness write.
    pub fn set_brightness(&mut self, value: u8) -> Result<(), LightError> {
        if value == 0 {
            debug!("brightness 0 — powering off {} light(s)", self.targets.len());
            return self.api.set_state(&self.targets, &StateUpdate::power(false));
        }

        let off: Vec<String> = self
            .api
            .all_lights()?
            .into_iter()
            .filter(|l| !l.on && self.targets.contains(&l.id))
            .map(|l| l.id)
            .collect();
        if !off.is_empty() {
            debug!("powering on {} light(s)", off.len());
            self.api.set_state(&off, &StateUpdate::power(true))?;
        }

        debug!("brightness → {}", value);
        self.api.set_state(&self.targets, &StateUpdate::brightness(value))
    }

    /// Set saturation on all targets.  No power-state side effect.
    pub fn set_saturation(&mut self, value: u8) -> Result<(), LightError> {
        debug!("saturation → {}", value);
        self.api.set_state(&self.targets, &StateUpdate::saturation(value))
    }

    /// Set hue on all targets.  No power-state side effect.
    pub fn set_hue(&mut self, value: u16) -> Result<(), LightError> {
        debug!("hue → {}", value);
        self.api.set_state(&self.targets, &StateUpdate::hue(value))
    }
}

// ════════════════════════════════════════════════════════════════════════════
// Test fake — shared with the wiring tests in app.rs
// ════════════════════════════════════════════════════════════════════════════

#[cfg(test)]
pub(crate) mod fake {
    use super::*;
    use std::sync::{Arc, Mutex};

    /// Records every batched write; the light inventory is fixed at
    /// construction except that power writes update the `on` flags.
    pub(crate) struct FakeApi {
        lights:    Arc<Mutex<Vec<LightInfo>>>,
        pub calls: Arc<Mutex<Vec<(Vec<String>, StateUpdate)>>>,
    }

    impl FakeApi {
        pub fn new(lights: Vec<LightInfo>) -> Self {
            FakeApi {
                lights: Arc::new(Mutex::new(lights)),
                calls:  Arc::new(Mutex::new(Vec::new())),
            }
        }

        pub fn call_log(&self) -> Arc<Mutex<Vec<(Vec<String>, StateUpdate)>>> {
            Arc::clone(&self.calls)
        }
    }

    impl LightApi for FakeApi {
        fn all_lights(&self) -> Result<Vec<LightInfo>, LightError> {
            Ok(self.lights.lock().unwrap().clone())
        }

        fn set_state(&mut self, ids: &[String], update: &StateUpdate) -> Result<(), LightError> {
            self.calls.lock().unwrap().push((ids.to_vec(), *update));
            if let Some(on) = update.on {
                for l in self.lights.lock().unwrap().iter_mut() {
                    if ids.contains(&l.id) {
                        l.on = on;
                    }
                }
            }
            Ok(())
        }
    }

    pub fn light(id: &str, name: &str, on: bool) -> LightInfo {
        LightInfo { id: id.to_string(), name: name.to_string(), on }
    }
}

// ════════════════════════════════════════════════════════════════════════════
// Tests
// ════════════════════════════════════════════════════════════════════════════

#[cfg(test)]
mod tests {
    use super::fake::{light, FakeApi};
    use super::*;

    fn two_light_api(on: bool) -> FakeApi {
        FakeApi::new(vec![light("1", "Desk", on), light("2", "Shelf", on)])
    }

    #[test]
    fn empty_request_selects_every_light() {
        let ctl = LightController::connect(two_light_api(true), &[]).unwrap();
        assert_eq!(ctl.targets(), ["1".to_string(), "2".to_string()]);
    }

    #[test]
    fn targets_resolve_by_name_or_id() {
        let ctl =
            LightController::connect(two_light_api(true), &["Shelf".into(), "1".into()]).unwrap();
        assert_eq!(ctl.targets(), ["2".to_string(), "1".to_string()]);
    }

    #[test]
    fn unknown_target_passes_through_verbatim() {
        let ctl = LightController::connect(two_light_api(true), &["Attic".into()]).unwrap();
        assert_eq!(ctl.targets(), ["Attic".to_string()]);
        assert!(ctl.descriptor("Attic").is_none());
    }

    #[test]
    fn brightness_zero_is_power_off_only() {
        let api = two_light_api(true);
        let calls = api.call_log();
        let mut ctl = LightController::connect(api, &[]).unwrap();

        ctl.set_brightness(0).unwrap();

        let calls = calls.lock().unwrap();
        assert_eq!(calls.len(), 1);
        assert_eq!(calls[0].0, ["1".to_string(), "2".to_string()]);
        assert_eq!(calls[0].1, StateUpdate::power(false));
    }

    #[test]
    fn brightness_powers_on_only_the_off_lights() {
        let api = FakeApi::new(vec![light("1", "Desk", false), light("2", "Shelf", true)]);
        let calls = api.call_log();
        let mut ctl = LightController::connect(api, &[]).unwrap();

        ctl.set_brightness(200).unwrap();

        let calls = calls.lock().unwrap();
        assert_eq!(calls.len(), 2);
        // Power-on reaches only light 1…
        assert_eq!(calls[0].0, ["1".to_string()]);
        assert_eq!(calls[0].1, StateUpdate::power(true));
        // …then one batched brightness write reaches both.
        assert_eq!(calls[1].0, ["1".to_string(), "2".to_string()]);
        assert_eq!(calls[1].1, StateUpdate::brightness(200));
    }

    #[test]
    fn brightness_skips_power_call_when_all_on() {
        let api = two_light_api(true);
        let calls = api.call_log();
        let mut ctl = LightController::connect(api, &[]).unwrap();

        ctl.set_brightness(10).unwrap();

        let calls = calls.lock().unwrap();
        assert_eq!(calls.len(), 1);
        assert_eq!(calls[0].1, StateUpdate::brightness(10));
    }

    #[test]
    fn saturation_and_hue_touch_no_power_state() {
        let api = two_light_api(false);
        let calls = api.call_log();
        let mut ctl = LightController::connect(api, &[]).unwrap();

        ctl.set_saturation(127).unwrap();
        ctl.set_hue(40_000).unwrap();

        let calls = calls.lock().unwrap();
        assert_eq!(calls.len(), 2);
        assert_eq!(calls[0].1, StateUpdate::saturation(127));
        assert_eq!(calls[1].1, StateUpdate::hue(40_000));
        assert!(calls.iter().all(|(_, u)| u.on.is_none()));
    }

    #[test]
    fn identical_values_are_retransmitted() {
        let api = two_light_api(true);
        let calls = api.call_log();
        let mut ctl = LightController::connect(api, &[]).unwrap();

        ctl.set_saturation(99).unwrap();
        ctl.set_saturation(99).unwrap();

        assert_eq!(calls.lock().unwrap().len(), 2);
    }
}
