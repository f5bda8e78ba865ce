//! Light control façade.
//!
//! [`LightController`] is the single entry point for changing LED output. Each
//! operation combines the transition engine with persistence and a status
//! report to the network. Local state changes are applied even when the storage
//! write or the status message fails; both are only logged.

use crate::config::NodeConfig;
use crate::engine::TransitionEngine;
use crate::fader::{ChannelFader, LedChannels};
use crate::network::{self, Transport};
use crate::storage::LevelStore;
use crate::types::{ChannelGroup, Level, SwitchingSource, Transition};
use core::fmt::Debug;
use embedded_storage::Storage;

/// Owns the engine, the level store and the transport.
///
/// Construct exactly once at start-up and keep it for the lifetime of the
/// program; every method must be called from the same control loop.
///
/// # Type Parameters
/// * `F` - Channel fader implementation type
/// * `S` - Non-volatile storage driver
/// * `N` - Mesh transport
pub struct LightController<F: ChannelFader, S: Storage, N: Transport> {
    engine: TransitionEngine<F>,
    store: LevelStore<S>,
    transport: N,
    sensors: [u8; ChannelGroup::COUNT],
    fade_time_ms: u32,
}

impl<F, S, N> LightController<F, S, N>
where
    F: ChannelFader,
    S: Storage,
    S::Error: Debug,
    N: Transport,
{
    pub fn new(channels: LedChannels<F>, store: LevelStore<S>, transport: N, config: &NodeConfig) -> Self {
        Self {
            engine: TransitionEngine::new(channels),
            store,
            transport,
            sensors: [config.color_sensor_id, config.white_sensor_id],
            fade_time_ms: config.fade_time_ms,
        }
    }

    /// Restores persisted levels and switches every group off.
    pub fn boot(&mut self) {
        if let Err(err) = self.store.load() {
            log::error!("Failed to load stored levels: {}", err);
        }
        for group in ChannelGroup::ALL {
            self.switch_off(group);
        }
    }

    /// Stops `group`'s transition, remembers `level` for `source` and fades to it.
    pub fn set_limit(&mut self, group: ChannelGroup, level: Level, source: SwitchingSource) {
        self.engine.start_transition(group, false);

        if let Err(err) = self.store.save(group, source, level) {
            log::error!("Failed to persist {:?} level for {:?}: {}", group, source, err);
        }
        self.engine.fade_to(group, level, self.fade_time_ms);
        self.report(group, true);
    }

    /// Stores and starts `transition` for `group`.
    pub fn begin_transition(&mut self, group: ChannelGroup, transition: Transition) {
        self.engine.set_transition(group, transition);
        self.engine.start_transition(group, true);
        self.report(group, true);
    }

    /// Stops `group`'s transition and fades it to zero.
    pub fn switch_off(&mut self, group: ChannelGroup) {
        self.engine.start_transition(group, false);
        self.engine.fade_to(group, Level::OFF, self.fade_time_ms);
        self.report(group, false);
    }

    /// Stops `group`'s transition and fades it to the level remembered for `source`.
    pub fn switch_on(&mut self, group: ChannelGroup, source: SwitchingSource) {
        self.engine.start_transition(group, false);
        let level = self.store.level(source);
        self.engine.fade_to(group, level, self.fade_time_ms);
        self.report(group, true);
    }

    /// True if any of the four channels is currently driving a non-zero value.
    pub fn is_on(&self) -> bool {
        self.engine.channels().any_on()
    }

    /// Polls the channel drivers and advances looping transitions.
    ///
    /// Call on every cycle, whether or not a transition is active.
    pub fn process(&mut self) {
        self.engine.process();
    }

    pub fn is_transitioning(&self, group: ChannelGroup) -> bool {
        self.engine.is_transitioning(group)
    }

    /// Returns the level remembered for `source`.
    pub fn stored_level(&self, source: SwitchingSource) -> Level {
        self.store.level(source)
    }

    pub fn engine(&self) -> &TransitionEngine<F> {
        &self.engine
    }

    pub fn transport_mut(&mut self) -> &mut N {
        &mut self.transport
    }

    /// Sensor id reporting `group`'s status.
    pub fn sensor_id(&self, group: ChannelGroup) -> u8 {
        self.sensors[group.index()]
    }

    /// Maps a sensor id back to its group, `None` for foreign ids.
    pub fn group_for_sensor(&self, sensor: u8) -> Option<ChannelGroup> {
        ChannelGroup::ALL
            .into_iter()
            .find(|group| self.sensors[group.index()] == sensor)
    }

    fn report(&mut self, group: ChannelGroup, on: bool) {
        let sensor = self.sensor_id(group);
        network::send_status(&mut self.transport, sensor, on);
    }
}
