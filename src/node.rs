//! The kitchen light node.
//!
//! [`KitchenNode`] owns the [`LightController`] and is the only place where raw
//! network input is validated. It maps sensor ids to channel groups, decodes
//! text commands, and implements what the local push button does:
//!
//! - short release toggles both groups: off if anything is lit, otherwise on
//!   at the levels remembered for the button;
//! - long press cycles both groups on, color only, white only, and back.

use crate::button::{Button, ButtonEvent};
use crate::command::Command;
use crate::config::NodeConfig;
use crate::controller::LightController;
use crate::fader::{ChannelFader, LedChannels};
use crate::network::{Message, Payload, SensorKind, Transport};
use crate::parser::parse_command;
use crate::storage::LevelStore;
use crate::time::{TimeInstant, TimeSource};
use crate::types::{ChannelGroup, SwitchingSource};
use core::fmt::Debug;
use embedded_hal::digital::InputPin;
use embedded_storage::Storage;

/// Which groups the next long press lights up.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum LongPressMode {
    Both,
    ColorOnly,
    WhiteOnly,
}

impl LongPressMode {
    const fn next(self) -> Self {
        match self {
            LongPressMode::Both => LongPressMode::ColorOnly,
            LongPressMode::ColorOnly => LongPressMode::WhiteOnly,
            LongPressMode::WhiteOnly => LongPressMode::Both,
        }
    }

    const fn lights(self, group: ChannelGroup) -> bool {
        match (self, group) {
            (LongPressMode::Both, _) => true,
            (LongPressMode::ColorOnly, ChannelGroup::Color) => true,
            (LongPressMode::WhiteOnly, ChannelGroup::White) => true,
            _ => false,
        }
    }
}

/// Single owner of all runtime state of the node.
pub struct KitchenNode<F: ChannelFader, S: Storage, N: Transport> {
    controller: LightController<F, S, N>,
    config: NodeConfig,
    long_press_mode: LongPressMode,
}

impl<F, S, N> KitchenNode<F, S, N>
where
    F: ChannelFader,
    S: Storage,
    S::Error: Debug,
    N: Transport,
{
    pub fn new(channels: LedChannels<F>, storage: S, transport: N, config: NodeConfig) -> Self {
        let store = LevelStore::new(storage, config.storage_offset);
        Self {
            controller: LightController::new(channels, store, transport, &config),
            config,
            long_press_mode: LongPressMode::Both,
        }
    }

    /// Presents the node to the gateway, restores stored levels and switches
    /// all LEDs off.
    pub fn start(&mut self) {
        log::info!("Presenting node {} to the gateway", self.config.node_id);
        let transport = self.controller.transport_mut();
        if !transport.send_sketch_info(self.config.sketch_name, self.config.sketch_version) {
            log::error!("Sketch info didn't reach a next node");
        }
        let sensors = [
            (self.config.color_sensor_id, SensorKind::RgbLight, "Color LEDs"),
            (self.config.white_sensor_id, SensorKind::Light, "White LED"),
        ];
        for (sensor, kind, description) in sensors {
            if !transport.present(sensor, kind, description) {
                log::error!("Presentation of sensor {} didn't reach a next node", sensor);
            }
        }

        self.controller.boot();
    }

    /// Validates and dispatches one inbound message.
    pub fn handle_message(&mut self, message: &Message) {
        let Some(group) = self.controller.group_for_sensor(message.sensor) else {
            log::error!("Got message for unexpected sensor {}", message.sensor);
            return;
        };

        match &message.payload {
            Payload::Light(on) => {
                log::debug!("=> Message: sensor={}, status={}", message.sensor, on);
                if *on {
                    self.controller.switch_on(group, SwitchingSource::External);
                } else {
                    self.controller.switch_off(group);
                }
            }
            Payload::Text(text) => {
                log::debug!("=> Message: sensor={}, data={}", message.sensor, text.as_str());
                match parse_command(text, group) {
                    Command::SetLimit { source, level } => self.controller.set_limit(group, level, source),
                    Command::Transition(transition) => self.controller.begin_transition(group, transition),
                    Command::None => {}
                }
            }
            Payload::Unsupported(kind) => {
                log::error!(
                    "Got message with unexpected type: (sensor={}, type={})",
                    message.sensor,
                    kind
                );
            }
        }
    }

    /// Toggles both groups: off if anything is lit, else on at the button levels.
    pub fn on_short_release(&mut self) {
        self.long_press_mode = LongPressMode::Both;
        if self.controller.is_on() {
            for group in ChannelGroup::ALL {
                self.controller.switch_off(group);
            }
        } else {
            for group in ChannelGroup::ALL {
                self.controller.switch_on(group, SwitchingSource::Button);
            }
        }
    }

    /// Applies the current long press mode and advances to the next one.
    pub fn on_long_press(&mut self) {
        let mode = self.long_press_mode;
        for group in ChannelGroup::ALL {
            if mode.lights(group) {
                self.controller.switch_on(group, SwitchingSource::Button);
            } else {
                self.controller.switch_off(group);
            }
        }
        self.long_press_mode = mode.next();
    }

    /// Binds the node's button behaviour to `button`.
    pub fn register_button<P, I, T>(button: &mut Button<'_, P, I, T, Self>)
    where
        P: InputPin,
        I: TimeInstant,
        T: TimeSource<I>,
    {
        button.on(ButtonEvent::ShortRelease, Self::on_short_release);
        button.on(ButtonEvent::LongPress, Self::on_long_press);
    }

    /// Drains inbound messages, then advances the LEDs.
    pub fn poll(&mut self) {
        self.drain_inbound();
        self.controller.process();
    }

    /// One iteration of the control loop: network, button, LEDs.
    pub fn run_cycle<P, I, T>(&mut self, button: &mut Button<'_, P, I, T, Self>)
    where
        P: InputPin,
        I: TimeInstant,
        T: TimeSource<I>,
    {
        self.drain_inbound();
        button.process(self);
        self.controller.process();
    }

    /// Returns the mode the next long press applies.
    pub fn long_press_mode(&self) -> LongPressMode {
        self.long_press_mode
    }

    pub fn controller(&self) -> &LightController<F, S, N> {
        &self.controller
    }

    pub fn controller_mut(&mut self) -> &mut LightController<F, S, N> {
        &mut self.controller
    }

    pub fn config(&self) -> &NodeConfig {
        &self.config
    }

    fn drain_inbound(&mut self) {
        while let Some(message) = self.controller.transport_mut().receive() {
            self.handle_message(&message);
        }
    }
}
