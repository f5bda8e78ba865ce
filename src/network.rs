//! Mesh network boundary.
//!
//! The radio stack (node ids, framing, acknowledgement, routing) lives behind
//! the [`Transport`] trait. The node only sees decoded inbound [`Message`]s and
//! sends on/off status per sensor.

use crate::config::MAX_PAYLOAD_SIZE;
use heapless::String;

/// Kind of sensor announced to the gateway during presentation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum SensorKind {
    /// Dimmable RGB light.
    RgbLight,
    /// Dimmable single channel light.
    Light,
}

/// Value carried by an inbound message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Payload {
    /// On/off switch request.
    Light(bool),
    /// Text command, see [`crate::parser`].
    Text(String<MAX_PAYLOAD_SIZE>),
    /// Any other value type, carrying the raw type code.
    Unsupported(u8),
}

/// A decoded inbound message addressed to one of this node's sensors.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Message {
    pub sensor: u8,
    pub payload: Payload,
}

impl Message {
    pub fn light(sensor: u8, on: bool) -> Self {
        Self {
            sensor,
            payload: Payload::Light(on),
        }
    }

    /// Builds a text message. Returns `None` if `text` does not fit the payload buffer.
    pub fn text(sensor: u8, text: &str) -> Option<Self> {
        let mut payload = String::new();
        payload.push_str(text).ok()?;
        Some(Self {
            sensor,
            payload: Payload::Text(payload),
        })
    }
}

/// Trait for abstracting the mesh transport.
///
/// Send methods return whether the message reached the next hop. The node logs
/// failures and never retries.
pub trait Transport {
    /// Sends the on/off status of `sensor`.
    fn send_status(&mut self, sensor: u8, on: bool) -> bool;

    /// Announces firmware name and version.
    fn send_sketch_info(&mut self, name: &str, version: &str) -> bool;

    /// Announces one sensor of this node.
    fn present(&mut self, sensor: u8, kind: SensorKind, description: &str) -> bool;

    /// Returns the next inbound message, if any.
    fn receive(&mut self) -> Option<Message>;
}

/// Sends `sensor`'s status, logging a message that did not reach the next node.
pub(crate) fn send_status<N: Transport>(transport: &mut N, sensor: u8, on: bool) {
    if !transport.send_status(sensor, on) {
        log::error!("Status message (sensor={}, on={}) didn't reach a next node", sensor, on);
    }
}
