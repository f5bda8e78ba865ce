//! Node configuration.
//!
//! Compile-time limits live here as constants; everything a board might want
//! to tune is collected in [`NodeConfig`].

/// Payloads of this many bytes or more are rejected.
pub const MAX_PAYLOAD_SIZE: usize = 50;

/// Upper bound on comma separated fields in a payload.
pub const MAX_FIELD_COUNT: usize = 4;

/// Version tag of the persisted level record. Bump whenever the layout changes.
pub const STORAGE_VERSION: u8 = 2;

/// Runtime parameters of the kitchen light node.
#[derive(Debug, Clone)]
pub struct NodeConfig {
    /// Mesh node id.
    pub node_id: u8,
    /// Firmware name announced to the gateway.
    pub sketch_name: &'static str,
    /// Firmware version announced to the gateway.
    pub sketch_version: &'static str,
    /// Sensor id of the color LED group.
    pub color_sensor_id: u8,
    /// Sensor id of the white LED group.
    pub white_sensor_id: u8,
    /// Duration of plain on/off/limit fades.
    pub fade_time_ms: u32,
    /// Hold time after which a press counts as short.
    pub short_press_ms: u32,
    /// Hold time after which a press counts as long.
    pub long_press_ms: u32,
    /// Byte offset of the level record in non-volatile storage.
    pub storage_offset: u32,
}

impl Default for NodeConfig {
    fn default() -> Self {
        Self {
            node_id: 4,
            sketch_name: "KitchenLEDs",
            sketch_version: "0.4",
            color_sensor_id: 0,
            white_sensor_id: 1,
            fade_time_ms: 3000,
            short_press_ms: 50,
            long_press_ms: 2000,
            storage_offset: 0,
        }
    }
}
