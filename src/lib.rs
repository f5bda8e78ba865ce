#![cfg_attr(not(feature = "std"), no_std)]
#![doc = include_str!("../README.md")]

//! # Core Concepts
//!
//! - **`Level`**: An RGBW brightness value, 0-255 per channel
//! - **`ChannelGroup`**: The color (RGB) or white channel set, controlled independently
//! - **`Transition`**: A start level, stop level and duration, one-shot or looping
//! - **`ChannelFader`**: Trait to implement for your PWM fade hardware (or use `SoftFader`)
//! - **`TransitionEngine`**: Runs transitions and reverses looping ones at their endpoints
//! - **`LightController`**: Combines the engine with persistence and status reports
//! - **`LevelStore`**: Remembers the last level per switching source in EEPROM/flash
//! - **`Transport`**: Trait to implement for your mesh radio stack
//! - **`Button`**: Classifies push button presses into short and long events
//! - **`KitchenNode`**: Owns everything and runs one control loop iteration at a time
//!
//! Everything is driven from a single cooperative loop. Nothing blocks and
//! nothing allocates.

// Re-export Srgb from palette for user convenience
pub use palette::Srgb;

pub mod time;
pub mod types;
pub mod config;
pub mod command;
pub mod parser;
pub mod fader;
pub mod engine;
pub mod storage;
pub mod network;
pub mod controller;
pub mod button;
pub mod node;

pub use types::{ChannelGroup, Level, SwitchingSource, Transition};
pub use time::{TimeDuration, TimeInstant, TimeSource};
pub use config::{NodeConfig, MAX_PAYLOAD_SIZE, STORAGE_VERSION};
pub use command::{Command, CommandCode};
pub use parser::{parse_command, try_parse_command, ParseError};
pub use fader::{ChannelFader, LedChannels, SoftFader};
pub use engine::{Direction, TransitionEngine, TransitionState};
pub use storage::{LevelStore, PersistedRecord, StorageError, RECORD_SIZE};
pub use network::{Message, Payload, SensorKind, Transport};
pub use controller::LightController;
pub use button::{Button, ButtonEvent, ButtonHandler};
pub use node::{KitchenNode, LongPressMode};
