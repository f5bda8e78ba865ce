//! Typed commands decoded from text payloads.

use crate::types::{Level, SwitchingSource, Transition};

/// Wire discriminant of a command, the first character of a payload.
#[repr(u8)]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum CommandCode {
    /// Rejected or empty payload.
    None = b'\0',
    /// Set the level remembered for network commands and fade to it.
    SetExternalLimit = b'0',
    /// Set the level remembered for the push button and fade to it.
    SetButtonLimit = b'1',
    /// Start a one-shot transition.
    TransitionOneShot = b'2',
    /// Start a looping transition.
    TransitionLoop = b'3',
}

impl CommandCode {
    /// Maps a payload's first byte to its command code.
    pub fn from_byte(byte: u8) -> Option<Self> {
        match byte {
            b'0' => Some(CommandCode::SetExternalLimit),
            b'1' => Some(CommandCode::SetButtonLimit),
            b'2' => Some(CommandCode::TransitionOneShot),
            b'3' => Some(CommandCode::TransitionLoop),
            _ => None,
        }
    }

    /// The wire byte for this code.
    #[inline]
    pub const fn as_byte(self) -> u8 {
        self as u8
    }
}

/// A command for one channel group.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Command {
    /// Nothing to do. Produced for every rejected payload.
    None,
    /// Remember `level` for `source` and fade to it.
    SetLimit {
        source: SwitchingSource,
        level: Level,
    },
    /// Start a transition.
    Transition(Transition),
}

impl Command {
    /// The wire discriminant this command was decoded from.
    pub fn code(&self) -> CommandCode {
        match self {
            Command::None => CommandCode::None,
            Command::SetLimit {
                source: SwitchingSource::External,
                ..
            } => CommandCode::SetExternalLimit,
            Command::SetLimit {
                source: SwitchingSource::Button,
                ..
            } => CommandCode::SetButtonLimit,
            Command::Transition(transition) if transition.looping => CommandCode::TransitionLoop,
            Command::Transition(_) => CommandCode::TransitionOneShot,
        }
    }

    /// Returns true for [`Command::None`].
    pub fn is_none(&self) -> bool {
        matches!(self, Command::None)
    }
}
