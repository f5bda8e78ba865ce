//! Text payload parser.
//!
//! Payloads have the shape `<digit>[,<field>]*`:
//!
//! | Code | Command                  | Fields                                   |
//! |------|--------------------------|------------------------------------------|
//! | `0`  | set limit (external)     | level                                    |
//! | `1`  | set limit (button)       | level                                    |
//! | `2`  | one-shot transition      | start level, stop level, duration in ms  |
//! | `3`  | looping transition       | start level, stop level, duration in ms  |
//!
//! A level is two hex digits (`WW`) for the white group and six hex digits
//! (`RRGGBB`) for the color group.

use crate::command::{Command, CommandCode};
use crate::config::{MAX_FIELD_COUNT, MAX_PAYLOAD_SIZE};
use crate::types::{ChannelGroup, Level, SwitchingSource, Transition};
use heapless::Vec;

/// Reasons a payload is rejected.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ParseError {
    /// Payload is empty.
    Empty,

    /// Payload is `MAX_PAYLOAD_SIZE` bytes or longer.
    TooLong(usize),

    /// Second character is not `,`.
    BadSeparator,

    /// First character is not a known command code.
    UnknownCommand(u8),

    /// Wrong number of fields for the command.
    FieldCount { expected: usize, actual: usize },

    /// A level field has the wrong number of hex digits.
    LevelLength { expected: usize, actual: usize },

    /// A level field contains a non-hex character.
    BadHex,

    /// The duration is not a decimal number or does not fit 32 bits.
    BadDuration,
}

impl core::fmt::Display for ParseError {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            ParseError::Empty => write!(f, "empty payload"),
            ParseError::TooLong(len) => write!(f, "payload too long: {} bytes", len),
            ParseError::BadSeparator => write!(f, "second character must be ','"),
            ParseError::UnknownCommand(code) => write!(f, "unknown command code {:#04x}", code),
            ParseError::FieldCount { expected, actual } => {
                write!(f, "expected {} fields, got {}", expected, actual)
            }
            ParseError::LevelLength { expected, actual } => {
                write!(f, "expected {} hex digits, got {}", expected, actual)
            }
            ParseError::BadHex => write!(f, "invalid hex digit"),
            ParseError::BadDuration => write!(f, "duration is not an unsigned 32-bit decimal"),
        }
    }
}

#[cfg(feature = "std")]
impl std::error::Error for ParseError {}

/// Parses `payload` as a command for `group`.
///
/// Never fails: rejected payloads are logged and yield [`Command::None`].
pub fn parse_command(payload: &str, group: ChannelGroup) -> Command {
    log::debug!("Input: {}", payload);

    match try_parse_command(payload, group) {
        Ok(command) => {
            log::debug!("Parsed: {:?}", command);
            command
        }
        Err(err) => {
            log::error!("Rejected payload {:?}: {}", payload, err);
            Command::None
        }
    }
}

/// Parses `payload` as a command for `group`, reporting why it was rejected.
pub fn try_parse_command(payload: &str, group: ChannelGroup) -> Result<Command, ParseError> {
    let bytes = payload.as_bytes();
    if bytes.is_empty() {
        return Err(ParseError::Empty);
    }
    if bytes.len() >= MAX_PAYLOAD_SIZE {
        return Err(ParseError::TooLong(bytes.len()));
    }
    if bytes.len() > 2 && bytes[1] != b',' {
        return Err(ParseError::BadSeparator);
    }

    let code = CommandCode::from_byte(bytes[0]).ok_or(ParseError::UnknownCommand(bytes[0]))?;
    let fields = split_fields(payload)?;

    match code {
        CommandCode::SetExternalLimit | CommandCode::SetButtonLimit => {
            expect_fields(&fields, 1)?;
            let source = if code == CommandCode::SetExternalLimit {
                SwitchingSource::External
            } else {
                SwitchingSource::Button
            };
            Ok(Command::SetLimit {
                source,
                level: parse_level(fields[0], group)?,
            })
        }
        CommandCode::TransitionOneShot | CommandCode::TransitionLoop => {
            expect_fields(&fields, 3)?;
            Ok(Command::Transition(Transition {
                start: parse_level(fields[0], group)?,
                stop: parse_level(fields[1], group)?,
                duration_ms: parse_duration(fields[2])?,
                looping: code == CommandCode::TransitionLoop,
            }))
        }
        CommandCode::None => Err(ParseError::UnknownCommand(bytes[0])),
    }
}

fn split_fields(payload: &str) -> Result<Vec<&str, MAX_FIELD_COUNT>, ParseError> {
    let mut fields = Vec::new();
    // "0," and "0" carry no fields at all
    let Some(rest) = payload.get(2..).filter(|rest| !rest.is_empty()) else {
        return Ok(fields);
    };

    for field in rest.split(',') {
        if fields.push(field).is_err() {
            return Err(ParseError::FieldCount {
                expected: MAX_FIELD_COUNT,
                actual: rest.split(',').count(),
            });
        }
    }
    Ok(fields)
}

fn expect_fields(fields: &[&str], expected: usize) -> Result<(), ParseError> {
    if fields.len() != expected {
        return Err(ParseError::FieldCount {
            expected,
            actual: fields.len(),
        });
    }
    Ok(())
}

fn parse_level(field: &str, group: ChannelGroup) -> Result<Level, ParseError> {
    match group {
        ChannelGroup::Color => {
            let [r, g, b] = parse_hex::<3>(field)?;
            Ok(Level::rgb(r, g, b))
        }
        ChannelGroup::White => {
            let [w] = parse_hex::<1>(field)?;
            Ok(Level::white(w))
        }
    }
}

fn parse_hex<const N: usize>(field: &str) -> Result<[u8; N], ParseError> {
    let digits = field.as_bytes();
    if digits.len() != N * 2 {
        return Err(ParseError::LevelLength {
            expected: N * 2,
            actual: digits.len(),
        });
    }

    let mut out = [0u8; N];
    for (byte, pair) in out.iter_mut().zip(digits.chunks_exact(2)) {
        *byte = (hex_digit(pair[0])? << 4) | hex_digit(pair[1])?;
    }
    Ok(out)
}

fn hex_digit(c: u8) -> Result<u8, ParseError> {
    match c {
        b'0'..=b'9' => Ok(c - b'0'),
        b'a'..=b'f' => Ok(c - b'a' + 10),
        b'A'..=b'F' => Ok(c - b'A' + 10),
        _ => Err(ParseError::BadHex),
    }
}

fn parse_duration(field: &str) -> Result<u32, ParseError> {
    if field.is_empty() || !field.bytes().all(|c| c.is_ascii_digit()) {
        return Err(ParseError::BadDuration);
    }
    field.parse().map_err(|_| ParseError::BadDuration)
}
