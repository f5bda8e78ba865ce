//! Core value types shared by the engine, storage and command parser.

use palette::Srgb;

/// One of the two independently controlled LED channel sets.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ChannelGroup {
    /// The correlated red, green and blue channels.
    Color,

    /// The single white channel.
    White,
}

impl ChannelGroup {
    /// Number of channel groups.
    pub const COUNT: usize = 2;

    /// Both groups, in index order.
    pub const ALL: [ChannelGroup; Self::COUNT] = [ChannelGroup::Color, ChannelGroup::White];

    /// Index of this group into per-group state arrays.
    #[inline]
    pub const fn index(self) -> usize {
        match self {
            ChannelGroup::Color => 0,
            ChannelGroup::White => 1,
        }
    }
}

/// The actor whose last commanded level is remembered.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum SwitchingSource {
    /// A command received over the network.
    External,

    /// The local push button.
    Button,
}

impl SwitchingSource {
    /// Number of switching sources.
    pub const COUNT: usize = 2;

    /// Both sources, in index order (and in persisted record order).
    pub const ALL: [SwitchingSource; Self::COUNT] =
        [SwitchingSource::External, SwitchingSource::Button];

    /// Index of this source into the persisted record.
    #[inline]
    pub const fn index(self) -> usize {
        match self {
            SwitchingSource::External => 0,
            SwitchingSource::Button => 1,
        }
    }
}

/// An RGBW brightness value, each component 0-255.
///
/// Only the components belonging to a [`ChannelGroup`] are meaningful when the
/// level is used for that group. Constructors for a single group leave the other
/// components at zero.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Level {
    rgb: Srgb<u8>,
    white: u8,
}

impl Level {
    /// All channels off.
    pub const OFF: Level = Level::new(0, 0, 0, 0);

    /// All channels at full brightness.
    pub const FULL: Level = Level::new(255, 255, 255, 255);

    /// Creates a level from all four components.
    #[inline]
    pub const fn new(red: u8, green: u8, blue: u8, white: u8) -> Self {
        Self {
            rgb: Srgb::new(red, green, blue),
            white,
        }
    }

    /// Creates a color-only level (white = 0).
    #[inline]
    pub const fn rgb(red: u8, green: u8, blue: u8) -> Self {
        Self::new(red, green, blue, 0)
    }

    /// Creates a white-only level (R = G = B = 0).
    #[inline]
    pub const fn white(white: u8) -> Self {
        Self::new(0, 0, 0, white)
    }

    #[inline]
    pub const fn r(&self) -> u8 {
        self.rgb.red
    }

    #[inline]
    pub const fn g(&self) -> u8 {
        self.rgb.green
    }

    #[inline]
    pub const fn b(&self) -> u8 {
        self.rgb.blue
    }

    #[inline]
    pub const fn w(&self) -> u8 {
        self.white
    }

    /// The color part of this level.
    #[inline]
    pub const fn color(&self) -> Srgb<u8> {
        self.rgb
    }

    /// Components as `[R, G, B, W]`.
    #[inline]
    pub const fn to_array(self) -> [u8; 4] {
        [self.rgb.red, self.rgb.green, self.rgb.blue, self.white]
    }

    /// Builds a level from `[R, G, B, W]`.
    #[inline]
    pub const fn from_array(components: [u8; 4]) -> Self {
        Self::new(components[0], components[1], components[2], components[3])
    }

    /// Returns this level with `group`'s components replaced by those of `other`.
    pub const fn with_group(self, group: ChannelGroup, other: Level) -> Self {
        match group {
            ChannelGroup::Color => Self {
                rgb: other.rgb,
                white: self.white,
            },
            ChannelGroup::White => Self {
                rgb: self.rgb,
                white: other.white,
            },
        }
    }

    /// True if any of `group`'s components is non-zero.
    pub const fn is_lit(&self, group: ChannelGroup) -> bool {
        match group {
            ChannelGroup::Color => self.rgb.red > 0 || self.rgb.green > 0 || self.rgb.blue > 0,
            ChannelGroup::White => self.white > 0,
        }
    }
}

#[cfg(feature = "defmt")]
impl defmt::Format for Level {
    fn format(&self, f: defmt::Formatter) {
        defmt::write!(
            f,
            "Level(R={=u8:#x}, G={=u8:#x}, B={=u8:#x}, W={=u8:#x})",
            self.r(),
            self.g(),
            self.b(),
            self.w()
        )
    }
}

/// A fade from one level to another, optionally self-reversing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Transition {
    /// Level the channels are set to when the transition starts.
    pub start: Level,

    /// Level the channels fade towards.
    pub stop: Level,

    /// Fade duration in milliseconds. Zero is an instantaneous jump.
    pub duration_ms: u32,

    /// Reverse direction every time an endpoint is reached.
    pub looping: bool,
}

impl Transition {
    /// Creates a transition that fades once and then holds `stop`.
    #[inline]
    pub const fn one_shot(start: Level, stop: Level, duration_ms: u32) -> Self {
        Self {
            start,
            stop,
            duration_ms,
            looping: false,
        }
    }

    /// Creates a transition that bounces between `start` and `stop`.
    #[inline]
    pub const fn looping(start: Level, stop: Level, duration_ms: u32) -> Self {
        Self {
            start,
            stop,
            duration_ms,
            looping: true,
        }
    }
}

impl Default for Transition {
    fn default() -> Self {
        Self::one_shot(Level::OFF, Level::OFF, 0)
    }
}
