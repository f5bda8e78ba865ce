//! PWM channel fading.
//!
//! Defines the [`ChannelFader`] trait the transition engine drives, a software
//! implementation on top of `embedded-hal` PWM ([`SoftFader`]), and the four
//! channel bundle [`LedChannels`] with per-group helpers.

use crate::time::{TimeInstant, TimeSource};
use crate::types::{ChannelGroup, Level};
use embedded_hal::pwm::SetDutyCycle;

/// Trait for abstracting a single fading PWM channel.
///
/// Implement this for a hardware fade engine (e.g. the ESP32 LEDC fade unit)
/// or use [`SoftFader`]. Implementations own the live output value; callers
/// only command it and read it back.
pub trait ChannelFader {
    /// Returns the value currently driven on the output.
    fn value(&self) -> u8;

    /// Drives `value` immediately, cancelling any fade in progress.
    fn set_value(&mut self, value: u8);

    /// Starts fading from the current value to `target` over `duration_ms`.
    ///
    /// A new fade overrides one already in progress.
    fn fade(&mut self, target: u8, duration_ms: u32);

    /// Advances the fade. Must be polled every cycle.
    ///
    /// Returns true while a fade is still in progress.
    fn update(&mut self) -> bool;
}

/// Minimum time between two output steps of a [`SoftFader`].
pub const MIN_STEP_INTERVAL_MS: u64 = 20;

#[derive(Debug, Clone, Copy)]
struct Fade<I> {
    from: u8,
    to: u8,
    duration_ms: u64,
    interval_ms: u64,
    started: I,
    last_step: I,
}

/// Software fader over an `embedded-hal` PWM channel.
///
/// Steps the output linearly, never more often than every
/// [`MIN_STEP_INTERVAL_MS`], and writes exactly the target value once the
/// duration has elapsed. Fades of [`MIN_STEP_INTERVAL_MS`] or less jump
/// straight to the target.
///
/// # Type Parameters
/// * `'t` - Lifetime of the time source reference
/// * `P` - PWM channel type
/// * `I` - Time instant type
/// * `T` - Time source implementation type
pub struct SoftFader<'t, P: SetDutyCycle, I: TimeInstant, T: TimeSource<I>> {
    pwm: P,
    time_source: &'t T,
    value: u8,
    fade: Option<Fade<I>>,
}

impl<'t, P: SetDutyCycle, I: TimeInstant, T: TimeSource<I>> SoftFader<'t, P, I, T> {
    /// Creates a fader with the output switched off.
    pub fn new(pwm: P, time_source: &'t T) -> Self {
        let mut fader = Self {
            pwm,
            time_source,
            value: 0,
            fade: None,
        };
        fader.write(0);
        fader
    }

    /// Returns true while a fade is in progress.
    pub fn is_fading(&self) -> bool {
        self.fade.is_some()
    }

    /// Returns the value the current fade is heading to, or the current value.
    pub fn target(&self) -> u8 {
        self.fade.map_or(self.value, |fade| fade.to)
    }

    fn write(&mut self, value: u8) {
        self.value = value;
        if let Err(err) = self.pwm.set_duty_cycle_fraction(u16::from(value), 255) {
            log::error!("PWM duty write failed: {:?}", err);
        }
    }
}

impl<P: SetDutyCycle, I: TimeInstant, T: TimeSource<I>> ChannelFader for SoftFader<'_, P, I, T> {
    fn value(&self) -> u8 {
        self.value
    }

    fn set_value(&mut self, value: u8) {
        self.fade = None;
        self.write(value);
    }

    fn fade(&mut self, target: u8, duration_ms: u32) {
        self.fade = None;
        if target == self.value {
            return;
        }

        let duration_ms = u64::from(duration_ms);
        if duration_ms <= MIN_STEP_INTERVAL_MS {
            self.write(target);
            return;
        }

        let delta = u64::from(self.value.abs_diff(target));
        let now = self.time_source.now();
        self.fade = Some(Fade {
            from: self.value,
            to: target,
            duration_ms,
            interval_ms: (duration_ms / delta).max(MIN_STEP_INTERVAL_MS),
            started: now,
            last_step: now,
        });
    }

    fn update(&mut self) -> bool {
        let Some(fade) = self.fade else {
            return false;
        };

        let now = self.time_source.now();
        let elapsed = now.millis_since(fade.started);
        if elapsed >= fade.duration_ms {
            self.fade = None;
            self.write(fade.to);
            return false;
        }

        if now.millis_since(fade.last_step) < fade.interval_ms {
            return true;
        }

        let span = i64::from(fade.to) - i64::from(fade.from);
        // elapsed < duration_ms, so the offset stays strictly inside the span
        let offset = span * elapsed as i64 / fade.duration_ms as i64;
        let value = (i64::from(fade.from) + offset) as u8;

        self.fade = Some(Fade {
            last_step: now,
            ..fade
        });
        self.write(value);
        true
    }
}

/// The four channel drivers of an RGBW fixture.
pub struct LedChannels<F: ChannelFader> {
    red: F,
    green: F,
    blue: F,
    white: F,
}

impl<F: ChannelFader> LedChannels<F> {
    pub fn new(red: F, green: F, blue: F, white: F) -> Self {
        Self {
            red,
            green,
            blue,
            white,
        }
    }

    /// Jumps `group` to `start`, then fades it to `stop`.
    pub fn fade_between(&mut self, group: ChannelGroup, start: Level, stop: Level, duration_ms: u32) {
        match group {
            ChannelGroup::Color => {
                self.red.set_value(start.r());
                self.green.set_value(start.g());
                self.blue.set_value(start.b());
                self.red.fade(stop.r(), duration_ms);
                self.green.fade(stop.g(), duration_ms);
                self.blue.fade(stop.b(), duration_ms);
            }
            ChannelGroup::White => {
                self.white.set_value(start.w());
                self.white.fade(stop.w(), duration_ms);
            }
        }
    }

    /// Fades `group` from wherever it is to `target`.
    pub fn fade_to(&mut self, group: ChannelGroup, target: Level, duration_ms: u32) {
        match group {
            ChannelGroup::Color => {
                self.red.fade(target.r(), duration_ms);
                self.green.fade(target.g(), duration_ms);
                self.blue.fade(target.b(), duration_ms);
            }
            ChannelGroup::White => self.white.fade(target.w(), duration_ms),
        }
    }

    /// True if `group`'s live values are exactly `level`'s components.
    pub fn matches(&self, group: ChannelGroup, level: &Level) -> bool {
        match group {
            ChannelGroup::Color => {
                self.red.value() == level.r()
                    && self.green.value() == level.g()
                    && self.blue.value() == level.b()
            }
            ChannelGroup::White => self.white.value() == level.w(),
        }
    }

    /// Live values of all four channels.
    pub fn current(&self) -> Level {
        Level::new(
            self.red.value(),
            self.green.value(),
            self.blue.value(),
            self.white.value(),
        )
    }

    /// True if any channel drives a non-zero value.
    pub fn any_on(&self) -> bool {
        self.red.value() > 0 || self.green.value() > 0 || self.blue.value() > 0 || self.white.value() > 0
    }

    /// Polls every channel. Returns true if any of them is still fading.
    pub fn update(&mut self) -> bool {
        let red = self.red.update();
        let green = self.green.update();
        let blue = self.blue.update();
        let white = self.white.update();
        red || green || blue || white
    }
}
