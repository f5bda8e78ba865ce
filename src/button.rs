//! Push button press classification.
//!
//! [`Button`] polls an input pin once per cycle and classifies how long it has
//! been held:
//!
//! | Event          | Fires when                                        |
//! |----------------|---------------------------------------------------|
//! | `ShortPress`   | hold time reaches the short press threshold       |
//! | `LongPress`    | hold time reaches the long press threshold        |
//! | `ShortRelease` | released after a short press, before a long one   |
//! | `LongRelease`  | released after a long press                       |
//!
//! A press released before the short threshold fires nothing.

use crate::time::{TimeInstant, TimeSource};
use embedded_hal::digital::InputPin;

/// Classified button events.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ButtonEvent {
    ShortPress,
    LongPress,
    ShortRelease,
    LongRelease,
}

impl ButtonEvent {
    const COUNT: usize = 4;

    const fn index(self) -> usize {
        match self {
            ButtonEvent::ShortPress => 0,
            ButtonEvent::LongPress => 1,
            ButtonEvent::ShortRelease => 2,
            ButtonEvent::LongRelease => 3,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum PressStatus {
    None,
    Short,
    Long,
}

/// Handler invoked with the context passed to [`Button::process`].
pub type ButtonHandler<C> = fn(&mut C);

/// Classifies presses of an active-high push button.
///
/// # Type Parameters
/// * `'t` - Lifetime of the time source reference
/// * `P` - Input pin type
/// * `I` - Time instant type
/// * `T` - Time source implementation type
/// * `C` - Context handed to handlers
pub struct Button<'t, P: InputPin, I: TimeInstant, T: TimeSource<I>, C> {
    pin: P,
    time_source: &'t T,
    short_press_ms: u64,
    long_press_ms: u64,
    was_pressed: bool,
    pressed_at: Option<I>,
    status: PressStatus,
    prev_status: PressStatus,
    handlers: [Option<ButtonHandler<C>>; ButtonEvent::COUNT],
}

impl<'t, P: InputPin, I: TimeInstant, T: TimeSource<I>, C> Button<'t, P, I, T, C> {
    pub fn new(pin: P, time_source: &'t T, short_press_ms: u32, long_press_ms: u32) -> Self {
        Self {
            pin,
            time_source,
            short_press_ms: u64::from(short_press_ms),
            long_press_ms: u64::from(long_press_ms),
            was_pressed: false,
            pressed_at: None,
            status: PressStatus::None,
            prev_status: PressStatus::None,
            handlers: [None; ButtonEvent::COUNT],
        }
    }

    /// Registers `handler` for `event`, replacing any previous one.
    pub fn on(&mut self, event: ButtonEvent, handler: ButtonHandler<C>) {
        self.handlers[event.index()] = Some(handler);
    }

    /// Removes the handler for `event`.
    pub fn clear(&mut self, event: ButtonEvent) {
        self.handlers[event.index()] = None;
    }

    /// Samples the pin, classifies the press and runs handlers for any event.
    ///
    /// Returns the last event fired in this call.
    pub fn process(&mut self, ctx: &mut C) -> Option<ButtonEvent> {
        let pressed = match self.pin.is_high() {
            Ok(level) => level,
            Err(err) => {
                log::error!("Button pin read failed: {:?}", err);
                false
            }
        };
        let now = self.time_source.now();
        let mut fired = None;

        if pressed && !self.was_pressed {
            self.pressed_at = Some(now);
        } else if !pressed && self.was_pressed {
            self.pressed_at = None;
            let release = match self.status {
                PressStatus::Short => Some(ButtonEvent::ShortRelease),
                PressStatus::Long => Some(ButtonEvent::LongRelease),
                PressStatus::None => None,
            };
            if let Some(event) = release {
                fired = self.fire(event, ctx);
            }
            self.status = PressStatus::None;
        }

        if let Some(pressed_at) = self.pressed_at {
            let held = now.millis_since(pressed_at);
            if held >= self.long_press_ms {
                self.status = PressStatus::Long;
            } else if held >= self.short_press_ms {
                self.status = PressStatus::Short;
            }
        }

        if self.status != self.prev_status {
            let press = match self.status {
                PressStatus::Short => Some(ButtonEvent::ShortPress),
                PressStatus::Long => Some(ButtonEvent::LongPress),
                PressStatus::None => None,
            };
            if let Some(event) = press {
                fired = self.fire(event, ctx);
            }
        }

        self.was_pressed = pressed;
        self.prev_status = self.status;
        fired
    }

    fn fire(&self, event: ButtonEvent, ctx: &mut C) -> Option<ButtonEvent> {
        log::debug!("Button event: {:?}", event);
        if let Some(handler) = self.handlers[event.index()] {
            handler(ctx);
        }
        Some(event)
    }
}
