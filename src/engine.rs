//! Transition engine driving one-shot and self-reversing fades.
//!
//! Provides [`TransitionEngine`] which owns the four channel drivers and one
//! transition run state per [`ChannelGroup`]. The engine issues fade commands
//! when a transition starts, and reverses looping transitions from [`tick`]
//! when the live channel values land on an endpoint.
//!
//! Reversal compares the live driver output against the endpoint with exact
//! equality. A driver whose discretized fade never lands exactly on an
//! endpoint will leave a looping transition stalled at a near-endpoint value.
//!
//! [`tick`]: TransitionEngine::tick

use crate::fader::{ChannelFader, LedChannels};
use crate::types::{ChannelGroup, Level, Transition};

/// Direction a looping transition is currently fading in.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Direction {
    /// Fading from `start` to `stop`.
    Forward,
    /// Fading from `stop` back to `start`.
    Backward,
}

/// The observable state of one channel group.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum TransitionState {
    /// No transition running. Output is whatever was last commanded.
    Idle,
    /// A one-shot transition was started. Stays here after the fade completes
    /// until the transition is explicitly stopped.
    RunningOneShot,
    /// Looping transition fading from `start` to `stop`.
    RunningLoopForward,
    /// Looping transition fading from `stop` to `start`.
    RunningLoopBackward,
}

#[derive(Debug, Clone, Copy)]
struct RunState {
    running: bool,
    transition: Transition,
    direction: Direction,
}

impl RunState {
    const fn new() -> Self {
        Self {
            running: false,
            transition: Transition::one_shot(Level::OFF, Level::OFF, 0),
            direction: Direction::Forward,
        }
    }
}

/// Drives transitions for the color and white channel groups.
///
/// Color and white transitions are stored, started and reversed completely
/// independently of each other.
pub struct TransitionEngine<F: ChannelFader> {
    channels: LedChannels<F>,
    runs: [RunState; ChannelGroup::COUNT],
}

impl<F: ChannelFader> TransitionEngine<F> {
    /// Creates an engine with both groups idle.
    pub fn new(channels: LedChannels<F>) -> Self {
        Self {
            channels,
            runs: [RunState::new(); ChannelGroup::COUNT],
        }
    }

    /// Stores `transition` for `group` without starting it.
    ///
    /// A transition that is already running keeps its running flag and
    /// direction; it picks up the new endpoints on its next reversal.
    pub fn set_transition(&mut self, group: ChannelGroup, transition: Transition) {
        self.runs[group.index()].transition = transition;
    }

    /// Starts or stops the stored transition for `group`.
    ///
    /// Starting jumps the group's channels to `transition.start` and fades them
    /// to `transition.stop`. Stopping only clears the running flag and leaves
    /// the channels where they are.
    pub fn start_transition(&mut self, group: ChannelGroup, start: bool) {
        let run = &mut self.runs[group.index()];
        if start {
            let transition = run.transition;
            run.direction = Direction::Forward;
            Self::fade(&mut self.channels, group, transition.start, transition.stop, transition.duration_ms);
        }
        self.runs[group.index()].running = start;
    }

    /// Returns true if a transition is running for `group`.
    pub fn is_transitioning(&self, group: ChannelGroup) -> bool {
        self.runs[group.index()].running
    }

    /// Returns the state of `group`.
    pub fn state(&self, group: ChannelGroup) -> TransitionState {
        let run = &self.runs[group.index()];
        match (run.running, run.transition.looping, run.direction) {
            (false, _, _) => TransitionState::Idle,
            (true, false, _) => TransitionState::RunningOneShot,
            (true, true, Direction::Forward) => TransitionState::RunningLoopForward,
            (true, true, Direction::Backward) => TransitionState::RunningLoopBackward,
        }
    }

    /// Returns the transition stored for `group`.
    pub fn transition(&self, group: ChannelGroup) -> &Transition {
        &self.runs[group.index()].transition
    }

    /// Returns the direction of `group`'s transition.
    pub fn direction(&self, group: ChannelGroup) -> Direction {
        self.runs[group.index()].direction
    }

    /// Reverses looping transitions that reached an endpoint.
    ///
    /// Call once per cycle after polling the channel drivers.
    pub fn tick(&mut self) {
        for group in ChannelGroup::ALL {
            let run = self.runs[group.index()];
            if !run.running || !run.transition.looping {
                continue;
            }

            let transition = run.transition;
            match run.direction {
                Direction::Forward if self.channels.matches(group, &transition.stop) => {
                    Self::fade(&mut self.channels, group, transition.stop, transition.start, transition.duration_ms);
                    self.runs[group.index()].direction = Direction::Backward;
                }
                Direction::Backward if self.channels.matches(group, &transition.start) => {
                    Self::fade(&mut self.channels, group, transition.start, transition.stop, transition.duration_ms);
                    self.runs[group.index()].direction = Direction::Forward;
                }
                _ => {}
            }
        }
    }

    /// Fades `group` from its current output to `target`.
    pub fn fade_to(&mut self, group: ChannelGroup, target: Level, duration_ms: u32) {
        match group {
            ChannelGroup::Color => log::info!(
                "LEDs are fading to R={:#x}, G={:#x}, B={:#x}, time={}ms",
                target.r(),
                target.g(),
                target.b(),
                duration_ms
            ),
            ChannelGroup::White => log::info!("LED is fading to W={:#x}, time={}ms", target.w(), duration_ms),
        }
        self.channels.fade_to(group, target, duration_ms);
    }

    /// Polls all channel drivers, then reverses loops that hit an endpoint.
    pub fn process(&mut self) {
        self.channels.update();
        self.tick();
    }

    /// Returns the channel drivers.
    pub fn channels(&self) -> &LedChannels<F> {
        &self.channels
    }

    fn fade(channels: &mut LedChannels<F>, group: ChannelGroup, start: Level, stop: Level, duration_ms: u32) {
        match group {
            ChannelGroup::Color => log::info!(
                "LEDs are fading R={:#x}, G={:#x}, B={:#x} => R={:#x}, G={:#x}, B={:#x}, time={}ms",
                start.r(),
                start.g(),
                start.b(),
                stop.r(),
                stop.g(),
                stop.b(),
                duration_ms
            ),
            ChannelGroup::White => log::info!(
                "LED is fading W={:#x} => W={:#x}, time={}ms",
                start.w(),
                stop.w(),
                duration_ms
            ),
        }
        channels.fade_between(group, start, stop, duration_ms);
    }
}
