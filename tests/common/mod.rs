//! Shared test infrastructure for kitchen-leds integration tests

#![allow(dead_code)] // Items used across multiple test files; Rust analyzes per-file

use std::cell::{Cell, RefCell};
use std::collections::VecDeque;
use std::rc::Rc;

use embedded_hal::digital::{self, ErrorKind, InputPin};
use embedded_hal::pwm::{self, SetDutyCycle};
use embedded_storage::{ReadStorage, Storage};
use kitchen_leds::{
    ChannelFader, ChannelGroup, KitchenNode, LedChannels, LevelStore, LightController, Message,
    NodeConfig, SensorKind, TimeDuration, TimeInstant, TimeSource, Transport, RECORD_SIZE,
    STORAGE_VERSION,
};

// ============================================================================
// Mock Time Types
// ============================================================================

/// Mock duration type for testing (wraps milliseconds)
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct TestDuration(pub u64);

impl TimeDuration for TestDuration {
    fn as_millis(&self) -> u64 {
        self.0
    }
}

/// Mock instant type for testing
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct TestInstant(pub u64);

impl TimeInstant for TestInstant {
    type Duration = TestDuration;

    fn duration_since(&self, earlier: Self) -> Self::Duration {
        TestDuration(self.0 - earlier.0)
    }
}

// ============================================================================
// Mock Time Source
// ============================================================================

/// Mock time source with controllable time advancement
pub struct MockTimeSource {
    current_time: Cell<TestInstant>,
}

impl MockTimeSource {
    pub fn new() -> Self {
        Self {
            current_time: Cell::new(TestInstant(0)),
        }
    }

    /// Advance time by the given number of milliseconds
    pub fn advance_ms(&self, millis: u64) {
        let current = self.current_time.get();
        self.current_time.set(TestInstant(current.0 + millis));
    }
}

impl TimeSource<TestInstant> for MockTimeSource {
    fn now(&self) -> TestInstant {
        self.current_time.get()
    }
}

// ============================================================================
// Mock Fader
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Channel {
    Red,
    Green,
    Blue,
    White,
}

impl Channel {
    pub const ALL: [Channel; 4] = [Channel::Red, Channel::Green, Channel::Blue, Channel::White];

    fn index(self) -> usize {
        self as usize
    }

    pub fn group(self) -> ChannelGroup {
        match self {
            Channel::White => ChannelGroup::White,
            _ => ChannelGroup::Color,
        }
    }
}

/// A driver command as seen by a channel.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FaderCall {
    Set(u8),
    Fade { target: u8, duration_ms: u32 },
}

/// How a [`MockFader`] moves on `update()` after a fade was commanded.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FadeBehavior {
    /// Lands exactly on the target on the next update.
    Complete,
    /// Never moves; tests drive values with [`FaderLog::force`].
    Hold,
    /// Stops one step short of the target.
    Undershoot,
}

/// State shared by the four mock faders of one fixture.
pub struct FaderLog {
    calls: RefCell<Vec<(Channel, FaderCall)>>,
    values: [Cell<u8>; 4],
    pending: [Cell<Option<u8>>; 4],
    behavior: Cell<FadeBehavior>,
}

impl FaderLog {
    fn new(behavior: FadeBehavior) -> Self {
        Self {
            calls: RefCell::new(Vec::new()),
            values: Default::default(),
            pending: Default::default(),
            behavior: Cell::new(behavior),
        }
    }

    pub fn calls(&self) -> Vec<(Channel, FaderCall)> {
        self.calls.borrow().clone()
    }

    /// Calls issued to the channels of `group`, in order.
    pub fn group_calls(&self, group: ChannelGroup) -> Vec<(Channel, FaderCall)> {
        self.calls
            .borrow()
            .iter()
            .copied()
            .filter(|(channel, _)| channel.group() == group)
            .collect()
    }

    pub fn clear(&self) {
        self.calls.borrow_mut().clear();
    }

    pub fn value(&self, channel: Channel) -> u8 {
        self.values[channel.index()].get()
    }

    /// Overrides the live value of `channel` without recording a call.
    pub fn force(&self, channel: Channel, value: u8) {
        self.values[channel.index()].set(value);
    }

    pub fn set_behavior(&self, behavior: FadeBehavior) {
        self.behavior.set(behavior);
    }
}

/// Mock channel driver that records every command in a shared [`FaderLog`]
pub struct MockFader {
    channel: Channel,
    log: Rc<FaderLog>,
}

impl ChannelFader for MockFader {
    fn value(&self) -> u8 {
        self.log.value(self.channel)
    }

    fn set_value(&mut self, value: u8) {
        let i = self.channel.index();
        self.log.pending[i].set(None);
        self.log.values[i].set(value);
        self.log.calls.borrow_mut().push((self.channel, FaderCall::Set(value)));
    }

    fn fade(&mut self, target: u8, duration_ms: u32) {
        self.log.pending[self.channel.index()].set(Some(target));
        self.log
            .calls
            .borrow_mut()
            .push((self.channel, FaderCall::Fade { target, duration_ms }));
    }

    fn update(&mut self) -> bool {
        let i = self.channel.index();
        let Some(target) = self.log.pending[i].take() else {
            return false;
        };
        let current = self.log.values[i].get();
        match self.log.behavior.get() {
            FadeBehavior::Complete => self.log.values[i].set(target),
            FadeBehavior::Hold => self.log.pending[i].set(Some(target)),
            FadeBehavior::Undershoot => {
                let landed = if target > current {
                    target - 1
                } else if target < current {
                    target + 1
                } else {
                    target
                };
                self.log.values[i].set(landed);
            }
        }
        false
    }
}

/// Builds four mock channels sharing one log.
pub fn mock_channels(behavior: FadeBehavior) -> (LedChannels<MockFader>, Rc<FaderLog>) {
    let log = Rc::new(FaderLog::new(behavior));
    let fader = |channel| MockFader {
        channel,
        log: Rc::clone(&log),
    };
    let channels = LedChannels::new(
        fader(Channel::Red),
        fader(Channel::Green),
        fader(Channel::Blue),
        fader(Channel::White),
    );
    (channels, log)
}

// ============================================================================
// Mock PWM
// ============================================================================

/// Mock PWM channel exposing the last written duty cycle
pub struct MockPwm {
    duty: Rc<Cell<u16>>,
}

impl MockPwm {
    pub fn new() -> (Self, Rc<Cell<u16>>) {
        let duty = Rc::new(Cell::new(u16::MAX));
        (
            Self {
                duty: Rc::clone(&duty),
            },
            duty,
        )
    }
}

impl pwm::ErrorType for MockPwm {
    type Error = core::convert::Infallible;
}

impl SetDutyCycle for MockPwm {
    fn max_duty_cycle(&self) -> u16 {
        255
    }

    fn set_duty_cycle(&mut self, duty: u16) -> Result<(), Self::Error> {
        self.duty.set(duty);
        Ok(())
    }
}

// ============================================================================
// Mock EEPROM
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EepromError;

/// Mock EEPROM; clones share the same memory and failure switches
#[derive(Clone)]
pub struct MockEeprom {
    memory: Rc<RefCell<Vec<u8>>>,
    fail_reads: Rc<Cell<bool>>,
    fail_writes: Rc<Cell<bool>>,
    writes: Rc<Cell<u32>>,
}

impl MockEeprom {
    /// Erased EEPROM of `size` bytes.
    pub fn blank(size: usize) -> Self {
        Self {
            memory: Rc::new(RefCell::new(vec![0xFF; size])),
            fail_reads: Rc::new(Cell::new(false)),
            fail_writes: Rc::new(Cell::new(false)),
            writes: Rc::new(Cell::new(0)),
        }
    }

    /// EEPROM holding a current-version record at offset 0.
    pub fn with_levels(external: [u8; 4], button: [u8; 4]) -> Self {
        let eeprom = Self::blank(64);
        {
            let mut memory = eeprom.memory.borrow_mut();
            memory[0] = STORAGE_VERSION;
            memory[1..5].copy_from_slice(&external);
            memory[5..9].copy_from_slice(&button);
        }
        eeprom
    }

    pub fn bytes(&self, offset: usize) -> [u8; RECORD_SIZE] {
        let mut out = [0u8; RECORD_SIZE];
        out.copy_from_slice(&self.memory.borrow()[offset..offset + RECORD_SIZE]);
        out
    }

    /// Overwrites one byte without counting a write.
    pub fn poke(&self, offset: usize, byte: u8) {
        self.memory.borrow_mut()[offset] = byte;
    }

    pub fn fail_reads(&self, fail: bool) {
        self.fail_reads.set(fail);
    }

    pub fn fail_writes(&self, fail: bool) {
        self.fail_writes.set(fail);
    }

    pub fn writes(&self) -> u32 {
        self.writes.get()
    }
}

impl ReadStorage for MockEeprom {
    type Error = EepromError;

    fn read(&mut self, offset: u32, bytes: &mut [u8]) -> Result<(), Self::Error> {
        if self.fail_reads.get() {
            return Err(EepromError);
        }
        let start = offset as usize;
        let memory = self.memory.borrow();
        let src = memory.get(start..start + bytes.len()).ok_or(EepromError)?;
        bytes.copy_from_slice(src);
        Ok(())
    }

    fn capacity(&self) -> usize {
        self.memory.borrow().len()
    }
}

impl Storage for MockEeprom {
    fn write(&mut self, offset: u32, bytes: &[u8]) -> Result<(), Self::Error> {
        if self.fail_writes.get() {
            return Err(EepromError);
        }
        let start = offset as usize;
        let mut memory = self.memory.borrow_mut();
        let dst = memory.get_mut(start..start + bytes.len()).ok_or(EepromError)?;
        dst.copy_from_slice(bytes);
        self.writes.set(self.writes.get() + 1);
        Ok(())
    }
}

// ============================================================================
// Mock Transport
// ============================================================================

#[derive(Default)]
pub struct TransportLog {
    pub statuses: Vec<(u8, bool)>,
    pub sketch_info: Option<(String, String)>,
    pub presented: Vec<(u8, SensorKind, String)>,
    pub inbound: VecDeque<Message>,
    pub offline: bool,
}

/// Mock mesh transport; clones share the same log and inbound queue
#[derive(Clone, Default)]
pub struct MockTransport {
    log: Rc<RefCell<TransportLog>>,
}

impl MockTransport {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn statuses(&self) -> Vec<(u8, bool)> {
        self.log.borrow().statuses.clone()
    }

    pub fn clear_statuses(&self) {
        self.log.borrow_mut().statuses.clear();
    }

    pub fn sketch_info(&self) -> Option<(String, String)> {
        self.log.borrow().sketch_info.clone()
    }

    pub fn presented(&self) -> Vec<(u8, SensorKind, String)> {
        self.log.borrow().presented.clone()
    }

    pub fn push_inbound(&self, message: Message) {
        self.log.borrow_mut().inbound.push_back(message);
    }

    pub fn inbound_len(&self) -> usize {
        self.log.borrow().inbound.len()
    }

    /// Makes every send report that it did not reach the next node.
    pub fn set_offline(&self, offline: bool) {
        self.log.borrow_mut().offline = offline;
    }
}

impl Transport for MockTransport {
    fn send_status(&mut self, sensor: u8, on: bool) -> bool {
        let mut log = self.log.borrow_mut();
        log.statuses.push((sensor, on));
        !log.offline
    }

    fn send_sketch_info(&mut self, name: &str, version: &str) -> bool {
        let mut log = self.log.borrow_mut();
        log.sketch_info = Some((name.to_string(), version.to_string()));
        !log.offline
    }

    fn present(&mut self, sensor: u8, kind: SensorKind, description: &str) -> bool {
        let mut log = self.log.borrow_mut();
        log.presented.push((sensor, kind, description.to_string()));
        !log.offline
    }

    fn receive(&mut self) -> Option<Message> {
        self.log.borrow_mut().inbound.pop_front()
    }
}

// ============================================================================
// Mock Pin
// ============================================================================

/// Mock active-high button pin; clones share the same level
#[derive(Clone)]
pub struct MockPin {
    high: Rc<Cell<bool>>,
    broken: Rc<Cell<bool>>,
}

impl MockPin {
    pub fn new() -> Self {
        Self {
            high: Rc::new(Cell::new(false)),
            broken: Rc::new(Cell::new(false)),
        }
    }

    pub fn press(&self) {
        self.high.set(true);
    }

    pub fn release(&self) {
        self.high.set(false);
    }

    pub fn set_broken(&self, broken: bool) {
        self.broken.set(broken);
    }
}

impl digital::ErrorType for MockPin {
    type Error = ErrorKind;
}

impl InputPin for MockPin {
    fn is_high(&mut self) -> Result<bool, Self::Error> {
        if self.broken.get() {
            return Err(ErrorKind::Other);
        }
        Ok(self.high.get())
    }

    fn is_low(&mut self) -> Result<bool, Self::Error> {
        self.is_high().map(|high| !high)
    }
}

// ============================================================================
// Fixtures
// ============================================================================

pub type TestController = LightController<MockFader, MockEeprom, MockTransport>;
pub type TestNode = KitchenNode<MockFader, MockEeprom, MockTransport>;

/// Handles to the mocks owned by a controller or node under test.
pub struct Rig {
    pub leds: Rc<FaderLog>,
    pub eeprom: MockEeprom,
    pub transport: MockTransport,
}

pub const EXTERNAL_LEVEL: [u8; 4] = [0x11, 0x22, 0x33, 0x44];
pub const BUTTON_LEVEL: [u8; 4] = [0x55, 0x66, 0x77, 0x88];

fn rig(eeprom: MockEeprom) -> (LedChannels<MockFader>, Rig) {
    let (channels, leds) = mock_channels(FadeBehavior::Complete);
    let rig = Rig {
        leds,
        eeprom,
        transport: MockTransport::new(),
    };
    (channels, rig)
}

/// Booted controller with [`EXTERNAL_LEVEL`] and [`BUTTON_LEVEL`] stored.
pub fn booted_controller() -> (TestController, Rig) {
    let (channels, rig) = rig(MockEeprom::with_levels(EXTERNAL_LEVEL, BUTTON_LEVEL));
    let store = LevelStore::new(rig.eeprom.clone(), 0);
    let mut controller = LightController::new(channels, store, rig.transport.clone(), &NodeConfig::default());
    controller.boot();
    controller.process();
    rig.leds.clear();
    rig.transport.clear_statuses();
    (controller, rig)
}

/// Unstarted node with [`EXTERNAL_LEVEL`] and [`BUTTON_LEVEL`] stored.
pub fn node() -> (TestNode, Rig) {
    let (channels, rig) = rig(MockEeprom::with_levels(EXTERNAL_LEVEL, BUTTON_LEVEL));
    let node = KitchenNode::new(channels, rig.eeprom.clone(), rig.transport.clone(), NodeConfig::default());
    (node, rig)
}

/// Started node with all mocks' logs cleared.
pub fn started_node() -> (TestNode, Rig) {
    let (mut node, rig) = node();
    node.start();
    node.poll();
    rig.leds.clear();
    rig.transport.clear_statuses();
    (node, rig)
}

/// Live values of all four channels as `[R, G, B, W]`.
pub fn live(leds: &FaderLog) -> [u8; 4] {
    Channel::ALL.map(|channel| leds.value(channel))
}
