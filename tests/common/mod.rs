//! Shared test infrastructure for tile-player integration tests

#![allow(dead_code)] // Items used across multiple test files; Rust analyzes per-file

use std::cell::{Cell, RefCell};
use std::collections::VecDeque;
use std::rc::Rc;
use std::vec::Vec;

use tile_player::{
    AnimationDescriptor, BootHandoff, Button, ButtonInput, DeviceMode, Encoding, OutputDriver,
    PIXEL_OFF, Pixel, Renderer, StreamInput, TimeDuration, TimeInstant, TimeSource, Watchdog,
};

// ============================================================================
// Logging
// ============================================================================

pub fn init_logger() {
    let _ = env_logger::builder().is_test(true).try_init();
}

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

/// Millisecond counter shared between the time source and the mocks that
/// simulate slow hardware.
#[derive(Debug, Clone, Default)]
pub struct Clock(Rc<Cell<u64>>);

impl Clock {
    pub fn now_ms(&self) -> u64 {
        self.0.get()
    }

    pub fn advance(&self, ms: u64) {
        self.0.set(self.0.get() + ms);
    }
}

/// Mock time source; optionally moves forward on every read so busy-wait
/// loops terminate.
pub struct MockTimeSource {
    clock: Clock,
    step_per_read: Cell<u64>,
}

impl MockTimeSource {
    pub fn new(clock: Clock) -> Self {
        Self {
            clock,
            step_per_read: Cell::new(0),
        }
    }

    pub fn with_step_per_read(clock: Clock, step_ms: u64) -> Self {
        Self {
            clock,
            step_per_read: Cell::new(step_ms),
        }
    }
}

impl TimeSource<TestInstant> for MockTimeSource {
    fn now(&self) -> TestInstant {
        let now = self.clock.now_ms();
        self.clock.advance(self.step_per_read.get());
        TestInstant(now)
    }
}

// ============================================================================
// Event Log
// ============================================================================

/// Side effects the loop has on the board, in order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Event {
    Configure(u32),
    Refresh,
    Show,
    StreamRead(usize),
    BootToken(u32),
    DisableInterrupts,
    DetachHostLink,
}

pub type EventLog = Rc<RefCell<Vec<Event>>>;

pub fn event_log() -> EventLog {
    Rc::new(RefCell::new(Vec::new()))
}

// ============================================================================
// Mock Renderer
// ============================================================================

/// Renderer that records what it was asked to play.
pub struct MockRenderer {
    pub inits: Vec<AnimationDescriptor>,
    pub stream_starts: u32,
    pub stream_bytes: Vec<u8>,
    pub steps: Vec<u64>,
    frame: [Pixel; 2],
}

impl MockRenderer {
    pub fn new() -> Self {
        Self {
            inits: Vec::new(),
            stream_starts: 0,
            stream_bytes: Vec::new(),
            steps: Vec::new(),
            frame: [PIXEL_OFF; 2],
        }
    }

    pub fn last_init(&self) -> Option<&AnimationDescriptor> {
        self.inits.last()
    }
}

impl Renderer for MockRenderer {
    fn init(&mut self, descriptor: &AnimationDescriptor) {
        self.inits.push(*descriptor);
        self.frame = [Pixel::new(descriptor.frame_count as u8, 0, 0), PIXEL_OFF];
    }

    fn begin_stream(&mut self) {
        self.stream_starts += 1;
    }

    fn feed_stream(&mut self, bytes: &[u8]) {
        self.stream_bytes.extend_from_slice(bytes);
    }

    fn compute_step(&mut self, elapsed_ms: u64) -> &[Pixel] {
        self.steps.push(elapsed_ms);
        &self.frame
    }
}

// ============================================================================
// Mock Output Driver
// ============================================================================

/// Output driver that takes `show_cost_ms` of simulated time per frame.
pub struct MockOutput {
    log: EventLog,
    clock: Clock,
    show_cost_ms: u64,
    frame_history: heapless::Vec<Pixel, 64>,
}

impl MockOutput {
    pub fn new(log: EventLog, clock: Clock, show_cost_ms: u64) -> Self {
        Self {
            log,
            clock,
            show_cost_ms,
            frame_history: heapless::Vec::new(),
        }
    }

    /// First pixel of every frame shown so far (up to 64).
    pub fn first_pixels(&self) -> &[Pixel] {
        &self.frame_history
    }
}

impl OutputDriver for MockOutput {
    fn show(&mut self, frame: &[Pixel]) {
        self.clock.advance(self.show_cost_ms);
        self.log.borrow_mut().push(Event::Show);
        if let Some(first) = frame.first() {
            let _ = self.frame_history.push(*first);
        }
    }
}

// ============================================================================
// Mock Platform
// ============================================================================

/// Board mock: watchdog, button, host stream, mode flag and handoff.
pub struct MockPlatform {
    log: EventLog,
    clock: Clock,
    press: Option<Button>,
    stream: VecDeque<u8>,
    read_cost_ms: u64,
    read_limit: usize,
    update_after_polls: Option<u32>,
    polls: Cell<u32>,
}

impl MockPlatform {
    pub fn new(log: EventLog, clock: Clock) -> Self {
        Self {
            log,
            clock,
            press: None,
            stream: VecDeque::new(),
            read_cost_ms: 0,
            read_limit: usize::MAX,
            update_after_polls: None,
            polls: Cell::new(0),
        }
    }

    /// Each `read` takes `cost_ms` and returns at most `limit` bytes.
    pub fn with_slow_reads(mut self, cost_ms: u64, limit: usize) -> Self {
        self.read_cost_ms = cost_ms;
        self.read_limit = limit;
        self
    }

    /// The mode flag reads "update requested" from poll number `polls` on.
    pub fn request_update_after(mut self, polls: u32) -> Self {
        self.update_after_polls = Some(polls);
        self
    }

    pub fn press(&mut self, button: Button) {
        self.press = Some(button);
    }

    pub fn send(&mut self, bytes: &[u8]) {
        self.stream.extend(bytes.iter().copied());
    }

    pub fn pending_stream_bytes(&self) -> usize {
        self.stream.len()
    }
}

impl Watchdog for MockPlatform {
    fn configure(&mut self, timeout_ticks: u32) {
        self.log.borrow_mut().push(Event::Configure(timeout_ticks));
    }

    fn refresh(&mut self) {
        self.log.borrow_mut().push(Event::Refresh);
    }
}

impl ButtonInput for MockPlatform {
    fn take_press(&mut self) -> Option<Button> {
        self.press.take()
    }
}

impl StreamInput for MockPlatform {
    fn available(&self) -> usize {
        self.stream.len()
    }

    fn read(&mut self, buf: &mut [u8]) -> usize {
        let count = buf.len().min(self.read_limit).min(self.stream.len());
        for (slot, byte) in buf.iter_mut().zip(self.stream.drain(..count)) {
            *slot = byte;
        }
        self.clock.advance(self.read_cost_ms);
        self.log.borrow_mut().push(Event::StreamRead(count));
        count
    }
}

impl DeviceMode for MockPlatform {
    fn update_requested(&self) -> bool {
        let polls = self.polls.get();
        self.polls.set(polls + 1);
        self.update_after_polls.is_some_and(|after| polls >= after)
    }
}

impl BootHandoff for MockPlatform {
    fn write_boot_token(&mut self, token: u32) {
        self.log.borrow_mut().push(Event::BootToken(token));
    }

    fn disable_interrupts(&mut self) {
        self.log.borrow_mut().push(Event::DisableInterrupts);
    }

    fn detach_host_link(&mut self) {
        self.log.borrow_mut().push(Event::DetachHostLink);
    }

    fn wait_for_reset(&mut self) -> ! {
        panic!("watchdog reset");
    }
}

// ============================================================================
// Tables and Built-ins
// ============================================================================

pub const TABLE_BASE: u32 = 0xA002;

/// Two patterns for 30 LEDs: `[1, off 0, 5 frames]` and `[2, off 20, 3 frames]`.
#[rustfmt::skip]
pub const TWO_PATTERNS: [u8; 20] = [
    2, 30,
    1, 0, 0, 0, 0,  0, 5, 0, 0,
    2, 0, 0, 0, 20, 0, 3, 0, 0,
];

/// Builds a table of `count` entries, each with `frame_count = index + 1`
/// and frame data `16 * index` bytes after the entry table, followed by
/// enough frame bytes for the last entry.
pub fn table_bytes(count: u8, led_count: u8) -> Vec<u8> {
    let mut bytes = vec![count, led_count];
    for index in 0..u32::from(count) {
        bytes.push(0);
        bytes.extend_from_slice(&(index * 16).to_be_bytes());
        bytes.extend_from_slice(&((index + 1) as u16).to_be_bytes());
        bytes.extend_from_slice(&0u16.to_be_bytes());
    }
    bytes.resize(bytes.len() + usize::from(count) * 16, 0xAA);
    bytes
}

pub static BOOT_FRAMES: [u8; 3] = [0x10, 0x20, 0x30];
pub static SPARKLE_FRAMES: [u8; 6] = [0xFF; 6];

pub const BOOT: AnimationDescriptor =
    AnimationDescriptor::builtin(&BOOT_FRAMES, 1, Encoding::Rgb24, 1);
pub const EMPTY: AnimationDescriptor = AnimationDescriptor::builtin(&[], 0, Encoding::Rgb24, 1);
pub const SPARKLE: AnimationDescriptor =
    AnimationDescriptor::builtin(&SPARKLE_FRAMES, 2, Encoding::Rgb24, 1);
