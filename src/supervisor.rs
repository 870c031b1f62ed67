//! Cooperative main loop.
//!
//! Runs one tick at a time under the hardware watchdog and hands over to the
//! update bootloader when the host asks for it. Every point in a tick that
//! can take a while is bracketed by a watchdog refresh, and every refresh is
//! timed so the worst gap can be checked against the watchdog period.

use crate::builtin::BuiltinCatalog;
use crate::config::{DFU_BOOT_TOKEN, PlayerConfig};
use crate::controller::{SelectionController, SelectionState, TickDecisions, Triggers};
use crate::hal::{OutputDriver, Platform, Renderer};
use crate::slot::AnimationSlot;
use crate::table::PatternTable;
use crate::time::{Deadline, TimeDuration, TimeInstant, TimeSource};

/// Bytes moved from the host link per drain step.
pub const STREAM_CHUNK_LEN: usize = 64;

/// Summary of one tick.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TickReport {
    /// Selection decisions taken at the start of the tick.
    pub decisions: TickDecisions,
    /// Stream bytes drained at the end of the tick.
    pub stream_bytes: usize,
}

/// Owns the selection state, the slot and the board, and drives them.
///
/// # Type Parameters
/// * `'a` - Lifetime of the pattern table bytes and the time source
/// * `I` - Time instant type
/// * `T` - Time source implementation type
/// * `R` - Renderer implementation type
/// * `O` - Output driver implementation type
/// * `P` - Platform (watchdog, inputs, mode flag, handoff) implementation type
/// * `N` - Built-in catalog capacity
pub struct Supervisor<'a, I, T, R, O, P, const N: usize>
where
    I: TimeInstant,
    T: TimeSource<I>,
    R: Renderer,
    O: OutputDriver,
    P: Platform,
{
    config: PlayerConfig,
    table: PatternTable<'a>,
    controller: SelectionController<N>,
    slot: AnimationSlot<R>,
    output: O,
    platform: P,
    time_source: &'a T,
    pending: Triggers,
    animation_generation: u32,
    animation_start: I,
    last_refresh: I,
    max_refresh_gap_ms: u64,
    ticks: u32,
}

impl<'a, I, T, R, O, P, const N: usize> Supervisor<'a, I, T, R, O, P, N>
where
    I: TimeInstant,
    T: TimeSource<I>,
    R: Renderer,
    O: OutputDriver,
    P: Platform,
{
    /// Wires the loop together. Nothing touches the hardware until
    /// [`start`](Self::start).
    pub fn new(
        config: PlayerConfig,
        table: PatternTable<'a>,
        builtins: BuiltinCatalog<N>,
        renderer: R,
        output: O,
        platform: P,
        time_source: &'a T,
    ) -> Self {
        let now = time_source.now();

        Self {
            config,
            table,
            controller: SelectionController::new(builtins, config.button_fallback),
            slot: AnimationSlot::new(renderer),
            output,
            platform,
            time_source,
            pending: Triggers::default(),
            animation_generation: 0,
            animation_start: now,
            last_refresh: now,
            max_refresh_gap_ms: 0,
            ticks: 0,
        }
    }

    /// Programs the watchdog and boots the selection controller. Refresh gaps
    /// are measured from here on.
    pub fn start(&mut self) {
        self.platform.configure(self.config.watchdog_timeout_ticks);
        self.last_refresh = self.time_source.now();
        self.refresh_watchdog();
        self.controller.boot(&mut self.slot);
    }

    /// Runs one tick: select, render, show, then poll inputs for the next
    /// tick.
    pub fn tick(&mut self) -> TickReport {
        self.refresh_watchdog();

        let triggers = core::mem::take(&mut self.pending);
        let decisions = self.controller.evaluate(triggers, &self.table, &mut self.slot);

        self.render();
        let stream_bytes = self.poll_inputs();

        self.ticks = self.ticks.wrapping_add(1);
        TickReport {
            decisions,
            stream_bytes,
        }
    }

    /// Ticks until the device-mode flag asks for a firmware update.
    /// Returns the number of ticks run.
    pub fn run_until_update_requested(&mut self) -> u32 {
        let first = self.ticks;
        while !self.platform.update_requested() {
            self.tick();
        }
        let ticks = self.ticks.wrapping_sub(first);

        log::info!("update requested after {} ticks", ticks);
        ticks
    }

    /// Everything of the bootloader handoff short of the final spin: leave
    /// the boot token, give the host time to see the detach response while
    /// keeping the watchdog fed, then cut interrupts and the host link.
    pub fn prepare_handoff(&mut self) {
        self.platform.write_boot_token(DFU_BOOT_TOKEN);

        let deadline = Deadline::after(self.time_source.now(), self.config.handoff_delay_ms);
        while !deadline.has_passed(self.time_source.now()) {
            self.refresh_watchdog();
        }

        self.platform.disable_interrupts();
        self.platform.detach_host_link();
    }

    /// Boots, plays until an update is requested, then reboots into the
    /// bootloader by starving the watchdog.
    pub fn run(mut self) -> ! {
        self.start();
        self.run_until_update_requested();
        self.prepare_handoff();
        self.platform.wait_for_reset()
    }

    fn render(&mut self) {
        let now = self.time_source.now();
        if self.slot.generation() != self.animation_generation {
            self.animation_generation = self.slot.generation();
            self.animation_start = now;
        }
        let elapsed_ms = now.duration_since(self.animation_start).as_millis();

        self.refresh_watchdog();
        let frame = self.slot.compute_step(elapsed_ms);
        self.output.show(frame);
        self.refresh_watchdog();
    }

    /// Latches the next button edge and drains whatever the host has sent.
    fn poll_inputs(&mut self) -> usize {
        self.pending.button = self.platform.take_press();

        let mut buf = [0u8; STREAM_CHUNK_LEN];
        let mut drained = 0;
        let mut chunks = 0;

        while self.platform.available() > 0 {
            let read = self.platform.read(&mut buf);
            if read == 0 {
                break;
            }

            self.slot.feed_stream(&buf[..read]);
            self.pending.stream_active = true;
            drained += read;
            chunks += 1;
            self.refresh_watchdog();

            let limit = self.config.max_stream_chunks_per_tick;
            if limit != 0 && chunks >= limit {
                break;
            }
        }

        drained
    }

    fn refresh_watchdog(&mut self) {
        let now = self.time_source.now();
        let gap = now.duration_since(self.last_refresh).as_millis();

        if gap > self.max_refresh_gap_ms {
            self.max_refresh_gap_ms = gap;
        }
        if gap >= self.config.watchdog_timeout_ms {
            log::warn!(
                "watchdog refreshed {} ms after the previous refresh (timeout {} ms)",
                gap,
                self.config.watchdog_timeout_ms
            );
        }

        self.platform.refresh();
        self.last_refresh = now;
    }

    pub fn state(&self) -> SelectionState {
        self.controller.state()
    }

    pub fn controller(&self) -> &SelectionController<N> {
        &self.controller
    }

    pub fn slot(&self) -> &AnimationSlot<R> {
        &self.slot
    }

    pub fn table(&self) -> &PatternTable<'a> {
        &self.table
    }

    pub fn output(&self) -> &O {
        &self.output
    }

    pub fn platform(&self) -> &P {
        &self.platform
    }

    pub fn platform_mut(&mut self) -> &mut P {
        &mut self.platform
    }

    /// Longest time seen between two consecutive watchdog refreshes.
    pub fn max_refresh_gap_ms(&self) -> u64 {
        self.max_refresh_gap_ms
    }

    /// Ticks run since construction.
    pub fn ticks(&self) -> u32 {
        self.ticks
    }
}
