//! Player configuration and firmware constants.

/// Start of the animation region in flash.
pub const ANIMATION_REGION_BASE: u32 = 0xA000;

/// Magic bytes expected at the start of the animation region.
pub const TABLE_MAGIC: [u8; 2] = [0x31, 0x23];

/// Header length in bytes (`pattern_count`, `led_count`).
pub const HEADER_LEN: usize = 2;

/// Entry length in bytes.
pub const ENTRY_LEN: usize = 9;

/// Token left in reserved RAM to make the bootloader stay in DFU mode.
pub const DFU_BOOT_TOKEN: u32 = 0x7462_4346;

/// Time given to the host to see the DFU_DETACH response before detaching.
pub const HANDOFF_DELAY_MS: u64 = 10;

/// Watchdog period the loop is designed around.
pub const WATCHDOG_TIMEOUT_MS: u64 = 500;

/// Watchdog reload value for a clock running at `bus_clock_hz`.
///
/// Half a second worth of bus cycles.
pub const fn watchdog_timeout_ticks(bus_clock_hz: u32) -> u32 {
    bus_clock_hz / 2
}

/// How the LED count handed to the renderer is chosen.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum LedCountPolicy {
    /// Use the compiled-in count and ignore the header.
    Fixed(u8),

    /// Trust the count stored in the table header.
    Stored,

    /// Use the compiled-in count and refuse tables built for another count.
    RequireMatch(u8),
}

/// Which checks the pattern-table reader performs.
///
/// The default trusts the flashing tool and checks nothing beyond the
/// bounds of the region itself.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct TablePolicy {
    /// Require [`TABLE_MAGIC`] in front of the table.
    pub check_magic: bool,

    /// Require frame data to start inside the region.
    pub check_frame_bounds: bool,

    /// Reject entries with a zero frame count.
    pub reject_empty_frames: bool,

    /// Reject entries whose encoding is not known.
    pub reject_unknown_encoding: bool,
}

impl TablePolicy {
    /// No content validation.
    pub const fn trusting() -> Self {
        Self {
            check_magic: false,
            check_frame_bounds: false,
            reject_empty_frames: false,
            reject_unknown_encoding: false,
        }
    }

    /// Every check enabled.
    pub const fn strict() -> Self {
        Self {
            check_magic: true,
            check_frame_bounds: true,
            reject_empty_frames: true,
            reject_unknown_encoding: true,
        }
    }
}

impl Default for TablePolicy {
    fn default() -> Self {
        Self::trusting()
    }
}

/// What button A does when there are no stored patterns.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ButtonFallback {
    /// Report `EmptyTable` and keep the current animation.
    #[default]
    None,

    /// Step through the built-in animations instead.
    CycleBuiltins,
}

/// Complete player configuration.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PlayerConfig {
    /// Checks applied when reading the pattern table.
    pub table_policy: TablePolicy,

    /// Where the renderer's LED count comes from.
    pub led_count: LedCountPolicy,

    /// What button A does with no stored patterns.
    pub button_fallback: ButtonFallback,

    /// Watchdog period in milliseconds, used to flag late refreshes.
    pub watchdog_timeout_ms: u64,

    /// Watchdog reload value programmed at start, in watchdog clock ticks.
    pub watchdog_timeout_ticks: u32,

    /// Wait between writing the boot token and detaching the host link.
    pub handoff_delay_ms: u64,

    /// Stream chunks drained per tick at most; 0 drains until empty.
    pub max_stream_chunks_per_tick: usize,
}

impl PlayerConfig {
    /// Default configuration for a device with `led_count` LEDs and a bus
    /// clock of `bus_clock_hz`.
    pub const fn new(led_count: u8, bus_clock_hz: u32) -> Self {
        Self {
            table_policy: TablePolicy::trusting(),
            led_count: LedCountPolicy::Fixed(led_count),
            button_fallback: ButtonFallback::None,
            watchdog_timeout_ms: WATCHDOG_TIMEOUT_MS,
            watchdog_timeout_ticks: watchdog_timeout_ticks(bus_clock_hz),
            handoff_delay_ms: HANDOFF_DELAY_MS,
            max_stream_chunks_per_tick: 64,
        }
    }

    pub const fn with_table_policy(mut self, policy: TablePolicy) -> Self {
        self.table_policy = policy;
        self
    }

    pub const fn with_led_count_policy(mut self, policy: LedCountPolicy) -> Self {
        self.led_count = policy;
        self
    }

    pub const fn with_button_fallback(mut self, fallback: ButtonFallback) -> Self {
        self.button_fallback = fallback;
        self
    }

    pub const fn with_handoff_delay_ms(mut self, delay_ms: u64) -> Self {
        self.handoff_delay_ms = delay_ms;
        self
    }

    /// Caps how many stream chunks one tick may drain. Zero means unbounded;
    /// the drain still refreshes the watchdog after every chunk.
    pub const fn with_max_stream_chunks_per_tick(mut self, chunks: usize) -> Self {
        self.max_stream_chunks_per_tick = chunks;
        self
    }
}

impl Default for PlayerConfig {
    fn default() -> Self {
        Self::new(10, 48_000_000)
    }
}
