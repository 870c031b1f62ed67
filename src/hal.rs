//! Interfaces to the parts of the device that live outside the player core.
//!
//! Board support code implements these for its hardware; tests implement
//! them with recording mocks.

use crate::Pixel;
use crate::types::AnimationDescriptor;

/// Turns the active animation into frames.
///
/// The renderer owns the decoding state for every encoding it supports and a
/// separate single-frame buffer for host-stream data.
pub trait Renderer {
    /// Starts playing `descriptor` from frame 0, discarding the previous
    /// animation state.
    fn init(&mut self, descriptor: &AnimationDescriptor);

    /// Switches to the stream frame buffer. Stream bytes already received
    /// stay in place.
    fn begin_stream(&mut self);

    /// Feeds host-stream bytes into the stream frame buffer. Framing is the
    /// renderer's business; bytes may arrive split at any point.
    fn feed_stream(&mut self, bytes: &[u8]);

    /// Computes the frame for `elapsed_ms` since the animation was set.
    fn compute_step(&mut self, elapsed_ms: u64) -> &[Pixel];
}

/// Pushes frames to the physical LEDs.
pub trait OutputDriver {
    /// Shows `frame`. May be slow; the caller refreshes the watchdog around
    /// it. Handle hardware errors internally - this method cannot fail.
    fn show(&mut self, frame: &[Pixel]);
}

/// Hardware watchdog.
pub trait Watchdog {
    /// Programs the timeout, in watchdog clock ticks.
    fn configure(&mut self, timeout_ticks: u32);

    /// Restarts the timeout window.
    fn refresh(&mut self);
}

/// Physical buttons after debouncing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Button {
    /// Steps to the next stored pattern.
    A,

    /// Not used for selection.
    B,
}

/// Debounced button edges.
pub trait ButtonInput {
    /// Returns the button pressed since the last poll, if any.
    fn take_press(&mut self) -> Option<Button>;
}

/// Host-link byte stream.
pub trait StreamInput {
    /// Bytes that can be read right now without blocking.
    fn available(&self) -> usize;

    /// Reads up to `buf.len()` immediately available bytes, returning how
    /// many were read.
    fn read(&mut self, buf: &mut [u8]) -> usize;
}

/// Device-mode flag set by the host link.
pub trait DeviceMode {
    /// True once the host has asked for a firmware update.
    fn update_requested(&self) -> bool;
}

/// Low-level steps of the reboot into the update bootloader.
pub trait BootHandoff {
    /// Stores `token` in the reserved RAM word the bootloader inspects.
    fn write_boot_token(&mut self, token: u32);

    fn disable_interrupts(&mut self);

    /// Deasserts the host-link control register.
    fn detach_host_link(&mut self);

    /// Spins until the watchdog resets the device.
    fn wait_for_reset(&mut self) -> !;
}

/// Everything the supervisor needs from the board besides rendering.
pub trait Platform: Watchdog + ButtonInput + StreamInput + DeviceMode + BootHandoff {}

impl<T> Platform for T where T: Watchdog + ButtonInput + StreamInput + DeviceMode + BootHandoff {}
