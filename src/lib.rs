#![cfg_attr(not(feature = "std"), no_std)]
#![doc = include_str!("../README.md")]

//! # Core Concepts
//!
//! - **`PatternTable`**: Decodes the stored-pattern directory in non-volatile memory
//! - **`AnimationDescriptor`**: Everything the renderer needs to play one animation
//! - **`BuiltinCatalog`**: Animations compiled into the firmware; entry 0 plays at boot
//! - **`AnimationSlot`**: The single holder of the animation currently playing
//! - **`SelectionController`**: Chooses between built-in, stored and streamed animations
//! - **`Supervisor`**: The watchdog-supervised main loop and bootloader handoff
//! - **`Renderer`**, **`OutputDriver`**, **`Platform`**: Traits to implement for your board
//! - **`TimeSource`**: Trait to implement for your monotonic clock
//!
//! Frames are slices of [`Pixel`] (`Srgb<u8>`); convert them to your LED
//! driver's wire format in your `OutputDriver`.

pub use palette::Srgb;

pub mod builtin;
pub mod config;
pub mod controller;
pub mod hal;
pub mod slot;
pub mod supervisor;
pub mod table;
pub mod time;
pub mod types;

pub use builtin::{BuiltinCatalog, CatalogError};
pub use config::{ButtonFallback, LedCountPolicy, PlayerConfig, TablePolicy};
pub use controller::{SelectionController, SelectionState, TickDecisions, Triggers};
pub use hal::{
    BootHandoff, Button, ButtonInput, DeviceMode, OutputDriver, Platform, Renderer, StreamInput,
    Watchdog,
};
pub use slot::{AnimationSlot, SlotContent};
pub use supervisor::{Supervisor, TickReport};
pub use table::PatternTable;
pub use time::{Deadline, TimeDuration, TimeInstant, TimeSource};
pub use types::{
    AnimationDescriptor, Encoding, FrameData, PatternEntry, PatternTableHeader, TableError,
};

/// One LED's color as handed to the output driver.
pub type Pixel = Srgb<u8>;

/// All LEDs off.
pub const PIXEL_OFF: Pixel = Pixel::new(0, 0, 0);
