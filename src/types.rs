//! Pattern-table records, animation descriptors and table errors.

/// Decoded pattern-table header.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct PatternTableHeader {
    /// Number of entries that follow the header.
    pub pattern_count: u8,

    /// LED count the stored patterns were authored for.
    pub led_count: u8,
}

/// One raw 9-byte entry of the pattern table.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct PatternEntry {
    /// Frame encoding byte.
    pub encoding: Encoding,

    /// Offset of the frame data, relative to the end of the entry table.
    pub frame_data_offset: u32,

    /// Number of frames.
    pub frame_count: u16,

    /// Per-frame delay. Decoded but not used by the player.
    pub frame_delay: u16,
}

/// Frame encodings understood by the renderer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Encoding {
    /// Three bytes per pixel.
    Rgb24,

    /// Run-length encoded RGB565.
    Rgb565Rle,

    /// Palette indices.
    Indexed,

    /// Run-length encoded palette indices.
    IndexedRle,

    /// Any other value; passed through to the renderer untouched.
    Unknown(u8),
}

impl Encoding {
    /// Returns true for encodings the renderer is known to support.
    pub fn is_known(&self) -> bool {
        !matches!(self, Encoding::Unknown(_))
    }
}

impl From<u8> for Encoding {
    fn from(raw: u8) -> Self {
        match raw {
            0 => Encoding::Rgb24,
            1 => Encoding::Rgb565Rle,
            2 => Encoding::Indexed,
            3 => Encoding::IndexedRle,
            other => Encoding::Unknown(other),
        }
    }
}

impl From<Encoding> for u8 {
    fn from(encoding: Encoding) -> Self {
        match encoding {
            Encoding::Rgb24 => 0,
            Encoding::Rgb565Rle => 1,
            Encoding::Indexed => 2,
            Encoding::IndexedRle => 3,
            Encoding::Unknown(raw) => raw,
        }
    }
}

/// Where an animation's frame bytes live.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FrameData {
    /// Absolute address in non-volatile memory.
    Flash {
        /// Address of the first frame byte.
        address: u32,
    },

    /// Frames compiled into the firmware image.
    Firmware(&'static [u8]),
}

/// Everything the renderer needs to play one animation.
///
/// Descriptors are never mutated: a selection change builds a new one and
/// replaces the old one in the slot.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AnimationDescriptor {
    /// Number of frames to play.
    pub frame_count: u16,

    /// Where the first frame starts.
    pub frame_data: FrameData,

    /// How the frames are encoded.
    pub encoding: Encoding,

    /// Number of LEDs each frame drives.
    pub led_count: u8,
}

impl AnimationDescriptor {
    /// Describes an animation whose frames are compiled into the firmware.
    pub const fn builtin(
        frames: &'static [u8],
        frame_count: u16,
        encoding: Encoding,
        led_count: u8,
    ) -> Self {
        Self {
            frame_count,
            frame_data: FrameData::Firmware(frames),
            encoding,
            led_count,
        }
    }

    /// Absolute frame-data address for stored patterns.
    pub fn flash_address(&self) -> Option<u32> {
        match self.frame_data {
            FrameData::Flash { address } => Some(address),
            FrameData::Firmware(_) => None,
        }
    }
}

/// Pattern-table errors.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum TableError {
    /// Requested index is not below the stored pattern count.
    IndexOutOfRange { index: u16, count: u8 },

    /// No stored patterns available.
    EmptyTable,

    /// A read would run past the end of the region.
    Truncated { offset: usize },

    /// Region does not start with the expected magic bytes.
    BadMagic,

    /// Frame data of the entry starts outside the region.
    FrameDataOutOfBounds { index: u16 },

    /// Entry declares zero frames.
    EmptyFrames { index: u16 },

    /// Entry uses an encoding the renderer does not know.
    UnknownEncoding { index: u16, encoding: u8 },

    /// Header LED count differs from the wired LED count.
    LedCountMismatch { stored: u8, expected: u8 },
}

impl core::fmt::Display for TableError {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            TableError::IndexOutOfRange { index, count } => {
                write!(f, "pattern index {} out of range (count is {})", index, count)
            }
            TableError::EmptyTable => write!(f, "pattern table is empty"),
            TableError::Truncated { offset } => {
                write!(f, "pattern table truncated at offset {}", offset)
            }
            TableError::BadMagic => write!(f, "pattern table magic mismatch"),
            TableError::FrameDataOutOfBounds { index } => {
                write!(f, "frame data of pattern {} lies outside the region", index)
            }
            TableError::EmptyFrames { index } => {
                write!(f, "pattern {} has no frames", index)
            }
            TableError::UnknownEncoding { index, encoding } => {
                write!(f, "pattern {} uses unknown encoding {}", index, encoding)
            }
            TableError::LedCountMismatch { stored, expected } => {
                write!(
                    f,
                    "pattern table built for {} LEDs, device has {}",
                    stored, expected
                )
            }
        }
    }
}

#[cfg(feature = "std")]
impl std::error::Error for TableError {}
