//! Pattern-table reader.
//!
//! Decodes the directory of stored animations that the flashing tool writes
//! into non-volatile memory. The reader works on a plain byte slice, so every
//! access is bounds checked and a short or garbage region produces an error
//! value instead of a stray read.
//!
//! ```text
//! offset 0:  pattern_count       (1 byte)
//! offset 1:  led_count           (1 byte)
//! offset 2 + i*9:
//!   +0: encoding                 (1 byte)
//!   +1: frame_data_offset        (4 bytes, big-endian, relative to end of entry table)
//!   +5: frame_count              (2 bytes, big-endian)
//!   +7: frame_delay              (2 bytes, big-endian, unused)
//! ```

use crate::config::{
    ENTRY_LEN, HEADER_LEN, LedCountPolicy, PlayerConfig, TABLE_MAGIC, TablePolicy,
};
use crate::types::{
    AnimationDescriptor, Encoding, FrameData, PatternEntry, PatternTableHeader, TableError,
};

/// Read-only view of a pattern table.
///
/// The reader is stateless: every query decodes straight from the borrowed
/// bytes, so it can be rebuilt or shared freely.
#[derive(Debug, Clone, Copy)]
pub struct PatternTable<'a> {
    bytes: &'a [u8],
    base: u32,
    magic: Option<[u8; 2]>,
    policy: TablePolicy,
    led_count: LedCountPolicy,
}

impl<'a> PatternTable<'a> {
    /// Creates a reader over `bytes`, where `bytes[0]` is the pattern count
    /// and `table_base` is the absolute address of that byte.
    ///
    /// A table created this way carries no magic bytes, so enabling
    /// [`TablePolicy::check_magic`] makes it read as absent.
    pub fn new(bytes: &'a [u8], table_base: u32, led_count: LedCountPolicy) -> Self {
        Self {
            bytes,
            base: table_base,
            magic: None,
            policy: TablePolicy::trusting(),
            led_count,
        }
    }

    /// Creates a reader over the whole animation region, which starts with
    /// the two magic bytes followed by the table.
    pub fn from_region(region: &'a [u8], region_base: u32, led_count: LedCountPolicy) -> Self {
        let magic = region.get(..TABLE_MAGIC.len()).and_then(|m| m.try_into().ok());
        let bytes = region.get(TABLE_MAGIC.len()..).unwrap_or(&[]);

        Self {
            bytes,
            base: region_base.wrapping_add(TABLE_MAGIC.len() as u32),
            magic,
            policy: TablePolicy::trusting(),
            led_count,
        }
    }

    /// Reader over the animation region with the LED-count and validation
    /// policies taken from `config`.
    pub fn from_config(region: &'a [u8], region_base: u32, config: &PlayerConfig) -> Self {
        Self::from_region(region, region_base, config.led_count).with_policy(config.table_policy)
    }

    /// Replaces the validation policy.
    pub fn with_policy(mut self, policy: TablePolicy) -> Self {
        self.policy = policy;
        self
    }

    /// Absolute address of the first table byte.
    pub fn base(&self) -> u32 {
        self.base
    }

    pub fn policy(&self) -> TablePolicy {
        self.policy
    }

    fn magic_rejected(&self) -> bool {
        self.policy.check_magic && self.magic != Some(TABLE_MAGIC)
    }

    /// Decodes the header, or `None` when the table is absent.
    pub fn header(&self) -> Option<PatternTableHeader> {
        if self.magic_rejected() {
            return None;
        }

        let [pattern_count, led_count] = self.read_array::<HEADER_LEN>(0).ok()?;
        Some(PatternTableHeader {
            pattern_count,
            led_count,
        })
    }

    /// Number of stored patterns; 0 when the table is absent.
    pub fn count(&self) -> u8 {
        self.header().map_or(0, |header| header.pattern_count)
    }

    /// LED count handed to the renderer, chosen by the configured policy.
    pub fn led_count(&self) -> u8 {
        match self.led_count {
            LedCountPolicy::Fixed(count) | LedCountPolicy::RequireMatch(count) => count,
            LedCountPolicy::Stored => self.header().map_or(0, |header| header.led_count),
        }
    }

    /// Offset of the first byte after the entry table.
    fn entries_end(&self) -> usize {
        HEADER_LEN + usize::from(self.count()) * ENTRY_LEN
    }

    fn check_index(&self, index: u16) -> Result<(), TableError> {
        let count = self.count();
        if index >= u16::from(count) {
            return Err(TableError::IndexOutOfRange { index, count });
        }
        Ok(())
    }

    /// Decodes the raw entry at `index`.
    pub fn entry(&self, index: u16) -> Result<PatternEntry, TableError> {
        self.check_index(index)?;

        let offset = HEADER_LEN + usize::from(index) * ENTRY_LEN;
        Ok(PatternEntry {
            encoding: Encoding::from(self.read_u8(offset)?),
            frame_data_offset: self.read_be_u32(offset + 1)?,
            frame_count: self.read_be_u16(offset + 5)?,
            frame_delay: self.read_be_u16(offset + 7)?,
        })
    }

    /// Builds the animation descriptor for the stored pattern at `index`.
    ///
    /// `index` must be strictly below [`count`](Self::count).
    pub fn load(&self, index: u16) -> Result<AnimationDescriptor, TableError> {
        let entry = self.entry(index)?;

        if let LedCountPolicy::RequireMatch(expected) = self.led_count {
            let stored = self.header().map_or(0, |header| header.led_count);
            if stored != expected {
                return Err(TableError::LedCountMismatch { stored, expected });
            }
        }

        if self.policy.reject_empty_frames && entry.frame_count == 0 {
            return Err(TableError::EmptyFrames { index });
        }

        if self.policy.reject_unknown_encoding && !entry.encoding.is_known() {
            return Err(TableError::UnknownEncoding {
                index,
                encoding: entry.encoding.into(),
            });
        }

        let relative = u32::try_from(self.entries_end())
            .ok()
            .and_then(|end| end.checked_add(entry.frame_data_offset))
            .ok_or(TableError::FrameDataOutOfBounds { index })?;

        if self.policy.check_frame_bounds && relative as usize >= self.bytes.len() {
            return Err(TableError::FrameDataOutOfBounds { index });
        }

        let address = self
            .base
            .checked_add(relative)
            .ok_or(TableError::FrameDataOutOfBounds { index })?;

        Ok(AnimationDescriptor {
            frame_count: entry.frame_count,
            frame_data: FrameData::Flash { address },
            encoding: entry.encoding,
            led_count: self.led_count(),
        })
    }

    /// Checks the whole table against the configured policy and reports the
    /// first problem found.
    pub fn validate(&self) -> Result<(), TableError> {
        if self.magic_rejected() {
            return Err(TableError::BadMagic);
        }

        let count = self.header().ok_or(TableError::Truncated { offset: 0 })?.pattern_count;
        for index in 0..u16::from(count) {
            self.load(index)?;
        }
        Ok(())
    }

    /// Frame bytes of a stored pattern, from its first byte to the end of
    /// the region. `None` for built-ins or addresses outside this table.
    pub fn frame_bytes(&self, descriptor: &AnimationDescriptor) -> Option<&'a [u8]> {
        let address = descriptor.flash_address()?;
        let offset = address.checked_sub(self.base)?;
        self.bytes.get(offset as usize..)
    }

    fn read_array<const N: usize>(&self, offset: usize) -> Result<[u8; N], TableError> {
        offset
            .checked_add(N)
            .and_then(|end| self.bytes.get(offset..end))
            .and_then(|slice| slice.try_into().ok())
            .ok_or(TableError::Truncated { offset })
    }

    fn read_u8(&self, offset: usize) -> Result<u8, TableError> {
        let [byte] = self.read_array::<1>(offset)?;
        Ok(byte)
    }

    fn read_be_u16(&self, offset: usize) -> Result<u16, TableError> {
        self.read_array(offset).map(u16::from_be_bytes)
    }

    fn read_be_u32(&self, offset: usize) -> Result<u32, TableError> {
        self.read_array(offset).map(u32::from_be_bytes)
    }
}
