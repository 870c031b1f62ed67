//! Animations compiled into the firmware.

use crate::types::AnimationDescriptor;
use heapless::Vec;

/// Catalog construction errors.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum CatalogError {
    /// No animations provided; built-in 0 is the boot animation.
    Empty,

    /// More animations than the catalog capacity.
    CapacityExceeded,
}

impl core::fmt::Display for CatalogError {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            CatalogError::Empty => write!(f, "built-in catalog needs at least one animation"),
            CatalogError::CapacityExceeded => write!(f, "built-in catalog capacity exceeded"),
        }
    }
}

#[cfg(feature = "std")]
impl std::error::Error for CatalogError {}

/// Fixed-capacity list of built-in animations.
///
/// Always holds at least one entry: index 0 is what the device plays at boot.
#[derive(Debug, Clone)]
pub struct BuiltinCatalog<const N: usize> {
    animations: Vec<AnimationDescriptor, N>,
}

impl<const N: usize> BuiltinCatalog<N> {
    /// Builds a catalog from `animations`, in playback order.
    pub fn new(animations: &[AnimationDescriptor]) -> Result<Self, CatalogError> {
        if animations.is_empty() {
            return Err(CatalogError::Empty);
        }

        let mut list = Vec::new();
        for animation in animations {
            list.push(*animation).map_err(|_| CatalogError::CapacityExceeded)?;
        }

        Ok(Self { animations: list })
    }

    /// Boot animation.
    pub fn default_animation(&self) -> &AnimationDescriptor {
        &self.animations[0]
    }

    pub fn get(&self, index: u8) -> Option<&AnimationDescriptor> {
        self.animations.get(usize::from(index))
    }

    pub fn len(&self) -> usize {
        self.animations.len()
    }

    /// Returns true when the catalog holds no animations, which
    /// [`new`](Self::new) never produces.
    pub fn is_empty(&self) -> bool {
        self.animations.is_empty()
    }

    /// Next built-in after `current` that has at least one frame, wrapping
    /// around. Returns `None` when no built-in has frames.
    pub fn next_playable(&self, current: u8) -> Option<u8> {
        let len = self.animations.len();
        (1..=len)
            .map(|step| (usize::from(current) + step) % len)
            .find(|&index| self.animations[index].frame_count > 0)
            .and_then(|index| u8::try_from(index).ok())
    }
}
