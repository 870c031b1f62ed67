//! The single holder of the currently playing animation.

use crate::Pixel;
use crate::hal::Renderer;
use crate::types::AnimationDescriptor;

/// What the slot is currently playing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SlotContent {
    /// A built-in or stored animation.
    Pattern(AnimationDescriptor),

    /// The host-stream frame buffer.
    Stream,
}

/// Owns the renderer and the animation it is playing.
///
/// Every change is a destructive replace: there is no queue and no way back
/// to the previous animation other than selecting it again.
pub struct AnimationSlot<R: Renderer> {
    renderer: R,
    content: Option<SlotContent>,
    generation: u32,
}

impl<R: Renderer> AnimationSlot<R> {
    /// Creates an empty slot. Nothing is rendered until the first `set`.
    pub fn new(renderer: R) -> Self {
        Self {
            renderer,
            content: None,
            generation: 0,
        }
    }

    /// Replaces the active animation and restarts the renderer at frame 0.
    pub fn set(&mut self, descriptor: AnimationDescriptor) {
        self.renderer.init(&descriptor);
        self.content = Some(SlotContent::Pattern(descriptor));
        self.generation = self.generation.wrapping_add(1);
    }

    /// Makes the stream frame buffer the active animation.
    pub fn set_stream(&mut self) {
        self.renderer.begin_stream();
        self.content = Some(SlotContent::Stream);
        self.generation = self.generation.wrapping_add(1);
    }

    /// Descriptor being played, or `None` before the first `set` and while
    /// the stream is playing.
    pub fn active(&self) -> Option<&AnimationDescriptor> {
        match &self.content {
            Some(SlotContent::Pattern(descriptor)) => Some(descriptor),
            _ => None,
        }
    }

    pub fn content(&self) -> Option<&SlotContent> {
        self.content.as_ref()
    }

    /// Counter bumped on every replacement.
    pub fn generation(&self) -> u32 {
        self.generation
    }

    /// Passes host-stream bytes to the renderer's stream buffer, whatever is
    /// currently playing.
    pub fn feed_stream(&mut self, bytes: &[u8]) {
        self.renderer.feed_stream(bytes);
    }

    /// Renders the frame at `elapsed_ms`; empty while nothing is set.
    pub fn compute_step(&mut self, elapsed_ms: u64) -> &[Pixel] {
        if self.content.is_none() {
            return &[];
        }
        self.renderer.compute_step(elapsed_ms)
    }

    pub fn renderer(&self) -> &R {
        &self.renderer
    }
}
