//! Animation selection state machine.
//!
//! Decides which source owns the [`AnimationSlot`]: the boot-time built-in,
//! a stored pattern chosen with button A, or the host stream. Triggers are
//! applied in a fixed order each tick (reload, button, stream), so a stream
//! burst always wins the tick it shows up in.

use crate::builtin::BuiltinCatalog;
use crate::config::ButtonFallback;
use crate::hal::{Button, Renderer};
use crate::slot::AnimationSlot;
use crate::table::PatternTable;
use crate::types::TableError;

/// Which source currently owns the slot.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum SelectionState {
    /// Not booted yet.
    Idle,
    /// Playing the built-in animation at this index.
    PlayingBuiltin(u8),
    /// Playing the stored pattern at this index.
    PlayingStored(u16),
    /// Playing host-stream data.
    PlayingStream,
}

/// Inputs gathered by the supervisor since the previous evaluation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Triggers {
    /// Button edge seen since the last poll.
    pub button: Option<Button>,
    /// Stream bytes were available at the last poll.
    pub stream_active: bool,
}

/// What one evaluation did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TickDecisions {
    /// Outcome of the pending reload, if one ran.
    pub reload: Option<Result<(), TableError>>,
    /// Outcome of the button press, if one was handled.
    pub button: Option<Result<(), TableError>>,
    /// The stream took over (or kept) the slot.
    pub stream: bool,
    /// State after all triggers were applied.
    pub state: SelectionState,
}

/// Owns the selection state and the built-in catalog.
pub struct SelectionController<const N: usize> {
    state: SelectionState,
    reload_requested: bool,
    cursor: u16,
    builtin_cursor: u8,
    builtins: BuiltinCatalog<N>,
    fallback: ButtonFallback,
}

impl<const N: usize> SelectionController<N> {
    /// Creates an idle controller.
    pub fn new(builtins: BuiltinCatalog<N>, fallback: ButtonFallback) -> Self {
        Self {
            state: SelectionState::Idle,
            reload_requested: false,
            cursor: 0,
            builtin_cursor: 0,
            builtins,
            fallback,
        }
    }

    /// Plays built-in 0 and schedules the first stored-pattern scan for the
    /// next evaluation.
    pub fn boot<R: Renderer>(&mut self, slot: &mut AnimationSlot<R>) {
        slot.set(*self.builtins.default_animation());
        self.state = SelectionState::PlayingBuiltin(0);
        self.builtin_cursor = 0;
        self.cursor = 0;
        self.reload_requested = true;

        log::info!("boot: playing built-in 0");
    }

    pub fn state(&self) -> SelectionState {
        self.state
    }

    pub fn reload_pending(&self) -> bool {
        self.reload_requested
    }

    /// Index button A advances from.
    pub fn cursor(&self) -> u16 {
        self.cursor
    }

    pub fn builtins(&self) -> &BuiltinCatalog<N> {
        &self.builtins
    }

    /// Applies all triggers in order: pending reload, button, stream.
    pub fn evaluate<R: Renderer>(
        &mut self,
        triggers: Triggers,
        table: &PatternTable<'_>,
        slot: &mut AnimationSlot<R>,
    ) -> TickDecisions {
        let reload = self.on_reload(table, slot);
        let button = triggers
            .button
            .and_then(|button| self.on_button(button, table, slot));

        if triggers.stream_active {
            self.on_stream_activity(slot);
        }

        TickDecisions {
            reload,
            button,
            stream: triggers.stream_active,
            state: self.state,
        }
    }

    /// Runs the pending stored-pattern scan. Returns `None` when no reload
    /// is pending.
    ///
    /// The request is cleared whatever the outcome; with an empty table the
    /// current animation keeps playing and `EmptyTable` is reported.
    pub fn on_reload<R: Renderer>(
        &mut self,
        table: &PatternTable<'_>,
        slot: &mut AnimationSlot<R>,
    ) -> Option<Result<(), TableError>> {
        if !self.reload_requested {
            return None;
        }

        self.reload_requested = false;
        self.cursor = 0;

        let result = self.play_stored(0, table, slot);
        if let Err(err) = result {
            log::debug!("reload: no stored pattern played ({})", err);
        }
        Some(result)
    }

    /// Handles a debounced button edge. Returns `None` for buttons that do
    /// not drive selection.
    ///
    /// Button A moves the cursor to the next stored pattern, wrapping at the
    /// stored count. The cursor moves even if that pattern fails to load, in
    /// which case the previous animation keeps playing.
    pub fn on_button<R: Renderer>(
        &mut self,
        button: Button,
        table: &PatternTable<'_>,
        slot: &mut AnimationSlot<R>,
    ) -> Option<Result<(), TableError>> {
        if button != Button::A {
            return None;
        }

        let count = u16::from(table.count());
        if count == 0 {
            let result = match self.fallback {
                ButtonFallback::None => Err(TableError::EmptyTable),
                ButtonFallback::CycleBuiltins => self.play_next_builtin(slot),
            };
            return Some(result);
        }

        let next = (self.cursor + 1) % count;
        self.cursor = next;

        let result = self.play_stored(next, table, slot);
        if let Err(err) = result {
            log::warn!("button: pattern {} not loaded ({})", next, err);
        }
        Some(result)
    }

    /// Hands the slot to the stream. Stays there until a later reload or
    /// button press picks something else; an idle stream changes nothing.
    pub fn on_stream_activity<R: Renderer>(&mut self, slot: &mut AnimationSlot<R>) {
        if self.state == SelectionState::PlayingStream {
            return;
        }

        slot.set_stream();
        self.state = SelectionState::PlayingStream;
        log::debug!("stream: taking over slot");
    }

    fn play_stored<R: Renderer>(
        &mut self,
        index: u16,
        table: &PatternTable<'_>,
        slot: &mut AnimationSlot<R>,
    ) -> Result<(), TableError> {
        if table.count() == 0 {
            return Err(TableError::EmptyTable);
        }

        let descriptor = table.load(index)?;
        slot.set(descriptor);
        self.state = SelectionState::PlayingStored(index);

        log::info!("playing stored pattern {}", index);
        Ok(())
    }

    fn play_next_builtin<R: Renderer>(
        &mut self,
        slot: &mut AnimationSlot<R>,
    ) -> Result<(), TableError> {
        let next = self
            .builtins
            .next_playable(self.builtin_cursor)
            .ok_or(TableError::EmptyTable)?;
        let descriptor = *self.builtins.get(next).ok_or(TableError::EmptyTable)?;

        slot.set(descriptor);
        self.builtin_cursor = next;
        self.state = SelectionState::PlayingBuiltin(next);

        log::info!("playing built-in {}", next);
        Ok(())
    }
}
