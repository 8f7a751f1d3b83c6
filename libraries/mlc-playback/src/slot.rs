//! The single "now playing" slot

use mlc_core::{AudioEvent, AudioHandle, HandleId, PlayId, RowHandle, SoundDescriptor};
use std::sync::Arc;

/// The clip currently playing, together with the row showing it
pub struct PlaybackSlot {
    handle: Arc<dyn AudioHandle>,
    play: PlayId,
    row: RowHandle,
    sound: SoundDescriptor,
}

impl PlaybackSlot {
    pub(crate) fn new(
        handle: Arc<dyn AudioHandle>,
        play: PlayId,
        row: RowHandle,
        sound: SoundDescriptor,
    ) -> Self {
        Self {
            handle,
            play,
            row,
            sound,
        }
    }

    pub fn handle(&self) -> &Arc<dyn AudioHandle> {
        &self.handle
    }

    pub fn handle_id(&self) -> HandleId {
        self.handle.id()
    }

    pub fn play_id(&self) -> PlayId {
        self.play
    }

    /// Whether `event` was emitted by this play of the slot's handle
    pub fn owns(&self, event: &AudioEvent) -> bool {
        event.handle() == self.handle.id() && event.play() == self.play
    }

    pub fn row(&self) -> RowHandle {
        self.row
    }

    pub fn sound(&self) -> &SoundDescriptor {
        &self.sound
    }

    /// Move the slot to the row that now displays the same clip
    pub(crate) fn rebind(&mut self, row: RowHandle, sound: SoundDescriptor) {
        self.row = row;
        self.sound = sound;
    }

    /// Pause and rewind, leaving the handle ready for the next play
    pub(crate) fn halt(&self) {
        self.handle.pause();
        self.handle.rewind();
    }
}

impl std::fmt::Debug for PlaybackSlot {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PlaybackSlot")
            .field("handle", &self.handle.id())
            .field("play", &self.play)
            .field("row", &self.row)
            .field("sound", &self.sound.name)
            .finish()
    }
}
