//! # Animation Player
//!
//! Sprite-sheet frame timers. Definitions are authored once and shared;
//! instances only carry a definition id and their own playback cursor.
//!
//! ## Playback
//!
//! Each [`update`](AnimationPlayer::update) subtracts the frame delta from
//! the current frame's remaining time. When it runs out the cursor moves to
//! the next frame and the timer reloads from that frame's duration. Past
//! the last frame a looping instance wraps to frame 0; a non-looping one
//! stays on its last frame for good.

use kindle_core::{fatal, SlotPool, SlotStore};
use tracing::{debug, warn};

use crate::error::AnimationError;

/// Most frames one definition can hold.
pub const MAX_FRAMES: usize = 16;

/// Opaque handle to a sprite sheet owned by the renderer.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub struct SheetId(pub u32);

/// One cell of a sprite sheet shown for `duration` seconds.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct AnimationFrame {
    /// Seconds the frame stays on screen.
    pub duration: f32,
    /// Sheet row.
    pub row: u8,
    /// Sheet column.
    pub column: u8,
}

impl AnimationFrame {
    /// Creates a frame.
    #[inline]
    #[must_use]
    pub const fn new(duration: f32, row: u8, column: u8) -> Self {
        Self { duration, row, column }
    }
}

/// An immutable frame sequence over one sheet.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct AnimationDefinition {
    /// Sheet the frames index into.
    pub sheet: SheetId,
    frames: [AnimationFrame; MAX_FRAMES],
    frame_count: u8,
}

impl AnimationDefinition {
    /// Returns the authored frames.
    #[inline]
    #[must_use]
    pub fn frames(&self) -> &[AnimationFrame] {
        &self.frames[..usize::from(self.frame_count)]
    }

    /// Returns the number of authored frames.
    #[inline]
    #[must_use]
    pub const fn frame_count(&self) -> usize {
        self.frame_count as usize
    }

    fn frame(&self, index: u8) -> AnimationFrame {
        self.frames[usize::from(index.min(self.frame_count.saturating_sub(1)))]
    }
}

/// Index of an [`AnimationDefinition`]. Definitions are never destroyed.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct DefinitionId(u32);

impl DefinitionId {
    /// Returns the definition index.
    #[inline]
    #[must_use]
    pub const fn index(self) -> u32 {
        self.0
    }
}

kindle_core::slot_handle! {
    /// Handle to a playing [`Animation`].
    AnimationId
}

/// A playback cursor over a definition.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Animation {
    /// Definition being played.
    pub definition: DefinitionId,
    /// Seconds left on the current frame.
    pub frame_time: f32,
    /// Current frame.
    pub frame_index: u8,
    /// Wrap to frame 0 after the last frame.
    pub looping: bool,
    /// Mirror horizontally when drawn.
    pub flipped: bool,
}

/// What a renderer needs to draw one animation this frame.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct RenderFrame {
    /// Sheet to sample.
    pub sheet: SheetId,
    /// Sheet row.
    pub row: u8,
    /// Sheet column.
    pub column: u8,
    /// Mirror horizontally.
    pub flipped: bool,
}

/// Owns every definition and every playing instance.
#[derive(Debug, Default)]
pub struct AnimationPlayer {
    definitions: SlotStore<AnimationDefinition>,
    instances: SlotPool<Animation>,
}

impl AnimationPlayer {
    /// Creates an empty player.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    // =========================================================================
    // DEFINITIONS
    // =========================================================================

    /// Defines an animation frame by frame.
    ///
    /// # Errors
    ///
    /// Returns [`AnimationError::NoFrames`] or
    /// [`AnimationError::TooManyFrames`] if `frames` is empty or longer than
    /// [`MAX_FRAMES`].
    pub fn define(
        &mut self,
        sheet: SheetId,
        frames: &[AnimationFrame],
    ) -> Result<DefinitionId, AnimationError> {
        if frames.is_empty() {
            return Err(AnimationError::NoFrames);
        }
        if frames.len() > MAX_FRAMES {
            return Err(AnimationError::TooManyFrames {
                count: frames.len(),
                max: MAX_FRAMES,
            });
        }

        let mut definition = AnimationDefinition {
            sheet,
            frames: [AnimationFrame::default(); MAX_FRAMES],
            frame_count: frames.len() as u8,
        };
        definition.frames[..frames.len()].copy_from_slice(frames);

        let index = match self.definitions.push(definition) {
            Ok(index) => index,
            Err(err) => fatal(err),
        };
        debug!(index, frames = frames.len(), "animation defined");
        Ok(DefinitionId(index as u32))
    }

    /// Defines an animation whose frames share a row and a duration.
    ///
    /// # Errors
    ///
    /// Same as [`define`](Self::define).
    ///
    /// # Example
    ///
    /// ```rust,ignore
    /// // Four-frame run cycle on row 1 of the player sheet.
    /// let run = player.define_filmstrip(PLAYER_SHEET, 1, 0.1, &[0, 1, 2, 3])?;
    /// ```
    pub fn define_filmstrip(
        &mut self,
        sheet: SheetId,
        row: u8,
        duration: f32,
        columns: &[u8],
    ) -> Result<DefinitionId, AnimationError> {
        if columns.len() > MAX_FRAMES {
            return Err(AnimationError::TooManyFrames {
                count: columns.len(),
                max: MAX_FRAMES,
            });
        }
        let mut frames = [AnimationFrame::default(); MAX_FRAMES];
        for (frame, &column) in frames.iter_mut().zip(columns) {
            *frame = AnimationFrame::new(duration, row, column);
        }
        self.define(sheet, &frames[..columns.len()])
    }

    /// Gets a definition.
    #[must_use]
    pub fn definition(&self, id: DefinitionId) -> Option<&AnimationDefinition> {
        self.definitions.get(id.0 as usize)
    }

    /// Returns the number of definitions.
    #[inline]
    #[must_use]
    pub fn definition_count(&self) -> usize {
        self.definitions.len()
    }

    // =========================================================================
    // INSTANCES
    // =========================================================================

    /// Starts playing `definition` from its first frame.
    ///
    /// Referencing a definition that was never created is fatal.
    pub fn create(&mut self, definition: DefinitionId, looping: bool) -> AnimationId {
        let Some(first) = self.definition(definition).map(|def| def.frame(0)) else {
            fatal(AnimationError::UnknownDefinition(definition.0));
        };

        let animation = Animation {
            definition,
            frame_time: first.duration,
            frame_index: 0,
            looping,
            flipped: false,
        };
        let id = match self.instances.insert(animation) {
            Ok(slot) => AnimationId::from_slot(slot),
            Err(err) => fatal(err),
        };
        debug!(index = id.index(), definition = definition.0, looping, "animation created");
        id
    }

    /// Gets an instance, live or destroyed, if `id` still owns its slot.
    #[inline]
    #[must_use]
    pub fn get(&self, id: AnimationId) -> Option<&Animation> {
        self.instances.get(id.slot())
    }

    /// Gets a mutable instance, live or destroyed, if `id` still owns its slot.
    #[inline]
    pub fn get_mut(&mut self, id: AnimationId) -> Option<&mut Animation> {
        self.instances.get_mut(id.slot())
    }

    /// Stops an instance. Returns `false` if it was not playing.
    pub fn destroy(&mut self, id: AnimationId) -> bool {
        let destroyed = self.instances.destroy(id.slot());
        if destroyed {
            debug!(index = id.index(), "animation destroyed");
        } else {
            warn!(index = id.index(), "destroy of inactive or stale animation");
        }
        destroyed
    }

    /// Checks if `id` refers to a playing instance.
    #[inline]
    #[must_use]
    pub fn is_active(&self, id: AnimationId) -> bool {
        self.instances.is_active(id.slot())
    }

    /// Returns the number of playing instances.
    #[inline]
    #[must_use]
    pub const fn active_count(&self) -> usize {
        self.instances.active_count()
    }

    /// Advances every playing instance by `dt` seconds.
    pub fn update(&mut self, dt: f32) {
        let definitions = self.definitions.as_slice();

        for (_, animation) in self.instances.iter_mut() {
            let Some(definition) = definitions.get(animation.definition.0 as usize) else {
                continue;
            };
            let last = definition.frame_count.saturating_sub(1);

            if !animation.looping && animation.frame_index >= last {
                continue;
            }

            animation.frame_time -= dt;
            if animation.frame_time > 0.0 {
                continue;
            }

            animation.frame_index = if animation.frame_index >= last {
                if animation.looping { 0 } else { last }
            } else {
                animation.frame_index + 1
            };
            animation.frame_time = definition.frame(animation.frame_index).duration;
        }
    }

    /// Returns the sheet cell a playing instance shows right now.
    #[must_use]
    pub fn render_frame(&self, id: AnimationId) -> Option<RenderFrame> {
        let animation = self.instances.get(id.slot()).filter(|_| self.is_active(id))?;
        let definition = self.definition(animation.definition)?;
        let frame = definition.frame(animation.frame_index);

        Some(RenderFrame {
            sheet: definition.sheet,
            row: frame.row,
            column: frame.column,
            flipped: animation.flipped,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SHEET: SheetId = SheetId(7);

    fn three_frames(player: &mut AnimationPlayer) -> DefinitionId {
        player.define_filmstrip(SHEET, 2, 0.1, &[0, 1, 2]).unwrap()
    }

    #[test]
    fn test_looping_wraps_to_first_frame() {
        let mut player = AnimationPlayer::new();
        let def = three_frames(&mut player);
        let id = player.create(def, true);

        player.update(0.1);
        assert_eq!(player.get(id).unwrap().frame_index, 1);
        player.update(0.1);
        assert_eq!(player.get(id).unwrap().frame_index, 2);
        player.update(0.1);
        assert_eq!(player.get(id).unwrap().frame_index, 0);
    }

    #[test]
    fn test_non_looping_clamps_on_last_frame() {
        let mut player = AnimationPlayer::new();
        let def = three_frames(&mut player);
        let id = player.create(def, false);

        for _ in 0..3 {
            player.update(0.1);
        }
        assert_eq!(player.get(id).unwrap().frame_index, 2);

        let frozen = *player.get(id).unwrap();
        for _ in 0..10 {
            player.update(0.1);
        }
        assert_eq!(*player.get(id).unwrap(), frozen);
    }

    #[test]
    fn test_per_frame_durations() {
        let mut player = AnimationPlayer::new();
        let def = player
            .define(
                SHEET,
                &[AnimationFrame::new(0.5, 0, 3), AnimationFrame::new(0.25, 1, 4)],
            )
            .unwrap();
        let id = player.create(def, true);
        assert_eq!(player.get(id).unwrap().frame_time, 0.5);

        player.update(0.25);
        assert_eq!(player.get(id).unwrap().frame_index, 0);
        player.update(0.25);
        assert_eq!(player.get(id).unwrap().frame_index, 1);
        assert_eq!(player.get(id).unwrap().frame_time, 0.25);

        let frame = player.render_frame(id).unwrap();
        assert_eq!((frame.sheet, frame.row, frame.column), (SHEET, 1, 4));
    }

    #[test]
    fn test_define_rejects_bad_lengths() {
        let mut player = AnimationPlayer::new();
        assert_eq!(player.define(SHEET, &[]), Err(AnimationError::NoFrames));
        assert_eq!(
            player.define_filmstrip(SHEET, 0, 0.1, &[0; 17]),
            Err(AnimationError::TooManyFrames { count: 17, max: MAX_FRAMES })
        );
        assert_eq!(player.definition_count(), 0);
        assert!(player.define_filmstrip(SHEET, 0, 0.1, &[0; 16]).is_ok());
        assert_eq!(player.definition_count(), 1);
    }

    #[test]
    fn test_destroy_and_reuse() {
        let mut player = AnimationPlayer::new();
        let def = three_frames(&mut player);
        let a = player.create(def, true);
        let b = player.create(def, true);

        assert!(player.destroy(a));
        assert!(!player.destroy(a));
        assert!(player.render_frame(a).is_none());
        assert_eq!(player.active_count(), 1);

        let c = player.create(def, false);
        assert_eq!(c.index(), a.index());
        assert!(player.get(a).is_none());
        assert!(player.is_active(b));
    }

    #[test]
    fn test_flipped_reaches_render_frame() {
        let mut player = AnimationPlayer::new();
        let def = three_frames(&mut player);
        let id = player.create(def, true);
        player.get_mut(id).unwrap().flipped = true;
        assert!(player.render_frame(id).unwrap().flipped);
    }

    #[test]
    #[should_panic(expected = "unknown animation definition")]
    fn test_unknown_definition_is_fatal() {
        let mut player = AnimationPlayer::new();
        player.create(DefinitionId(3), true);
    }
}
