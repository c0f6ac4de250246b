//! Animation sequence store.
//!
//! An [`AnimationSequence`] owns the ordered frame list and the global
//! parameters until it is assembled or closed:
//!
//! ```text
//!            push_frame / set_params
//!               ┌──────┐
//!               ▼      │
//!   new() ──▶  Open ───┘ ──assemble()──▶ Assembled
//!               │                           │
//!               └────────close()────────────┴──▶ Closed
//! ```
//!
//! Mutations are only accepted while `Open`. Dropping the sequence closes it.

use super::assemble::assemble_frames;
use super::error::MuxError;
use super::frame::FrameDescriptor;
use super::params::AnimationParams;

/// Lifecycle state of an [`AnimationSequence`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SequenceState {
    /// Accepting frames and parameters.
    Open,
    /// Assembled once; frozen.
    Assembled,
    /// Resources released; every operation but `close` fails.
    Closed,
}

/// Ordered, append-only list of frames plus the animation parameters.
///
/// ```rust
/// use webp_animate::mux::{AnimationParams, AnimationSequence, MuxError};
///
/// let mut sequence = AnimationSequence::new();
/// sequence.set_params(AnimationParams::new(0xFF000000, 3))?;
/// sequence.close();
/// assert!(matches!(sequence.set_params(AnimationParams::default()), Err(MuxError::Closed)));
/// # Ok::<(), MuxError>(())
/// ```
#[derive(Debug)]
pub struct AnimationSequence {
    frames: Vec<FrameDescriptor>,
    params: Option<AnimationParams>,
    state: SequenceState,
}

impl Default for AnimationSequence {
    fn default() -> Self {
        Self::new()
    }
}

impl AnimationSequence {
    /// Create an empty, open sequence.
    pub fn new() -> Self {
        Self {
            frames: Vec::new(),
            params: None,
            state: SequenceState::Open,
        }
    }

    pub(crate) fn ensure_open(&self) -> Result<(), MuxError> {
        match self.state {
            SequenceState::Open => Ok(()),
            SequenceState::Assembled => Err(MuxError::AlreadyAssembled),
            SequenceState::Closed => Err(MuxError::Closed),
        }
    }

    /// Append a frame. Frames play in the order they are pushed.
    pub fn push_frame(&mut self, frame: FrameDescriptor) -> Result<(), MuxError> {
        self.ensure_open()?;
        tracing::debug!(
            index = self.frames.len(),
            x = frame.x_offset(),
            y = frame.y_offset(),
            duration_ms = frame.duration_ms(),
            dispose = ?frame.dispose(),
            blend = ?frame.blend(),
            payload_bytes = frame.payload().len(),
            "frame appended"
        );
        self.frames.push(frame);
        Ok(())
    }

    /// Set the animation parameters, replacing any earlier value.
    pub fn set_params(&mut self, params: AnimationParams) -> Result<(), MuxError> {
        self.ensure_open()?;
        tracing::debug!(
            background = params.background_color,
            loop_count = %params.loop_count,
            "animation parameters set"
        );
        self.params = Some(params);
        Ok(())
    }

    /// Parameters that assembly will use: the last value set, or
    /// [`AnimationParams::default`].
    pub fn params(&self) -> AnimationParams {
        self.params.unwrap_or_default()
    }

    /// Number of frames appended so far. Zero once closed.
    pub fn num_frames(&self) -> usize {
        self.frames.len()
    }

    /// The frames in display order.
    pub fn frames(&self) -> &[FrameDescriptor] {
        &self.frames
    }

    /// Current lifecycle state.
    pub fn state(&self) -> SequenceState {
        self.state
    }

    /// Whether [`close`](Self::close) has been called.
    pub fn is_closed(&self) -> bool {
        self.state == SequenceState::Closed
    }

    /// Assemble the animated WebP file.
    ///
    /// The sequence must be open. On success it moves to
    /// [`SequenceState::Assembled`] and later calls return
    /// [`MuxError::AlreadyAssembled`]. On failure nothing changes and no
    /// bytes are returned.
    pub fn assemble(&mut self) -> Result<Vec<u8>, MuxError> {
        self.ensure_open()?;
        let out = assemble_frames(&self.frames, &self.params())?;
        self.state = SequenceState::Assembled;
        Ok(out)
    }

    /// Release every frame payload and the parameters.
    ///
    /// Calling this more than once is a no-op.
    pub fn close(&mut self) {
        if self.state == SequenceState::Closed {
            return;
        }
        tracing::trace!(frames = self.frames.len(), "closing animation sequence");
        self.frames = Vec::new();
        self.params = None;
        self.state = SequenceState::Closed;
    }
}

impl Drop for AnimationSequence {
    fn drop(&mut self) {
        self.close();
    }
}
