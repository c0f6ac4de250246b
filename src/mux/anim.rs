//! Animation encoder.
//!
//! High-level API for encoding animated WebP files frame-by-frame.
//!
//! # Example
//!
//! ```rust
//! use webp_animate::mux::{
//!     AnimationEncoder, AnimationParams, BlendMethod, DisposeMethod, Frame, PixelLayout, RawImage,
//! };
//!
//! let red = [255u8, 0, 0, 255].repeat(32 * 24);
//! let blue = [0u8, 0, 255, 255].repeat(32 * 24);
//! let red = RawImage::new(&red, PixelLayout::Rgba8, 32, 24);
//! let blue = RawImage::new(&blue, PixelLayout::Rgba8, 32, 24);
//!
//! let mut encoder = AnimationEncoder::new();
//! encoder.set_animation_params(AnimationParams::new(0xFFFFFFFF, 0))?;
//! for image in [&red, &blue] {
//!     let frame = Frame {
//!         dispose: DisposeMethod::Background,
//!         blend: BlendMethod::Overwrite,
//!         ..Frame::new(image, 1000)
//!     };
//!     encoder.add_frame(&frame)?;
//! }
//!
//! let mut webp = Vec::new();
//! encoder.encode(&mut webp)?;
//! encoder.close();
//! # Ok::<(), webp_animate::mux::MuxError>(())
//! ```

use std::io::Write;

use super::codec::{encode_frame, FrameCodec, LosslessCodec, PixelSource, FRAME_QUALITY};
use super::error::MuxError;
use super::frame::{BlendMethod, DisposeMethod, FrameDescriptor};
use super::params::AnimationParams;
use super::sequence::AnimationSequence;

/// A frame to add to an animation: an image plus placement and timing.
#[derive(Clone, Copy)]
pub struct Frame<'a> {
    /// Pixels for this frame.
    pub image: &'a dyn PixelSource,
    /// Horizontal offset on the canvas. Odd values are rounded down.
    pub x_offset: u32,
    /// Vertical offset on the canvas. Odd values are rounded down.
    pub y_offset: u32,
    /// Display duration in milliseconds.
    pub duration_ms: u32,
    /// How the frame area is treated before the next frame is drawn.
    pub dispose: DisposeMethod,
    /// How the frame's pixels combine with the canvas.
    pub blend: BlendMethod,
}

impl<'a> Frame<'a> {
    /// A frame at the canvas origin that stays on the canvas and alpha-blends.
    pub fn new(image: &'a dyn PixelSource, duration_ms: u32) -> Self {
        Self {
            image,
            x_offset: 0,
            y_offset: 0,
            duration_ms,
            dispose: DisposeMethod::None,
            blend: BlendMethod::AlphaBlend,
        }
    }
}

impl core::fmt::Debug for Frame<'_> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("Frame")
            .field("dimensions", &self.image.dimensions())
            .field("x_offset", &self.x_offset)
            .field("y_offset", &self.y_offset)
            .field("duration_ms", &self.duration_ms)
            .field("dispose", &self.dispose)
            .field("blend", &self.blend)
            .finish()
    }
}

/// Animated WebP encoder.
///
/// Compresses each added frame with its [`FrameCodec`] at
/// [`FRAME_QUALITY`] and collects the results in an [`AnimationSequence`].
/// Dropping the encoder releases everything it holds.
#[derive(Debug)]
pub struct AnimationEncoder<C: FrameCodec = LosslessCodec> {
    codec: C,
    sequence: AnimationSequence,
}

impl AnimationEncoder<LosslessCodec> {
    /// Create an encoder using the lossless codec.
    ///
    /// [`LosslessCodec`] ignores [`FRAME_QUALITY`]; every frame is stored
    /// pixel-exact.
    pub fn new() -> Self {
        Self::with_codec(LosslessCodec)
    }
}

impl Default for AnimationEncoder<LosslessCodec> {
    fn default() -> Self {
        Self::new()
    }
}

impl<C: FrameCodec> AnimationEncoder<C> {
    /// Create an encoder that compresses frames with `codec`.
    pub fn with_codec(codec: C) -> Self {
        Self {
            codec,
            sequence: AnimationSequence::new(),
        }
    }

    /// Encode a frame and append it to the animation.
    ///
    /// Frames are displayed in the order they are added. Fails if the
    /// encoder is closed or already encoded, or if the codec rejects the
    /// image; in every case the animation is left unchanged.
    pub fn add_frame(&mut self, frame: &Frame<'_>) -> Result<(), MuxError> {
        self.sequence.ensure_open()?;
        let payload = encode_frame(&self.codec, frame.image, FRAME_QUALITY)?;
        let descriptor = FrameDescriptor::new(
            &payload,
            frame.x_offset,
            frame.y_offset,
            frame.duration_ms,
            frame.dispose,
            frame.blend,
        )?;
        self.sequence.push_frame(descriptor)
    }

    /// Set the background color and loop count, replacing earlier values.
    pub fn set_animation_params(&mut self, params: AnimationParams) -> Result<(), MuxError> {
        self.sequence.set_params(params)
    }

    /// Number of frames added so far.
    pub fn num_frames(&self) -> usize {
        self.sequence.num_frames()
    }

    /// Assemble the animation and return the bytes.
    pub fn encode_to_vec(&mut self) -> Result<Vec<u8>, MuxError> {
        self.sequence.assemble()
    }

    /// Assemble the animation and write it to `writer`.
    ///
    /// Nothing is written unless assembly succeeds.
    pub fn encode<W: Write>(&mut self, mut writer: W) -> Result<(), MuxError> {
        let data = self.sequence.assemble()?;
        writer.write_all(&data).map_err(MuxError::Write)
    }

    /// Release all frames. Safe to call more than once.
    pub fn close(&mut self) {
        self.sequence.close();
    }

    /// Whether [`close`](Self::close) has been called.
    pub fn is_closed(&self) -> bool {
        self.sequence.is_closed()
    }
}

/// Encode an animated WebP from `frames` and write it to `writer`.
///
/// Parameters are set first, then each frame is encoded in order; the first
/// failure aborts the whole operation before anything is written. The
/// intermediate encoder is released on every path.
#[tracing::instrument(level = "debug", skip_all, fields(frames = frames.len()))]
pub fn encode_animation<W: Write>(
    writer: W,
    frames: &[Frame<'_>],
    params: AnimationParams,
) -> Result<(), MuxError> {
    let mut encoder = AnimationEncoder::new();
    encoder.set_animation_params(params)?;
    for frame in frames {
        encoder.add_frame(frame)?;
    }
    encoder.encode(writer)
}

/// Encode an animated WebP from `frames` and return the bytes.
pub fn encode_animation_to_vec(
    frames: &[Frame<'_>],
    params: AnimationParams,
) -> Result<Vec<u8>, MuxError> {
    let mut out = Vec::new();
    encode_animation(&mut out, frames, params)?;
    Ok(out)
}
