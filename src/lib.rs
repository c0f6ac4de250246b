//! Animated WebP encoding.
//!
//! This crate combines independently compressed still frames, each with its
//! own placement, duration, disposal and blending, into a single animated
//! WebP file with a background color and loop count.
//!
//! # Quick start
//!
//! ```rust
//! use webp_animate::{encode_animation_to_vec, AnimationParams, Frame, PixelLayout, RawImage};
//!
//! let pixels = vec![255u8; 16 * 16 * 4];
//! let image = RawImage::new(&pixels, PixelLayout::Rgba8, 16, 16);
//! let frames = [Frame::new(&image, 100), Frame::new(&image, 100)];
//!
//! let webp = encode_animation_to_vec(&frames, AnimationParams::default())?;
//! assert_eq!(&webp[8..16], b"WEBPVP8X");
//! # Ok::<(), webp_animate::MuxError>(())
//! ```
//!
//! # Lower-level pieces
//!
//! [`AnimationEncoder`] is the stateful form of the same flow. Below it sit
//! [`encode_frame`] (pixels → still WebP), [`FrameDescriptor`] (one frame's
//! metadata) and [`AnimationSequence`] (ordered frames plus parameters,
//! assembled once). [`WebPDemuxer`] reads the result back at the chunk
//! level.
//!
//! # Codecs
//!
//! Frames are compressed at a fixed quality of 90. The default
//! [`LosslessCodec`] is pure Rust and ignores quality, since VP8L is
//! pixel-exact. With the `lossy` feature (on by default), `LossyCodec`
//! produces VP8 frames through libwebp where quality 90 applies; pass it to
//! [`AnimationEncoder::with_codec`].
//!
//! # Logging
//!
//! Frame appends, parameter changes and assembly emit `tracing` events at
//! `debug` level. Install a subscriber to see them.
//!
//! # Safety
//!
//! This crate contains no unsafe code.

#![forbid(unsafe_code)]
#![deny(missing_docs)]

/// Frame encoding, sequencing, assembly and demuxing.
pub mod mux;

mod slice_reader;
mod vec_writer;

pub use mux::{
    encode_animation, encode_animation_to_vec, encode_frame, AnimationEncoder, AnimationParams,
    AnimationSequence, AssemblyError, BlendMethod, CodecError, DisposeMethod, Frame, FrameCodec,
    FrameDescriptor, LoopCount, LosslessCodec, MuxError, PixelImage, PixelLayout, PixelSource,
    RawImage, WebPDemuxer,
};

#[cfg(feature = "lossy")]
pub use mux::LossyCodec;
