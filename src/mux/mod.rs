//! Animated WebP assembly.
//!
//! The pieces, leaf first:
//!
//! - **Codec** ([`encode_frame`], [`FrameCodec`]): converts a [`PixelSource`]
//!   to RGBA and compresses it into a still WebP.
//! - **Frames** ([`FrameDescriptor`]): a compressed still plus placement,
//!   duration, [`DisposeMethod`] and [`BlendMethod`].
//! - **Sequence** ([`AnimationSequence`]): ordered frames and
//!   [`AnimationParams`], with an Open/Assembled/Closed lifecycle.
//! - **Assembly** ([`AnimationSequence::assemble`]): one RIFF/WebP file with
//!   VP8X, ANIM and one ANMF chunk per frame.
//! - **Demux** ([`WebPDemuxer`]): chunk-level reader for still and animated
//!   files.
//! - **Animation** ([`AnimationEncoder`], [`encode_animation`]): the whole
//!   flow in one place.

mod anim;
mod assemble;
mod codec;
mod demux;
mod error;
mod frame;
mod params;
mod sequence;

pub use anim::{encode_animation, encode_animation_to_vec, AnimationEncoder, Frame};
pub use codec::{
    encode_frame, EncodePixel, FrameCodec, LosslessCodec, PixelImage, PixelLayout, PixelSource,
    RawImage, FRAME_QUALITY, MAX_DIMENSION,
};
#[cfg(feature = "lossy")]
pub use codec::LossyCodec;
pub use demux::{DemuxFrame, DemuxFrameIter, WebPDemuxer};
pub use error::{AssemblyError, CodecError, MuxError};
pub use frame::{BlendMethod, DisposeMethod, FrameDescriptor};
pub use params::{AnimationParams, LoopCount};
pub use sequence::{AnimationSequence, SequenceState};
