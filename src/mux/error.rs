//! Error types for animation assembly.

use thiserror::Error;

/// Errors surfaced by the sequence store, the assembler and the encoder.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum MuxError {
    /// A mutating operation was attempted after the sequence was closed.
    #[error("Animation sequence is closed")]
    Closed,

    /// The sequence was already assembled and is frozen.
    #[error("Animation sequence was already assembled")]
    AlreadyAssembled,

    /// Frame duration does not fit the container's 24-bit field.
    #[error("Frame duration {duration_ms}ms exceeds the 24-bit limit")]
    InvalidDuration {
        /// The rejected duration.
        duration_ms: u32,
    },

    /// The still-image codec rejected a frame.
    #[error("Codec error: {0}")]
    Codec(#[from] CodecError),

    /// The container could not be assembled.
    #[error("Assembly error: {0}")]
    Assembly(#[from] AssemblyError),

    /// The output sink failed to accept the assembled bytes.
    #[error("Write error: {0}")]
    Write(#[source] std::io::Error),
}

/// Errors from converting and compressing a single frame.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum CodecError {
    /// Frame dimensions are zero or beyond the WebP limit of 16384.
    #[error("Invalid dimensions: {width}x{height}")]
    InvalidDimensions {
        /// The invalid width.
        width: u32,
        /// The invalid height.
        height: u32,
    },

    /// The pixel buffer is smaller than its declared dimensions require.
    #[error("Invalid buffer size: expected at least {expected} bytes, got {actual}")]
    InvalidBufferSize {
        /// Minimum byte length for the declared dimensions and layout.
        expected: usize,
        /// Byte length actually supplied.
        actual: usize,
    },

    /// Quality outside 0..=100.
    #[error("Invalid quality: {0} (expected 0..=100)")]
    InvalidQuality(u8),

    /// The underlying encoder failed.
    #[error("Encoder failed: {0}")]
    Encoder(#[from] image_webp::EncodingError),

    /// libwebp rejected the frame.
    #[error("Lossy encoder failed: {0}")]
    Lossy(String),
}

/// Errors from walking the frame list and writing the container.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum AssemblyError {
    /// No frames were added before assembly.
    #[error("No frames to assemble")]
    NoFrames,

    /// The data is not a valid WebP file.
    #[error("Invalid WebP format: {0}")]
    InvalidFormat(String),

    /// A frame's payload could not be unwrapped into a still bitstream.
    #[error("Frame {index} has an invalid payload: {reason}")]
    InvalidFramePayload {
        /// 0-based position of the frame in display order.
        index: usize,
        /// What was wrong with it.
        reason: String,
    },

    /// The canvas implied by frame placement exceeds the container limits.
    #[error("Canvas {width}x{height} exceeds the WebP limits")]
    CanvasTooLarge {
        /// Canvas width in pixels.
        width: u64,
        /// Canvas height in pixels.
        height: u64,
    },

    /// The assembled file would not fit a 32-bit RIFF size field.
    #[error("Assembled file of {size} bytes exceeds the RIFF size limit")]
    OutputTooLarge {
        /// Total size in bytes.
        size: usize,
    },
}
