//! Animated WebP container assembler.
//!
//! [`assemble_frames`] unwraps every frame's still-WebP payload into its raw
//! VP8/VP8L bitstream, derives the canvas from frame placement, and writes
//! a single extended-format file:
//!
//! ```text
//! RIFF <size> WEBP
//!   VP8X  flags, canvas width-1, canvas height-1
//!   ANIM  background color (B, G, R, A), loop count
//!   ANMF  x/2, y/2, width-1, height-1, duration, flags, [ALPH] VP8|VP8L
//!   ANMF  ...
//! ```
//!
//! Every payload is validated before the first byte is written, so a bad
//! frame never produces partial output.

use super::demux::WebPDemuxer;
use super::error::AssemblyError;
use super::frame::{BlendMethod, DisposeMethod, FrameDescriptor};
use super::params::AnimationParams;
use crate::vec_writer::{chunk_size, write_chunk, VecWriter, MAX_U24};

/// Canvas width and height are stored minus one in 24 bits.
const MAX_CANVAS_DIMENSION: u64 = 1 << 24;
/// libwebp refuses canvases whose area does not fit 32 bits.
const MAX_CANVAS_AREA: u64 = u32::MAX as u64;
/// ANMF header fields before the sub-chunks: 5 × u24 + flags byte.
const ANMF_HEADER_SIZE: usize = 16;

/// A single frame ready to be muxed, borrowing its bitstream from the
/// descriptor that owns it.
#[derive(Debug, Clone)]
pub(crate) struct MuxFrame<'a> {
    /// Horizontal offset on the canvas. Must be even.
    pub x_offset: u32,
    /// Vertical offset on the canvas. Must be even.
    pub y_offset: u32,
    /// Frame width in pixels.
    pub width: u32,
    /// Frame height in pixels.
    pub height: u32,
    /// Frame duration in milliseconds (max 16777215).
    pub duration_ms: u32,
    /// How the frame area is disposed after rendering.
    pub dispose: DisposeMethod,
    /// How the frame is blended onto the canvas.
    pub blend: BlendMethod,
    /// Raw VP8 or VP8L bitstream data.
    pub bitstream: &'a [u8],
    /// Raw ALPH chunk payload (for lossy frames with separate alpha).
    pub alpha_data: Option<&'a [u8]>,
    /// Whether the bitstream is VP8L (lossless). `false` means VP8 (lossy).
    pub is_lossless: bool,
    /// Whether the frame carries any alpha.
    pub has_alpha: bool,
}

impl MuxFrame<'_> {
    fn image_chunk(&self) -> &'static [u8; 4] {
        if self.is_lossless {
            b"VP8L"
        } else {
            b"VP8 "
        }
    }

    fn anmf_payload_size(&self) -> usize {
        let mut size = ANMF_HEADER_SIZE;
        if let Some(alpha) = self.alpha_data {
            size += chunk_size(alpha.len());
        }
        size + chunk_size(self.bitstream.len())
    }
}

/// Animated WebP container writer.
///
/// Holds the global parameters and the ordered frames; the canvas is the
/// smallest rectangle that contains every frame.
#[derive(Debug)]
pub(crate) struct WebPMux<'a> {
    params: AnimationParams,
    frames: Vec<MuxFrame<'a>>,
}

impl<'a> WebPMux<'a> {
    /// Create an empty animated mux.
    pub fn new(params: AnimationParams) -> Self {
        Self {
            params,
            frames: Vec::new(),
        }
    }

    /// Append a frame in display order.
    pub fn push_frame(&mut self, frame: MuxFrame<'a>) {
        debug_assert!(frame.x_offset % 2 == 0 && frame.y_offset % 2 == 0);
        debug_assert!(frame.duration_ms <= MAX_U24);
        self.frames.push(frame);
    }

    /// Canvas size covering every frame.
    pub fn canvas_size(&self) -> Result<(u32, u32), AssemblyError> {
        let (width, height) = self.frames.iter().fold((0u64, 0u64), |(w, h), f| {
            (
                w.max(u64::from(f.x_offset) + u64::from(f.width)),
                h.max(u64::from(f.y_offset) + u64::from(f.height)),
            )
        });
        if width == 0
            || height == 0
            || width > MAX_CANVAS_DIMENSION
            || height > MAX_CANVAS_DIMENSION
            || width * height > MAX_CANVAS_AREA
        {
            return Err(AssemblyError::CanvasTooLarge { width, height });
        }
        Ok((width as u32, height as u32))
    }

    /// Write the complete file into a freshly allocated buffer.
    pub fn assemble(&self) -> Result<Vec<u8>, AssemblyError> {
        if self.frames.is_empty() {
            return Err(AssemblyError::NoFrames);
        }
        let (canvas_width, canvas_height) = self.canvas_size()?;

        // "WEBP" + VP8X + ANIM + frames
        let mut total = 4 + chunk_size(10) + chunk_size(6);
        for frame in &self.frames {
            total += chunk_size(frame.anmf_payload_size());
        }
        if total > u32::MAX as usize - 1 {
            return Err(AssemblyError::OutputTooLarge { size: total + 8 });
        }

        let mut out = Vec::with_capacity(total + 8);
        out.write_all(b"RIFF");
        out.write_u32_le(total as u32);
        out.write_all(b"WEBP");

        let mut flags = 1u8 << 1; // animation flag
        if self.frames.iter().any(|f| f.has_alpha) {
            flags |= 1 << 4;
        }
        let mut vp8x = Vec::with_capacity(10);
        vp8x.write_u8(flags);
        vp8x.write_all(&[0; 3]); // reserved
        vp8x.write_u24_le(canvas_width - 1);
        vp8x.write_u24_le(canvas_height - 1);
        write_chunk(&mut out, b"VP8X", &vp8x);

        let mut anim = Vec::with_capacity(6);
        anim.write_all(&self.params.background_bgra());
        anim.write_u16_le(self.params.loop_count.to_u16());
        write_chunk(&mut out, b"ANIM", &anim);

        for frame in &self.frames {
            write_anmf(&mut out, frame);
        }

        debug_assert_eq!(out.len(), total + 8);
        Ok(out)
    }
}

fn write_anmf(out: &mut Vec<u8>, frame: &MuxFrame<'_>) {
    out.write_all(b"ANMF");
    out.write_u32_le(frame.anmf_payload_size() as u32);

    // Offsets are stored in 2-pixel units
    out.write_u24_le(frame.x_offset / 2);
    out.write_u24_le(frame.y_offset / 2);
    out.write_u24_le(frame.width - 1);
    out.write_u24_le(frame.height - 1);
    out.write_u24_le(frame.duration_ms);
    out.write_u8(frame.dispose.to_bits() | (frame.blend.to_bits() << 1));

    if let Some(alpha) = frame.alpha_data {
        write_chunk(out, b"ALPH", alpha);
    }
    write_chunk(out, frame.image_chunk(), frame.bitstream);
}

/// Unwrap a descriptor's still-WebP payload into a muxable frame.
fn mux_frame(descriptor: &FrameDescriptor) -> Result<MuxFrame<'_>, AssemblyError> {
    let demuxer = WebPDemuxer::new(descriptor.payload())?;
    if demuxer.is_animated() {
        return Err(AssemblyError::InvalidFormat(
            "Payload is already animated".into(),
        ));
    }
    let still = demuxer
        .frame(1)
        .ok_or_else(|| AssemblyError::InvalidFormat("Payload has no image".into()))?;
    Ok(MuxFrame {
        x_offset: descriptor.x_offset(),
        y_offset: descriptor.y_offset(),
        width: still.width,
        height: still.height,
        duration_ms: descriptor.duration_ms(),
        dispose: descriptor.dispose(),
        blend: descriptor.blend(),
        bitstream: still.bitstream,
        alpha_data: still.alpha_data,
        is_lossless: !still.is_lossy,
        has_alpha: still.has_alpha,
    })
}

/// Assemble frames in display order into one animated WebP file.
///
/// Fails without output when there are no frames, when any payload is not a
/// still WebP, or when the resulting canvas exceeds the format's limits.
#[tracing::instrument(level = "debug", skip_all, fields(frames = frames.len()))]
pub(crate) fn assemble_frames(
    frames: &[FrameDescriptor],
    params: &AnimationParams,
) -> Result<Vec<u8>, AssemblyError> {
    if frames.is_empty() {
        return Err(AssemblyError::NoFrames);
    }

    let mut mux = WebPMux::new(*params);
    for (index, descriptor) in frames.iter().enumerate() {
        let frame = mux_frame(descriptor).map_err(|err| AssemblyError::InvalidFramePayload {
            index,
            reason: err.to_string(),
        })?;
        mux.push_frame(frame);
    }

    let out = mux.assemble()?;
    tracing::debug!(
        bytes = out.len(),
        background = params.background_color,
        loop_count = %params.loop_count,
        "assembled animation"
    );
    Ok(out)
}
