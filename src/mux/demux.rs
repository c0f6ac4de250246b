//! Zero-copy WebP demuxer.
//!
//! Parses a WebP file at the chunk level, exposing frame metadata and raw
//! bitstream data without decoding pixels. The assembler uses it to unwrap
//! each frame's still payload; it is equally useful for inspecting an
//! assembled animation.
//!
//! # Example
//!
//! ```rust,no_run
//! use webp_animate::mux::WebPDemuxer;
//!
//! let data: &[u8] = &[]; // your WebP data
//! let demuxer = WebPDemuxer::new(data)?;
//! println!("{}x{}, {} frame(s)", demuxer.canvas_width(), demuxer.canvas_height(), demuxer.num_frames());
//!
//! for frame in demuxer.frames() {
//!     println!("  frame {}: {}x{} at ({},{}) duration={}ms",
//!         frame.frame_num, frame.width, frame.height,
//!         frame.x_offset, frame.y_offset, frame.duration_ms);
//! }
//! # Ok::<(), webp_animate::mux::AssemblyError>(())
//! ```

use core::ops::Range;

use super::error::AssemblyError;
use super::frame::{BlendMethod, DisposeMethod};
use super::params::LoopCount;
use crate::slice_reader::SliceReader;

const VP8X_ALPHA: u8 = 1 << 4;
const VP8X_ANIMATION: u8 = 1 << 1;

fn invalid(msg: impl Into<String>) -> AssemblyError {
    AssemblyError::InvalidFormat(msg.into())
}

/// Metadata for a single frame extracted by the demuxer.
///
/// The `bitstream` field contains the raw VP8 or VP8L data (not including
/// any RIFF container framing). For lossy frames with separate alpha, the
/// `alpha_data` field contains the raw ALPH chunk payload.
#[derive(Debug, Clone)]
pub struct DemuxFrame<'a> {
    /// 1-based frame number.
    pub frame_num: u32,
    /// Horizontal offset of the frame on the canvas (always even).
    pub x_offset: u32,
    /// Vertical offset of the frame on the canvas (always even).
    pub y_offset: u32,
    /// Frame width in pixels.
    pub width: u32,
    /// Frame height in pixels.
    pub height: u32,
    /// Frame duration in milliseconds.
    pub duration_ms: u32,
    /// How the frame area is disposed after rendering.
    pub dispose: DisposeMethod,
    /// How the frame is blended onto the canvas.
    pub blend: BlendMethod,
    /// Whether the frame carries alpha.
    pub has_alpha: bool,
    /// Whether the frame uses lossy (VP8) encoding. `false` means lossless (VP8L).
    pub is_lossy: bool,
    /// Raw VP8 or VP8L bitstream data for this frame.
    pub bitstream: &'a [u8],
    /// Raw ALPH chunk payload, if present (lossy frames with separate alpha).
    pub alpha_data: Option<&'a [u8]>,
}

/// Image bitstream located inside a container: byte ranges into the file.
#[derive(Debug, Clone)]
struct ImageRanges {
    bitstream: Range<usize>,
    alpha: Option<Range<usize>>,
    is_lossy: bool,
    width: u32,
    height: u32,
    has_alpha: bool,
}

/// Parsed ANMF chunk.
#[derive(Debug, Clone)]
struct FrameRecord {
    x_offset: u32,
    y_offset: u32,
    width: u32,
    height: u32,
    duration_ms: u32,
    dispose: DisposeMethod,
    blend: BlendMethod,
    image: ImageRanges,
}

/// Zero-copy WebP demuxer.
///
/// Parses a still or animated WebP file and provides access to frame
/// metadata and raw bitstreams without decoding pixel data.
pub struct WebPDemuxer<'a> {
    data: &'a [u8],
    canvas_width: u32,
    canvas_height: u32,
    loop_count: LoopCount,
    background_color: u32,
    has_alpha: bool,
    is_animated: bool,
    frames: Vec<FrameRecord>,
    single: Option<ImageRanges>,
}

impl<'a> WebPDemuxer<'a> {
    /// Parse a WebP file from a byte slice.
    ///
    /// This only parses the container structure and the bitstream headers
    /// needed for frame dimensions. No pixel decoding is performed.
    pub fn new(data: &'a [u8]) -> Result<Self, AssemblyError> {
        if data.len() < 20 {
            return Err(invalid("File too small"));
        }

        let mut r = SliceReader::new(data);
        if &r.read_fourcc()? != b"RIFF" {
            return Err(invalid("Missing RIFF signature"));
        }
        let riff_size = r.read_u32_le()? as usize;
        if &r.read_fourcc()? != b"WEBP" {
            return Err(invalid("Missing WEBP signature"));
        }
        // Trailing bytes after the declared RIFF size are ignored.
        let end = riff_size.saturating_add(8).min(data.len());

        let mut demuxer = Self {
            data,
            canvas_width: 0,
            canvas_height: 0,
            loop_count: LoopCount::from(1),
            background_color: 0,
            has_alpha: false,
            is_animated: false,
            frames: Vec::new(),
            single: None,
        };

        let (fourcc, payload) = read_chunk(&mut r, end)?;
        match &fourcc {
            b"VP8 " | b"VP8L" => {
                let image = image_ranges(data, fourcc, payload, None)?;
                demuxer.canvas_width = image.width;
                demuxer.canvas_height = image.height;
                demuxer.has_alpha = image.has_alpha;
                demuxer.single = Some(image);
            }
            b"VP8X" => demuxer.parse_extended(r, payload, end)?,
            other => {
                return Err(invalid(format!(
                    "Unknown first chunk {:?}",
                    String::from_utf8_lossy(other)
                )))
            }
        }
        Ok(demuxer)
    }

    fn parse_extended(
        &mut self,
        mut r: SliceReader<'a>,
        vp8x: Range<usize>,
        end: usize,
    ) -> Result<(), AssemblyError> {
        let data = self.data;
        if vp8x.len() < 10 {
            return Err(invalid("VP8X chunk too small"));
        }
        let mut header = SliceReader::new(&data[vp8x]);
        let flags = header.read_u8()?;
        header.skip(3)?;
        self.canvas_width = header.read_u24_le()? + 1;
        self.canvas_height = header.read_u24_le()? + 1;
        self.has_alpha = flags & VP8X_ALPHA != 0;
        self.is_animated = flags & VP8X_ANIMATION != 0;

        let mut pending_alpha = None;
        while r.position() + 8 <= end {
            let (fourcc, payload) = read_chunk(&mut r, end)?;
            match &fourcc {
                b"ANIM" if self.is_animated => {
                    let mut anim = SliceReader::new(&data[payload]);
                    self.background_color = anim.read_u32_le()?;
                    self.loop_count = LoopCount::from(anim.read_u16_le()?);
                }
                b"ANMF" if self.is_animated => {
                    let record = self.parse_anmf(payload)?;
                    self.frames.push(record);
                }
                b"ALPH" if !self.is_animated => pending_alpha = Some(payload),
                b"VP8 " | b"VP8L" if !self.is_animated => {
                    let image = image_ranges(data, fourcc, payload, pending_alpha.take())?;
                    self.single = Some(image);
                }
                _ => {}
            }
        }

        if !self.is_animated && self.single.is_none() {
            return Err(invalid("No image data in extended file"));
        }
        Ok(())
    }

    fn parse_anmf(&self, payload: Range<usize>) -> Result<FrameRecord, AssemblyError> {
        if payload.len() < 16 + 8 {
            return Err(invalid("ANMF chunk too small"));
        }
        let start = payload.start;

        // ANMF payload layout:
        // 3 bytes: Frame X (in 2-pixel units)
        // 3 bytes: Frame Y (in 2-pixel units)
        // 3 bytes: Frame Width Minus One
        // 3 bytes: Frame Height Minus One
        // 3 bytes: Frame Duration
        // 1 byte:  Flags (dispose[0], blend[1], reserved[2-7])
        // Then: sub-chunks (ALPH + VP8, or VP8L)
        let mut r = SliceReader::new(&self.data[..payload.end]);
        r.seek_from_start(start)?;
        let x_offset = r.read_u24_le()? * 2;
        let y_offset = r.read_u24_le()? * 2;
        let width = r.read_u24_le()? + 1;
        let height = r.read_u24_le()? + 1;
        let duration_ms = r.read_u24_le()?;
        let flags = r.read_u8()?;
        let dispose = if flags & 1 != 0 {
            DisposeMethod::Background
        } else {
            DisposeMethod::None
        };
        let blend = if flags & 2 != 0 {
            BlendMethod::Overwrite
        } else {
            BlendMethod::AlphaBlend
        };

        let mut alpha = None;
        while r.position() + 8 <= payload.end {
            let (fourcc, sub) = read_chunk(&mut r, payload.end)?;
            match &fourcc {
                b"ALPH" => alpha = Some(sub),
                b"VP8 " | b"VP8L" => {
                    let image = image_ranges(self.data, fourcc, sub, alpha)?;
                    return Ok(FrameRecord {
                        x_offset,
                        y_offset,
                        width,
                        height,
                        duration_ms,
                        dispose,
                        blend,
                        image,
                    });
                }
                _ => {}
            }
        }
        Err(invalid("ANMF chunk without image data"))
    }

    /// Canvas width in pixels.
    pub fn canvas_width(&self) -> u32 {
        self.canvas_width
    }

    /// Canvas height in pixels.
    pub fn canvas_height(&self) -> u32 {
        self.canvas_height
    }

    /// Number of frames. Non-animated images return 1.
    pub fn num_frames(&self) -> u32 {
        if self.is_animated {
            self.frames.len() as u32
        } else {
            1
        }
    }

    /// Loop count for animated images.
    pub fn loop_count(&self) -> LoopCount {
        self.loop_count
    }

    /// Background color for animated images, packed ARGB.
    pub fn background_color(&self) -> u32 {
        self.background_color
    }

    /// Whether the image is animated.
    pub fn is_animated(&self) -> bool {
        self.is_animated
    }

    /// Whether the image has alpha data.
    pub fn has_alpha(&self) -> bool {
        self.has_alpha
    }

    /// Get a specific frame by 1-based index.
    ///
    /// Returns `None` if the index is out of range.
    pub fn frame(&self, n: u32) -> Option<DemuxFrame<'a>> {
        let idx = n.checked_sub(1)? as usize;

        if !self.is_animated {
            if idx != 0 {
                return None;
            }
            let image = self.single.as_ref()?;
            return Some(self.demux_frame(
                1,
                image,
                FramePlacement {
                    x_offset: 0,
                    y_offset: 0,
                    width: image.width,
                    height: image.height,
                    duration_ms: 0,
                    dispose: DisposeMethod::None,
                    blend: BlendMethod::Overwrite,
                },
            ));
        }

        let record = self.frames.get(idx)?;
        Some(self.demux_frame(
            n,
            &record.image,
            FramePlacement {
                x_offset: record.x_offset,
                y_offset: record.y_offset,
                width: record.width,
                height: record.height,
                duration_ms: record.duration_ms,
                dispose: record.dispose,
                blend: record.blend,
            },
        ))
    }

    /// Iterate over all frames.
    pub fn frames(&self) -> DemuxFrameIter<'a, '_> {
        DemuxFrameIter {
            demuxer: self,
            current: 1,
        }
    }

    fn demux_frame(
        &self,
        frame_num: u32,
        image: &ImageRanges,
        placement: FramePlacement,
    ) -> DemuxFrame<'a> {
        DemuxFrame {
            frame_num,
            x_offset: placement.x_offset,
            y_offset: placement.y_offset,
            width: placement.width,
            height: placement.height,
            duration_ms: placement.duration_ms,
            dispose: placement.dispose,
            blend: placement.blend,
            has_alpha: image.has_alpha,
            is_lossy: image.is_lossy,
            bitstream: &self.data[image.bitstream.clone()],
            alpha_data: image.alpha.clone().map(|r| &self.data[r]),
        }
    }
}

struct FramePlacement {
    x_offset: u32,
    y_offset: u32,
    width: u32,
    height: u32,
    duration_ms: u32,
    dispose: DisposeMethod,
    blend: BlendMethod,
}

/// Iterator over demuxed frames.
pub struct DemuxFrameIter<'a, 'b> {
    demuxer: &'b WebPDemuxer<'a>,
    current: u32,
}

impl<'a> Iterator for DemuxFrameIter<'a, '_> {
    type Item = DemuxFrame<'a>;

    fn next(&mut self) -> Option<Self::Item> {
        let frame = self.demuxer.frame(self.current)?;
        self.current += 1;
        Some(frame)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let remaining = self.demuxer.num_frames().saturating_sub(self.current - 1) as usize;
        (remaining, Some(remaining))
    }
}

impl ExactSizeIterator for DemuxFrameIter<'_, '_> {}

/// Read one chunk header and return its tag and payload range, leaving the
/// reader positioned after the (padded) payload.
fn read_chunk(
    r: &mut SliceReader<'_>,
    end: usize,
) -> Result<([u8; 4], Range<usize>), AssemblyError> {
    let fourcc = r.read_fourcc()?;
    let size = r.read_u32_le()? as usize;
    let start = r.position();
    let payload_end = start
        .checked_add(size)
        .filter(|&e| e <= end)
        .ok_or_else(|| {
            invalid(format!(
                "Chunk {:?} overruns its container",
                String::from_utf8_lossy(&fourcc)
            ))
        })?;
    // The pad byte of the final chunk may be missing in the wild.
    r.seek_from_start((payload_end + (size & 1)).min(end))?;
    Ok((fourcc, start..payload_end))
}

/// Locate a VP8/VP8L bitstream and read its dimensions from the header.
fn image_ranges(
    data: &[u8],
    fourcc: [u8; 4],
    bitstream: Range<usize>,
    alpha: Option<Range<usize>>,
) -> Result<ImageRanges, AssemblyError> {
    let mut r = SliceReader::new(&data[bitstream.clone()]);
    if &fourcc == b"VP8L" {
        if r.read_u8()? != 0x2f {
            return Err(invalid("Invalid VP8L signature"));
        }
        let header = r.read_u32_le()?;
        let width = (header & 0x3FFF) + 1;
        let height = ((header >> 14) & 0x3FFF) + 1;
        let has_alpha = (header >> 28) & 1 != 0;
        return Ok(ImageRanges {
            bitstream,
            alpha: None,
            is_lossy: false,
            width,
            height,
            has_alpha,
        });
    }

    let frame_tag = r.read_u24_le()?;
    if frame_tag & 1 != 0 {
        return Err(invalid("VP8 frame is not a keyframe"));
    }
    if r.take_slice(3)? != [0x9Du8, 0x01, 0x2A] {
        return Err(invalid("Invalid VP8 magic"));
    }
    let width = u32::from(r.read_u16_le()? & 0x3FFF);
    let height = u32::from(r.read_u16_le()? & 0x3FFF);
    if width == 0 || height == 0 {
        return Err(invalid("VP8 frame has zero dimensions"));
    }
    Ok(ImageRanges {
        bitstream,
        has_alpha: alpha.is_some(),
        alpha,
        is_lossy: true,
        width,
        height,
    })
}
