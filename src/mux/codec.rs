//! Frame codec adapter.
//!
//! Turns any [`PixelSource`] into a canonical RGBA buffer and hands it to a
//! [`FrameCodec`], which produces a complete still-WebP file. The animation
//! encoder always calls it with [`FRAME_QUALITY`].
//!
//! ```rust
//! use webp_animate::mux::{encode_frame, LosslessCodec, PixelLayout, RawImage};
//!
//! let rgb = vec![255u8; 4 * 4 * 3];
//! let image = RawImage::new(&rgb, PixelLayout::Rgb8, 4, 4);
//! let webp = encode_frame(&LosslessCodec, &image, 90)?;
//! assert_eq!(&webp[..4], b"RIFF");
//! # Ok::<(), webp_animate::mux::CodecError>(())
//! ```

use std::borrow::Cow;

use rgb::{Bgr, Bgra, Rgb, Rgba};

use super::error::CodecError;

/// Quality used for every frame added through the animation encoder.
pub const FRAME_QUALITY: u8 = 90;

/// Largest width or height a WebP frame can have.
pub const MAX_DIMENSION: u32 = 16384;

/// Byte layout of a raw pixel buffer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PixelLayout {
    /// 8-bit grayscale.
    L8,
    /// 8-bit grayscale with alpha.
    La8,
    /// 8-bit RGB.
    Rgb8,
    /// 8-bit RGBA.
    Rgba8,
    /// 8-bit BGR.
    Bgr8,
    /// 8-bit BGRA.
    Bgra8,
}

impl PixelLayout {
    /// Bytes per pixel.
    pub const fn bytes_per_pixel(self) -> usize {
        match self {
            PixelLayout::L8 => 1,
            PixelLayout::La8 => 2,
            PixelLayout::Rgb8 | PixelLayout::Bgr8 => 3,
            PixelLayout::Rgba8 | PixelLayout::Bgra8 => 4,
        }
    }

    /// Whether the layout carries an alpha channel.
    pub const fn has_alpha(self) -> bool {
        matches!(
            self,
            PixelLayout::La8 | PixelLayout::Rgba8 | PixelLayout::Bgra8
        )
    }
}

/// Anything that can describe itself as width × height RGBA pixels.
pub trait PixelSource {
    /// Width and height in pixels.
    fn dimensions(&self) -> (u32, u32);

    /// Tightly packed RGBA8 pixels, row-major.
    ///
    /// Sources already stored as RGBA8 should borrow; everything else
    /// materializes a converted copy.
    fn to_rgba(&self) -> Result<Cow<'_, [u8]>, CodecError>;
}

/// A raw, tightly packed pixel buffer in one of the [`PixelLayout`]s.
#[derive(Debug, Clone, Copy)]
pub struct RawImage<'a> {
    pixels: &'a [u8],
    layout: PixelLayout,
    width: u32,
    height: u32,
}

impl<'a> RawImage<'a> {
    /// Wrap a pixel buffer. Its length is checked when the frame is encoded.
    pub fn new(pixels: &'a [u8], layout: PixelLayout, width: u32, height: u32) -> Self {
        Self {
            pixels,
            layout,
            width,
            height,
        }
    }

    /// The buffer's layout.
    pub fn layout(&self) -> PixelLayout {
        self.layout
    }
}

impl PixelSource for RawImage<'_> {
    fn dimensions(&self) -> (u32, u32) {
        (self.width, self.height)
    }

    fn to_rgba(&self) -> Result<Cow<'_, [u8]>, CodecError> {
        let expected = pixel_count(self.width, self.height)
            .and_then(|n| n.checked_mul(self.layout.bytes_per_pixel()))
            .unwrap_or(usize::MAX);
        if self.pixels.len() < expected {
            return Err(CodecError::InvalidBufferSize {
                expected,
                actual: self.pixels.len(),
            });
        }
        let pixels = &self.pixels[..expected];
        let rgba = match self.layout {
            PixelLayout::Rgba8 => return Ok(Cow::Borrowed(pixels)),
            PixelLayout::L8 => pixels.iter().flat_map(|&p| [p, p, p, 255]).collect(),
            PixelLayout::La8 => pixels
                .chunks_exact(2)
                .flat_map(|p| [p[0], p[0], p[0], p[1]])
                .collect(),
            PixelLayout::Rgb8 => pixels
                .chunks_exact(3)
                .flat_map(|p| [p[0], p[1], p[2], 255])
                .collect(),
            PixelLayout::Bgr8 => pixels
                .chunks_exact(3)
                .flat_map(|p| [p[2], p[1], p[0], 255])
                .collect(),
            PixelLayout::Bgra8 => pixels
                .chunks_exact(4)
                .flat_map(|p| [p[2], p[1], p[0], p[3]])
                .collect(),
        };
        Ok(Cow::Owned(rgba))
    }
}

/// `width * height`, or `None` when it does not fit in `usize`. A buffer can
/// never be that long, so callers report it as too short.
fn pixel_count(width: u32, height: u32) -> Option<usize> {
    usize::try_from(width)
        .ok()?
        .checked_mul(usize::try_from(height).ok()?)
}

mod private {
    pub trait Sealed {}
}

/// Typed pixel from the [`rgb`] crate that converts to RGBA8.
pub trait EncodePixel: Copy + private::Sealed {
    /// This pixel as `[r, g, b, a]`.
    fn to_rgba8(self) -> [u8; 4];
}

impl private::Sealed for Rgb<u8> {}
impl private::Sealed for Rgba<u8> {}
impl private::Sealed for Bgr<u8> {}
impl private::Sealed for Bgra<u8> {}

impl EncodePixel for Rgb<u8> {
    fn to_rgba8(self) -> [u8; 4] {
        [self.r, self.g, self.b, 255]
    }
}

impl EncodePixel for Rgba<u8> {
    fn to_rgba8(self) -> [u8; 4] {
        [self.r, self.g, self.b, self.a]
    }
}

impl EncodePixel for Bgr<u8> {
    fn to_rgba8(self) -> [u8; 4] {
        [self.r, self.g, self.b, 255]
    }
}

impl EncodePixel for Bgra<u8> {
    fn to_rgba8(self) -> [u8; 4] {
        [self.r, self.g, self.b, self.a]
    }
}

/// A row-major slice of typed pixels.
///
/// ```rust
/// use rgb::Rgb;
/// use webp_animate::mux::{PixelImage, PixelSource};
///
/// let pixels = vec![Rgb::new(255u8, 0, 0); 2 * 2];
/// let image = PixelImage::new(&pixels, 2, 2);
/// assert_eq!(&image.to_rgba()?[..4], &[255, 0, 0, 255]);
/// # Ok::<(), webp_animate::mux::CodecError>(())
/// ```
#[derive(Debug, Clone, Copy)]
pub struct PixelImage<'a, P: EncodePixel> {
    pixels: &'a [P],
    width: u32,
    height: u32,
}

impl<'a, P: EncodePixel> PixelImage<'a, P> {
    /// Wrap a pixel slice. Its length is checked when the frame is encoded.
    pub fn new(pixels: &'a [P], width: u32, height: u32) -> Self {
        Self {
            pixels,
            width,
            height,
        }
    }
}

impl<P: EncodePixel> PixelSource for PixelImage<'_, P> {
    fn dimensions(&self) -> (u32, u32) {
        (self.width, self.height)
    }

    fn to_rgba(&self) -> Result<Cow<'_, [u8]>, CodecError> {
        let npixels = pixel_count(self.width, self.height).unwrap_or(usize::MAX);
        if self.pixels.len() < npixels {
            return Err(CodecError::InvalidBufferSize {
                expected: npixels,
                actual: self.pixels.len(),
            });
        }
        Ok(Cow::Owned(
            self.pixels[..npixels]
                .iter()
                .flat_map(|p| p.to_rgba8())
                .collect(),
        ))
    }
}

/// Still-image compressor used for each animation frame.
pub trait FrameCodec {
    /// Compress tightly packed RGBA8 pixels into a complete still-WebP file.
    ///
    /// Callers guarantee `rgba.len() == width * height * 4`, non-zero
    /// dimensions no larger than [`MAX_DIMENSION`] and `quality <= 100`.
    fn encode_rgba(
        &self,
        rgba: &[u8],
        width: u32,
        height: u32,
        quality: u8,
    ) -> Result<Vec<u8>, CodecError>;
}

/// Lossless VP8L codec backed by `image-webp`.
///
/// The quality argument is ignored: VP8L output is pixel-exact and the
/// encoder exposes no effort knob, so the same pixels always produce the
/// same payload. Use `LossyCodec` when quality should matter.
#[derive(Debug, Clone, Copy, Default)]
pub struct LosslessCodec;

impl FrameCodec for LosslessCodec {
    fn encode_rgba(
        &self,
        rgba: &[u8],
        width: u32,
        height: u32,
        quality: u8,
    ) -> Result<Vec<u8>, CodecError> {
        tracing::trace!(width, height, quality, "encoding lossless frame");
        let mut out = Vec::new();
        image_webp::WebPEncoder::new(&mut out).encode(
            rgba,
            width,
            height,
            image_webp::ColorType::Rgba8,
        )?;
        Ok(out)
    }
}

/// Lossy VP8 codec backed by libwebp (through `webpx`).
///
/// `quality` maps directly onto libwebp's 0-100 quality scale. Frames with
/// transparency come back as extended stills carrying an `ALPH` chunk.
#[cfg(feature = "lossy")]
#[derive(Debug, Clone, Copy, Default)]
pub struct LossyCodec;

#[cfg(feature = "lossy")]
impl FrameCodec for LossyCodec {
    fn encode_rgba(
        &self,
        rgba: &[u8],
        width: u32,
        height: u32,
        quality: u8,
    ) -> Result<Vec<u8>, CodecError> {
        tracing::trace!(width, height, quality, "encoding lossy frame");
        webpx::EncoderConfig::new()
            .quality(f32::from(quality))
            .encode_rgba(rgba, width, height, webpx::Unstoppable)
            .map_err(|e| CodecError::Lossy(e.to_string()))
    }
}

impl<C: FrameCodec + ?Sized> FrameCodec for &C {
    fn encode_rgba(
        &self,
        rgba: &[u8],
        width: u32,
        height: u32,
        quality: u8,
    ) -> Result<Vec<u8>, CodecError> {
        (**self).encode_rgba(rgba, width, height, quality)
    }
}

/// Validate, convert to RGBA and compress one frame.
///
/// Nothing from `image` is retained once this returns.
pub fn encode_frame<C: FrameCodec + ?Sized>(
    codec: &C,
    image: &dyn PixelSource,
    quality: u8,
) -> Result<Vec<u8>, CodecError> {
    if quality > 100 {
        return Err(CodecError::InvalidQuality(quality));
    }
    let (width, height) = image.dimensions();
    if width == 0 || height == 0 || width > MAX_DIMENSION || height > MAX_DIMENSION {
        return Err(CodecError::InvalidDimensions { width, height });
    }
    let rgba = image.to_rgba()?;
    codec.encode_rgba(&rgba, width, height, quality)
}
