//! Frame descriptors: one compressed still plus its placement and timing.

use super::error::MuxError;
use crate::vec_writer::MAX_U24;

/// How the frame area is disposed after rendering.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub enum DisposeMethod {
    /// Do not dispose. The frame remains on the canvas.
    #[default]
    None,
    /// Fill the frame rectangle with the background color.
    Background,
}

impl DisposeMethod {
    /// The one-bit code stored in the ANMF flags byte.
    pub const fn to_bits(self) -> u8 {
        match self {
            Self::None => 0,
            Self::Background => 1,
        }
    }
}

impl TryFrom<u8> for DisposeMethod {
    type Error = u8;

    fn try_from(code: u8) -> Result<Self, Self::Error> {
        match code {
            0 => Ok(Self::None),
            1 => Ok(Self::Background),
            other => Err(other),
        }
    }
}

/// How the frame is blended with the canvas.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub enum BlendMethod {
    /// Use alpha blending with the existing canvas content.
    #[default]
    AlphaBlend,
    /// Overwrite the canvas region with the frame data.
    Overwrite,
}

impl BlendMethod {
    /// The one-bit code for this mode (before shifting into the ANMF flags byte).
    pub const fn to_bits(self) -> u8 {
        match self {
            Self::AlphaBlend => 0,
            Self::Overwrite => 1,
        }
    }
}

impl TryFrom<u8> for BlendMethod {
    type Error = u8;

    fn try_from(code: u8) -> Result<Self, Self::Error> {
        match code {
            0 => Ok(Self::AlphaBlend),
            1 => Ok(Self::Overwrite),
            other => Err(other),
        }
    }
}

/// A single animation frame ready to join a sequence.
///
/// Built from an encoded still-WebP payload. The payload is copied on
/// construction, so the caller's buffer can be reused or dropped right away.
/// Descriptors are immutable once built.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FrameDescriptor {
    payload: Box<[u8]>,
    x_offset: u32,
    y_offset: u32,
    duration_ms: u32,
    dispose: DisposeMethod,
    blend: BlendMethod,
}

impl FrameDescriptor {
    /// Build a descriptor.
    ///
    /// Offsets are rounded down to the nearest even value, since ANMF stores
    /// them in 2-pixel units. `duration_ms` must fit in 24 bits.
    pub fn new(
        payload: &[u8],
        x_offset: u32,
        y_offset: u32,
        duration_ms: u32,
        dispose: DisposeMethod,
        blend: BlendMethod,
    ) -> Result<Self, MuxError> {
        if duration_ms > MAX_U24 {
            return Err(MuxError::InvalidDuration { duration_ms });
        }
        Ok(Self {
            payload: payload.into(),
            x_offset: x_offset & !1,
            y_offset: y_offset & !1,
            duration_ms,
            dispose,
            blend,
        })
    }

    /// The encoded still-WebP payload.
    pub fn payload(&self) -> &[u8] {
        &self.payload
    }

    /// Horizontal offset on the canvas (always even).
    pub fn x_offset(&self) -> u32 {
        self.x_offset
    }

    /// Vertical offset on the canvas (always even).
    pub fn y_offset(&self) -> u32 {
        self.y_offset
    }

    /// Display duration in milliseconds.
    pub fn duration_ms(&self) -> u32 {
        self.duration_ms
    }

    /// Disposal applied after this frame is shown.
    pub fn dispose(&self) -> DisposeMethod {
        self.dispose
    }

    /// Blending applied when this frame is drawn.
    pub fn blend(&self) -> BlendMethod {
        self.blend
    }
}
