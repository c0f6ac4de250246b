//! Global animation parameters.

use core::num::NonZeroU16;

/// Number of times that an animation loops.
#[derive(Copy, Clone, Debug, Default, Eq, PartialEq, Hash)]
pub enum LoopCount {
    /// The animation loops forever.
    #[default]
    Forever,
    /// The whole frame sequence plays the specified number of times.
    Times(NonZeroU16),
}

impl LoopCount {
    /// The value stored in the ANIM chunk, where 0 means forever.
    pub const fn to_u16(self) -> u16 {
        match self {
            LoopCount::Forever => 0,
            LoopCount::Times(n) => n.get(),
        }
    }
}

impl core::fmt::Display for LoopCount {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            LoopCount::Forever => f.write_str("infinite"),
            LoopCount::Times(n) => write!(f, "{} time{}", n, if n.get() == 1 { "" } else { "s" }),
        }
    }
}

impl From<u16> for LoopCount {
    fn from(n: u16) -> Self {
        match NonZeroU16::new(n) {
            None => LoopCount::Forever,
            Some(n) => LoopCount::Times(n),
        }
    }
}

/// Canvas background and looping for an animated WebP.
///
/// The default is an opaque white background looping forever.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct AnimationParams {
    /// Background color packed as ARGB: `0xAARRGGBB`.
    ///
    /// For example `0xFFFFFFFF` is opaque white, `0xFF000000` opaque black and
    /// `0x00000000` fully transparent. Viewers may ignore it.
    pub background_color: u32,
    /// Loop count for the animation.
    pub loop_count: LoopCount,
}

impl AnimationParams {
    /// Opaque white.
    pub const DEFAULT_BACKGROUND: u32 = 0xFFFF_FFFF;

    /// Create parameters from a packed ARGB color and a raw loop count
    /// (0 = forever).
    pub fn new(background_color: u32, loop_count: u16) -> Self {
        Self {
            background_color,
            loop_count: loop_count.into(),
        }
    }

    /// Background color as stored in the ANIM chunk: `[B, G, R, A]`.
    pub fn background_bgra(&self) -> [u8; 4] {
        self.background_color.to_le_bytes()
    }
}

impl Default for AnimationParams {
    fn default() -> Self {
        Self {
            background_color: Self::DEFAULT_BACKGROUND,
            loop_count: LoopCount::Forever,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn zero_loops_means_forever() {
        assert_eq!(LoopCount::from(0), LoopCount::Forever);
        assert_eq!(LoopCount::from(5).to_u16(), 5);
        assert_eq!(LoopCount::Forever.to_u16(), 0);
    }

    #[test]
    fn default_is_opaque_white_forever() {
        let params = AnimationParams::default();
        assert_eq!(params.background_color, 0xFFFF_FFFF);
        assert_eq!(params.loop_count, LoopCount::Forever);
    }

    #[test]
    fn background_is_stored_blue_first() {
        let params = AnimationParams::new(0x80_11_22_33, 0);
        assert_eq!(params.background_bgra(), [0x33, 0x22, 0x11, 0x80]);
    }

    #[test]
    fn loop_count_display() {
        assert_eq!(LoopCount::Forever.to_string(), "infinite");
        assert_eq!(LoopCount::from(1).to_string(), "1 time");
        assert_eq!(LoopCount::from(3).to_string(), "3 times");
    }
}
