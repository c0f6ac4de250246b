//! End-to-end tests for animated WebP encoding.

use std::io::Cursor;

use rgb::Rgb;
use webp_animate::mux::{
    AnimationEncoder, AnimationParams, AnimationSequence, AssemblyError, BlendMethod, CodecError,
    DisposeMethod, Frame, FrameDescriptor, LoopCount, MuxError, PixelImage, PixelLayout, RawImage,
    SequenceState, WebPDemuxer,
};
use webp_animate::{encode_animation, encode_animation_to_vec, encode_frame, LosslessCodec};

fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_max_level(tracing::Level::DEBUG)
        .with_test_writer()
        .try_init();
}

/// Create a solid-color RGBA frame.
fn solid_rgba(width: u32, height: u32, rgba: [u8; 4]) -> Vec<u8> {
    rgba.repeat((width * height) as usize)
}

/// Decode every frame with an independent decoder, returning the first
/// canvas pixel as RGBA and the duration of each frame.
fn decode_frames(data: &[u8]) -> Vec<([u8; 4], u32)> {
    let mut decoder = image_webp::WebPDecoder::new(Cursor::new(data)).unwrap();
    assert!(decoder.is_animated());
    let channels = if decoder.has_alpha() { 4 } else { 3 };
    let mut buf = vec![0u8; decoder.output_buffer_size().unwrap()];

    (0..decoder.num_frames())
        .map(|_| {
            let duration = decoder.read_frame(&mut buf).unwrap();
            let alpha = if channels == 4 { buf[3] } else { 255 };
            ([buf[0], buf[1], buf[2], alpha], duration)
        })
        .collect()
}

// ============================================================================
// One-shot encoding
// ============================================================================

#[test]
fn two_frame_roundtrip() {
    init_tracing();
    let red = solid_rgba(320, 240, [255, 0, 0, 255]);
    let blue = solid_rgba(320, 240, [0, 0, 255, 255]);
    let red = RawImage::new(&red, PixelLayout::Rgba8, 320, 240);
    let blue = RawImage::new(&blue, PixelLayout::Rgba8, 320, 240);

    let frames = [&red, &blue].map(|image| Frame {
        dispose: DisposeMethod::Background,
        blend: BlendMethod::Overwrite,
        ..Frame::new(image, 1000)
    });
    let params = AnimationParams {
        background_color: 0xFFFF_FFFF,
        loop_count: LoopCount::Forever,
    };

    let mut webp = Vec::new();
    encode_animation(&mut webp, &frames, params).unwrap();

    let decoder = image_webp::WebPDecoder::new(Cursor::new(&webp)).unwrap();
    assert_eq!(decoder.dimensions(), (320, 240));
    assert_eq!(decoder.num_frames(), 2);
    assert_eq!(decoder.loop_count(), image_webp::LoopCount::Forever);

    let decoded = decode_frames(&webp);
    assert_eq!(
        decoded,
        vec![([255, 0, 0, 255], 1000), ([0, 0, 255, 255], 1000)]
    );

    let demuxer = WebPDemuxer::new(&webp).unwrap();
    for frame in demuxer.frames() {
        assert_eq!(frame.dispose, DisposeMethod::Background);
        assert_eq!(frame.blend, BlendMethod::Overwrite);
        assert!(!frame.is_lossy);
    }
}

#[test]
fn to_vec_matches_writer_output() {
    let pixels = solid_rgba(8, 8, [10, 20, 30, 255]);
    let image = RawImage::new(&pixels, PixelLayout::Rgba8, 8, 8);
    let frames = [Frame::new(&image, 40)];

    let mut written = Vec::new();
    encode_animation(&mut written, &frames, AnimationParams::default()).unwrap();
    let returned = encode_animation_to_vec(&frames, AnimationParams::default()).unwrap();
    assert_eq!(written, returned);
}

#[test]
fn codec_error_on_second_frame_aborts_without_output() {
    let pixels = solid_rgba(4, 4, [1, 1, 1, 255]);
    let good = RawImage::new(&pixels, PixelLayout::Rgba8, 4, 4);
    let empty = RawImage::new(&[], PixelLayout::Rgba8, 0, 0);
    let frames = [
        Frame::new(&good, 10),
        Frame::new(&empty, 10),
        Frame::new(&good, 10),
    ];

    let mut sink = Vec::new();
    let err = encode_animation(&mut sink, &frames, AnimationParams::default()).unwrap_err();
    assert!(matches!(
        err,
        MuxError::Codec(CodecError::InvalidDimensions {
            width: 0,
            height: 0
        })
    ));
    assert!(sink.is_empty());

    // The stateful path can still be cleaned up after the same failure.
    let mut encoder = AnimationEncoder::new();
    encoder.add_frame(&frames[0]).unwrap();
    assert!(encoder.add_frame(&frames[1]).is_err());
    encoder.close();
    encoder.close();
    assert!(encoder.is_closed());
}

#[test]
fn zero_frames_is_an_assembly_error() {
    let err = encode_animation_to_vec(&[], AnimationParams::default()).unwrap_err();
    assert!(matches!(err, MuxError::Assembly(AssemblyError::NoFrames)));
}

// ============================================================================
// Parameters
// ============================================================================

#[test]
fn last_parameters_win() {
    let pixels = solid_rgba(4, 4, [0, 255, 0, 255]);
    let image = RawImage::new(&pixels, PixelLayout::Rgba8, 4, 4);

    let mut encoder = AnimationEncoder::new();
    encoder
        .set_animation_params(AnimationParams::new(0xFF00_0000, 5))
        .unwrap();
    encoder.add_frame(&Frame::new(&image, 100)).unwrap();
    encoder
        .set_animation_params(AnimationParams::new(0x0000_0000, 0))
        .unwrap();
    let webp = encoder.encode_to_vec().unwrap();

    let demuxer = WebPDemuxer::new(&webp).unwrap();
    assert_eq!(demuxer.loop_count(), LoopCount::Forever);
    assert_eq!(demuxer.background_color(), 0x0000_0000);

    let decoder = image_webp::WebPDecoder::new(Cursor::new(&webp)).unwrap();
    assert_eq!(decoder.loop_count(), image_webp::LoopCount::Forever);
}

#[test]
fn default_parameters_are_white_and_forever() {
    let pixels = solid_rgba(2, 2, [3, 3, 3, 255]);
    let image = RawImage::new(&pixels, PixelLayout::Rgba8, 2, 2);
    let mut encoder = AnimationEncoder::new();
    encoder.add_frame(&Frame::new(&image, 100)).unwrap();
    let webp = encoder.encode_to_vec().unwrap();

    let demuxer = WebPDemuxer::new(&webp).unwrap();
    assert_eq!(demuxer.background_color(), 0xFFFF_FFFF);
    assert_eq!(demuxer.loop_count(), LoopCount::Forever);
}

#[test]
fn finite_loop_count_roundtrips() {
    let pixels = solid_rgba(2, 2, [3, 3, 3, 255]);
    let image = RawImage::new(&pixels, PixelLayout::Rgba8, 2, 2);
    let webp =
        encode_animation_to_vec(&[Frame::new(&image, 100)], AnimationParams::new(0, 3)).unwrap();

    let decoder = image_webp::WebPDecoder::new(Cursor::new(&webp)).unwrap();
    assert_eq!(
        decoder.loop_count(),
        image_webp::LoopCount::Times(std::num::NonZeroU16::new(3).unwrap())
    );
}

// ============================================================================
// Placement and pixel sources
// ============================================================================

#[test]
fn odd_offsets_are_rounded_down_in_the_container() {
    let full = solid_rgba(16, 16, [0, 0, 0, 255]);
    let patch = solid_rgba(4, 4, [255, 255, 255, 255]);
    let full = RawImage::new(&full, PixelLayout::Rgba8, 16, 16);
    let patch = RawImage::new(&patch, PixelLayout::Rgba8, 4, 4);

    let frames = [
        Frame::new(&full, 100),
        Frame {
            x_offset: 5,
            y_offset: 3,
            ..Frame::new(&patch, 100)
        },
    ];
    let webp = encode_animation_to_vec(&frames, AnimationParams::default()).unwrap();

    let demuxer = WebPDemuxer::new(&webp).unwrap();
    assert_eq!((demuxer.canvas_width(), demuxer.canvas_height()), (16, 16));
    let patch = demuxer.frame(2).unwrap();
    assert_eq!((patch.x_offset, patch.y_offset), (4, 2));
    assert_eq!((patch.width, patch.height), (4, 4));

    let decoder = image_webp::WebPDecoder::new(Cursor::new(&webp)).unwrap();
    assert_eq!(decoder.num_frames(), 2);
}

#[test]
fn non_rgba_sources_are_converted() {
    let bgr = [30u8, 20, 10].repeat(6 * 6);
    let bgr = RawImage::new(&bgr, PixelLayout::Bgr8, 6, 6);
    let typed = vec![Rgb::new(7u8, 8, 9); 6 * 6];
    let typed = PixelImage::new(&typed, 6, 6);

    let frames = [
        Frame {
            blend: BlendMethod::Overwrite,
            ..Frame::new(&bgr, 10)
        },
        Frame {
            blend: BlendMethod::Overwrite,
            ..Frame::new(&typed, 20)
        },
    ];
    let webp = encode_animation_to_vec(&frames, AnimationParams::default()).unwrap();

    let decoded = decode_frames(&webp);
    assert_eq!(
        decoded,
        vec![([10, 20, 30, 255], 10), ([7, 8, 9, 255], 20)]
    );
}

// ============================================================================
// Sequence store
// ============================================================================

#[test]
fn sequence_assembles_prebuilt_descriptors() {
    let pixels = solid_rgba(4, 4, [50, 60, 70, 255]);
    let image = RawImage::new(&pixels, PixelLayout::Rgba8, 4, 4);
    let payload = encode_frame(&LosslessCodec, &image, 90).unwrap();

    let mut sequence = AnimationSequence::new();
    for duration in [0, 250] {
        let frame = FrameDescriptor::new(
            &payload,
            0,
            0,
            duration,
            DisposeMethod::None,
            BlendMethod::AlphaBlend,
        )
        .unwrap();
        sequence.push_frame(frame).unwrap();
    }
    let webp = sequence.assemble().unwrap();
    assert_eq!(sequence.state(), SequenceState::Assembled);
    assert!(matches!(
        sequence.assemble(),
        Err(MuxError::AlreadyAssembled)
    ));

    let demuxer = WebPDemuxer::new(&webp).unwrap();
    let durations: Vec<_> = demuxer.frames().map(|f| f.duration_ms).collect();
    assert_eq!(durations, [0, 250]);

    sequence.close();
    assert_eq!(sequence.state(), SequenceState::Closed);
}

#[test]
fn malformed_payload_produces_no_output() {
    let pixels = solid_rgba(4, 4, [1, 2, 3, 255]);
    let image = RawImage::new(&pixels, PixelLayout::Rgba8, 4, 4);
    let good = encode_frame(&LosslessCodec, &image, 90).unwrap();
    let mut bad = good.clone();
    bad.truncate(14);

    let mut sequence = AnimationSequence::new();
    for payload in [&good, &bad] {
        let frame = FrameDescriptor::new(
            payload,
            0,
            0,
            10,
            DisposeMethod::None,
            BlendMethod::AlphaBlend,
        )
        .unwrap();
        sequence.push_frame(frame).unwrap();
    }

    let err = sequence.assemble().unwrap_err();
    assert!(matches!(
        err,
        MuxError::Assembly(AssemblyError::InvalidFramePayload { index: 1, .. })
    ));
    assert_eq!(sequence.state(), SequenceState::Open);
    assert_eq!(sequence.num_frames(), 2);
}

// ============================================================================
// Lossy frames
// ============================================================================

#[cfg(feature = "lossy")]
#[test]
fn lossy_translucent_frames_carry_alpha() {
    use webp_animate::LossyCodec;

    init_tracing();
    let red = solid_rgba(32, 16, [250, 10, 10, 128]);
    let red = RawImage::new(&red, PixelLayout::Rgba8, 32, 16);
    let frame = Frame {
        blend: BlendMethod::Overwrite,
        ..Frame::new(&red, 80)
    };

    let mut encoder = AnimationEncoder::with_codec(LossyCodec);
    encoder.add_frame(&frame).unwrap();
    encoder.add_frame(&frame).unwrap();
    let webp = encoder.encode_to_vec().unwrap();

    let demuxer = WebPDemuxer::new(&webp).unwrap();
    assert!(demuxer.has_alpha());
    assert_eq!(demuxer.num_frames(), 2);
    for frame in demuxer.frames() {
        assert!(frame.is_lossy);
        assert!(frame.alpha_data.is_some());
        assert_eq!((frame.width, frame.height), (32, 16));
    }

    let decoded = decode_frames(&webp);
    assert_eq!(decoded.len(), 2);
    for ([r, g, b, a], duration) in decoded {
        assert_eq!(duration, 80);
        assert_eq!(a, 128);
        assert!(r > 200 && g < 60 && b < 60, "{r},{g},{b}");
    }
}
