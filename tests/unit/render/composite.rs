use super::*;

#[test]
fn flatten_premul_over_black() {
    let src = [64u8, 32, 0, 128];
    let mut dst = [0u8; 4];
    flatten_to_opaque_rgba8(&mut dst, &src, true, [0, 0, 0, 255]).unwrap();
    assert_eq!(dst, [64, 32, 0, 255]);
}

#[test]
fn flatten_straight_over_white() {
    let src = [0u8, 0, 0, 128];
    let mut dst = [0u8; 4];
    flatten_to_opaque_rgba8(&mut dst, &src, false, [255, 255, 255, 255]).unwrap();
    assert_eq!(dst, [127, 127, 127, 255]);
}

#[test]
fn flatten_rejects_mismatched_buffers() {
    let mut dst = [0u8; 8];
    assert!(flatten_to_opaque_rgba8(&mut dst, &[0u8; 4], true, [0, 0, 0, 255]).is_err());
}

#[test]
fn unpremultiply_restores_straight_alpha() {
    assert_eq!(unpremultiply_rgba8(&[128, 0, 64, 128]), vec![255, 0, 128, 128]);
    assert_eq!(unpremultiply_rgba8(&[9, 9, 9, 0]), vec![0, 0, 0, 0]);
    assert_eq!(unpremultiply_rgba8(&[1, 2, 3, 255]), vec![1, 2, 3, 255]);
}

#[test]
fn encoder_pixels_keeps_alpha_for_png() {
    let frame = FrameRGBA {
        width: 1,
        height: 1,
        data: vec![0, 0, 0, 0],
        premultiplied: true,
    };
    assert_eq!(encoder_pixels(&frame, false, [0, 0, 0, 255]).unwrap(), vec![0, 0, 0, 0]);
    assert_eq!(encoder_pixels(&frame, true, [0, 0, 0, 255]).unwrap(), vec![0, 0, 0, 255]);
}
