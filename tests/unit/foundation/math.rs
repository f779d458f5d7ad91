use super::*;

#[test]
fn mul_div255_variants_align() {
    for x in [0u16, 1, 127, 255] {
        for y in [0u16, 1, 127, 255] {
            assert_eq!(u16::from(mul_div255_u8(x, y)), mul_div255_u16(x, y));
        }
    }
}

#[test]
fn round_handles_halves_and_non_finite() {
    assert_eq!(round_i64(2.5), 3);
    assert_eq!(round_i64(-2.5), -3);
    assert_eq!(round_i64(f64::INFINITY), 0);
}
