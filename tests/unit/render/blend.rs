use super::*;

#[test]
fn over_opacity_0_is_noop() {
    let dst = [1, 2, 3, 4];
    let src = [200, 200, 200, 200];
    assert_eq!(over(dst, src, 0.0), dst);
}

#[test]
fn over_src_alpha_0_is_noop() {
    let dst = [10, 20, 30, 40];
    let src = [255, 255, 255, 0];
    assert_eq!(over(dst, src, 1.0), dst);
}

#[test]
fn over_src_opaque_replaces_dst() {
    let dst = [0, 0, 0, 255];
    let src = [255, 0, 0, 255];
    assert_eq!(over(dst, src, 1.0), src);
}

#[test]
fn over_dst_transparent_returns_scaled_src() {
    let dst = [0, 0, 0, 0];
    let src = [100, 110, 120, 200];
    assert_eq!(over(dst, src, 1.0), src);
}

#[test]
fn over_in_place_requires_matching_buffers() {
    let mut dst = vec![0u8; 8];
    assert!(over_in_place(&mut dst, &[0u8; 4], 1.0).is_err());
    let mut short = vec![0u8; 6];
    assert!(over_in_place(&mut short, &[0u8; 6], 1.0).is_err());
    assert!(over_in_place(&mut dst, &[0u8; 8], 1.0).is_ok());
}

#[test]
fn punch_out_full_coverage_clears_pixels() {
    let mut dst = vec![100, 50, 25, 255, 10, 20, 30, 128];
    punch_out_in_place(&mut dst, &[255, 255]).unwrap();
    assert_eq!(dst, vec![0u8; 8]);
}

#[test]
fn punch_out_zero_coverage_is_noop() {
    let mut dst = vec![100, 50, 25, 255, 10, 20, 30, 128];
    let orig = dst.clone();
    punch_out_in_place(&mut dst, &[0, 0]).unwrap();
    assert_eq!(dst, orig);
}

#[test]
fn punch_out_partial_coverage_scales_all_channels() {
    let mut dst = vec![200, 100, 50, 255];
    punch_out_in_place(&mut dst, &[127]).unwrap();
    // keep = 128/255 of the original, within integer rounding.
    assert!(dst[3] >= 127 && dst[3] <= 129, "alpha was {}", dst[3]);
    assert!(dst[0] >= 99 && dst[0] <= 101, "red was {}", dst[0]);
}

#[test]
fn punch_out_requires_one_mask_byte_per_pixel() {
    let mut dst = vec![0u8; 8];
    assert!(punch_out_in_place(&mut dst, &[0u8; 3]).is_err());
    assert!(punch_out_in_place(&mut dst, &[0u8; 2]).is_ok());
}
