use crate::foundation::error::{PfpError, PfpResult};
use crate::foundation::math::mul_div255_u8;

/// One premultiplied RGBA8 pixel.
pub type PremulRgba8 = [u8; 4];

/// Source-over composite of premultiplied pixels at the given opacity.
pub fn over(dst: PremulRgba8, src: PremulRgba8, opacity: f32) -> PremulRgba8 {
    let opacity = opacity.clamp(0.0, 1.0);
    if opacity <= 0.0 || src[3] == 0 {
        return dst;
    }

    let op = ((opacity * 255.0).round() as i32).clamp(0, 255) as u16;
    let sa = mul_div255(u16::from(src[3]), op);
    if sa == 0 {
        return dst;
    }

    let inv = 255u16 - u16::from(sa);

    let mut out = [0u8; 4];
    out[3] = add_sat_u8(sa, mul_div255(u16::from(dst[3]), inv));

    for i in 0..3 {
        let sc = mul_div255(u16::from(src[i]), op);
        let dc = mul_div255(u16::from(dst[i]), inv);
        out[i] = add_sat_u8(sc, dc);
    }
    out
}

/// Source-over composite `src` onto `dst`, pixel by pixel.
pub fn over_in_place(dst: &mut [u8], src: &[u8], opacity: f32) -> PfpResult<()> {
    if dst.len() != src.len() || !dst.len().is_multiple_of(4) {
        return Err(PfpError::render(
            "over_in_place expects equal-length rgba8 buffers",
        ));
    }
    for (d, s) in dst.chunks_exact_mut(4).zip(src.chunks_exact(4)) {
        let out = over([d[0], d[1], d[2], d[3]], [s[0], s[1], s[2], s[3]], opacity);
        d.copy_from_slice(&out);
    }
    Ok(())
}

/// Destination-out: erase `dst` wherever `mask` has coverage.
///
/// `mask` holds one coverage byte per pixel; full coverage (255) clears the
/// pixel entirely, partial coverage scales all four premultiplied channels.
pub fn punch_out_in_place(dst: &mut [u8], mask: &[u8]) -> PfpResult<()> {
    if dst.len() != mask.len() * 4 {
        return Err(PfpError::render(
            "punch_out_in_place expects 4 rgba bytes per mask byte",
        ));
    }
    for (d, &m) in dst.chunks_exact_mut(4).zip(mask.iter()) {
        if m == 0 {
            continue;
        }
        let keep = 255u16 - u16::from(m);
        for c in d.iter_mut() {
            *c = mul_div255(u16::from(*c), keep);
        }
    }
    Ok(())
}

fn mul_div255(x: u16, y: u16) -> u8 {
    mul_div255_u8(x, y)
}

fn add_sat_u8(a: u8, b: u8) -> u8 {
    a.saturating_add(b)
}

#[cfg(test)]
#[path = "../../tests/unit/render/blend.rs"]
mod tests;
