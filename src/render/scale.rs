use crate::assets::decode::PreparedImage;
use crate::foundation::error::{PfpError, PfpResult};

/// Nearest-neighbor scale of `src` onto a `size`x`size` buffer.
///
/// No filtering or smoothing of any kind: each destination pixel copies
/// exactly one source pixel (floor mapping), preserving pixel-art edges at
/// any zoom level. A zero-dimension source yields a transparent buffer.
pub fn scale_nearest(src: &PreparedImage, size: u32) -> Vec<u8> {
    let mut out = vec![0u8; (size as usize) * (size as usize) * 4];
    // Infallible: the buffer was just sized to size*size*4.
    let _ = scale_nearest_into(src, size, &mut out);
    out
}

/// Nearest-neighbor scale of `src` into a caller-provided `size`x`size`
/// buffer, overwriting its previous contents.
pub fn scale_nearest_into(src: &PreparedImage, size: u32, dst: &mut [u8]) -> PfpResult<()> {
    let n = size as usize;
    if dst.len() != n * n * 4 {
        return Err(PfpError::render(
            "scale_nearest_into expects a size*size*4 destination",
        ));
    }
    if src.width == 0 || src.height == 0 {
        dst.fill(0);
        return Ok(());
    }

    let sw = src.width as usize;
    let sh = src.height as usize;
    let pixels = src.rgba8_premul.as_slice();

    for y in 0..n {
        let sy = y * sh / n;
        let src_row = sy * sw * 4;
        let dst_row = y * n * 4;
        for x in 0..n {
            let sx = x * sw / n;
            let s = src_row + sx * 4;
            let d = dst_row + x * 4;
            dst[d..d + 4].copy_from_slice(&pixels[s..s + 4]);
        }
    }
    Ok(())
}

#[cfg(test)]
#[path = "../../tests/unit/render/scale.rs"]
mod tests;
