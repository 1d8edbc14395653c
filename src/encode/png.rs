use std::io::Cursor;
use std::path::Path;

use anyhow::Context;

use crate::foundation::core::FrameRgba;
use crate::foundation::error::{PfpError, PfpResult};

/// Fixed file name used by the save convention.
pub const EXPORT_FILE_NAME: &str = "my-pfp.png";

/// Encode a frame as PNG bytes.
///
/// Premultiplied input is converted back to straight alpha before encoding.
/// Fails without side effects; nothing is written anywhere.
pub fn encode_png(frame: &FrameRgba) -> PfpResult<Vec<u8>> {
    let expected = (frame.width as usize)
        .checked_mul(frame.height as usize)
        .and_then(|n| n.checked_mul(4));
    if expected != Some(frame.data.len()) {
        return Err(PfpError::export("frame buffer does not match dimensions"));
    }

    let mut data = frame.data.clone();
    if frame.premultiplied {
        unpremultiply_rgba8_in_place(&mut data);
    }

    let img = image::RgbaImage::from_raw(frame.width, frame.height, data)
        .ok_or_else(|| PfpError::export("frame buffer rejected by encoder"))?;

    let mut buf = Vec::new();
    image::DynamicImage::ImageRgba8(img)
        .write_to(&mut Cursor::new(&mut buf), image::ImageFormat::Png)
        .context("encode png")?;
    Ok(buf)
}

/// Encode `frame` and write it to `path`.
///
/// The frame is encoded fully in memory first, so an encoding failure never
/// leaves a partial file behind.
pub fn write_png(frame: &FrameRgba, path: &Path) -> PfpResult<()> {
    let bytes = encode_png(frame)?;
    ensure_parent_dir(path)?;
    std::fs::write(path, &bytes).with_context(|| format!("write png '{}'", path.display()))?;
    tracing::debug!(path = %path.display(), len = bytes.len(), "wrote png export");
    Ok(())
}

/// Create the parent directory of `path` if it is missing.
pub fn ensure_parent_dir(path: &Path) -> PfpResult<()> {
    if let Some(parent) = path.parent()
        && !parent.as_os_str().is_empty()
    {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("create output dir '{}'", parent.display()))?;
    }
    Ok(())
}

fn unpremultiply_rgba8_in_place(rgba: &mut [u8]) {
    for px in rgba.chunks_exact_mut(4) {
        let a = u32::from(px[3]);
        if a == 0 {
            px[0] = 0;
            px[1] = 0;
            px[2] = 0;
            continue;
        }
        for c in &mut px[..3] {
            let v = (u32::from(*c) * 255 + a / 2) / a;
            *c = v.min(255) as u8;
        }
    }
}

#[cfg(test)]
#[path = "../../tests/unit/encode/png.rs"]
mod tests;
