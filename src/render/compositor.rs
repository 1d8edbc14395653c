use crate::assets::decode::PreparedImage;
use crate::catalog::model::{Asset, Catalog};
use crate::foundation::core::{Category, FrameRgba};
use crate::foundation::error::{PfpError, PfpResult};
use crate::render::blend::{over_in_place, punch_out_in_place};
use crate::render::scale::scale_nearest_into;
use crate::selection::state::Selection;

/// Default square output resolution in pixels.
///
/// High enough for device-independent export quality; the on-screen display
/// size is a presentation concern and never affects the render.
pub const DEFAULT_CANVAS_SIZE: u32 = 2000;

/// Compositor options. The alpha cutoff and dilation radius are the visual
/// parity knobs of the occlusion mask and should not normally be changed.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct CompositorOpts {
    /// Square output resolution in pixels.
    pub canvas_size: u32,
    /// Straight-alpha base fill before any layer; `None` leaves the canvas
    /// transparent.
    pub clear_rgba: Option<[u8; 4]>,
    /// Body alpha below this counts as "outside the body silhouette".
    pub body_alpha_cutoff: u8,
    /// Radius in pixels of the disc stamped per qualifying eye pixel,
    /// dilating the mask so no hairline of hat survives at its edges.
    pub dilation_radius: u32,
}

impl Default for CompositorOpts {
    fn default() -> Self {
        Self {
            canvas_size: DEFAULT_CANVAS_SIZE,
            clear_rgba: Some([255, 255, 255, 255]),
            body_alpha_cutoff: 128,
            dilation_radius: 1,
        }
    }
}

impl CompositorOpts {
    /// Options with a different square resolution.
    pub fn with_canvas_size(mut self, canvas_size: u32) -> Self {
        self.canvas_size = canvas_size;
        self
    }
}

/// Render the current selection into a premultiplied RGBA8 frame.
///
/// A pure projection of `(catalog, selection)`: every call fully redraws
/// from scratch, so it is safe to invoke on every state change. Layers whose
/// selected asset has no loaded image are silently skipped.
///
/// Draw order, bottom to top: background, hat back art, body, costume,
/// mouth, then eye and hat. When the selected hat requests occlusion masking
/// and both eye and hat are equipped, the hat is drawn with a hole punched
/// wherever eye pixels fall outside the body silhouette; otherwise eye and
/// hat are plain overlays in that order.
#[tracing::instrument(level = "debug", skip(catalog, selection))]
pub fn render_composite(
    catalog: &Catalog,
    selection: &Selection,
    opts: &CompositorOpts,
) -> PfpResult<FrameRgba> {
    let size = opts.canvas_size;
    if size == 0 {
        return Err(PfpError::validation("canvas size must be > 0"));
    }
    let byte_len = (size as usize)
        .checked_mul(size as usize)
        .and_then(|n| n.checked_mul(4))
        .ok_or_else(|| PfpError::validation("canvas size overflows pixel buffer"))?;

    let mut dst = vec![0u8; byte_len];
    if let Some([r, g, b, a]) = opts.clear_rgba {
        let px = premul_px(r, g, b, a);
        for d in dst.chunks_exact_mut(4) {
            d.copy_from_slice(&px);
        }
    }
    let mut scratch = vec![0u8; byte_len];

    draw_layer(
        &mut dst,
        &mut scratch,
        selected(catalog, selection, Category::Background).and_then(Asset::image),
        size,
    )?;

    let hat = selected(catalog, selection, Category::Hat);
    if selection.is_equipped(Category::Hat) {
        draw_layer(
            &mut dst,
            &mut scratch,
            hat.and_then(Asset::back_image),
            size,
        )?;
    }

    draw_layer(
        &mut dst,
        &mut scratch,
        selected(catalog, selection, Category::Body).and_then(Asset::image),
        size,
    )?;

    if selection.is_equipped(Category::Costume) {
        draw_layer(
            &mut dst,
            &mut scratch,
            selected(catalog, selection, Category::Costume).and_then(Asset::image),
            size,
        )?;
    }

    if selection.is_equipped(Category::Mouth) {
        draw_layer(
            &mut dst,
            &mut scratch,
            selected(catalog, selection, Category::Mouth).and_then(Asset::image),
            size,
        )?;
    }

    let mask_mode = selection.is_equipped(Category::Hat)
        && selection.is_equipped(Category::Eye)
        && hat.is_some_and(Asset::occlusion_mask);

    if mask_mode {
        composite_masked(
            &mut dst,
            &mut scratch,
            selected(catalog, selection, Category::Eye).and_then(Asset::image),
            selected(catalog, selection, Category::Body).and_then(Asset::image),
            hat.and_then(Asset::image),
            opts,
        )?;
    } else {
        if selection.is_equipped(Category::Eye) {
            draw_layer(
                &mut dst,
                &mut scratch,
                selected(catalog, selection, Category::Eye).and_then(Asset::image),
                size,
            )?;
        }
        if selection.is_equipped(Category::Hat) {
            draw_layer(&mut dst, &mut scratch, hat.and_then(Asset::image), size)?;
        }
    }

    Ok(FrameRgba {
        width: size,
        height: size,
        data: dst,
        premultiplied: true,
    })
}

fn selected<'a>(catalog: &'a Catalog, selection: &Selection, category: Category) -> Option<&'a Asset> {
    catalog.get(category, selection.index(category))
}

fn draw_layer(
    dst: &mut [u8],
    scratch: &mut [u8],
    image: Option<&PreparedImage>,
    size: u32,
) -> PfpResult<()> {
    let Some(img) = image else {
        return Ok(());
    };
    scale_nearest_into(img, size, scratch)?;
    over_in_place(dst, scratch, 1.0)
}

/// Eye-then-hat draw with the occlusion mask cut into the hat.
fn composite_masked(
    dst: &mut [u8],
    scratch: &mut [u8],
    eye: Option<&PreparedImage>,
    body: Option<&PreparedImage>,
    hat: Option<&PreparedImage>,
    opts: &CompositorOpts,
) -> PfpResult<()> {
    let size = opts.canvas_size;

    let mut eye_buf = vec![0u8; dst.len()];
    if let Some(img) = eye {
        scale_nearest_into(img, size, &mut eye_buf)?;
    }

    // The body scratch is only needed for its alpha channel.
    scratch.fill(0);
    if let Some(img) = body {
        scale_nearest_into(img, size, scratch)?;
    }

    let mask = build_occlusion_mask(
        &eye_buf,
        scratch,
        size,
        opts.body_alpha_cutoff,
        opts.dilation_radius,
    );

    let mut hat_buf = vec![0u8; dst.len()];
    if let Some(img) = hat {
        scale_nearest_into(img, size, &mut hat_buf)?;
    }
    punch_out_in_place(&mut hat_buf, &mask)?;

    over_in_place(dst, &eye_buf, 1.0)?;
    over_in_place(dst, &hat_buf, 1.0)
}

/// One coverage byte per pixel: eye pixels outside the body silhouette,
/// dilated by stamping a filled disc at each qualifying pixel.
fn build_occlusion_mask(
    eye: &[u8],
    body: &[u8],
    size: u32,
    body_alpha_cutoff: u8,
    dilation_radius: u32,
) -> Vec<u8> {
    let n = size as usize;
    let mut mask = vec![0u8; n * n];
    let r = dilation_radius as i64;
    let r2 = r * r;

    for y in 0..n {
        for x in 0..n {
            let i = (y * n + x) * 4;
            let eye_alpha = eye[i + 3];
            let body_alpha = body[i + 3];
            if eye_alpha == 0 || body_alpha >= body_alpha_cutoff {
                continue;
            }
            for dy in -r..=r {
                for dx in -r..=r {
                    if dx * dx + dy * dy > r2 {
                        continue;
                    }
                    let px = x as i64 + dx;
                    let py = y as i64 + dy;
                    if px < 0 || py < 0 || px >= n as i64 || py >= n as i64 {
                        continue;
                    }
                    mask[(py as usize) * n + (px as usize)] = 255;
                }
            }
        }
    }
    mask
}

fn premul_px(r: u8, g: u8, b: u8, a: u8) -> [u8; 4] {
    let premul = |c: u8| -> u8 {
        let c = u16::from(c);
        let a = u16::from(a);
        (((c * a) + 127) / 255) as u8
    };
    [premul(r), premul(g), premul(b), a]
}

#[cfg(test)]
#[path = "../../tests/unit/render/compositor.rs"]
mod tests;
