//! pfpkit is a layered profile-picture compositing engine.
//!
//! Given per-category image assets (background, body, costume, mouth, eye,
//! hat), a selection state, and a canvas size, pfpkit renders a composite
//! raster in a fixed z-order and exports it as PNG. The one algorithmic
//! piece is the occlusion mask: hats that request it are drawn with a hole
//! punched wherever eye artwork protrudes past the body silhouette, so tall
//! ears and antennae are never hidden under a hat brim.
//!
//! # Pipeline overview
//!
//! 1. **Configure**: `CatalogConfig` (JSON) -> `Catalog` skeleton
//! 2. **Load**: staged background fetching via [`CatalogLoader`]; failures
//!    and timeouts settle as transparent placeholders, never errors
//! 3. **Select**: [`Selection`] cycling, equip toggles, seeded randomize
//! 4. **Render**: [`render_composite`] -> [`FrameRgba`] (pure, synchronous)
//! 5. **Export**: [`encode_png`] / [`PfpStudio::export_png`]
//!
//! The key design constraints:
//!
//! - **No unsafe**: `unsafe` is forbidden in this crate.
//! - **Premultiplied RGBA8** end-to-end: the compositor reads and writes
//!   premultiplied pixels; only PNG export converts back to straight alpha.
//! - **Pure projection**: the rendered frame is always reproducible from
//!   `(Catalog, Selection)`; every render fully redraws from scratch.
//! - **No smoothing**: all layer scaling is nearest-neighbor so pixel-art
//!   edges survive any resolution exactly.
//! - **Single-threaded mutation**: loader workers only send completions;
//!   the owning thread installs them when it pumps.
#![forbid(unsafe_code)]
#![deny(missing_docs)]

mod assets;
mod catalog;
mod encode;
mod foundation;
mod render;
mod selection;
mod studio;

pub use assets::decode::{PreparedImage, decode_image};
pub use assets::fetch::{FsFetcher, ImageFetcher, normalize_rel_path};
pub use catalog::loader::{CatalogLoader, LoadProgress, LoaderOpts, load_catalog_blocking};
pub use catalog::model::{Asset, AssetSpec, Catalog, CatalogConfig};
pub use catalog::unlock::{UnlockEntry, UnlockOutcome, UnlockTable, apply_unlock, normalize_code};
pub use encode::png::{EXPORT_FILE_NAME, encode_png, ensure_parent_dir, write_png};
pub use foundation::core::{Category, CategoryMap, FrameRgba};
pub use foundation::error::{PfpError, PfpResult};
pub use foundation::math::Xorshift64;
pub use render::blend::{PremulRgba8, over, over_in_place, punch_out_in_place};
pub use render::compositor::{
    CompositorOpts, DEFAULT_CANVAS_SIZE, render_composite,
};
pub use render::scale::{scale_nearest, scale_nearest_into};
pub use selection::state::Selection;
pub use studio::session::{PfpStudio, StudioOpts};
