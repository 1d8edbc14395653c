use std::path::Path;
use std::time::{Duration, Instant};

use anyhow::Context;

use crate::assets::decode::PreparedImage;
use crate::catalog::unlock::UnlockEntry;
use crate::foundation::core::{Category, CategoryMap};
use crate::foundation::error::PfpResult;

/// Declarative asset entry supplied by external configuration.
///
/// `back_source` and `occlusion_mask` are only meaningful for hats: the back
/// image is drawn beneath the body, and the mask flag requests the
/// eye-cutout draw mode.
#[derive(Clone, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct AssetSpec {
    /// Display name; unique within a category (duplicates are dropped).
    pub name: String,
    /// Primary image reference, resolved by an [`crate::ImageFetcher`].
    pub source: String,
    /// Optional secondary image drawn behind the body (hats only).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub back_source: Option<String>,
    /// Whether this hat requests occlusion masking against the eye layer.
    #[serde(default)]
    pub occlusion_mask: bool,
}

impl AssetSpec {
    /// Shorthand for a plain single-image asset.
    pub fn new(name: impl Into<String>, source: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            source: source.into(),
            back_source: None,
            occlusion_mask: false,
        }
    }
}

/// External catalog configuration document (JSON).
///
/// Each category holds an ordered sequence of specs; order defines cyclic
/// previous/next navigation. The unlock table rides along in the same
/// document.
#[derive(Clone, Debug, Default, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct CatalogConfig {
    /// Background entries.
    #[serde(default)]
    pub background: Vec<AssetSpec>,
    /// Body entries.
    #[serde(default)]
    pub body: Vec<AssetSpec>,
    /// Costume entries.
    #[serde(default)]
    pub costume: Vec<AssetSpec>,
    /// Mouth entries.
    #[serde(default)]
    pub mouth: Vec<AssetSpec>,
    /// Eye entries.
    #[serde(default)]
    pub eye: Vec<AssetSpec>,
    /// Hat entries.
    #[serde(default)]
    pub hat: Vec<AssetSpec>,
    /// Unlockable bonus assets keyed by secret code.
    #[serde(default)]
    pub unlocks: Vec<UnlockEntry>,
}

impl CatalogConfig {
    /// Parse a config document from a JSON string.
    pub fn from_json(json: &str) -> PfpResult<Self> {
        let cfg = serde_json::from_str(json).context("parse catalog config json")?;
        Ok(cfg)
    }

    /// Read and parse a config document from a file path.
    pub fn from_path(path: impl AsRef<Path>) -> PfpResult<Self> {
        let path = path.as_ref();
        let json = std::fs::read_to_string(path)
            .with_context(|| format!("read catalog config '{}'", path.display()))?;
        Self::from_json(&json)
    }

    /// Specs for one category, in navigation order.
    pub fn specs(&self, category: Category) -> &[AssetSpec] {
        match category {
            Category::Background => &self.background,
            Category::Body => &self.body,
            Category::Costume => &self.costume,
            Category::Mouth => &self.mouth,
            Category::Eye => &self.eye,
            Category::Hat => &self.hat,
        }
    }
}

/// Load lifecycle of one image reference.
#[derive(Clone, Debug)]
pub(crate) enum ImageSlot {
    /// Fetch in flight (or not yet started).
    Pending {
        /// When the fetch was scheduled; drives the load timeout.
        since: Instant,
    },
    /// Decoded pixels available.
    Ready(PreparedImage),
    /// Load failed or timed out; a transparent placeholder stands in.
    Placeholder(PreparedImage),
}

impl ImageSlot {
    pub(crate) fn pending_now() -> Self {
        ImageSlot::Pending {
            since: Instant::now(),
        }
    }

    pub(crate) fn placeholder() -> Self {
        ImageSlot::Placeholder(PreparedImage::transparent(1, 1))
    }

    pub(crate) fn image(&self) -> Option<&PreparedImage> {
        match self {
            ImageSlot::Pending { .. } => None,
            ImageSlot::Ready(img) | ImageSlot::Placeholder(img) => Some(img),
        }
    }

    pub(crate) fn is_pending(&self) -> bool {
        matches!(self, ImageSlot::Pending { .. })
    }

    pub(crate) fn is_ready(&self) -> bool {
        matches!(self, ImageSlot::Ready(_))
    }
}

/// Which of an asset's images a load event refers to.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) enum ImageKind {
    /// The primary artwork.
    Primary,
    /// The optional hat back artwork.
    Back,
}

/// One selectable asset within a category.
#[derive(Clone, Debug)]
pub struct Asset {
    spec: AssetSpec,
    image: ImageSlot,
    back_image: Option<ImageSlot>,
}

impl Asset {
    pub(crate) fn from_spec(spec: AssetSpec) -> Self {
        let back_image = spec.back_source.as_ref().map(|_| ImageSlot::pending_now());
        Self {
            spec,
            image: ImageSlot::pending_now(),
            back_image,
        }
    }

    /// Declarative spec this asset was built from.
    pub fn spec(&self) -> &AssetSpec {
        &self.spec
    }

    /// Display name.
    pub fn name(&self) -> &str {
        &self.spec.name
    }

    /// Primary image, once loaded (placeholder counts as loaded).
    pub fn image(&self) -> Option<&PreparedImage> {
        self.image.image()
    }

    /// Back image, once loaded; `None` when the spec declares none.
    pub fn back_image(&self) -> Option<&PreparedImage> {
        self.back_image.as_ref().and_then(ImageSlot::image)
    }

    /// Whether this asset requests occlusion masking.
    pub fn occlusion_mask(&self) -> bool {
        self.spec.occlusion_mask
    }

    fn slot_mut(&mut self, kind: ImageKind) -> Option<&mut ImageSlot> {
        match kind {
            ImageKind::Primary => Some(&mut self.image),
            ImageKind::Back => self.back_image.as_mut(),
        }
    }
}

/// Append-only per-category asset store.
///
/// Built once from a [`CatalogConfig`]; the only later mutations are image
/// installs from the loader and unlock appends. Entries are de-duplicated by
/// name within each category, both at construction and on append.
#[derive(Clone, Debug, Default)]
pub struct Catalog {
    assets: CategoryMap<Vec<Asset>>,
}

impl Catalog {
    /// Build the catalog skeleton (all images pending) from a config.
    pub fn from_config(config: &CatalogConfig) -> Self {
        let mut catalog = Self::default();
        for category in Category::ALL {
            for spec in config.specs(category) {
                catalog.append(category, spec.clone());
            }
        }
        catalog
    }

    /// Assets of one category, in navigation order.
    pub fn assets(&self, category: Category) -> &[Asset] {
        &self.assets[category]
    }

    /// Number of assets in one category.
    pub fn len(&self, category: Category) -> usize {
        self.assets[category].len()
    }

    /// Whether every category is empty.
    pub fn is_empty(&self) -> bool {
        Category::ALL.iter().all(|&c| self.assets[c].is_empty())
    }

    /// Asset at `index` within `category`, if in bounds.
    pub fn get(&self, category: Category, index: usize) -> Option<&Asset> {
        self.assets[category].get(index)
    }

    /// Index of the asset named `name` within `category`.
    pub fn index_of(&self, category: Category, name: &str) -> Option<usize> {
        self.assets[category].iter().position(|a| a.name() == name)
    }

    /// Append a spec to a category, de-duplicated by name.
    ///
    /// Returns the asset's index and whether it was newly added. Appending a
    /// name that already exists is a no-op beyond returning its index, which
    /// makes unlock idempotent.
    pub fn append(&mut self, category: Category, spec: AssetSpec) -> (usize, bool) {
        if let Some(existing) = self.index_of(category, &spec.name) {
            return (existing, false);
        }
        self.assets[category].push(Asset::from_spec(spec));
        (self.assets[category].len() - 1, true)
    }

    /// Install a completed load into the matching pending slot.
    ///
    /// Returns `false` when the slot is unknown or already settled; the
    /// caller discards such stale results.
    pub(crate) fn install(
        &mut self,
        category: Category,
        name: &str,
        kind: ImageKind,
        image: PreparedImage,
    ) -> bool {
        let Some(asset) = self.assets[category].iter_mut().find(|a| a.name() == name) else {
            return false;
        };
        let Some(slot) = asset.slot_mut(kind) else {
            return false;
        };
        if !slot.is_pending() {
            return false;
        }
        *slot = ImageSlot::Ready(image);
        true
    }

    /// Substitute the placeholder into the matching pending slot.
    pub(crate) fn place_hold(&mut self, category: Category, name: &str, kind: ImageKind) -> bool {
        let Some(asset) = self.assets[category].iter_mut().find(|a| a.name() == name) else {
            return false;
        };
        let Some(slot) = asset.slot_mut(kind) else {
            return false;
        };
        if !slot.is_pending() {
            return false;
        }
        *slot = ImageSlot::placeholder();
        true
    }

    /// Expire pending slots older than `timeout` to placeholders.
    ///
    /// Returns how many slots were expired. A completion arriving for an
    /// expired slot is discarded by [`Catalog::install`].
    pub(crate) fn expire_overdue(&mut self, timeout: Duration) -> usize {
        let now = Instant::now();
        let mut expired = 0;
        for category in Category::ALL {
            for asset in &mut self.assets[category] {
                for slot in [Some(&mut asset.image), asset.back_image.as_mut()]
                    .into_iter()
                    .flatten()
                {
                    if let ImageSlot::Pending { since } = slot
                        && now.duration_since(*since) >= timeout
                    {
                        *slot = ImageSlot::placeholder();
                        expired += 1;
                    }
                }
            }
        }
        expired
    }

    /// Count of image slots still pending across all categories.
    pub fn pending_count(&self) -> usize {
        let mut pending = 0;
        for category in Category::ALL {
            for asset in &self.assets[category] {
                if asset.image.is_pending() {
                    pending += 1;
                }
                if let Some(back) = &asset.back_image
                    && back.is_pending()
                {
                    pending += 1;
                }
            }
        }
        pending
    }

    /// Count of image slots that loaded real pixels.
    pub fn ready_count(&self) -> usize {
        let mut ready = 0;
        for category in Category::ALL {
            for asset in &self.assets[category] {
                if asset.image.is_ready() {
                    ready += 1;
                }
                if let Some(back) = &asset.back_image
                    && back.is_ready()
                {
                    ready += 1;
                }
            }
        }
        ready
    }

    /// Whether the minimal usable subset is settled: the first background and
    /// the first body are no longer pending.
    pub fn essential_ready(&self) -> bool {
        let settled = |category: Category| {
            self.assets[category]
                .first()
                .is_some_and(|a| !a.image.is_pending())
        };
        settled(Category::Background) && settled(Category::Body)
    }
}

#[cfg(test)]
#[path = "../../tests/unit/catalog/model.rs"]
mod tests;
