use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use anyhow::Context;

use crate::assets::fetch::ImageFetcher;
use crate::catalog::loader::{CatalogLoader, LoadProgress, LoaderOpts};
use crate::catalog::model::{Catalog, CatalogConfig};
use crate::catalog::unlock::{UnlockOutcome, UnlockTable, apply_unlock};
use crate::encode::png::{EXPORT_FILE_NAME, encode_png, ensure_parent_dir};
use crate::foundation::core::{Category, FrameRgba};
use crate::foundation::error::{PfpError, PfpResult};
use crate::foundation::math::Xorshift64;
use crate::render::compositor::{CompositorOpts, render_composite};
use crate::selection::state::Selection;

/// Options for a [`PfpStudio`] session.
#[derive(Clone, Debug)]
pub struct StudioOpts {
    /// Compositor settings (canvas size, clear color, mask knobs).
    pub compositor: CompositorOpts,
    /// Loader settings (timeout, essential stage sizes).
    pub loader: LoaderOpts,
    /// Seed for deterministic randomize draws.
    pub seed: u64,
    /// Randomize the selection once the essential subset has settled,
    /// restricted to the assets of that subset.
    pub randomize_on_ready: bool,
}

impl Default for StudioOpts {
    fn default() -> Self {
        Self {
            compositor: CompositorOpts::default(),
            loader: LoaderOpts::default(),
            seed: 0,
            randomize_on_ready: false,
        }
    }
}

/// Interactive profile-picture session.
///
/// Owns the canonical state pair `(Catalog, Selection)` plus the staged
/// loader, unlock table, and a cached composite. The cached frame is a pure
/// projection: any state mutation invalidates it and the next
/// [`PfpStudio::composite`] call re-renders synchronously from scratch.
pub struct PfpStudio {
    catalog: Catalog,
    selection: Selection,
    unlocks: UnlockTable,
    loader: Option<CatalogLoader>,
    rng: Xorshift64,
    opts: StudioOpts,
    cached: Option<FrameRgba>,
    randomize_armed: bool,
    on_export: Option<Box<dyn FnMut(&[u8])>>,
}

impl PfpStudio {
    /// Start a session: build the catalog skeleton from `config` and begin
    /// staged loading through `fetcher`. Usable immediately; layers render
    /// as their images settle.
    pub fn start(
        config: &CatalogConfig,
        fetcher: Arc<dyn ImageFetcher>,
        opts: StudioOpts,
    ) -> Self {
        let catalog = Catalog::from_config(config);
        let unlocks = UnlockTable::new(config.unlocks.clone());
        let loader = CatalogLoader::start(&catalog, fetcher, opts.loader.clone());
        let rng = Xorshift64::new(opts.seed);
        let randomize_armed = opts.randomize_on_ready;
        Self {
            catalog,
            selection: Selection::new(),
            unlocks,
            loader: Some(loader),
            rng,
            opts,
            cached: None,
            randomize_armed,
            on_export: None,
        }
    }

    /// Open a session over an already-loaded catalog; no background loading,
    /// and unlocked assets keep pending images.
    pub fn with_catalog(catalog: Catalog, unlocks: UnlockTable, opts: StudioOpts) -> Self {
        let rng = Xorshift64::new(opts.seed);
        Self {
            catalog,
            selection: Selection::new(),
            unlocks,
            loader: None,
            rng,
            opts,
            cached: None,
            randomize_armed: false,
            on_export: None,
        }
    }

    /// The catalog.
    pub fn catalog(&self) -> &Catalog {
        &self.catalog
    }

    /// The selection state.
    pub fn selection(&self) -> &Selection {
        &self.selection
    }

    /// Apply completed loads and timeouts; call from the interaction loop.
    pub fn pump(&mut self) -> LoadProgress {
        let Some(loader) = &mut self.loader else {
            return LoadProgress {
                pending: self.catalog.pending_count(),
                ready: self.catalog.ready_count(),
                applied: 0,
                essential_ready: self.catalog.essential_ready(),
            };
        };
        let progress = loader.pump(&mut self.catalog);
        self.after_pump(progress);
        progress
    }

    /// Block until every scheduled load has settled.
    pub fn wait_loaded(&mut self) -> LoadProgress {
        let mut progress = self.pump();
        while !progress.done() {
            let Some(loader) = &mut self.loader else {
                break;
            };
            progress = loader.pump_wait(&mut self.catalog, Duration::from_millis(50));
            self.after_pump(progress);
        }
        progress
    }

    fn after_pump(&mut self, progress: LoadProgress) {
        if progress.applied > 0 {
            self.invalidate();
        }
        if self.randomize_armed && progress.essential_ready {
            self.randomize_armed = false;
            self.randomize_essential();
        }
    }

    /// Randomize within the essential subset only (the assets guaranteed
    /// settled when the session first becomes usable).
    fn randomize_essential(&mut self) {
        let bg_pool = self
            .opts
            .loader
            .essential_backgrounds
            .min(self.catalog.len(Category::Background));
        let body_pool = self
            .opts
            .loader
            .essential_bodies
            .min(self.catalog.len(Category::Body));
        if bg_pool > 0 {
            let i = self.rng.next_below(bg_pool);
            self.selection
                .set_index(&self.catalog, Category::Background, i);
        }
        if body_pool > 0 {
            let i = self.rng.next_below(body_pool);
            self.selection.set_index(&self.catalog, Category::Body, i);
        }
        self.invalidate();
    }

    /// Move a category's selection by one step, wrapping at either end.
    pub fn cycle(&mut self, category: Category, direction: i32) -> usize {
        let index = self.selection.cycle(&self.catalog, category, direction);
        self.invalidate();
        index
    }

    /// Set a category's selection index (clamped into bounds).
    pub fn set_index(&mut self, category: Category, index: usize) -> usize {
        let index = self.selection.set_index(&self.catalog, category, index);
        self.invalidate();
        index
    }

    /// Set a toggleable category's visibility.
    pub fn set_equipped(&mut self, category: Category, on: bool) {
        self.selection.set_equipped(category, on);
        self.invalidate();
    }

    /// Draw an independent uniform-random index for every non-empty
    /// category.
    pub fn randomize(&mut self) {
        self.selection.randomize_all(&self.catalog, &mut self.rng);
        self.invalidate();
    }

    /// Try an unlock code.
    ///
    /// On a match the asset is appended to its category (idempotently), the
    /// category is equipped and selected to the unlocked asset, and its
    /// images are scheduled for loading.
    pub fn unlock(&mut self, code: &str) -> UnlockOutcome {
        let outcome = apply_unlock(&mut self.catalog, &self.unlocks, code);
        if let UnlockOutcome::Unlocked {
            category,
            index,
            newly_added,
            ..
        } = &outcome
        {
            self.selection.set_equipped(*category, true);
            self.selection.set_index(&self.catalog, *category, *index);
            if *newly_added
                && let Some(loader) = &self.loader
                && let Some(asset) = self.catalog.get(*category, *index)
            {
                loader.request(*category, asset.spec());
            }
            self.invalidate();
        }
        outcome
    }

    /// Render (or reuse) the composite for the current state.
    pub fn composite(&mut self) -> PfpResult<&FrameRgba> {
        if self.cached.is_none() {
            let frame = render_composite(&self.catalog, &self.selection, &self.opts.compositor)?;
            self.cached = Some(frame);
        }
        match &self.cached {
            Some(frame) => Ok(frame),
            None => Err(PfpError::render("composite cache vanished")),
        }
    }

    /// Export the current composite as PNG bytes and fire the export hook.
    pub fn export_png(&mut self) -> PfpResult<Vec<u8>> {
        let bytes = encode_png(self.composite()?)?;
        if let Some(hook) = &mut self.on_export {
            hook(&bytes);
        }
        tracing::debug!(len = bytes.len(), "exported composite png");
        Ok(bytes)
    }

    /// Export and write the fixed-name file under `dir`. Returns the path.
    ///
    /// The payload is fully encoded before anything touches the filesystem,
    /// so no partial file is ever produced.
    pub fn export_to_dir(&mut self, dir: &Path) -> PfpResult<PathBuf> {
        let bytes = self.export_png()?;
        let path = dir.join(EXPORT_FILE_NAME);
        ensure_parent_dir(&path)?;
        std::fs::write(&path, &bytes)
            .with_context(|| format!("write png '{}'", path.display()))?;
        Ok(path)
    }

    /// Install a callback receiving every exported payload (share hooks,
    /// uploads). Entirely external to the core; errors there are its own.
    pub fn set_export_hook(&mut self, hook: impl FnMut(&[u8]) + 'static) {
        self.on_export = Some(Box::new(hook));
    }

    fn invalidate(&mut self) {
        self.cached = None;
    }
}

#[cfg(test)]
#[path = "../../tests/unit/studio/session.rs"]
mod tests;
