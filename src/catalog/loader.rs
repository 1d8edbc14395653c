use std::sync::Arc;
use std::sync::mpsc::{self, Receiver, RecvTimeoutError, Sender};
use std::time::Duration;

use crate::assets::decode::{PreparedImage, decode_image};
use crate::assets::fetch::ImageFetcher;
use crate::catalog::model::{AssetSpec, Catalog, CatalogConfig, ImageKind};
use crate::foundation::core::Category;

/// Loader tuning knobs.
#[derive(Clone, Debug)]
pub struct LoaderOpts {
    /// Per-image budget before the placeholder is substituted.
    pub load_timeout: Duration,
    /// How many leading backgrounds belong to the essential first stage.
    pub essential_backgrounds: usize,
    /// How many leading bodies belong to the essential first stage.
    pub essential_bodies: usize,
}

impl Default for LoaderOpts {
    fn default() -> Self {
        Self {
            load_timeout: Duration::from_secs(10),
            essential_backgrounds: 3,
            essential_bodies: 2,
        }
    }
}

/// Progress snapshot returned by pump calls.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct LoadProgress {
    /// Image slots still in flight.
    pub pending: usize,
    /// Image slots holding real decoded pixels.
    pub ready: usize,
    /// Completions applied by this pump call.
    pub applied: usize,
    /// Whether the minimal usable subset (first background + first body) is
    /// settled.
    pub essential_ready: bool,
}

impl LoadProgress {
    /// Whether every scheduled load has settled (ready or placeholder).
    pub fn done(&self) -> bool {
        self.pending == 0
    }
}

#[derive(Clone, Debug)]
struct LoadJob {
    category: Category,
    name: String,
    kind: ImageKind,
    source: String,
}

#[derive(Debug)]
struct LoadEvent {
    category: Category,
    name: String,
    kind: ImageKind,
    image: Option<PreparedImage>,
}

/// Staged background loader for a [`Catalog`].
///
/// Worker tasks fetch and decode off the interaction thread and deliver
/// completions over a channel; the owner drains them single-threadedly via
/// [`CatalogLoader::pump`], so catalog mutation is an atomic
/// replace-on-complete and never visible mid-load. Dropping the loader
/// discards any still-in-flight results (teardown is a no-op for workers).
pub struct CatalogLoader {
    tx: Sender<LoadEvent>,
    rx: Receiver<LoadEvent>,
    fetcher: Arc<dyn ImageFetcher>,
    opts: LoaderOpts,
}

impl CatalogLoader {
    /// Start staged fetching for every pending image referenced by `catalog`.
    ///
    /// Stage order follows usability, not category order: the essential
    /// subset first, then the remaining backgrounds/bodies plus eyes and
    /// mouths, then hats (front and back art) and costumes. Stages are
    /// barriers for scheduling only; results land whenever the owner pumps.
    pub fn start(catalog: &Catalog, fetcher: Arc<dyn ImageFetcher>, opts: LoaderOpts) -> Self {
        let (tx, rx) = mpsc::channel();
        let loader = Self {
            tx,
            rx,
            fetcher,
            opts,
        };

        let phases = build_phases(catalog, &loader.opts);
        let tx = loader.tx.clone();
        let fetcher = loader.fetcher.clone();
        std::thread::spawn(move || {
            for phase in phases {
                rayon::scope(|s| {
                    for job in phase {
                        let tx = tx.clone();
                        let fetcher = fetcher.clone();
                        s.spawn(move |_| {
                            let image = run_job(fetcher.as_ref(), &job);
                            let _ = tx.send(LoadEvent {
                                category: job.category,
                                name: job.name,
                                kind: job.kind,
                                image,
                            });
                        });
                    }
                });
            }
        });

        loader
    }

    /// Schedule the images of one extra asset (an unlock append).
    pub(crate) fn request(&self, category: Category, spec: &AssetSpec) {
        for job in jobs_for_spec(category, spec) {
            let tx = self.tx.clone();
            let fetcher = self.fetcher.clone();
            rayon::spawn(move || {
                let image = run_job(fetcher.as_ref(), &job);
                let _ = tx.send(LoadEvent {
                    category: job.category,
                    name: job.name,
                    kind: job.kind,
                    image,
                });
            });
        }
    }

    /// Drain completed loads into `catalog` without blocking.
    ///
    /// Also expires overdue pending slots to placeholders; a completion that
    /// arrives for an already-settled slot is discarded.
    pub fn pump(&mut self, catalog: &mut Catalog) -> LoadProgress {
        let mut applied = 0;
        while let Ok(ev) = self.rx.try_recv() {
            applied += apply(catalog, ev);
        }
        self.finish_pump(catalog, applied)
    }

    /// Block up to `wait` for at least one completion, then drain the rest.
    pub fn pump_wait(&mut self, catalog: &mut Catalog, wait: Duration) -> LoadProgress {
        let mut applied = 0;
        match self.rx.recv_timeout(wait) {
            Ok(ev) => applied += apply(catalog, ev),
            Err(RecvTimeoutError::Timeout) | Err(RecvTimeoutError::Disconnected) => {}
        }
        while let Ok(ev) = self.rx.try_recv() {
            applied += apply(catalog, ev);
        }
        self.finish_pump(catalog, applied)
    }

    fn finish_pump(&self, catalog: &mut Catalog, applied: usize) -> LoadProgress {
        let expired = catalog.expire_overdue(self.opts.load_timeout);
        if expired > 0 {
            tracing::warn!(expired, "asset loads timed out; placeholders substituted");
        }
        LoadProgress {
            pending: catalog.pending_count(),
            ready: catalog.ready_count(),
            applied,
            essential_ready: catalog.essential_ready(),
        }
    }
}

/// Build a catalog from `config` and drive loading to completion.
///
/// Convenience for non-interactive callers (CLI, tests). Failures and
/// timeouts settle as placeholders; this never errors.
pub fn load_catalog_blocking(
    config: &CatalogConfig,
    fetcher: Arc<dyn ImageFetcher>,
    opts: LoaderOpts,
) -> Catalog {
    let mut catalog = Catalog::from_config(config);
    let mut loader = CatalogLoader::start(&catalog, fetcher, opts);
    let mut progress = loader.pump(&mut catalog);
    while !progress.done() {
        progress = loader.pump_wait(&mut catalog, Duration::from_millis(50));
    }
    catalog
}

fn apply(catalog: &mut Catalog, ev: LoadEvent) -> usize {
    let installed = match ev.image {
        Some(image) => catalog.install(ev.category, &ev.name, ev.kind, image),
        None => catalog.place_hold(ev.category, &ev.name, ev.kind),
    };
    if !installed {
        tracing::debug!(
            category = %ev.category,
            name = %ev.name,
            "discarding stale load result"
        );
        return 0;
    }
    1
}

fn run_job(fetcher: &dyn ImageFetcher, job: &LoadJob) -> Option<PreparedImage> {
    let bytes = match fetcher.fetch(&job.source) {
        Ok(bytes) => bytes,
        Err(error) => {
            tracing::warn!(source = %job.source, %error, "asset fetch failed");
            return None;
        }
    };
    match decode_image(&bytes) {
        Ok(image) => Some(image),
        Err(error) => {
            tracing::warn!(source = %job.source, %error, "asset decode failed");
            None
        }
    }
}

fn jobs_for_spec(category: Category, spec: &AssetSpec) -> Vec<LoadJob> {
    let mut jobs = vec![LoadJob {
        category,
        name: spec.name.clone(),
        kind: ImageKind::Primary,
        source: spec.source.clone(),
    }];
    if let Some(back) = &spec.back_source {
        jobs.push(LoadJob {
            category,
            name: spec.name.clone(),
            kind: ImageKind::Back,
            source: back.clone(),
        });
    }
    jobs
}

fn build_phases(catalog: &Catalog, opts: &LoaderOpts) -> Vec<Vec<LoadJob>> {
    let primaries = |category: Category, range: std::ops::Range<usize>| -> Vec<LoadJob> {
        catalog
            .assets(category)
            .iter()
            .enumerate()
            .filter(|(i, _)| range.contains(i))
            .map(|(_, a)| LoadJob {
                category,
                name: a.name().to_string(),
                kind: ImageKind::Primary,
                source: a.spec().source.clone(),
            })
            .collect()
    };

    let n_bg = catalog.len(Category::Background);
    let n_body = catalog.len(Category::Body);
    let ess_bg = opts.essential_backgrounds.min(n_bg);
    let ess_body = opts.essential_bodies.min(n_body);

    let mut essential = primaries(Category::Background, 0..ess_bg);
    essential.extend(primaries(Category::Body, 0..ess_body));

    let mut core = primaries(Category::Background, ess_bg..n_bg);
    core.extend(primaries(Category::Body, ess_body..n_body));
    core.extend(primaries(Category::Eye, 0..catalog.len(Category::Eye)));
    core.extend(primaries(Category::Mouth, 0..catalog.len(Category::Mouth)));

    let mut secondary = Vec::new();
    for asset in catalog.assets(Category::Hat) {
        secondary.extend(jobs_for_spec(Category::Hat, asset.spec()));
    }
    secondary.extend(primaries(Category::Costume, 0..catalog.len(Category::Costume)));

    vec![essential, core, secondary]
}

#[cfg(test)]
#[path = "../../tests/unit/catalog/loader.rs"]
mod tests;
