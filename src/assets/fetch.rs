use std::path::{Path, PathBuf};

use anyhow::Context;

use crate::foundation::error::{PfpError, PfpResult};

/// Byte source for catalog asset references.
///
/// This is the seam to the external world: the catalog only knows source
/// strings; a fetcher turns one into encoded image bytes. Implementations
/// must be shareable across loader worker threads.
pub trait ImageFetcher: Send + Sync {
    /// Fetch the encoded image bytes for `source`.
    fn fetch(&self, source: &str) -> anyhow::Result<Vec<u8>>;
}

/// Filesystem fetcher resolving sources relative to a root directory.
#[derive(Clone, Debug)]
pub struct FsFetcher {
    root: PathBuf,
}

impl FsFetcher {
    /// Construct a fetcher rooted at `root`.
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// Root directory used when resolving relative sources.
    pub fn root(&self) -> &Path {
        &self.root
    }
}

impl ImageFetcher for FsFetcher {
    fn fetch(&self, source: &str) -> anyhow::Result<Vec<u8>> {
        let norm = normalize_rel_path(source)?;
        let path = self.root.join(Path::new(&norm));
        std::fs::read(&path).with_context(|| format!("read asset bytes from '{}'", path.display()))
    }
}

/// Normalize and validate catalog-relative asset paths.
///
/// The normalized result uses `/` separators, removes `.` segments, and
/// rejects absolute paths or parent traversals (`..`).
pub fn normalize_rel_path(source: &str) -> PfpResult<String> {
    let s = source.replace('\\', "/");
    if s.starts_with('/') {
        return Err(PfpError::validation("asset paths must be relative"));
    }
    if s.is_empty() {
        return Err(PfpError::validation("asset path must be non-empty"));
    }

    let mut out = Vec::<&str>::new();
    for part in s.split('/') {
        if part.is_empty() || part == "." {
            continue;
        }
        if part == ".." {
            return Err(PfpError::validation("asset paths must not contain '..'"));
        }
        out.push(part);
    }

    if out.is_empty() {
        return Err(PfpError::validation("asset path must contain a file name"));
    }

    Ok(out.join("/"))
}

#[cfg(test)]
#[path = "../../tests/unit/assets/fetch.rs"]
mod tests;
