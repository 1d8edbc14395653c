/// Convenience result type used across pfpkit.
pub type PfpResult<T> = Result<T, PfpError>;

/// Top-level error taxonomy used by engine APIs.
///
/// Asset-load failures are deliberately absent: a failed load degrades to a
/// transparent placeholder and is never surfaced as an error. Unknown unlock
/// codes are a typed outcome, not an error either.
#[derive(thiserror::Error, Debug)]
pub enum PfpError {
    /// Invalid user-provided or configuration data.
    #[error("validation error: {0}")]
    Validation(String),

    /// Errors in catalog construction or lookup.
    #[error("catalog error: {0}")]
    Catalog(String),

    /// Errors while compositing a frame.
    #[error("render error: {0}")]
    Render(String),

    /// Errors while encoding or writing an export payload.
    #[error("export error: {0}")]
    Export(String),

    /// Wrapped lower-level error from dependencies or IO.
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl PfpError {
    /// Build a [`PfpError::Validation`] value.
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }

    /// Build a [`PfpError::Catalog`] value.
    pub fn catalog(msg: impl Into<String>) -> Self {
        Self::Catalog(msg.into())
    }

    /// Build a [`PfpError::Render`] value.
    pub fn render(msg: impl Into<String>) -> Self {
        Self::Render(msg.into())
    }

    /// Build a [`PfpError::Export`] value.
    pub fn export(msg: impl Into<String>) -> Self {
        Self::Export(msg.into())
    }
}

#[cfg(test)]
#[path = "../../tests/unit/foundation/error.rs"]
mod tests;
