use crate::catalog::model::{AssetSpec, Catalog};
use crate::foundation::core::Category;

/// Unlockable bonus asset table entry.
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct UnlockEntry {
    /// Secret code; matched after trim + uppercase normalization.
    pub code: String,
    /// Category the asset is appended to.
    pub category: Category,
    /// The asset itself.
    pub asset: AssetSpec,
    /// Optional human-readable blurb surfaced on success.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

/// Fixed lookup table of unlock codes.
#[derive(Clone, Debug, Default)]
pub struct UnlockTable {
    entries: Vec<UnlockEntry>,
}

impl UnlockTable {
    /// Build a table; stored codes are normalized once up front.
    pub fn new(mut entries: Vec<UnlockEntry>) -> Self {
        for entry in &mut entries {
            entry.code = normalize_code(&entry.code);
        }
        Self { entries }
    }

    /// Entry matching `code`, if any.
    pub fn lookup(&self, code: &str) -> Option<&UnlockEntry> {
        let code = normalize_code(code);
        self.entries.iter().find(|e| e.code == code)
    }
}

/// Result of an unlock attempt.
#[derive(Clone, Debug, PartialEq)]
pub enum UnlockOutcome {
    /// Code matched; the asset is available at `index` within `category`.
    Unlocked {
        /// Category the asset belongs to.
        category: Category,
        /// Index of the asset within its category.
        index: usize,
        /// `false` when an equally named asset was already present.
        newly_added: bool,
        /// Blurb from the matching entry.
        description: Option<String>,
    },
    /// No entry matches the code. The catalog was not touched.
    UnknownCode,
}

/// Normalize a user-entered code: trim surrounding whitespace, uppercase.
pub fn normalize_code(code: &str) -> String {
    code.trim().to_ascii_uppercase()
}

/// Look up `code` and append the matching asset to `catalog`.
///
/// Idempotent: repeated unlocks of the same code return the same index with
/// `newly_added == false` and leave the catalog unchanged. This is the only
/// catalog-mutating operation after initial load.
pub fn apply_unlock(catalog: &mut Catalog, table: &UnlockTable, code: &str) -> UnlockOutcome {
    let Some(entry) = table.lookup(code) else {
        tracing::debug!(code = %normalize_code(code), "unlock code did not match");
        return UnlockOutcome::UnknownCode;
    };

    let (index, newly_added) = catalog.append(entry.category, entry.asset.clone());
    tracing::debug!(
        category = %entry.category,
        name = %entry.asset.name,
        newly_added,
        "unlock code accepted"
    );
    UnlockOutcome::Unlocked {
        category: entry.category,
        index,
        newly_added,
        description: entry.description.clone(),
    }
}

#[cfg(test)]
#[path = "../../tests/unit/catalog/unlock.rs"]
mod tests;
