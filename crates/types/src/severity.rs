//! Severity of a resolved schema reference.

/// Classification of a field, argument or enum value reference.
///
/// Variants are ordered from least to most severe, so `max()` over a set of
/// severities yields the worst one.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default)]
pub enum Severity {
    /// The reference exists and is not deprecated
    #[default]
    Valid,
    /// The reference exists but is marked deprecated
    Deprecated,
    /// The reference does not exist (or cannot be selected this way)
    Breaking,
}

impl Severity {
    /// Returns true if this severity should be shown to users.
    #[must_use]
    pub const fn is_reportable(self) -> bool {
        !matches!(self, Self::Valid)
    }

    /// Returns true if this severity breaks the query.
    #[must_use]
    pub const fn is_breaking(self) -> bool {
        matches!(self, Self::Breaking)
    }

    /// Lowercase name used in machine-readable output.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Valid => "valid",
            Self::Deprecated => "deprecated",
            Self::Breaking => "breaking",
        }
    }
}

impl std::fmt::Display for Severity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}
