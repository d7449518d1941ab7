use query_analyzer_types::Origin;
use thiserror::Error;

/// A document the resolver cannot walk.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ResolveError {
    /// A fragment spreads itself, directly or through other fragments.
    #[error("fragment cycle: {}", path.join(" -> "))]
    FragmentCycle {
        /// Fragment names along the cycle, starting and ending with the same name
        path: Vec<String>,
        /// The spread that closes the cycle
        origin: Origin,
    },
}

impl ResolveError {
    #[must_use]
    pub const fn origin(&self) -> &Origin {
        match self {
            Self::FragmentCycle { origin, .. } => origin,
        }
    }
}
