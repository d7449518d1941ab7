use thiserror::Error;

pub type Result<T> = std::result::Result<T, ParseError>;

/// A query document that cannot be analyzed.
///
/// Positions are 1-based host-file coordinates.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ParseError {
    #[error("syntax error at {line}:{column}: {message}")]
    Syntax {
        message: String,
        line: u32,
        column: u32,
    },

    #[error("unknown fragment \"{name}\" at {line}:{column}")]
    UndefinedFragment { name: String, line: u32, column: u32 },

    #[error("fragment \"{name}\" is defined more than once (second definition at {line}:{column})")]
    DuplicateFragment { name: String, line: u32, column: u32 },

    #[error("document contains no operations or fragments")]
    EmptyDocument,
}

impl ParseError {
    /// Host position of the error, if it has one.
    #[must_use]
    pub const fn position(&self) -> Option<(u32, u32)> {
        match self {
            Self::Syntax { line, column, .. }
            | Self::UndefinedFragment { line, column, .. }
            | Self::DuplicateFragment { line, column, .. } => Some((*line, *column)),
            Self::EmptyDocument => None,
        }
    }
}
