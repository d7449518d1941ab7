use query_analyzer_schema::Deprecation;
use query_analyzer_types::{Origin, Severity};

/// What a finding points at.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FindingKind {
    Field,
    Argument,
    EnumValue,
    /// Operation kind the schema has no root type for
    RootOperation,
    /// Fragment type condition
    TypeCondition,
    /// Sub-selection on a leaf type, or none on a composite type
    Selection,
    /// Declared type of an operation variable
    Variable,
    /// The query document itself could not be analyzed
    Document,
}

impl FindingKind {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Field => "field",
            Self::Argument => "argument",
            Self::EnumValue => "enum_value",
            Self::RootOperation => "root_operation",
            Self::TypeCondition => "type_condition",
            Self::Selection => "selection",
            Self::Variable => "variable",
            Self::Document => "document",
        }
    }
}

/// One classified schema reference.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Finding {
    pub origin: Origin,
    /// `Type.field`, `Type.field(arg)`, `Enum.VALUE`, ...
    pub target: String,
    pub severity: Severity,
    /// Empty for valid findings
    pub reason: String,
    pub kind: FindingKind,
}

impl Finding {
    #[must_use]
    pub fn breaking(
        kind: FindingKind,
        origin: Origin,
        target: impl Into<String>,
        reason: impl Into<String>,
    ) -> Self {
        Self {
            origin,
            target: target.into(),
            severity: Severity::Breaking,
            reason: reason.into(),
            kind,
        }
    }

    /// A reference that exists, deprecated or not.
    pub(crate) fn existing(
        kind: FindingKind,
        origin: Origin,
        target: String,
        deprecation: Option<&Deprecation>,
    ) -> Self {
        let (severity, reason) = match deprecation {
            Some(deprecation) => (Severity::Deprecated, deprecation.reason.to_string()),
            None => (Severity::Valid, String::new()),
        };
        Self {
            origin,
            target,
            severity,
            reason,
            kind,
        }
    }

    /// A reference that does not exist in the schema.
    pub(crate) fn missing(kind: FindingKind, origin: Origin, target: String) -> Self {
        let reason = format!("{target} does not exist");
        Self::breaking(kind, origin, target, reason)
    }
}
