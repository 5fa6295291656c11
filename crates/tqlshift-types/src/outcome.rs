//! Per-pipeline outcomes of position injection.
//!
//! None of these are errors: every variant is a normal, recoverable result
//! for one pipeline and never affects the processing of another.

use std::fmt;

use crate::family::ConnectorFamily;

/// How a start-position field was written.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FieldEdit {
    /// An existing field (or `'NOW'` placeholder) had its value overwritten.
    Replaced,
    /// A new field was added at the end of the source clause.
    Inserted,
}

/// Why a document was left byte-for-byte unchanged.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UnchangedReason {
    /// The checkpoint report was empty or no extraction rule matched.
    NoCheckpointData,
    /// Placeholder-only family and no `<field>: 'NOW'` placeholder present.
    NoPlaceholder { field: &'static str },
    /// Insertion needed but the source clause closing before `OUTPUT` was not found.
    NoInsertionPoint { field: &'static str },
    /// The field exists but its quoted value is not well formed.
    MalformedField { field: &'static str },
    /// The extracted position belongs to a different family than the document.
    FamilyMismatch {
        document: ConnectorFamily,
        position: ConnectorFamily,
    },
}

impl UnchangedReason {
    /// Whether an operator has to edit the document by hand.
    #[must_use]
    pub fn needs_operator(&self) -> bool {
        matches!(
            self,
            Self::NoInsertionPoint { .. } | Self::MalformedField { .. } | Self::FamilyMismatch { .. }
        )
    }
}

impl fmt::Display for UnchangedReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NoCheckpointData => f.write_str("no checkpoint data available"),
            Self::NoPlaceholder { field } => write!(f, "no {field}: 'NOW' found to update"),
            Self::NoInsertionPoint { field } => write!(
                f,
                "no insertion point for {field}: source clause closing before OUTPUT not found"
            ),
            Self::MalformedField { field } => {
                write!(f, "{field} is present but its quoted value is malformed")
            }
            Self::FamilyMismatch { document, position } => write!(
                f,
                "checkpoint holds a {position} position but the document declares a {document} source"
            ),
        }
    }
}

/// Result of processing one pipeline.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Disposition {
    /// The document carries the resume position now.
    Updated {
        text: String,
        field: &'static str,
        edit: FieldEdit,
    },
    /// The document is returned untouched.
    Unchanged(UnchangedReason),
    /// The document declares no recognized reader type.
    Unclassified,
}

impl Disposition {
    #[must_use]
    pub fn is_updated(&self) -> bool {
        matches!(self, Self::Updated { .. })
    }

    /// Updated text, if any.
    #[must_use]
    pub fn updated_text(&self) -> Option<&str> {
        match self {
            Self::Updated { text, .. } => Some(text),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn reasons_render_field_names() {
        let reason = UnchangedReason::NoPlaceholder {
            field: "StartTimestamp",
        };
        assert_eq!(reason.to_string(), "no StartTimestamp: 'NOW' found to update");

        let reason = UnchangedReason::FamilyMismatch {
            document: ConnectorFamily::MySqlBinlog,
            position: ConnectorFamily::OracleScn,
        };
        assert!(reason.to_string().contains("oracle position"));
        assert!(reason.to_string().contains("mysql source"));
    }

    #[test]
    fn structural_failures_need_an_operator() {
        assert!(UnchangedReason::NoInsertionPoint { field: "startSCN" }.needs_operator());
        assert!(UnchangedReason::MalformedField { field: "startSCN" }.needs_operator());
        assert!(!UnchangedReason::NoCheckpointData.needs_operator());
        assert!(!UnchangedReason::NoPlaceholder {
            field: "StartPosition"
        }
        .needs_operator());
    }

    #[test]
    fn disposition_exposes_updated_text() {
        let updated = Disposition::Updated {
            text: "doc".into(),
            field: "startSCN",
            edit: FieldEdit::Inserted,
        };
        assert!(updated.is_updated());
        assert_eq!(updated.updated_text(), Some("doc"));
        assert_eq!(Disposition::Unclassified.updated_text(), None);
    }
}
