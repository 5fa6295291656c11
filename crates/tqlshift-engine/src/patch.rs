//! Resume-position injection into definition documents.
//!
//! The document is never parsed. Edits are confined to a single quoted
//! field value, or to one insertion just before the closing parenthesis of
//! the source clause; every other byte is carried over verbatim.
//!
//! Two policies exist:
//!
//! - **Placeholder** (MySQL, SQL Server): only a `<Field>: 'NOW'` placeholder
//!   is rewritten. A missing placeholder is never created.
//! - **Ensure field** (MongoDB, Oracle): an existing `<field>: '...'` is
//!   overwritten wherever it is; otherwise the field is appended to the
//!   source clause.
//!
//! Locating the source clause is a best-effort structural anchor, not a
//! grammar: it runs from the `CREATE SOURCE ... USING Global.<Reader> (`
//! declaration to the first `)` that is directly followed by `OUTPUT`.
//! Parentheses inside option values are skipped only because they are not
//! followed by `OUTPUT`. `--` comments are recognized only so an inserted
//! separator lands before them; a comment that itself contains `)` followed
//! by `OUTPUT` still ends the clause early.

use std::ops::Range;
use std::sync::LazyLock;

use regex::Regex;
use tqlshift_types::{
    ConnectorFamily, Disposition, FieldEdit, PositionDescriptor, ReaderType, UnchangedReason,
};

use crate::classify::declaration_pattern;

const MYSQL_START_FIELD: &str = "StartTimestamp";
const SQLSERVER_START_FIELD: &str = "StartPosition";
const MONGO_START_FIELD: &str = "startTimestamp";
const ORACLE_START_FIELD: &str = "startSCN";

static MYSQL_PLACEHOLDER: LazyLock<Regex> =
    LazyLock::new(|| placeholder_regex(MYSQL_START_FIELD));
static SQLSERVER_PLACEHOLDER: LazyLock<Regex> =
    LazyLock::new(|| placeholder_regex(SQLSERVER_START_FIELD));
static MONGO_CLAUSE_FIELD: LazyLock<ClauseField> =
    LazyLock::new(|| ClauseField::new(MONGO_START_FIELD, ConnectorFamily::MongoTimestamp));
static ORACLE_CLAUSE_FIELD: LazyLock<ClauseField> =
    LazyLock::new(|| ClauseField::new(ORACLE_START_FIELD, ConnectorFamily::OracleScn));

/// Indentation of an inserted field line.
const INSERT_INDENT: &str = "  ";

fn placeholder_regex(field: &str) -> Regex {
    Regex::new(&format!(r"\b{field}:\s*'(?P<value>NOW)'")).expect("valid placeholder regex")
}

/// Start-position field a family writes in its source clause.
#[must_use]
pub fn start_field(family: ConnectorFamily) -> Option<&'static str> {
    match family {
        ConnectorFamily::MySqlBinlog => Some(MYSQL_START_FIELD),
        ConnectorFamily::SqlServerLsn => Some(SQLSERVER_START_FIELD),
        ConnectorFamily::MongoTimestamp => Some(MONGO_START_FIELD),
        ConnectorFamily::OracleScn => Some(ORACLE_START_FIELD),
        ConnectorFamily::Unclassified => None,
    }
}

/// Result of [`patch`]. Never an error: "nothing to do" is a normal outcome.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PatchOutcome {
    Updated {
        text: String,
        field: &'static str,
        edit: FieldEdit,
    },
    Unchanged(UnchangedReason),
}

impl PatchOutcome {
    #[must_use]
    pub fn changed(&self) -> bool {
        matches!(self, Self::Updated { .. })
    }

    /// Updated text, or `original` when nothing changed.
    #[must_use]
    pub fn into_text(self, original: &str) -> String {
        match self {
            Self::Updated { text, .. } => text,
            Self::Unchanged(_) => original.to_string(),
        }
    }
}

impl From<PatchOutcome> for Disposition {
    fn from(outcome: PatchOutcome) -> Self {
        match outcome {
            PatchOutcome::Updated { text, field, edit } => Self::Updated { text, field, edit },
            PatchOutcome::Unchanged(reason) => Self::Unchanged(reason),
        }
    }
}

/// Embed `position` into the source clause of `document`.
///
/// `family` is the classification of `document`; a position from another
/// family is refused rather than written into the wrong field.
#[must_use]
pub fn patch(document: &str, family: ConnectorFamily, position: &PositionDescriptor) -> PatchOutcome {
    if position.family() != family {
        return PatchOutcome::Unchanged(UnchangedReason::FamilyMismatch {
            document: family,
            position: position.family(),
        });
    }

    let value = position.render();
    match family {
        ConnectorFamily::MySqlBinlog => {
            replace_placeholder(document, &MYSQL_PLACEHOLDER, MYSQL_START_FIELD, &value)
        }
        ConnectorFamily::SqlServerLsn => {
            replace_placeholder(document, &SQLSERVER_PLACEHOLDER, SQLSERVER_START_FIELD, &value)
        }
        ConnectorFamily::MongoTimestamp => MONGO_CLAUSE_FIELD.ensure(document, &value),
        ConnectorFamily::OracleScn => ORACLE_CLAUSE_FIELD.ensure(document, &value),
        // Unreachable: no position carries this family.
        ConnectorFamily::Unclassified => {
            PatchOutcome::Unchanged(UnchangedReason::FamilyMismatch {
                document: family,
                position: position.family(),
            })
        }
    }
}

fn splice(document: &str, range: Range<usize>, replacement: &str) -> String {
    let mut text = String::with_capacity(document.len() + replacement.len());
    text.push_str(&document[..range.start]);
    text.push_str(replacement);
    text.push_str(&document[range.end..]);
    text
}

fn replace_placeholder(
    document: &str,
    placeholder: &Regex,
    field: &'static str,
    value: &str,
) -> PatchOutcome {
    let Some(caps) = placeholder.captures(document) else {
        return PatchOutcome::Unchanged(UnchangedReason::NoPlaceholder { field });
    };
    let Some(value_match) = caps.name("value") else {
        return PatchOutcome::Unchanged(UnchangedReason::NoPlaceholder { field });
    };
    PatchOutcome::Updated {
        text: splice(document, value_match.range(), value),
        field,
        edit: FieldEdit::Replaced,
    }
}

/// "Replace if present, else insert before the clause closing" for one field.
struct ClauseField {
    field: &'static str,
    /// Well-formed `field: '<value>'` on a single line.
    existing: Regex,
    /// Any mention of `field:`; matches where `existing` does not mean malformed.
    mention: Regex,
    /// Source clause of the family, split into `head` and `tail` at the closing `)`.
    clause: Regex,
}

impl ClauseField {
    fn new(field: &'static str, family: ConnectorFamily) -> Self {
        let readers: Vec<&str> = ReaderType::of_family(family).map(ReaderType::token).collect();
        let clause = format!(
            r"(?is)(?P<head>{}\s*\(.*?)(?P<tail>\s*\)\s*OUTPUT\b)",
            declaration_pattern(&readers)
        );
        Self {
            field,
            existing: Regex::new(&format!(r"\b{field}\s*:\s*'(?P<value>[^'\n]*)'"))
                .expect("valid existing field regex"),
            mention: Regex::new(&format!(r"\b{field}\s*:")).expect("valid field mention regex"),
            clause: Regex::new(&clause).expect("valid source clause regex"),
        }
    }

    fn ensure(&self, document: &str, value: &str) -> PatchOutcome {
        let field = self.field;

        if let Some(value_match) = self.existing.captures(document).and_then(|c| c.name("value")) {
            tracing::debug!(field, "Overwriting existing start field");
            return PatchOutcome::Updated {
                text: splice(document, value_match.range(), value),
                field,
                edit: FieldEdit::Replaced,
            };
        }

        if self.mention.is_match(document) {
            return PatchOutcome::Unchanged(UnchangedReason::MalformedField { field });
        }

        let Some(caps) = self.clause.captures(document) else {
            return PatchOutcome::Unchanged(UnchangedReason::NoInsertionPoint { field });
        };
        let (Some(head), Some(_tail)) = (caps.name("head"), caps.name("tail")) else {
            return PatchOutcome::Unchanged(UnchangedReason::NoInsertionPoint { field });
        };

        // The separating comma goes after the last option, ahead of any
        // trailing `--` comment; the new field goes after the comment.
        let options_end = head.start() + code_end(head.as_str());
        let last = document[..options_end].chars().last();
        let separator = if matches!(last, Some('(' | ',')) { "" } else { "," };

        let mut text = String::with_capacity(document.len() + field.len() + value.len() + 8);
        text.push_str(&document[..options_end]);
        text.push_str(separator);
        text.push_str(&document[options_end..head.end()]);
        text.push_str(&format!("\n{INSERT_INDENT}{field}: '{value}'"));
        text.push_str(&document[head.end()..]);

        tracing::debug!(field, "Inserting start field before source clause closing");
        PatchOutcome::Updated {
            text,
            field,
            edit: FieldEdit::Inserted,
        }
    }
}

/// Offset just past the last non-comment, non-blank text of `clause`.
fn code_end(clause: &str) -> usize {
    let mut end = clause.len();
    loop {
        let line_start = clause[..end].rfind('\n').map_or(0, |i| i + 1);
        let line = &clause[line_start..end];
        let code = line[..comment_start(line).unwrap_or(line.len())].trim_end();
        if !code.is_empty() || line_start == 0 {
            return line_start + code.len();
        }
        end = line_start - 1;
    }
}

/// Byte offset of a `--` comment outside single quotes.
fn comment_start(line: &str) -> Option<usize> {
    let bytes = line.as_bytes();
    let mut quoted = false;
    for (i, &b) in bytes.iter().enumerate() {
        match b {
            b'\'' => quoted = !quoted,
            b'-' if !quoted && bytes.get(i + 1) == Some(&b'-') => return Some(i),
            _ => {}
        }
    }
    None
}
