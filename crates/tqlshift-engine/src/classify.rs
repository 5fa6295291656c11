//! Connector family detection for definition documents.

use std::sync::LazyLock;

use regex::Regex;
use tqlshift_types::{ConnectorFamily, ReaderType};

static SOURCE_DECLARATION_RE: LazyLock<Regex> = LazyLock::new(|| {
    let readers: Vec<&str> = ReaderType::ALL.iter().map(|r| r.token()).collect();
    Regex::new(&format!("(?i){}", declaration_pattern(&readers)))
        .expect("valid source declaration regex")
});

/// Pattern for `CREATE [OR REPLACE] SOURCE <name> USING Global.<reader>`,
/// capturing the reader token as group 1. Carries no flags of its own.
pub(crate) fn declaration_pattern(readers: &[&str]) -> String {
    format!(
        r"CREATE\s+(?:OR\s+REPLACE\s+)?SOURCE\s+[\w.]+\s+USING\s+Global\.({})",
        readers.join("|")
    )
}

/// Reader type of the first recognized source declaration, in document order.
#[must_use]
pub fn detect_reader(document: &str) -> Option<ReaderType> {
    let caps = SOURCE_DECLARATION_RE.captures(document)?;
    ReaderType::from_token(caps.get(1)?.as_str())
}

/// Connector family a document declares, or [`ConnectorFamily::Unclassified`].
#[must_use]
pub fn classify(document: &str) -> ConnectorFamily {
    detect_reader(document).map_or(ConnectorFamily::Unclassified, ReaderType::family)
}
