//! Application naming for document import.

use std::path::Path;
use std::sync::LazyLock;

use regex::Regex;
use tqlshift_types::AppName;

static CREATE_APPLICATION_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)CREATE\s+APPLICATION\s+(\w+)").expect("valid create application regex")
});

/// Application name declared by `CREATE APPLICATION <name>`, first occurrence.
#[must_use]
pub fn application_name(document: &str) -> Option<String> {
    CREATE_APPLICATION_RE
        .captures(document)
        .and_then(|caps| caps.get(1))
        .map(|m| m.as_str().to_string())
}

/// Name to address the application by once imported.
///
/// Exported files are named `<namespace>.<app>.tql`; when the file stem
/// carries a namespace it is the qualified name, otherwise the declared
/// name is used as is.
#[must_use]
pub fn qualified_name(path: &Path, declared: &str) -> AppName {
    match path.file_stem().and_then(|s| s.to_str()) {
        Some(stem) if stem.contains('.') => AppName::new(stem),
        _ => AppName::new(declared),
    }
}
