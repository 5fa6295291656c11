use std::path::Path;

use anyhow::{Context, Result};
use tqlshift_engine::resolve;
use tqlshift_types::{CheckpointEntry, CheckpointReport, Disposition};

/// Execute the `patch` command: apply a saved checkpoint report to one
/// definition document without contacting any server.
pub fn execute(document_path: &Path, report_path: &Path, dry_run: bool) -> Result<()> {
    let document = std::fs::read_to_string(document_path)
        .with_context(|| format!("Failed to read document: {}", document_path.display()))?;
    let report_text = std::fs::read_to_string(report_path)
        .with_context(|| format!("Failed to read report: {}", report_path.display()))?;
    let report = load_report(&report_text);

    let outcome = resolve(&document, Some(&report));
    if let Some(position) = &outcome.position {
        tracing::info!(position = %position, family = %position.family(), "Checkpoint position found");
    }

    match outcome.disposition {
        Disposition::Updated { text, field, edit } => {
            if dry_run {
                print!("{text}");
            } else {
                std::fs::write(document_path, &text).with_context(|| {
                    format!("Failed to write document: {}", document_path.display())
                })?;
                println!("{}: {field} {edit:?}", document_path.display());
            }
        }
        Disposition::Unchanged(reason) => {
            println!("{}: unchanged ({reason})", document_path.display());
        }
        Disposition::Unclassified => {
            println!(
                "{}: no recognized source reader declared",
                document_path.display()
            );
        }
    }
    Ok(())
}

/// A report file holds either the JSON entry list the server returns or
/// the bare position summary text.
fn load_report(text: &str) -> CheckpointReport {
    match serde_json::from_str::<Vec<CheckpointEntry>>(text) {
        Ok(entries) => CheckpointReport { entries },
        Err(_) => CheckpointReport::from_summary(text),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const MONGO_DOC: &str = "CREATE SOURCE m USING Global.MongoDBReader (\n  Mode: 'Incremental'\n) OUTPUT TO s;\n";

    #[test]
    fn report_from_json_entries() {
        let report = load_report(
            r#"[{"sourcePositionSummary": "CommitSCN[9]"}, {"sourcePositionSummary": "CommitSCN[1]"}]"#,
        );
        assert_eq!(report.entries.len(), 2);
        assert_eq!(report.latest_summary(), Some("CommitSCN[9]"));
    }

    #[test]
    fn report_from_plain_text() {
        let report = load_report("BinlogName: bin.000001 BinLogPosition: 4\n");
        assert_eq!(report.entries.len(), 1);
        assert!(report.latest_summary().unwrap().starts_with("BinlogName"));
    }

    #[test]
    fn patch_writes_document_in_place() {
        let dir = tempfile::tempdir().unwrap();
        let document = dir.path().join("admin.events.tql");
        let report = dir.path().join("report.txt");
        std::fs::write(&document, MONGO_DOC).unwrap();
        std::fs::write(&report, "[UTC DateTime value = 2025-10-02T20:48:28.000Z]").unwrap();

        execute(&document, &report, false).unwrap();

        let updated = std::fs::read_to_string(&document).unwrap();
        assert_eq!(
            updated,
            "CREATE SOURCE m USING Global.MongoDBReader (\n  Mode: 'Incremental',\n  startTimestamp: '2025-10-02T20:48:28'\n) OUTPUT TO s;\n"
        );
    }

    #[test]
    fn dry_run_leaves_document() {
        let dir = tempfile::tempdir().unwrap();
        let document = dir.path().join("admin.events.tql");
        let report = dir.path().join("report.txt");
        std::fs::write(&document, MONGO_DOC).unwrap();
        std::fs::write(&report, "[UTC DateTime value = 2025-10-02T20:48:28.000Z]").unwrap();

        execute(&document, &report, true).unwrap();
        assert_eq!(std::fs::read_to_string(&document).unwrap(), MONGO_DOC);

        execute(&document, &report, false).unwrap();
        assert_ne!(std::fs::read_to_string(&document).unwrap(), MONGO_DOC);
    }

    #[test]
    fn missing_report_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let document = dir.path().join("a.tql");
        std::fs::write(&document, MONGO_DOC).unwrap();
        let err = execute(&document, &dir.path().join("absent.txt"), false).unwrap_err();
        assert!(err.to_string().contains("Failed to read report"));
    }
}
