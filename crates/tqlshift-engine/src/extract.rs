//! Checkpoint report parsing.
//!
//! Each connector family reports its position with its own labels. The
//! rules below are independent matchers tried in a fixed priority order;
//! the first one that yields a complete [`PositionDescriptor`] wins.

use std::sync::LazyLock;

use regex::Regex;
use tqlshift_types::{CheckpointReport, ConnectorFamily, PositionDescriptor};

static BINLOG_NAME_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"BinlogName\s*:\s*([^\s,;\]}]+)").expect("valid binlog name regex")
});
static BINLOG_POSITION_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"BinLogPosition\s*:\s*(\d+)").expect("valid binlog position regex"));
static SQLSERVER_LSN_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"CommitScn:\s*([A-Fa-f0-9]+)").expect("valid lsn regex"));
static MONGO_DATETIME_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"UTC DateTime value = ([^\]]+)\]").expect("valid mongo datetime regex")
});
static ORACLE_SCN_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"CommitSCN\[(\d+)\]").expect("valid scn regex"));

/// Millisecond/zulu suffix the platform appends to Mongo timestamps.
const MONGO_MILLIS_SUFFIX: &str = ".000Z";

/// A single extraction rule.
pub type Rule = fn(&str) -> Option<PositionDescriptor>;

/// Extraction rules in priority order.
pub const RULES: [(ConnectorFamily, Rule); 4] = [
    (ConnectorFamily::MySqlBinlog, mysql_binlog),
    (ConnectorFamily::SqlServerLsn, sqlserver_lsn),
    (ConnectorFamily::MongoTimestamp, mongo_timestamp),
    (ConnectorFamily::OracleScn, oracle_scn),
];

/// Parse a free-text position summary into a resume position.
///
/// Returns `None` for empty text or when no rule matches, which simply
/// means the pipeline has no checkpoint data yet.
#[must_use]
pub fn extract(report_text: &str) -> Option<PositionDescriptor> {
    if report_text.trim().is_empty() {
        return None;
    }
    RULES.iter().find_map(|(family, rule)| {
        let position = rule(report_text)?;
        tracing::debug!(family = %family, position = %position, "Checkpoint rule matched");
        Some(position)
    })
}

/// Apply [`extract`] to the most recent entry of a checkpoint history.
#[must_use]
pub fn extract_latest(report: &CheckpointReport) -> Option<PositionDescriptor> {
    report.latest_summary().and_then(extract)
}

/// Requires both `BinlogName` and `BinLogPosition`; never emits a half-filled position.
#[must_use]
pub fn mysql_binlog(text: &str) -> Option<PositionDescriptor> {
    let log_file_name = BINLOG_NAME_RE.captures(text)?.get(1)?.as_str();
    let offset = BINLOG_POSITION_RE.captures(text)?.get(1)?.as_str().parse().ok()?;
    Some(PositionDescriptor::MySqlBinlog {
        log_file_name: log_file_name.to_string(),
        offset,
    })
}

#[must_use]
pub fn sqlserver_lsn(text: &str) -> Option<PositionDescriptor> {
    let lsn_hex = SQLSERVER_LSN_RE.captures(text)?.get(1)?.as_str();
    Some(PositionDescriptor::SqlServerLsn {
        lsn_hex: lsn_hex.to_string(),
    })
}

#[must_use]
pub fn mongo_timestamp(text: &str) -> Option<PositionDescriptor> {
    let literal = MONGO_DATETIME_RE.captures(text)?.get(1)?.as_str().trim();
    let iso_date_time = literal.strip_suffix(MONGO_MILLIS_SUFFIX).unwrap_or(literal);
    if iso_date_time.is_empty() {
        return None;
    }
    Some(PositionDescriptor::MongoTimestamp {
        iso_date_time: iso_date_time.to_string(),
    })
}

#[must_use]
pub fn oracle_scn(text: &str) -> Option<PositionDescriptor> {
    let scn = ORACLE_SCN_RE.captures(text)?.get(1)?.as_str();
    Some(PositionDescriptor::OracleScn {
        scn: scn.to_string(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    const MYSQL_SUMMARY: &str =
        "MySQL CDC position {BinlogName: mysql-bin.000123, BinLogPosition: 456, ServerId: 1}";
    const SQLSERVER_SUMMARY: &str = "SQL Server position CommitScn: 0000002A000001F0001C";
    const MONGO_SUMMARY: &str =
        "OpLog position [Timestamp: 1759438108, UTC DateTime value = 2025-10-02T20:48:28.000Z]";
    const ORACLE_SUMMARY: &str = "{OpenSCN[30507229]-CommitSCN[30507230]-SeqNum[2]}";

    #[test]
    fn mysql_report_yields_file_and_offset() {
        let position = extract(MYSQL_SUMMARY).unwrap();
        assert_eq!(
            position,
            PositionDescriptor::MySqlBinlog {
                log_file_name: "mysql-bin.000123".into(),
                offset: 456,
            }
        );
        assert_eq!(position.render(), "FileName:mysql-bin.000123;offset:456");
    }

    #[test]
    fn mysql_labels_tolerate_spacing_around_colon() {
        let position = extract("BinlogName : binlog.000002\nBinLogPosition :157").unwrap();
        assert_eq!(position.render(), "FileName:binlog.000002;offset:157");
    }

    #[rstest]
    #[case("BinlogName: mysql-bin.000123")]
    #[case("BinLogPosition: 456")]
    #[case("BinlogName: mysql-bin.000123, BinLogPosition: 99999999999999999999999")]
    fn partial_mysql_report_is_not_a_position(#[case] text: &str) {
        assert_eq!(mysql_binlog(text), None);
        assert_eq!(extract(text), None);
    }

    #[test]
    fn partial_mysql_report_falls_through_to_later_rules() {
        let text = "BinlogName: mysql-bin.000123 CommitSCN[42]";
        assert_eq!(
            extract(text),
            Some(PositionDescriptor::OracleScn { scn: "42".into() })
        );
    }

    #[test]
    fn sqlserver_report_keeps_hex_case() {
        let position = extract("CommitScn: 00000027000003c80003").unwrap();
        assert_eq!(position.render(), "LSN:0x00000027000003c80003");
        assert_eq!(extract(SQLSERVER_SUMMARY).unwrap().family(), ConnectorFamily::SqlServerLsn);
    }

    #[test]
    fn mongo_report_strips_millis_suffix() {
        let position = extract(MONGO_SUMMARY).unwrap();
        assert_eq!(position.render(), "2025-10-02T20:48:28");
    }

    #[test]
    fn mongo_report_without_suffix_is_kept_verbatim() {
        let position = extract("UTC DateTime value = 2025-10-02T20:48:28.517Z]").unwrap();
        assert_eq!(position.render(), "2025-10-02T20:48:28.517Z");
    }

    #[test]
    fn mongo_literal_needs_closing_bracket() {
        assert_eq!(mongo_timestamp("UTC DateTime value = 2025-10-02T20:48:28.000Z"), None);
    }

    #[test]
    fn oracle_report_yields_commit_scn() {
        let position = extract(ORACLE_SUMMARY).unwrap();
        assert_eq!(position, PositionDescriptor::OracleScn { scn: "30507230".into() });
        assert_eq!(position.render(), "30507230");
    }

    #[test]
    fn mysql_wins_over_coincidental_later_labels() {
        let text = format!("{MYSQL_SUMMARY} CommitScn: ABC {ORACLE_SUMMARY}");
        assert_eq!(extract(&text).unwrap().family(), ConnectorFamily::MySqlBinlog);
    }

    #[test]
    fn lsn_rule_precedes_mongo_rule() {
        let text = format!("{MONGO_SUMMARY} CommitScn: FF");
        assert_eq!(extract(&text).unwrap().family(), ConnectorFamily::SqlServerLsn);
    }

    #[rstest]
    #[case("")]
    #[case("   \n\t")]
    #[case("Checkpoint not yet available")]
    #[case("CommitSCN[notanumber]")]
    #[case("CommitScn: ZZZ")]
    fn unmatched_text_is_absence(#[case] text: &str) {
        assert_eq!(extract(text), None);
    }

    #[test]
    fn extract_latest_reads_only_first_entry() {
        let report = CheckpointReport {
            entries: vec![
                tqlshift_types::CheckpointEntry {
                    source_position_summary: ORACLE_SUMMARY.into(),
                },
                tqlshift_types::CheckpointEntry {
                    source_position_summary: MYSQL_SUMMARY.into(),
                },
            ],
        };
        assert_eq!(extract_latest(&report).unwrap().render(), "30507230");
        assert_eq!(extract_latest(&CheckpointReport::default()), None);
    }

    #[test]
    fn rules_are_listed_in_priority_order() {
        let families: Vec<_> = RULES.iter().map(|(family, _)| *family).collect();
        assert_eq!(families, ConnectorFamily::CLASSIFIED.to_vec());
    }
}
