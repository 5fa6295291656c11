//! Normalized resume positions.
//!
//! A [`PositionDescriptor`] is always fully populated for its family. Its
//! [`Display`](std::fmt::Display) form is the exact text embedded into a
//! definition document.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::family::ConnectorFamily;

/// Where a source connector should resume.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum PositionDescriptor {
    /// Rendered as `FileName:<log_file_name>;offset:<offset>`.
    MySqlBinlog { log_file_name: String, offset: u64 },
    /// Rendered as `LSN:0x<lsn_hex>`; digit case is preserved.
    SqlServerLsn { lsn_hex: String },
    /// Rendered verbatim, already stripped of any `.000Z` suffix.
    MongoTimestamp { iso_date_time: String },
    /// Rendered as the bare decimal digits.
    OracleScn { scn: String },
}

impl PositionDescriptor {
    #[must_use]
    pub fn family(&self) -> ConnectorFamily {
        match self {
            Self::MySqlBinlog { .. } => ConnectorFamily::MySqlBinlog,
            Self::SqlServerLsn { .. } => ConnectorFamily::SqlServerLsn,
            Self::MongoTimestamp { .. } => ConnectorFamily::MongoTimestamp,
            Self::OracleScn { .. } => ConnectorFamily::OracleScn,
        }
    }

    /// Text to embed between the quotes of a start-position field.
    #[must_use]
    pub fn render(&self) -> String {
        self.to_string()
    }
}

impl fmt::Display for PositionDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::MySqlBinlog {
                log_file_name,
                offset,
            } => write!(f, "FileName:{log_file_name};offset:{offset}"),
            Self::SqlServerLsn { lsn_hex } => write!(f, "LSN:0x{lsn_hex}"),
            Self::MongoTimestamp { iso_date_time } => f.write_str(iso_date_time),
            Self::OracleScn { scn } => f.write_str(scn),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn mysql_renders_file_and_offset() {
        let pos = PositionDescriptor::MySqlBinlog {
            log_file_name: "mysql-bin.000123".into(),
            offset: 456,
        };
        assert_eq!(pos.render(), "FileName:mysql-bin.000123;offset:456");
        assert_eq!(pos.family(), ConnectorFamily::MySqlBinlog);
    }

    #[test]
    fn sqlserver_renders_prefixed_hex_preserving_case() {
        let pos = PositionDescriptor::SqlServerLsn {
            lsn_hex: "0000002A000001F0aBc1".into(),
        };
        assert_eq!(pos.render(), "LSN:0x0000002A000001F0aBc1");
    }

    #[test]
    fn mongo_and_oracle_render_bare() {
        let mongo = PositionDescriptor::MongoTimestamp {
            iso_date_time: "2025-10-02T20:48:28".into(),
        };
        let oracle = PositionDescriptor::OracleScn {
            scn: "30507230".into(),
        };
        assert_eq!(mongo.render(), "2025-10-02T20:48:28");
        assert_eq!(oracle.render(), "30507230");
        assert_eq!(oracle.family(), ConnectorFamily::OracleScn);
    }

    #[test]
    fn serializes_with_type_tag() {
        let pos = PositionDescriptor::OracleScn { scn: "7".into() };
        let json = serde_json::to_string(&pos).unwrap();
        assert_eq!(json, r#"{"type":"oracle_scn","scn":"7"}"#);
    }
}
