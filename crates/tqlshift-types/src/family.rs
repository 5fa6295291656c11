//! Connector families and the reader types that declare them.
//!
//! A [`ConnectorFamily`] decides both the vocabulary of a checkpoint report
//! and the start-position field of a definition document. Several reader
//! types may alias onto one family.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Class of source system a pipeline reads from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ConnectorFamily {
    /// MySQL binlog file + offset.
    MySqlBinlog,
    /// SQL Server log sequence number.
    SqlServerLsn,
    /// MongoDB oplog timestamp.
    MongoTimestamp,
    /// Oracle system change number.
    OracleScn,
    /// No recognized reader type declared.
    Unclassified,
}

impl ConnectorFamily {
    /// Families that carry a resume position.
    pub const CLASSIFIED: [Self; 4] = [
        Self::MySqlBinlog,
        Self::SqlServerLsn,
        Self::MongoTimestamp,
        Self::OracleScn,
    ];

    /// Short, stable label used in logs and summaries.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::MySqlBinlog => "mysql",
            Self::SqlServerLsn => "sqlserver",
            Self::MongoTimestamp => "mongodb",
            Self::OracleScn => "oracle",
            Self::Unclassified => "unclassified",
        }
    }

    #[must_use]
    pub fn is_classified(self) -> bool {
        !matches!(self, Self::Unclassified)
    }
}

impl fmt::Display for ConnectorFamily {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Reader type named in a source declaration (`USING Global.<Reader>`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ReaderType {
    MysqlReader,
    MsSqlReader,
    MsJet,
    MongoDbReader,
    OracleReader,
    OJet,
}

impl ReaderType {
    pub const ALL: [Self; 6] = [
        Self::MysqlReader,
        Self::MsSqlReader,
        Self::MsJet,
        Self::MongoDbReader,
        Self::OracleReader,
        Self::OJet,
    ];

    /// Token as spelled after `Global.` in a definition document.
    #[must_use]
    pub fn token(self) -> &'static str {
        match self {
            Self::MysqlReader => "MysqlReader",
            Self::MsSqlReader => "MSSqlReader",
            Self::MsJet => "MSJet",
            Self::MongoDbReader => "MongoDBReader",
            Self::OracleReader => "OracleReader",
            Self::OJet => "OJet",
        }
    }

    /// Case-insensitive lookup of a reader token (without the `Global.` prefix).
    #[must_use]
    pub fn from_token(token: &str) -> Option<Self> {
        Self::ALL
            .into_iter()
            .find(|reader| reader.token().eq_ignore_ascii_case(token))
    }

    #[must_use]
    pub fn family(self) -> ConnectorFamily {
        match self {
            Self::MysqlReader => ConnectorFamily::MySqlBinlog,
            Self::MsSqlReader | Self::MsJet => ConnectorFamily::SqlServerLsn,
            Self::MongoDbReader => ConnectorFamily::MongoTimestamp,
            Self::OracleReader | Self::OJet => ConnectorFamily::OracleScn,
        }
    }

    /// Every reader type that aliases onto `family`.
    pub fn of_family(family: ConnectorFamily) -> impl Iterator<Item = Self> {
        Self::ALL
            .into_iter()
            .filter(move |reader| reader.family() == family)
    }
}

impl fmt::Display for ReaderType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Global.{}", self.token())
    }
}
