//! Per-pipeline reports and run-level tallies.

use tqlshift_types::{
    AppName, ConnectorFamily, FieldEdit, PositionDescriptor, ReaderType, UnchangedReason,
};

/// What happened to one staged pipeline.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PipelineStatus {
    /// The start position was written (`persisted` is false on dry runs).
    Updated {
        field: &'static str,
        edit: FieldEdit,
        persisted: bool,
    },
    Unchanged(UnchangedReason),
    Unclassified,
    /// Reading, fetching or writing failed for this pipeline only.
    Failed(String),
}

/// Report for one staged pipeline.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PipelineReport {
    pub app: AppName,
    pub reader: Option<ReaderType>,
    pub position: Option<PositionDescriptor>,
    pub status: PipelineStatus,
}

impl PipelineReport {
    #[must_use]
    pub fn family(&self) -> ConnectorFamily {
        self.reader
            .map_or(ConnectorFamily::Unclassified, ReaderType::family)
    }
}

/// Aggregate counts over a run.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RunSummary {
    pub total: usize,
    pub mysql: usize,
    pub sqlserver: usize,
    pub mongodb: usize,
    pub oracle: usize,
    pub with_checkpoint: usize,
    pub updated: usize,
    pub unchanged: usize,
    pub unclassified: usize,
    pub failed: usize,
}

impl RunSummary {
    /// Fold one pipeline report into the tallies.
    pub fn record(&mut self, report: &PipelineReport) {
        self.total += 1;
        match report.family() {
            ConnectorFamily::MySqlBinlog => self.mysql += 1,
            ConnectorFamily::SqlServerLsn => self.sqlserver += 1,
            ConnectorFamily::MongoTimestamp => self.mongodb += 1,
            ConnectorFamily::OracleScn => self.oracle += 1,
            ConnectorFamily::Unclassified => {}
        }
        if report.position.is_some() {
            self.with_checkpoint += 1;
        }
        match report.status {
            PipelineStatus::Updated { .. } => self.updated += 1,
            PipelineStatus::Unchanged(_) => self.unchanged += 1,
            PipelineStatus::Unclassified => self.unclassified += 1,
            PipelineStatus::Failed(_) => self.failed += 1,
        }
    }

    /// Pipelines classified into `family`.
    #[must_use]
    pub fn family_count(&self, family: ConnectorFamily) -> usize {
        match family {
            ConnectorFamily::MySqlBinlog => self.mysql,
            ConnectorFamily::SqlServerLsn => self.sqlserver,
            ConnectorFamily::MongoTimestamp => self.mongodb,
            ConnectorFamily::OracleScn => self.oracle,
            ConnectorFamily::Unclassified => self.unclassified,
        }
    }
}

/// Result of processing a stage directory.
#[derive(Debug, Clone, Default)]
pub struct RunReport {
    pub pipelines: Vec<PipelineReport>,
    pub summary: RunSummary,
}

impl RunReport {
    pub fn push(&mut self, report: PipelineReport) {
        self.summary.record(&report);
        self.pipelines.push(report);
    }

    /// Pipelines left for an operator to fix by hand.
    pub fn needs_operator(&self) -> impl Iterator<Item = &PipelineReport> {
        self.pipelines.iter().filter(|p| match &p.status {
            PipelineStatus::Unchanged(reason) => reason.needs_operator(),
            PipelineStatus::Failed(_) => true,
            _ => false,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn report(
        reader: Option<ReaderType>,
        with_position: bool,
        status: PipelineStatus,
    ) -> PipelineReport {
        PipelineReport {
            app: AppName::new("admin.app"),
            reader,
            position: with_position.then(|| PositionDescriptor::OracleScn { scn: "1".into() }),
            status,
        }
    }

    #[test]
    fn summary_tallies_families_and_statuses() {
        let mut run = RunReport::default();
        run.push(report(
            Some(ReaderType::OJet),
            true,
            PipelineStatus::Updated {
                field: "startSCN",
                edit: FieldEdit::Inserted,
                persisted: true,
            },
        ));
        run.push(report(
            Some(ReaderType::MsJet),
            false,
            PipelineStatus::Unchanged(UnchangedReason::NoCheckpointData),
        ));
        run.push(report(None, false, PipelineStatus::Unclassified));
        run.push(report(
            Some(ReaderType::MysqlReader),
            false,
            PipelineStatus::Failed("connection refused".into()),
        ));

        let summary = &run.summary;
        assert_eq!(summary.total, 4);
        assert_eq!(summary.oracle, 1);
        assert_eq!(summary.sqlserver, 1);
        assert_eq!(summary.mysql, 1);
        assert_eq!(summary.mongodb, 0);
        assert_eq!(summary.with_checkpoint, 1);
        assert_eq!(summary.updated, 1);
        assert_eq!(summary.unchanged, 1);
        assert_eq!(summary.unclassified, 1);
        assert_eq!(summary.failed, 1);
        assert_eq!(summary.family_count(ConnectorFamily::SqlServerLsn), 1);
    }

    #[test]
    fn operator_list_holds_structural_and_failed_pipelines() {
        let mut run = RunReport::default();
        run.push(report(
            Some(ReaderType::MongoDbReader),
            true,
            PipelineStatus::Unchanged(UnchangedReason::NoInsertionPoint {
                field: "startTimestamp",
            }),
        ));
        run.push(report(
            Some(ReaderType::MysqlReader),
            true,
            PipelineStatus::Unchanged(UnchangedReason::NoPlaceholder {
                field: "StartTimestamp",
            }),
        ));
        run.push(report(
            Some(ReaderType::OJet),
            false,
            PipelineStatus::Failed("boom".into()),
        ));
        assert_eq!(run.needs_operator().count(), 2);
    }
}
