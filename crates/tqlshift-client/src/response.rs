//! Command result parsing.
//!
//! Output shapes differ per command and are loosely typed, so every parser
//! here walks a `serde_json::Value` and ignores entries it does not
//! understand instead of failing the whole response.

use serde::Deserialize;
use serde_json::Value;
use tqlshift_types::{CheckpointEntry, CheckpointReport};

/// One entry of the JSON list the command endpoint returns.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CommandResult {
    #[serde(default)]
    pub command: Option<String>,
    #[serde(default)]
    pub execution_status: Option<String>,
    #[serde(default)]
    pub failure_message: Option<String>,
    #[serde(default)]
    pub output: Value,
}

impl CommandResult {
    #[must_use]
    pub fn succeeded(&self) -> bool {
        self.execution_status.as_deref() == Some("Success")
    }

    /// Failure message, or a generic one when the server gave none.
    #[must_use]
    pub fn failure(&self) -> &str {
        self.failure_message.as_deref().unwrap_or("Unknown error")
    }
}

/// Output of the first result, if any.
#[must_use]
pub fn first_output(results: &[CommandResult]) -> Option<&Value> {
    results.first().map(|r| &r.output)
}

/// First failed result, if any.
#[must_use]
pub fn first_failure(results: &[CommandResult]) -> Option<&CommandResult> {
    results.iter().find(|r| r.execution_status.is_some() && !r.succeeded())
}

/// Fully qualified application names from `mon;`.
#[must_use]
pub fn application_names(results: &[CommandResult]) -> Vec<String> {
    first_output(results)
        .and_then(|output| output.get("striimApplications"))
        .and_then(Value::as_array)
        .map(|apps| {
            apps.iter()
                .filter_map(|app| app.get("fullName").and_then(Value::as_str))
                .filter(|name| !name.is_empty())
                .map(str::to_string)
                .collect()
        })
        .unwrap_or_default()
}

/// Checkpoint history from `SHOW <app> CHECKPOINT HISTORY;`, newest first.
#[must_use]
pub fn checkpoint_report(results: &[CommandResult]) -> CheckpointReport {
    let entries = first_output(results)
        .and_then(Value::as_array)
        .map(|items| {
            items
                .iter()
                .filter_map(|item| CheckpointEntry::deserialize(item).ok())
                .collect()
        })
        .unwrap_or_default();
    CheckpointReport { entries }
}

/// String values under keys starting with `prefix`, as `list users;` and
/// `list roles;` return them: `[{"user1": "admin"}, {"user2": "sys"}]`.
#[must_use]
pub fn indexed_names(results: &[CommandResult], prefix: &str) -> Vec<String> {
    output_items(results)
        .filter_map(Value::as_object)
        .flat_map(|item| {
            item.iter()
                .filter(|(key, _)| key.starts_with(prefix))
                .filter_map(|(_, value)| value.as_str())
                .map(str::to_string)
        })
        .collect()
}

/// Type names from `list types;`: `[{"type1": {"name": "Global.X"}}]`.
#[must_use]
pub fn type_names(results: &[CommandResult]) -> Vec<String> {
    output_items(results)
        .filter_map(Value::as_object)
        .flat_map(|item| {
            item.values()
                .filter_map(|info| info.get("name").and_then(Value::as_str))
                .map(str::to_string)
        })
        .collect()
}

/// Role names granted to a user, from `describe user <u>;`.
#[must_use]
pub fn user_roles(results: &[CommandResult]) -> Vec<String> {
    described_list(results, "roles")
}

/// Permission clauses of a role, from `describe role <r>;`.
#[must_use]
pub fn role_permissions(results: &[CommandResult]) -> Vec<String> {
    described_list(results, "permissions")
}

fn output_items(results: &[CommandResult]) -> impl Iterator<Item = &Value> {
    first_output(results)
        .and_then(Value::as_array)
        .into_iter()
        .flatten()
}

// Entries are either plain strings or objects carrying a `name`.
fn described_list(results: &[CommandResult], key: &str) -> Vec<String> {
    output_items(results)
        .next()
        .and_then(|described| described.get(key))
        .and_then(Value::as_array)
        .map(|entries| {
            entries
                .iter()
                .filter_map(|entry| {
                    entry
                        .as_str()
                        .or_else(|| entry.get("name").and_then(Value::as_str))
                })
                .map(str::to_string)
                .collect()
        })
        .unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn results(value: Value) -> Vec<CommandResult> {
        serde_json::from_value(value).unwrap()
    }

    #[test]
    fn command_result_status() {
        let parsed = results(json!([
            {"command": "DEPLOY APPLICATION a;", "executionStatus": "Success", "output": []},
            {"executionStatus": "Failure", "failureMessage": "no such app"},
        ]));
        assert!(parsed[0].succeeded());
        assert!(!parsed[1].succeeded());
        assert_eq!(first_failure(&parsed).map(CommandResult::failure), Some("no such app"));
        assert_eq!(CommandResult::default().failure(), "Unknown error");
    }

    #[test]
    fn application_names_from_mon() {
        let parsed = results(json!([{
            "executionStatus": "Success",
            "output": {"striimApplications": [
                {"fullName": "admin.orders", "status": "RUNNING"},
                {"fullName": ""},
                {"status": "CREATED"},
                {"fullName": "ops.billing"}
            ]}
        }]));
        assert_eq!(application_names(&parsed), vec!["admin.orders", "ops.billing"]);
        assert!(application_names(&[]).is_empty());
    }

    #[test]
    fn checkpoint_report_keeps_order() {
        let parsed = results(json!([{
            "output": [
                {"sourcePositionSummary": "CommitSCN[20]", "checkpointTime": 2},
                {"sourcePositionSummary": "CommitSCN[10]"}
            ]
        }]));
        let report = checkpoint_report(&parsed);
        assert_eq!(report.entries.len(), 2);
        assert_eq!(report.latest_summary(), Some("CommitSCN[20]"));
    }

    #[test]
    fn checkpoint_report_without_history_is_empty() {
        let parsed = results(json!([{"output": "No checkpoint history"}]));
        assert!(checkpoint_report(&parsed).is_empty());
    }

    #[test]
    fn indexed_names_for_users_and_roles() {
        let parsed = results(json!([{
            "output": [{"user1": "admin"}, {"user2": "alice"}, {"role1": "x"}, "stray"]
        }]));
        assert_eq!(indexed_names(&parsed, "user"), vec!["admin", "alice"]);
        assert_eq!(indexed_names(&parsed, "role"), vec!["x"]);
    }

    #[test]
    fn type_names_from_list_types() {
        let parsed = results(json!([{
            "output": [
                {"type1": {"name": "Global.MonitorBatchEvent"}},
                {"type2": {"name": "admin.mysql_src_orders_Type"}},
                {"type3": "not an object"}
            ]
        }]));
        assert_eq!(
            type_names(&parsed),
            vec!["Global.MonitorBatchEvent", "admin.mysql_src_orders_Type"]
        );
    }

    #[test]
    fn described_roles_and_permissions() {
        let user = results(json!([{
            "output": [{"name": "alice", "roles": [{"name": "alice.dev"}, {"name": "ops.viewer"}]}]
        }]));
        assert_eq!(user_roles(&user), vec!["alice.dev", "ops.viewer"]);

        let role = results(json!([{
            "output": [{"name": "ops.viewer", "permissions": ["GRANT READ ON application ops.*"]}]
        }]));
        assert_eq!(role_permissions(&role), vec!["GRANT READ ON application ops.*"]);
        assert!(role_permissions(&[]).is_empty());
    }
}
