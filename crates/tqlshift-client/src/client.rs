//! Authenticated command client.

use std::time::Duration;

use reqwest::header::{AUTHORIZATION, CONTENT_TYPE};
use reqwest::{Client, Response};
use serde::Deserialize;
use tqlshift_types::{AppName, CheckpointReport, ServerProfile};

use crate::error::{ClientError, Result};
use crate::response::{self, CommandResult};

const AUTH_PATH: &str = "/security/authenticate";
const COMMAND_PATH: &str = "/api/v2/tungsten";
const TOKEN_SCHEME: &str = "STRIIM-TOKEN";

/// Per-request time limits.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Timeouts {
    pub request: Duration,
    pub auth: Duration,
}

impl Default for Timeouts {
    fn default() -> Self {
        Self {
            request: Duration::from_secs(30),
            auth: Duration::from_secs(10),
        }
    }
}

#[derive(Debug, Deserialize)]
struct AuthResponse {
    token: Option<String>,
}

/// Types matched and dropped by [`StriimClient::drop_types_with_prefix`].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TypeDrop {
    pub matched: Vec<String>,
    pub failed: Vec<String>,
}

/// Client for one platform installation.
pub struct StriimClient {
    http: Client,
    profile: ServerProfile,
    timeouts: Timeouts,
    token: Option<String>,
}

impl StriimClient {
    /// Build an unauthenticated client for `profile`.
    ///
    /// # Errors
    ///
    /// Returns [`ClientError::Http`] if the TLS backend cannot be initialized.
    pub fn connect(profile: ServerProfile, timeouts: Timeouts) -> Result<Self> {
        let http = Client::builder()
            .timeout(timeouts.request)
            .danger_accept_invalid_certs(profile.accept_invalid_certs)
            .build()
            .map_err(|e| ClientError::http(profile.base_url(), e))?;
        Ok(Self {
            http,
            profile,
            timeouts,
            token: None,
        })
    }

    #[must_use]
    pub fn profile(&self) -> &ServerProfile {
        &self.profile
    }

    #[must_use]
    pub fn is_authenticated(&self) -> bool {
        self.token.is_some()
    }

    fn url(&self, path: &str) -> String {
        format!("{}{path}", self.profile.base_url())
    }

    /// Exchange the profile's credentials for a session token.
    ///
    /// # Errors
    ///
    /// Returns [`ClientError::AuthRejected`] when the server refuses the
    /// credentials or answers without a token.
    pub async fn authenticate(&mut self) -> Result<()> {
        let url = self.url(AUTH_PATH);
        let response = self
            .http
            .post(&url)
            .timeout(self.timeouts.auth)
            .form(&[
                ("username", self.profile.username.as_str()),
                ("password", self.profile.password.as_str()),
            ])
            .send()
            .await
            .map_err(|e| ClientError::http(&url, e))?;

        let status = response.status();
        let body = response.text().await.map_err(|e| ClientError::http(&url, e))?;
        if !status.is_success() {
            return Err(ClientError::AuthRejected(format!("{status}: {body}")));
        }
        let parsed: AuthResponse = serde_json::from_str(&body)
            .map_err(|e| ClientError::AuthRejected(format!("invalid response body: {e}")))?;
        let token = parsed
            .token
            .filter(|t| !t.is_empty())
            .ok_or_else(|| ClientError::AuthRejected("no token in response".to_string()))?;

        tracing::info!(url = %self.profile.base_url(), user = %self.profile.username, "Authenticated");
        self.token = Some(token);
        Ok(())
    }

    async fn post_command(&self, body: String, query: &[(&str, &str)]) -> Result<Response> {
        let token = self.token.as_deref().ok_or(ClientError::NotAuthenticated)?;
        let url = self.url(COMMAND_PATH);
        let response = self
            .http
            .post(&url)
            .query(query)
            .header(AUTHORIZATION, format!("{TOKEN_SCHEME} {token}"))
            .header(CONTENT_TYPE, "text/plain")
            .body(body)
            .send()
            .await
            .map_err(|e| ClientError::http(&url, e))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(ClientError::Status { url, status, body });
        }
        Ok(response)
    }

    async fn results(&self, command: &str, response: Response) -> Result<Vec<CommandResult>> {
        let url = self.url(COMMAND_PATH);
        let body = response.text().await.map_err(|e| ClientError::http(&url, e))?;
        serde_json::from_str(&body).map_err(|e| ClientError::UnexpectedResponse {
            command: command.to_string(),
            detail: e.to_string(),
        })
    }

    /// Run one TQL command and return the raw results.
    ///
    /// # Errors
    ///
    /// Returns an error on transport failure, a non-success HTTP status, or
    /// a body that is not a list of command results.
    pub async fn execute(&self, command: &str) -> Result<Vec<CommandResult>> {
        tracing::debug!(command, "Executing command");
        let response = self.post_command(command.to_string(), &[]).await?;
        self.results(command, response).await
    }

    /// Like [`execute`](Self::execute), but a reported failure status is an error.
    ///
    /// # Errors
    ///
    /// Returns [`ClientError::CommandFailed`] if any result reports failure.
    pub async fn execute_checked(&self, command: &str) -> Result<Vec<CommandResult>> {
        let results = self.execute(command).await?;
        if let Some(failed) = response::first_failure(&results) {
            return Err(ClientError::CommandFailed {
                command: command.to_string(),
                message: failed.failure().to_string(),
            });
        }
        Ok(results)
    }

    /// Fully qualified names of every application.
    ///
    /// # Errors
    ///
    /// Propagates command errors.
    pub async fn list_applications(&self) -> Result<Vec<AppName>> {
        let results = self.execute_checked("mon;").await?;
        Ok(response::application_names(&results)
            .into_iter()
            .map(AppName::new)
            .collect())
    }

    /// Checkpoint history of `app`, newest entry first.
    ///
    /// # Errors
    ///
    /// Propagates command errors.
    pub async fn checkpoint_history(&self, app: &AppName) -> Result<CheckpointReport> {
        let results = self
            .execute_checked(&format!("SHOW {app} CHECKPOINT HISTORY;"))
            .await?;
        Ok(response::checkpoint_report(&results))
    }

    /// # Errors
    ///
    /// Propagates command errors.
    pub async fn list_types(&self) -> Result<Vec<String>> {
        let results = self.execute_checked("list types;").await?;
        Ok(response::type_names(&results))
    }

    /// Drop every type named `<namespace>.<component>_*`.
    ///
    /// A type that fails to drop is recorded and the rest are still tried.
    ///
    /// # Errors
    ///
    /// Returns an error only if the type list cannot be fetched.
    pub async fn drop_types_with_prefix(&self, namespace: &str, component: &str) -> Result<TypeDrop> {
        let prefix = type_prefix(namespace, component);
        let matched: Vec<String> = self
            .list_types()
            .await?
            .into_iter()
            .filter(|name| name.starts_with(&prefix))
            .collect();
        tracing::info!(prefix = %prefix, matched = matched.len(), "Dropping generated types");

        let mut failed = Vec::new();
        for name in &matched {
            if let Err(e) = self.execute_checked(&format!("drop type {name};")).await {
                tracing::warn!(type_name = %name, error = %e, "Failed to drop type");
                failed.push(name.clone());
            }
        }
        Ok(TypeDrop { matched, failed })
    }

    /// # Errors
    ///
    /// Propagates command errors.
    pub async fn list_users(&self) -> Result<Vec<String>> {
        let results = self.execute_checked("list users;").await?;
        Ok(response::indexed_names(&results, "user"))
    }

    /// Roles granted to `username`.
    ///
    /// # Errors
    ///
    /// Propagates command errors.
    pub async fn describe_user(&self, username: &str) -> Result<Vec<String>> {
        let results = self
            .execute_checked(&format!("describe user {username};"))
            .await?;
        Ok(response::user_roles(&results))
    }

    /// # Errors
    ///
    /// Propagates command errors.
    pub async fn list_roles(&self) -> Result<Vec<String>> {
        let results = self.execute_checked("list roles;").await?;
        Ok(response::indexed_names(&results, "role"))
    }

    /// Permission clauses of `role`.
    ///
    /// # Errors
    ///
    /// Propagates command errors.
    pub async fn describe_role(&self, role: &str) -> Result<Vec<String>> {
        let results = self
            .execute_checked(&format!("describe role {role};"))
            .await?;
        Ok(response::role_permissions(&results))
    }

    /// Export every application as an archive protected by `passphrase`.
    ///
    /// Returns the archive bytes exactly as received.
    ///
    /// # Errors
    ///
    /// Returns an error on transport failure or a non-success status.
    pub async fn export_all(&self, passphrase: &str) -> Result<Vec<u8>> {
        tracing::debug!("Requesting export of all applications");
        let response = self
            .post_command(format!("EXPORT APPLICATION ALL passphrase=\"{passphrase}\";"), &[])
            .await?;
        let url = self.url(COMMAND_PATH);
        let bytes = response.bytes().await.map_err(|e| ClientError::http(&url, e))?;
        Ok(bytes.to_vec())
    }

    /// Import one definition document.
    ///
    /// The results are returned unchecked; callers decide what a failure
    /// status means for them.
    ///
    /// # Errors
    ///
    /// Returns an error on transport failure or a malformed response.
    pub async fn import_document(&self, document: &str) -> Result<Vec<CommandResult>> {
        let response = self
            .post_command(
                document.to_string(),
                &[("passphrase", self.profile.passphrase.as_str())],
            )
            .await?;
        self.results("import document", response).await
    }

    /// # Errors
    ///
    /// Returns [`ClientError::CommandFailed`] if the deployment is refused.
    pub async fn deploy(&self, app: &AppName) -> Result<()> {
        self.execute_checked(&lifecycle_command("DEPLOY", app))
            .await
            .map(|_| ())
    }

    /// Stop `app`; failure is logged and ignored since the app may not be running.
    pub async fn stop(&self, app: &AppName) {
        self.tolerant(&lifecycle_command("STOP", app)).await;
    }

    /// Undeploy `app`; failure is logged and ignored.
    pub async fn undeploy(&self, app: &AppName) {
        self.tolerant(&lifecycle_command("UNDEPLOY", app)).await;
    }

    /// Drop `app` and its components; failure is logged and ignored since
    /// the app may not exist.
    pub async fn drop_application(&self, app: &AppName) {
        self.tolerant(&format!("DROP APPLICATION {app} CASCADE;")).await;
    }

    async fn tolerant(&self, command: &str) {
        if let Err(e) = self.execute_checked(command).await {
            tracing::debug!(command, error = %e, "Ignoring failed lifecycle command");
        }
    }
}

fn lifecycle_command(verb: &str, app: &AppName) -> String {
    format!("{verb} APPLICATION {app};")
}

fn type_prefix(namespace: &str, component: &str) -> String {
    format!("{namespace}.{component}_")
}

#[cfg(test)]
mod tests {
    use super::*;

    fn client(url: &str) -> StriimClient {
        let profile = ServerProfile {
            url: url.into(),
            ..ServerProfile::default()
        };
        StriimClient::connect(profile, Timeouts::default()).unwrap()
    }

    #[test]
    fn urls_join_base_without_double_slash() {
        let client = client("https://striim.internal:9081/");
        assert_eq!(
            client.url(COMMAND_PATH),
            "https://striim.internal:9081/api/v2/tungsten"
        );
        assert!(!client.is_authenticated());
    }

    #[test]
    fn command_text() {
        let app = AppName::new("admin.orders");
        assert_eq!(lifecycle_command("UNDEPLOY", &app), "UNDEPLOY APPLICATION admin.orders;");
        assert_eq!(type_prefix("admin", "mysql_src"), "admin.mysql_src_");
    }

    #[tokio::test]
    async fn commands_require_authentication() {
        let client = client("http://127.0.0.1:9");
        let err = client.execute("mon;").await.unwrap_err();
        assert!(matches!(err, ClientError::NotAuthenticated));
        let err = client.export_all("pass").await.unwrap_err();
        assert!(matches!(err, ClientError::NotAuthenticated));
    }
}
