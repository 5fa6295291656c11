//! User and role export as TQL statements.
//!
//! Passwords cannot be exported; every `CREATE USER` statement carries the
//! literal placeholder `password` for the operator to replace.

/// Built-in users that exist on every installation.
pub const SYSTEM_USERS: [&str; 2] = ["admin", "sys"];

/// Suffixes of the roles the platform creates automatically for each user.
const USER_ROLE_SUFFIXES: [&str; 4] = [".dev", ".enduser", ".admin", ".useradmin"];

/// Name of the roles file referenced from the users file.
pub const ROLES_FILE: &str = "roles.tql";
pub const USERS_FILE: &str = "users.tql";

/// A user and the roles granted to it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UserDetail {
    pub username: String,
    pub roles: Vec<String>,
}

/// A custom role and its permission clauses (`GRANT ... ON ...`).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RoleDetail {
    pub name: String,
    pub permissions: Vec<String>,
}

#[must_use]
pub fn is_system_user(username: &str) -> bool {
    SYSTEM_USERS.contains(&username)
}

/// `CREATE USER` statement for `user`, or `None` for system users and
/// users whose only roles are their own per-user roles.
#[must_use]
pub fn create_user_statement(user: &UserDetail) -> Option<String> {
    if is_system_user(&user.username) {
        return None;
    }
    let own_prefix = format!("{}.", user.username);
    let roles: Vec<&str> = user
        .roles
        .iter()
        .map(String::as_str)
        .filter(|role| !role.is_empty() && !role.starts_with(&own_prefix))
        .collect();
    if roles.is_empty() {
        return None;
    }
    Some(format!(
        "CREATE USER {} IDENTIFIED BY password DEFAULT ROLE {};",
        user.username,
        roles.join(", ")
    ))
}

/// Custom roles worth exporting: drops `Global.*`, `System$*` and the
/// per-user roles the platform recreates on its own.
#[must_use]
pub fn exportable_roles<'a>(roles: &'a [String], usernames: &[String]) -> Vec<&'a str> {
    roles
        .iter()
        .map(String::as_str)
        .filter(|role| !role.starts_with("Global.") && !role.starts_with("System$"))
        .filter(|role| {
            !usernames.iter().any(|user| {
                USER_ROLE_SUFFIXES
                    .iter()
                    .any(|suffix| role.strip_prefix(user.as_str()) == Some(suffix))
            })
        })
        .collect()
}

/// `CREATE ROLE` followed by one `GRANT ... TO <role>;` per permission.
#[must_use]
pub fn role_statements(role: &RoleDetail) -> Vec<String> {
    std::iter::once(format!("CREATE ROLE {};", role.name))
        .chain(
            role.permissions
                .iter()
                .map(|permission| format!("{} TO {};", permission.trim_end_matches(';'), role.name)),
        )
        .collect()
}

/// Contents of `users.tql`.
#[must_use]
pub fn render_users_file(statements: &[String], generated_at: &str, with_roles: bool) -> String {
    let mut out = String::new();
    out.push_str("-- User export\n");
    out.push_str(&format!("-- Generated at: {generated_at}\n"));
    out.push_str("--\n");
    out.push_str("-- Replace 'password' with the real passwords before importing\n");
    if with_roles {
        out.push_str("--\n");
        out.push_str(&format!(
            "-- Run {ROLES_FILE} first: it creates the custom roles these users depend on\n"
        ));
        out.push_str(&format!("-- @include {ROLES_FILE}\n"));
    }
    out.push_str("--\n\n");
    for statement in statements {
        out.push_str(statement);
        out.push('\n');
    }
    out
}

/// Contents of `roles.tql`; roles are separated by a blank line.
#[must_use]
pub fn render_roles_file(roles: &[RoleDetail], generated_at: &str) -> String {
    let mut out = String::new();
    out.push_str("-- Custom role export\n");
    out.push_str(&format!("-- Generated at: {generated_at}\n"));
    out.push_str("--\n");
    out.push_str(&format!("-- Run this file before {USERS_FILE}\n"));
    out.push_str("--\n");
    for role in roles {
        out.push('\n');
        for statement in role_statements(role) {
            out.push_str(&statement);
            out.push('\n');
        }
    }
    out
}
