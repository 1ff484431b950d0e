//! GitHub repository creation.
//!
//! One authenticated call against the GitHub API, made with operator
//! supplied credentials. The remote URL the orchestrator wires up is
//! derived from the username and application name, not from the response.

use reqwest::blocking::Client;
use serde::Serialize;

use crate::error::{Error, GithubCreateFailedDetails, Result};

const CREATE_REPO_URL: &str = "https://api.github.com/user/repos";
const USER_AGENT: &str = concat!("groundwork/", env!("CARGO_PKG_VERSION"));

#[derive(Debug, Serialize)]
struct CreateRepoRequest<'a> {
    name: &'a str,
}

/// Create a repository under the authenticated user's account.
///
/// `password` is a personal access token for accounts with 2FA.
pub fn create_repo(username: &str, password: &str, name: &str) -> Result<()> {
    let client = Client::new();

    let response = client
        .post(CREATE_REPO_URL)
        .basic_auth(username, Some(password))
        .header(reqwest::header::USER_AGENT, USER_AGENT)
        .json(&CreateRepoRequest { name })
        .send()
        .map_err(|e| {
            Error::new(
                crate::error::ErrorCode::GithubCreateFailed,
                format!("GitHub request failed: {}", e),
                serde_json::Value::Null,
            )
            .with_retryable(true)
        })?;

    let status = response.status();
    if !status.is_success() {
        let body = response.text().unwrap_or_default();
        return Err(Error::github_create_failed(GithubCreateFailedDetails {
            repository: name.to_string(),
            status: status.as_u16(),
            body,
        }));
    }

    Ok(())
}

/// SSH remote URL for a repository under `username`.
pub fn ssh_remote_url(username: &str, name: &str) -> String {
    format!("git@github.com:{}/{}.git", username, name)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ssh_remote_url_formats_user_and_name() {
        assert_eq!(
            ssh_remote_url("someone", "myapp"),
            "git@github.com:someone/myapp.git"
        );
    }
}
