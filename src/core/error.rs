use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorCode {
    ValidationInvalidArgument,
    ValidationInvalidPattern,

    SetupTargetInvalid,
    SetupManifestMissing,
    SetupAlreadyConfigured,

    PromptAnswerMissing,
    PromptAnswerInvalid,
    PromptNotInteractive,

    ProcessCommandFailed,

    GitCommandFailed,
    GithubCreateFailed,

    InternalIoError,
    InternalJsonError,
    InternalUnexpected,
}

impl ErrorCode {
    pub fn as_str(&self) -> &'static str {
        match self {
            ErrorCode::ValidationInvalidArgument => "validation.invalid_argument",
            ErrorCode::ValidationInvalidPattern => "validation.invalid_pattern",

            ErrorCode::SetupTargetInvalid => "setup.target_invalid",
            ErrorCode::SetupManifestMissing => "setup.manifest_missing",
            ErrorCode::SetupAlreadyConfigured => "setup.already_configured",

            ErrorCode::PromptAnswerMissing => "prompt.answer_missing",
            ErrorCode::PromptAnswerInvalid => "prompt.answer_invalid",
            ErrorCode::PromptNotInteractive => "prompt.not_interactive",

            ErrorCode::ProcessCommandFailed => "process.command_failed",

            ErrorCode::GitCommandFailed => "git.command_failed",
            ErrorCode::GithubCreateFailed => "github.create_failed",

            ErrorCode::InternalIoError => "internal.io_error",
            ErrorCode::InternalJsonError => "internal.json_error",
            ErrorCode::InternalUnexpected => "internal.unexpected",
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Hint {
    pub message: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct InvalidArgumentDetails {
    pub field: String,
    pub problem: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct InvalidPatternDetails {
    pub pattern: String,
    pub error: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AnswerDetails {
    pub key: String,
    pub question: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub answer: Option<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub allowed: Vec<String>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CommandFailedDetails {
    pub command: String,
    pub exit_code: i32,
    pub stdout: String,
    pub stderr: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GithubCreateFailedDetails {
    pub repository: String,
    pub status: u16,
    pub body: String,
}

#[derive(Debug, Clone)]
pub struct Error {
    pub code: ErrorCode,
    pub message: String,
    pub details: Value,
    pub hints: Vec<Hint>,
    pub retryable: Option<bool>,
}

pub type Result<T> = std::result::Result<T, Error>;

impl std::fmt::Display for Error {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.message)
    }
}

impl std::error::Error for Error {}

impl Error {
    pub fn new(code: ErrorCode, message: impl Into<String>, details: Value) -> Self {
        Self {
            code,
            message: message.into(),
            details,
            hints: Vec::new(),
            retryable: None,
        }
    }

    pub fn with_hint(mut self, message: impl Into<String>) -> Self {
        self.hints.push(Hint {
            message: message.into(),
        });
        self
    }

    pub fn with_retryable(mut self, retryable: bool) -> Self {
        self.retryable = Some(retryable);
        self
    }

    pub fn validation_invalid_argument(
        field: impl Into<String>,
        problem: impl Into<String>,
    ) -> Self {
        let field = field.into();
        let problem = problem.into();
        Self::new(
            ErrorCode::ValidationInvalidArgument,
            format!("Invalid {}: {}", field, problem),
            to_details(InvalidArgumentDetails { field, problem }),
        )
    }

    pub fn validation_invalid_pattern(pattern: impl Into<String>, error: impl Into<String>) -> Self {
        let pattern = pattern.into();
        let error = error.into();
        Self::new(
            ErrorCode::ValidationInvalidPattern,
            format!("Invalid pattern '{}': {}", pattern, error),
            to_details(InvalidPatternDetails { pattern, error }),
        )
    }

    pub fn setup_target_invalid(path: impl Into<String>, problem: impl Into<String>) -> Self {
        let path = path.into();
        Self::new(
            ErrorCode::SetupTargetInvalid,
            format!("Invalid target '{}': {}", path, problem.into()),
            json!({ "path": path }),
        )
    }

    pub fn setup_manifest_missing(path: impl Into<String>) -> Self {
        let path = path.into();
        Self::new(
            ErrorCode::SetupManifestMissing,
            format!("No Gemfile found at {}", path),
            json!({ "path": path }),
        )
        .with_hint("The target must be a freshly generated Rails skeleton")
    }

    pub fn setup_already_configured(stamp_path: impl Into<String>) -> Self {
        let stamp_path = stamp_path.into();
        Self::new(
            ErrorCode::SetupAlreadyConfigured,
            "Target has already been configured by groundwork",
            json!({ "stampPath": stamp_path }),
        )
        .with_hint("Re-running duplicates patches and dependency lines; pass --force to run anyway")
    }

    pub fn prompt_answer_missing(key: impl Into<String>, question: impl Into<String>) -> Self {
        let key = key.into();
        Self::new(
            ErrorCode::PromptAnswerMissing,
            format!("No scripted answer for '{}'", key),
            to_details(AnswerDetails {
                key,
                question: question.into(),
                answer: None,
                allowed: Vec::new(),
            }),
        )
    }

    pub fn prompt_answer_invalid(
        key: impl Into<String>,
        question: impl Into<String>,
        answer: impl Into<String>,
        allowed: &[&str],
    ) -> Self {
        let key = key.into();
        let answer = answer.into();
        Self::new(
            ErrorCode::PromptAnswerInvalid,
            format!("Scripted answer '{}' for '{}' is not allowed", answer, key),
            to_details(AnswerDetails {
                key,
                question: question.into(),
                answer: Some(answer),
                allowed: allowed.iter().map(|s| s.to_string()).collect(),
            }),
        )
    }

    pub fn prompt_not_interactive() -> Self {
        Self::new(
            ErrorCode::PromptNotInteractive,
            "Interactive prompts require a TTY",
            Value::Null,
        )
        .with_hint("Pass --answers <file> to run non-interactively")
    }

    pub fn process_command_failed(details: CommandFailedDetails) -> Self {
        let message = format!(
            "Command failed with exit code {}: {}",
            details.exit_code, details.command
        );
        Self::new(ErrorCode::ProcessCommandFailed, message, to_details(details))
    }

    pub fn git_command_failed(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::GitCommandFailed, message, Value::Null)
    }

    pub fn github_create_failed(details: GithubCreateFailedDetails) -> Self {
        let message = format!(
            "GitHub repository creation failed: HTTP {}",
            details.status
        );
        Self::new(ErrorCode::GithubCreateFailed, message, to_details(details))
    }

    pub fn internal_io(message: impl Into<String>, operation: Option<String>) -> Self {
        Self::new(
            ErrorCode::InternalIoError,
            message,
            match operation {
                Some(op) => json!({ "operation": op }),
                None => Value::Null,
            },
        )
    }

    pub fn internal_json(message: impl Into<String>, operation: Option<String>) -> Self {
        Self::new(
            ErrorCode::InternalJsonError,
            message,
            match operation {
                Some(op) => json!({ "operation": op }),
                None => Value::Null,
            },
        )
    }

    pub fn internal_unexpected(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::InternalUnexpected, message, Value::Null)
    }
}

fn to_details<T: Serialize>(details: T) -> Value {
    serde_json::to_value(details).unwrap_or(Value::Null)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn codes_are_dotted_strings() {
        assert_eq!(
            ErrorCode::SetupAlreadyConfigured.as_str(),
            "setup.already_configured"
        );
        assert_eq!(
            ErrorCode::ProcessCommandFailed.as_str(),
            "process.command_failed"
        );
    }

    #[test]
    fn command_failed_carries_output_in_details() {
        let err = Error::process_command_failed(CommandFailedDetails {
            command: "bundle install".to_string(),
            exit_code: 127,
            stdout: String::new(),
            stderr: "sh: bundle: not found".to_string(),
        });
        assert_eq!(err.code, ErrorCode::ProcessCommandFailed);
        assert_eq!(err.details["exitCode"], 127);
        assert_eq!(err.details["stderr"], "sh: bundle: not found");
    }

    #[test]
    fn hints_accumulate() {
        let err = Error::setup_already_configured("/tmp/app/.groundwork.json");
        assert_eq!(err.hints.len(), 1);
    }
}
