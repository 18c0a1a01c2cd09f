use thiserror::Error;

/// One failing field from a schema validation pass.
#[derive(Debug, Clone, PartialEq, serde::Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Violation {
    /// JSON pointer to the offending value ("/" for the document root).
    pub path: String,
    pub message: String,
}

/// Every violation found in a single validation pass, never just the first.
#[derive(Debug, Clone, PartialEq, serde::Serialize)]
pub struct ValidationError {
    pub violations: Vec<Violation>,
}

impl ValidationError {
    pub fn single(path: &str, message: impl Into<String>) -> Self {
        Self {
            violations: vec![Violation { path: path.to_string(), message: message.into() }],
        }
    }

    /// True when any violation's path or message names the given field.
    pub fn mentions(&self, field: &str) -> bool {
        self.violations
            .iter()
            .any(|v| v.path.contains(field) || v.message.contains(field))
    }
}

impl std::fmt::Display for ValidationError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let joined = self
            .violations
            .iter()
            .map(|v| format!("{}: {}", v.path, v.message))
            .collect::<Vec<_>>()
            .join("; ");
        write!(f, "{joined}")
    }
}

impl std::error::Error for ValidationError {}

#[derive(Debug, Error)]
pub enum FlowError {
    #[error("invalid input: {0}")]
    InvalidInput(ValidationError),
    #[error("model output is not valid JSON: {reason}")]
    MalformedOutput { reason: String, raw: String },
    #[error("model output does not match the flow schema: {0}")]
    SchemaMismatch(ValidationError),
    #[error("model provider unavailable: {0}")]
    ProviderUnavailable(String),
    #[error("tool '{tool}' failed: {reason}")]
    ToolFailure { tool: String, reason: String },
    #[error("unknown flow '{0}'")]
    UnknownFlow(String),
    #[error("flow cancelled by caller")]
    Cancelled,
}

impl serde::Serialize for FlowError {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_string())
    }
}

impl From<reqwest::Error> for FlowError {
    fn from(e: reqwest::Error) -> Self {
        FlowError::ProviderUnavailable(e.to_string())
    }
}

pub type FlowResult<T> = Result<T, FlowError>;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum SessionError {
    #[error("invalid session transition from {from} to {to}")]
    InvalidTransition { from: String, to: String },
    #[error("participants can only be managed in a team session")]
    NotTeamSession,
    #[error("team session is full ({capacity} participants)")]
    TeamFull { capacity: usize },
    #[error("participant '{0}' already joined")]
    AlreadyJoined(String),
    #[error("participant '{0}' is not in this session")]
    UnknownParticipant(String),
}

impl serde::Serialize for SessionError {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_string())
    }
}
