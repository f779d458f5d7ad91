/// Convenience result type used across storycard.
pub type StoryResult<T> = Result<T, StoryError>;

/// Top-level error taxonomy used by editor, export, and platform-boundary APIs.
///
/// Pure functions (geometry, sizing, placement) never produce these; only operations that cross
/// an IO or platform boundary can fail.
#[derive(thiserror::Error, Debug)]
pub enum StoryError {
    /// Invalid caller-provided data (bad config, unknown template, malformed uri).
    #[error("validation error: {0}")]
    Validation(String),

    /// Capability unavailable: wrong platform, missing native tool, sharing unsupported.
    #[error("capability unavailable: {0}")]
    Capability(String),

    /// Input could not be read: permission denied, decode failure. The user may retry.
    #[error("input error: {0}")]
    Input(String),

    /// Failure inside the export flow.
    #[error("export error: {0}")]
    Export(String),

    /// Errors when serializing or deserializing data structures.
    #[error("serialization error: {0}")]
    Serde(String),

    /// The operation finished after its result stopped being wanted.
    #[error("cancelled: {0}")]
    Cancelled(String),

    /// Wrapped lower-level error from dependencies or IO.
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl StoryError {
    /// Build a [`StoryError::Validation`] value.
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }

    /// Build a [`StoryError::Capability`] value.
    pub fn capability(msg: impl Into<String>) -> Self {
        Self::Capability(msg.into())
    }

    /// Build a [`StoryError::Input`] value.
    pub fn input(msg: impl Into<String>) -> Self {
        Self::Input(msg.into())
    }

    /// Build a [`StoryError::Export`] value.
    pub fn export(msg: impl Into<String>) -> Self {
        Self::Export(msg.into())
    }

    /// Build a [`StoryError::Serde`] value.
    pub fn serde(msg: impl Into<String>) -> Self {
        Self::Serde(msg.into())
    }

    /// Build a [`StoryError::Cancelled`] value.
    pub fn cancelled(msg: impl Into<String>) -> Self {
        Self::Cancelled(msg.into())
    }

    /// Plain message suitable for showing to the person using the editor.
    pub fn user_message(&self) -> String {
        match self {
            Self::Capability(msg) => format!("Not available on this device: {msg}"),
            Self::Input(msg) => format!("Couldn't open that media: {msg}. Please try again."),
            Self::Export(msg) => format!("Export failed: {msg}"),
            Self::Cancelled(_) => "The operation was cancelled.".to_string(),
            Self::Validation(msg) | Self::Serde(msg) => format!("Something went wrong: {msg}"),
            Self::Other(err) => format!("Something went wrong: {err}"),
        }
    }

    /// Whether retrying the same action can reasonably succeed.
    pub fn is_retryable(&self) -> bool {
        matches!(self, Self::Input(_) | Self::Export(_) | Self::Other(_))
    }
}

impl From<serde_json::Error> for StoryError {
    fn from(value: serde_json::Error) -> Self {
        Self::Serde(value.to_string())
    }
}

#[cfg(test)]
#[path = "../../tests/unit/foundation/error.rs"]
mod tests;
