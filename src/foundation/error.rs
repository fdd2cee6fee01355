pub type StoryResult<T> = Result<T, StoryError>;

#[derive(thiserror::Error, Debug)]
pub enum StoryError {
    #[error("validation error: {0}")]
    Validation(String),

    #[error("config error: {0}")]
    Config(String),

    #[error("content source unavailable: {0}")]
    SourceUnavailable(String),

    #[error("narration failed: {0}")]
    SynthesisFailure(String),

    #[error("composition failed: {0}")]
    CompositionFailure(String),

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl StoryError {
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }

    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config(msg.into())
    }

    pub fn source_unavailable(msg: impl Into<String>) -> Self {
        Self::SourceUnavailable(msg.into())
    }

    pub fn synthesis(msg: impl Into<String>) -> Self {
        Self::SynthesisFailure(msg.into())
    }

    pub fn composition(msg: impl Into<String>) -> Self {
        Self::CompositionFailure(msg.into())
    }

    /// Re-tag any error raised while composing as a composition failure.
    ///
    /// Validation and composition errors pass through untouched so the original category survives.
    pub fn into_composition(self) -> Self {
        match self {
            Self::Validation(_) | Self::CompositionFailure(_) => self,
            other => Self::CompositionFailure(other.to_string()),
        }
    }
}

#[cfg(test)]
#[path = "../../tests/unit/foundation/error.rs"]
mod tests;
