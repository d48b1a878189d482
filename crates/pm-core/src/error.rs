use thiserror::Error;

pub type Result<T> = std::result::Result<T, MorphError>;

#[derive(Error, Debug)]
pub enum MorphError {
    #[error("keyframe error: {0}")]
    Keyframe(String),

    #[error("prompt error: {0}")]
    Prompt(String),

    #[error("plan error: {0}")]
    Plan(String),
}

impl MorphError {
    pub fn keyframe(msg: impl Into<String>) -> Self {
        Self::Keyframe(msg.into())
    }

    pub fn prompt(msg: impl Into<String>) -> Self {
        Self::Prompt(msg.into())
    }

    pub fn plan(msg: impl Into<String>) -> Self {
        Self::Plan(msg.into())
    }
}
