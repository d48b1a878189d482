use std::path::PathBuf;

use thiserror::Error;

#[derive(Error, Debug)]
pub enum AppError {
    #[error("error from backend: {0}")]
    Backend(String),

    #[error("render service reported: {0}")]
    Service(String),

    #[error("generated file not found at {0}")]
    MissingOutput(PathBuf),

    #[error("video error: {0}")]
    Video(String),

    #[error(transparent)]
    Http(#[from] reqwest::Error),

    #[error(transparent)]
    Image(#[from] image::ImageError),
}

impl AppError {
    pub fn video(msg: impl Into<String>) -> Self {
        Self::Video(msg.into())
    }
}
