pub type ManimalResult<T> = Result<T, ManimalError>;

#[derive(thiserror::Error, Debug)]
pub enum ManimalError {
    #[error("config error: {0}")]
    Config(String),

    #[error("render error: {0}")]
    Render(String),

    #[error("filesystem error: {0}")]
    Filesystem(String),

    #[error("serialization error: {0}")]
    Serde(String),

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl ManimalError {
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config(msg.into())
    }

    pub fn render(msg: impl Into<String>) -> Self {
        Self::Render(msg.into())
    }

    pub fn filesystem(msg: impl Into<String>) -> Self {
        Self::Filesystem(msg.into())
    }

    pub fn serde(msg: impl Into<String>) -> Self {
        Self::Serde(msg.into())
    }
}
