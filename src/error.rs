use std::path::PathBuf;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("failed to read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid corpus json: {0}")]
    Json(#[from] serde_json::Error),

    #[error("corpus contains no usable sentences")]
    EmptyCorpus,

    #[error("prompt must contain at least one character")]
    EmptyPrompt,
}
