#[derive(thiserror::Error, Debug, serde::Deserialize, serde::Serialize)]
pub enum Error {
    #[error("Input file not found: {0}")]
    InputNotFound(String),

    #[error("Input file is empty: {0}")]
    EmptyInput(String),

    #[error("Input directory not found: {0}")]
    InputDirNotFound(String),

    #[error("{failed} of {total} documents failed")]
    BatchFailed { failed: usize, total: usize },
}
