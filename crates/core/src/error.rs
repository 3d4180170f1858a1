use thiserror::Error;

#[derive(Debug, Error)]
pub enum DatasetError {
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("record {index} is missing required field `{field}`")]
    MissingField { index: usize, field: &'static str },

    #[error("invalid argument: {0}")]
    InvalidArgument(String),
}

#[derive(Debug, Error)]
pub enum PipelineError {
    #[error("regex error: {0}")]
    RegexError(#[from] regex::Error),

    #[error("invalid lexicon: {0}")]
    InvalidLexicon(String),

    #[error("invalid pipeline options: {0}")]
    InvalidOptions(String),

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    #[error("serialize error: {0}")]
    Serialization(#[from] serde_json::Error),
}
