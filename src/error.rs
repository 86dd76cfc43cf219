use thiserror::Error;

/// User-facing errors. The formatting pipeline itself never fails; these
/// come from configuration, file access and the safety check.
#[derive(Error, Debug)]
pub enum SqlbenchError {
    #[error("sqlbench config error: {0}")]
    Config(String),

    #[error("sqlbench equivalence error: {0}")]
    Equivalence(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("TOML parse error: {0}")]
    Toml(#[from] toml::de::Error),
}

pub type Result<T> = std::result::Result<T, SqlbenchError>;
