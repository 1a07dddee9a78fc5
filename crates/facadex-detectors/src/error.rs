use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    #[error("Failed to read knowledge base: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to parse knowledge base: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("Invalid domain for entity '{entity}': {source}")]
    Domain {
        entity: String,
        #[source]
        source: facadex_core::Error,
    },

    #[error("Pattern matching error: {0}")]
    Pattern(String),

    #[error("Invalid data: {0}")]
    InvalidData(String),
}

pub type Result<T> = std::result::Result<T, Error>;
