use thiserror::Error;

#[derive(Error, Debug)]
pub enum ConvertError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("failed to decode page image: {0}")]
    ImageDecode(String),

    #[error("failed to load overlay font: {0}")]
    Font(String),

    #[error("failed to build output document: {0}")]
    Artifact(String),
}

pub type Result<T> = std::result::Result<T, ConvertError>;
