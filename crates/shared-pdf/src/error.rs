use thiserror::Error;

#[derive(Error, Debug)]
pub enum DecodeError {
    #[error("Failed to parse PDF: {0}")]
    ParseError(String),

    #[error("PDF has no pages")]
    NoPages,

    #[error("No text could be extracted: {0}")]
    NoText(String),
}

impl From<DecodeError> for shared_types::AccessError {
    fn from(err: DecodeError) -> Self {
        shared_types::AccessError::Decode(err.to_string())
    }
}
