use thiserror::Error;

#[derive(Error, Debug)]
pub enum MetadataError {
    /// Neither a PNG nor a JPEG signature
    #[error("Unsupported format: {0}")]
    UnsupportedFormat(String),

    #[error("Image processing error: {0}")]
    ImageError(String),
}

pub type Result<T> = std::result::Result<T, MetadataError>;
