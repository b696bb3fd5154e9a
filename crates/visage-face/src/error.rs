use thiserror::Error;

/// Errors from loading models, decoding images or running inference.
#[derive(Debug, Error)]
pub enum FaceError {
    #[error("model error: {0}")]
    Model(String),

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    #[error("image error: {0}")]
    Image(#[from] image::ImageError),

    #[error("ort error: {0}")]
    Ort(#[from] ort::OrtError),

    #[error("invalid descriptor: {0}")]
    Descriptor(#[from] DescriptorError),
}

/// Reasons a descriptor string or vector is rejected.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DescriptorError {
    #[error("expected {expected} values, got {actual}")]
    Length { expected: usize, actual: usize },

    #[error("value {index} is not a number: {value:?}")]
    NotANumber { index: usize, value: String },

    #[error("value {index} is not finite")]
    NotFinite { index: usize },
}
