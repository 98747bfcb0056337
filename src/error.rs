use thiserror::Error;

pub type Result<T, E = Error> = std::result::Result<T, E>;

#[derive(Debug, Error)]
pub enum Error {
    #[error("no input image")]
    MissingInput,
    #[error("unknown parameter index {0}")]
    UnknownParameter(u32),
    #[error("{name} must be a number in [0, 1], got {value}")]
    ParameterOutOfRange { name: &'static str, value: f32 },
    #[error("image has no pixels ({width}x{height})")]
    EmptyImage { width: u32, height: u32 },
    #[error("image error: {0}")]
    Image(#[from] image::ImageError),
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
    #[error("invalid config: {0}")]
    Config(#[from] serde_json::Error),
}
