use thiserror::Error;

pub type Result<T> = std::result::Result<T, MarkupError>;

#[derive(Debug, Error)]
pub enum MarkupError {
    #[error("Invalid grid {width}x{height}: {reason}")]
    InvalidGrid {
        width: u32,
        height: u32,
        reason: String,
    },

    #[error("Pixel ({x}, {y}) is outside the {width}x{height} grid")]
    OutOfBounds {
        x: u32,
        y: u32,
        width: u32,
        height: u32,
    },

    #[error("Tolerance {0} is outside 0..=255")]
    InvalidTolerance(i64),

    #[error("Invalid color: {0}")]
    InvalidColor(String),

    #[error("Image error: {0}")]
    Image(#[from] image::ImageError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Config error: {0}")]
    Config(String),

    #[error("Worker error: {0}")]
    Worker(String),
}

impl From<serde_yaml::Error> for MarkupError {
    fn from(e: serde_yaml::Error) -> Self {
        MarkupError::Config(e.to_string())
    }
}
