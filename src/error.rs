use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
    #[error("Invalid config: {0}")]
    InvalidConfig(String),

    #[error("Frame shape mismatch: expected {expected:?}, got {actual:?}")]
    FrameShape {
        expected: (usize, usize, usize),
        actual: (usize, usize, usize),
    },

    #[error("Unknown source: {0}")]
    UnknownSource(String),

    #[error("Parse Error: {0}")]
    Parse(String),

    #[error("OpenCV Error: {0}")]
    OpenCv(#[from] opencv::Error),

    #[error("Shape Error: {0}")]
    Shape(#[from] ndarray::ShapeError),

    #[error("Json Error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Io Error: {0}")]
    Io(#[from] std::io::Error),
}
