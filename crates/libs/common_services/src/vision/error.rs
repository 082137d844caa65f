use crate::vision::DetectorError;
use thiserror::Error;

/// Per-photo analysis failures. The pipeline records these on the photo row
/// as `rejected`/`error` instead of propagating them, so one bad photo never
/// aborts the rest of a candidate's batch.
#[derive(Debug, Error)]
pub enum VisionError {
    #[error("photo has no local file")]
    MissingFile,

    #[error("could not read photo file: {0}")]
    Io(#[from] std::io::Error),

    #[error("could not decode image: {0}")]
    Image(#[from] image::ImageError),

    #[error(transparent)]
    Detector(#[from] DetectorError),

    #[error("detector returned a degenerate embedding")]
    DegenerateEmbedding,
}
