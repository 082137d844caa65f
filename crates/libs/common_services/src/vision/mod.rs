mod blur;
mod curator;
mod detector;
mod embedding;
mod error;
pub(crate) mod pipeline;

pub use blur::*;
pub use curator::*;
pub use detector::*;
pub use embedding::*;
pub use error::*;
pub use pipeline::*;
