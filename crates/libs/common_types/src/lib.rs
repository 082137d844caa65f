#![allow(
    clippy::missing_errors_doc,
    clippy::missing_panics_doc,
    clippy::struct_excessive_bools
)]

mod detection;
mod filter;
mod status;

pub use detection::*;
pub use filter::*;
pub use status::*;
