mod processor;
mod queue_manager;
mod registry;
mod service;
mod source;

pub use processor::*;
pub use queue_manager::*;
pub use registry::*;
pub use service::*;
pub use source::*;
