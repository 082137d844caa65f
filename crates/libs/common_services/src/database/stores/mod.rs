pub mod candidate_store;
pub mod history_store;
pub mod list_store;
pub mod operator_store;
pub mod photo_store;
pub mod queue_store;

pub use candidate_store::*;
pub use history_store::*;
pub use list_store::*;
pub use operator_store::*;
pub use photo_store::*;
pub use queue_store::*;
