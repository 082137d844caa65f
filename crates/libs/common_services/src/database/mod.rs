mod error;
mod init;
mod stores;
mod tables;

pub use error::*;
pub use init::*;
pub use stores::*;
pub use tables::*;
