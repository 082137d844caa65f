pub mod browse;
pub mod candidate;
pub mod operator;
pub mod photo;

pub use browse::*;
pub use candidate::*;
pub use operator::*;
pub use photo::*;
