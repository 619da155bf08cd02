pub mod compose;
pub mod env;
pub mod error;
pub mod plan;

pub use compose::*;
pub use env::*;
pub use error::*;
pub use plan::*;
