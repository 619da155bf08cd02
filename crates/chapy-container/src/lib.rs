pub mod docker;
pub mod error;
pub mod graph;
pub mod topology;

pub use docker::*;
pub use error::*;
pub use graph::*;
pub use topology::*;
