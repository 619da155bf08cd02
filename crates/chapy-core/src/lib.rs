pub mod engine;
pub mod env;
pub mod error;
pub mod fanout;
pub mod filter;
pub mod host;
pub mod logger;
pub mod model;
pub mod skeleton;
pub mod target;
pub mod template;

pub use engine::*;
pub use env::RuntimeEnvironment;
pub use error::*;
pub use filter::*;
pub use host::LocalHost;
pub use logger::{Logger, MemorySink};
pub use model::*;
pub use skeleton::build_skeleton;
pub use target::*;
pub use template::resolve;
