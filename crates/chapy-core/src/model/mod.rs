//! データモデル

mod options;
mod plan;

pub use options::*;
pub use plan::*;
