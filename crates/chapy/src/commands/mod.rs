pub mod environment;
pub mod graph;
pub mod list;
pub mod run;
pub mod skeleton;
pub mod stages;
pub mod topology;
