pub mod artifacts;
pub mod association;
pub mod catalog;
pub mod config;
pub mod dispatch;
pub mod images;

pub use config::{load_config, Config};
pub use dispatch::{run, RunSummary};
