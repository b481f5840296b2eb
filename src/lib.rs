pub mod analysis;
pub mod config;
pub mod error;
pub mod graph;
pub mod oracle;
pub mod order;
pub mod trace;

pub use config::SchedulerConfig;
pub use error::{Error, Result};

#[cfg(test)]
mod test;
