// Wire models for the overlay push channel

mod metrics;
mod storage;

pub use metrics::*;
pub use storage::*;
