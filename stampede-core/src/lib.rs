mod config;
mod constants;
mod metrics;
mod report;
mod thresholds;

pub use config::*;
pub use constants::*;
pub use metrics::*;
pub use report::*;
pub use thresholds::*;
