#![doc = include_str!("../README.md")]

pub mod checks;
pub mod client;
pub mod scenario;

pub(crate) mod executor;
pub(crate) mod scheduler;

mod error;

pub use error::{Error, NetworkError};
pub use scenario::{login_scenario, LoadTest, StopHandle};

pub use stampede_core as core;

pub mod prelude {
    pub use crate::scenario::{login_scenario, LoadTest, StopHandle};
    pub use stampede_core::{
        default_stages, default_thresholds, RunConfig, RunReport, Stage, Threshold,
    };
}
