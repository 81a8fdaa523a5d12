//! glift compiler: lifts checked-pointer kernels into guarded dataflow
//! graphs and drives the differential harness that cross-checks the lift
//! against direct execution.

pub mod config;
pub mod hoist;
pub mod lift;

pub use config::{ConfigFile, DriverConfig, OUT_DIR_ENV};
pub use hoist::{HoistCache, is_linear_guarded_chain};
pub use lift::{GraphBuilder, lift};
