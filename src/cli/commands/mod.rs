//! CLI command implementations.

mod config;
mod convert;
mod doctor;
mod serve;

pub use config::run_config;
pub use convert::run_convert;
pub use doctor::run_doctor;
pub use serve::{process_job, router, run_serve, secure_filename, AppState};
