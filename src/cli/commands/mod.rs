//! CLI command implementations.

mod cache;
mod config;
mod doctor;
mod extract;
mod generate;
mod serve;
mod style;

pub use cache::run_cache;
pub use config::run_config;
pub use doctor::run_doctor;
pub use extract::run_extract;
pub use generate::{run_generate, GenerateArgs};
pub use serve::run_serve;
pub use style::run_style;
