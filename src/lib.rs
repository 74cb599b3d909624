pub mod app;
pub mod console;
pub mod env_file;
pub mod exec;
pub mod paths;
pub mod prompt;
pub mod puma_dev;
pub mod ruby_manager;

// Re-export commonly used types
pub use puma_dev::{Options, PumaDev, StepOutcome};
