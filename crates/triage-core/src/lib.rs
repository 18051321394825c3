pub mod classifier;
pub mod config;
pub mod context;
pub mod error;
pub mod flags;
pub mod planner;
pub mod render;
pub mod rules;
pub mod submit;
pub mod template;
pub mod types;

pub use error::{Result, TriageError};
