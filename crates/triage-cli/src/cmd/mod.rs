pub mod classify;
pub mod config;
pub mod new;
pub mod plan;
pub mod run;
