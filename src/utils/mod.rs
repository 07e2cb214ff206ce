//! Utility modules shared by the pipeline stages.

pub mod date;
pub mod exec;
pub mod git;
