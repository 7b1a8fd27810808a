//! Director API models

pub mod deployment;
pub mod instance;
pub mod task;
