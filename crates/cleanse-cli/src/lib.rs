//! CLI library components for the cleansing pipeline.

pub mod commands;
pub mod logging;
