//! Configuration and the transient data passed between poll stages

pub mod config;
pub mod models;
