//! Shared state and data types used across the pipeline

pub mod config;
pub mod gate;
pub mod ledger;
pub mod models;
