//! Core data types for Metron

pub mod day;
pub mod plan;
pub mod tenant;
