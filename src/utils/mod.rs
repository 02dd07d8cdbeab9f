pub mod chart;
pub mod config;
pub mod file_ops;
pub mod reporting;
