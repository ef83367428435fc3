pub mod chart;
pub mod cli;
pub mod collector;
pub mod dashboard;
pub mod error;
pub mod github;
pub mod models;
pub mod report;
pub mod types;
