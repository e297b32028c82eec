pub mod api;
pub mod config;
pub mod core;
pub mod report;
pub mod sim;
