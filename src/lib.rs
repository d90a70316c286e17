pub mod cast;
pub mod config;
pub mod receipts;
pub mod runner;
pub mod types;
