pub mod config;
pub mod exchange;
pub mod filter;
pub mod stats;
