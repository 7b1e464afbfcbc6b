pub mod export;
pub mod filter;
pub mod manager;
pub mod session;
