pub mod config;
pub mod replay;
pub mod resolve;
