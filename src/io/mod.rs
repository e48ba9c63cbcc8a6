pub mod config;
pub mod error;
pub mod loader;
pub mod resolver;
pub mod writer;
