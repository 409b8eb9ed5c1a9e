pub mod args;
pub mod commands;
mod config;
mod db;
mod error;
mod mcp;
pub mod model;
mod utils;

pub use config::Config;
pub use error::{error_type, Error, ErrorType, Result};
