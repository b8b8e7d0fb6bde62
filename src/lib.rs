pub mod clients;
pub mod config;
pub mod error;
pub mod pipeline;
pub mod report;
pub mod types;

#[cfg(test)]
pub(crate) mod testing;

pub use error::{AppError, Result};
