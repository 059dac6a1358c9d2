pub mod config;
pub mod credentials;
pub mod error;
pub mod fill;
pub mod retry;
pub mod schedule;

pub use error::{Error, Result};
