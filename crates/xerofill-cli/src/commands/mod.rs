pub mod credentials;
pub mod fill;
