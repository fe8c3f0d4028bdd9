//! Data models.

pub mod config;
pub mod record;

pub use config::W2Config;
pub use record::{FieldName, W2Record};
