pub mod config;
pub mod error;
pub mod record;

pub use config::{Config, FieldAliases};
pub use error::*;
pub use record::*;
