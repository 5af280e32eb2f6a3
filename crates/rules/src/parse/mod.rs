//! Normalisation of heterogeneous date and duration cells.

mod date;
mod duration;

pub use date::{extract_date, parse_simple_date};
pub use duration::parse_duration;
