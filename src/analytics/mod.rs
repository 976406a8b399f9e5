//! Text metrics computed for each collected record

pub mod text;

pub use text::{contains_money, count_occurrences};
