pub mod harvest;

pub use harvest::{harvest, HarvestParams};
