pub mod common;
pub mod plugins;

pub use common::*;
pub use plugins::*;
