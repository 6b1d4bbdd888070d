//! Row types for the three pipeline layers

pub mod bronze;
pub mod gold;
pub mod silver;

pub use bronze::*;
pub use gold::*;
pub use silver::*;
