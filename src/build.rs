pub mod aggregate;
mod builder;
pub mod markdown;
pub mod matter;
pub mod paths;
pub mod render;
pub mod unit;

pub use builder::{BuildError, BuildReport, Builder};
