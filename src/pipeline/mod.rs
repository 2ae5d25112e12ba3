pub mod leg;

pub use leg::*;
