//! Data models

pub mod package;
pub mod overview;

pub use package::*;
pub use overview::*;
