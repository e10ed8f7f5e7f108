pub mod cache;
pub mod entity;
pub mod resolution;

pub use cache::*;
pub use entity::*;
pub use resolution::*;
