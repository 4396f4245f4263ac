pub mod album;
pub mod entity;
pub mod id;
pub mod media;
pub mod sort;

pub use album::*;
pub use entity::*;
pub use id::*;
pub use media::*;
pub use sort::*;
