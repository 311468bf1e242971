pub mod entity;
pub mod error;
pub mod port;
pub mod scoring;

pub use entity::*;
pub use error::DomainError;
pub use port::*;
pub use scoring::*;
