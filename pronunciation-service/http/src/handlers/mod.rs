mod analyze;
mod health;

pub use analyze::*;
pub use health::*;
