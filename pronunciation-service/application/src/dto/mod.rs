mod analyze_pronunciation;
mod health;

pub use analyze_pronunciation::*;
pub use health::*;
