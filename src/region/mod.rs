mod classifier;
mod overrides;
mod theme;

pub use classifier::*;
pub use overrides::*;
pub use theme::*;
