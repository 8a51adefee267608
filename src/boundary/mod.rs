mod feature;
mod loader;
mod store;

pub use feature::*;
pub use loader::*;
pub use store::*;
