mod controller;
mod crossfade;
mod plugin;

pub use controller::*;
pub use crossfade::*;
pub use plugin::*;
