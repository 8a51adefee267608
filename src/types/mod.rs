mod aggregate;
mod geo_point;

pub use aggregate::*;
pub use geo_point::*;
