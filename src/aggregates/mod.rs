mod client;
mod worker;

pub use client::*;
pub use worker::*;
