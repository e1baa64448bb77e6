#[macro_use]
pub mod macros;

pub mod cost;
pub mod energy;
pub mod power;
pub mod rate;
