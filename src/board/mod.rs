pub mod cozy;
pub mod san;

pub use cozy::{Position, SquareMove};
