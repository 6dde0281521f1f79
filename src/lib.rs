// Opening trainer: scripted opening lines, move-by-move checking, auto-played replies
pub mod board;
pub mod catalog;
pub mod compiler;
pub mod movetext;
pub mod oracle;
pub mod terminal;
pub mod trainer;

pub use compiler::{compile, try_compile, CompiledMove};
pub use oracle::{CozyOracle, PositionOracle};
pub use trainer::{MoveOutcome, ReplyOutcome, Snapshot, Status, Trainer, TrainerParams};
