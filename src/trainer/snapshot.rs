use std::collections::BTreeMap;

use serde::Serialize;

use crate::catalog::Side;
use crate::compiler::CompiledMove;

use super::session::Status;

/// Read-only projection of a session for presentation code.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Snapshot {
    pub opening_id: String,
    pub opening_name: String,
    pub fen: String,
    pub learner_side: Side,
    pub side_to_move: Side,
    /// Origin square to reachable squares. Empty unless the learner may move.
    pub legal_destinations: BTreeMap<String, Vec<String>>,
    pub last_move: Option<(String, String)>,
    pub status: Status,
    pub message: String,
    pub progress: usize,
    pub sequence_length: usize,
    pub mistakes: u32,
    pub awaiting_reply: bool,
    pub turns: Vec<TurnRow>,
}

/// One numbered row of the move list, `1. e4 e5`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TurnRow {
    pub number: usize,
    pub white: String,
    pub black: Option<String>,
}

/// Pairs the first `progress` moves into numbered White/Black rows.
pub fn turns(sequence: &[CompiledMove], progress: usize) -> Vec<TurnRow> {
    sequence[..progress.min(sequence.len())]
        .chunks(2)
        .map(|pair| TurnRow {
            number: pair[0].move_number(),
            white: pair[0].algebraic.clone(),
            black: pair.get(1).map(|m| m.algebraic.clone()),
        })
        .collect()
}
