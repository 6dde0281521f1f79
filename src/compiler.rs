//! Compiles an opening's movetext into the scripted line the trainer follows.

use cozy_chess::{Color, Piece, Square};
use log::warn;

use crate::oracle::{OracleError, PositionOracle};

/// One scripted half-move. Index 0 is White's first move.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CompiledMove {
    pub index: usize,
    pub from: Square,
    pub to: Square,
    pub promotion: Option<Piece>,
    pub algebraic: String,
}

impl CompiledMove {
    pub fn side(&self) -> Color {
        if self.index % 2 == 0 { Color::White } else { Color::Black }
    }

    /// Full-move number as printed in movetext.
    pub fn move_number(&self) -> usize { self.index / 2 + 1 }
}

pub fn try_compile<O: PositionOracle>(oracle: &O, text: &str) -> Result<Vec<CompiledMove>, OracleError> {
    let parsed = oracle.parse_move_text(text)?;
    Ok(parsed
        .into_iter()
        .enumerate()
        .map(|(index, p)| CompiledMove { index, from: p.from, to: p.to, promotion: p.promotion, algebraic: p.algebraic })
        .collect())
}

/// Like [`try_compile`], but unreadable content yields an empty line.
pub fn compile<O: PositionOracle>(oracle: &O, text: &str) -> Vec<CompiledMove> {
    match try_compile(oracle, text) {
        Ok(seq) => seq,
        Err(e) => {
            warn!("movetext {:?} did not compile: {}", text, e);
            Vec::new()
        }
    }
}

/// Plays a compiled line from the start position and returns where it ends.
pub fn replay<O: PositionOracle>(oracle: &O, sequence: &[CompiledMove]) -> Result<O::Position, OracleError> {
    sequence
        .iter()
        .try_fold(oracle.start_position(), |pos, m| oracle.apply_move(&pos, m.from, m.to, m.promotion))
}
