use cozy_chess::{Color, Piece, Square};
use thiserror::Error;

use crate::board::san::{self, SanError};
use crate::movetext::{self, MovetextError};

pub use crate::board::{Position, SquareMove};

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum OracleError {
    #[error("illegal move {from}{to}")]
    IllegalMove { from: Square, to: Square },
    #[error("FEN error: {0}")]
    Fen(String),
    #[error("unreadable coordinate move `{0}`")]
    Notation(String),
    #[error(transparent)]
    Movetext(#[from] MovetextError),
    #[error("ply {ply}: {source}")]
    San { ply: usize, source: SanError },
}

/// One move of a parsed movetext, resolved against the running position.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParsedMove {
    pub from: Square,
    pub to: Square,
    pub promotion: Option<Piece>,
    pub algebraic: String,
}

/// Chess rules as consumed by the trainer. The trainer never inspects a
/// position beyond what this trait exposes.
pub trait PositionOracle {
    type Position: Clone + std::fmt::Debug;

    fn start_position(&self) -> Self::Position;
    fn is_legal(&self, pos: &Self::Position, from: Square, to: Square, promotion: Option<Piece>) -> bool;
    fn apply_move(&self, pos: &Self::Position, from: Square, to: Square, promotion: Option<Piece>) -> Result<Self::Position, OracleError>;
    fn legal_moves(&self, pos: &Self::Position) -> Vec<SquareMove>;
    fn side_to_move(&self, pos: &Self::Position) -> Color;
    /// Movetext from the start position to resolved moves with canonical SAN.
    fn parse_move_text(&self, text: &str) -> Result<Vec<ParsedMove>, OracleError>;
    fn fen(&self, pos: &Self::Position) -> String;
}

/// Oracle backed by cozy-chess.
#[derive(Clone, Copy, Debug, Default)]
pub struct CozyOracle;

impl PositionOracle for CozyOracle {
    type Position = Position;

    fn start_position(&self) -> Position { Position::startpos() }

    fn is_legal(&self, pos: &Position, from: Square, to: Square, promotion: Option<Piece>) -> bool {
        pos.is_legal(from, to, promotion)
    }

    fn apply_move(&self, pos: &Position, from: Square, to: Square, promotion: Option<Piece>) -> Result<Position, OracleError> {
        pos.play(from, to, promotion)
    }

    fn legal_moves(&self, pos: &Position) -> Vec<SquareMove> { pos.legal_moves() }

    fn side_to_move(&self, pos: &Position) -> Color { pos.side_to_move() }

    fn parse_move_text(&self, text: &str) -> Result<Vec<ParsedMove>, OracleError> {
        let tokens = movetext::san_tokens(text)?;
        let mut pos = Position::startpos();
        let mut out = Vec::with_capacity(tokens.len());
        for (ply, token) in tokens.iter().enumerate() {
            let mv = san::resolve(&pos, token).map_err(|source| OracleError::San { ply, source })?;
            let algebraic = san::render(&pos, mv);
            pos = pos.play(mv.from, mv.to, mv.promotion)?;
            out.push(ParsedMove { from: mv.from, to: mv.to, promotion: mv.promotion, algebraic });
        }
        Ok(out)
    }

    fn fen(&self, pos: &Position) -> String { pos.fen() }
}
