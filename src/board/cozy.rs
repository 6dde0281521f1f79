use cozy_chess::{Board as CozyBoard, Color, File, GameStatus, Move, Piece, Square};

use crate::oracle::OracleError;

/// A legal move in board-agnostic form. Castling is the king's two-square step
/// (`e1g1`), not cozy-chess's king-takes-rook encoding.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct SquareMove {
    pub from: Square,
    pub to: Square,
    pub promotion: Option<Piece>,
}

impl std::fmt::Display for SquareMove {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}{}", self.from, self.to)?;
        if let Some(p) = self.promotion { write!(f, "{}", promotion_char(p))?; }
        Ok(())
    }
}

fn promotion_char(p: Piece) -> char {
    match p { Piece::Knight => 'n', Piece::Bishop => 'b', Piece::Rook => 'r', _ => 'q' }
}

/// Immutable-by-convention position: every move yields a new value.
#[derive(Clone, Debug)]
pub struct Position {
    board: CozyBoard,
}

impl Position {
    pub fn startpos() -> Self {
        Self { board: CozyBoard::default() }
    }

    pub fn from_fen(fen: &str) -> Result<Self, OracleError> {
        CozyBoard::from_fen(fen, false).map(|b| Self { board: b }).map_err(|e| OracleError::Fen(format!("{e:?}")))
    }

    pub fn fen(&self) -> String { format!("{}", self.board) }

    pub fn side_to_move(&self) -> Color { self.board.side_to_move() }

    pub fn piece_on(&self, sq: Square) -> Option<Piece> { self.board.piece_on(sq) }

    pub fn color_on(&self, sq: Square) -> Option<Color> { self.board.color_on(sq) }

    pub fn is_check(&self) -> bool { !self.board.checkers().is_empty() }

    pub fn is_checkmate(&self) -> bool { self.board.status() == GameStatus::Won }

    pub fn legal_moves(&self) -> Vec<SquareMove> {
        let mut out = Vec::new();
        self.board.generate_moves(|moves| {
            for m in moves { out.push(self.outward(m)); }
            false
        });
        out
    }

    pub fn is_legal(&self, from: Square, to: Square, promotion: Option<Piece>) -> bool {
        self.resolve(from, to, promotion).is_some()
    }

    /// Plays `from -> to` and returns the resulting position. A missing
    /// promotion piece defaults to a queen.
    pub fn play(&self, from: Square, to: Square, promotion: Option<Piece>) -> Result<Self, OracleError> {
        let mv = self.resolve(from, to, promotion).ok_or(OracleError::IllegalMove { from, to })?;
        let mut board = self.board.clone();
        board.play_unchecked(mv);
        Ok(Self { board })
    }

    /// Replays coordinate moves (`e2e4`, `e7e8q`, castling as `e1g1`) from the start position.
    pub fn from_uci_moves<S: AsRef<str>>(moves: &[S]) -> Result<Self, OracleError> {
        let mut pos = Self::startpos();
        for m in moves {
            let (from, to, promotion) = parse_coordinate_move(m.as_ref())
                .ok_or_else(|| OracleError::Notation(m.as_ref().to_string()))?;
            pos = pos.play(from, to, promotion)?;
        }
        Ok(pos)
    }

    fn resolve(&self, from: Square, to: Square, promotion: Option<Piece>) -> Option<Move> {
        let wanted = promotion.or(Some(Piece::Queen));
        let mut found = None;
        self.board.generate_moves(|moves| {
            if moves.from != from { return false; }
            for m in moves {
                if self.outward(m).to == to && (m.promotion.is_none() || m.promotion == wanted) {
                    found = Some(m);
                    break;
                }
            }
            found.is_some()
        });
        found
    }

    fn outward(&self, mv: Move) -> SquareMove {
        let castles = self.board.piece_on(mv.from) == Some(Piece::King)
            && self.board.color_on(mv.to) == Some(self.board.side_to_move());
        let to = if castles {
            let file = if (mv.to.file() as u8) > (mv.from.file() as u8) { File::G } else { File::C };
            Square::new(file, mv.from.rank())
        } else {
            mv.to
        };
        SquareMove { from: mv.from, to, promotion: mv.promotion }
    }
}

pub(crate) fn parse_coordinate_move(s: &str) -> Option<(Square, Square, Option<Piece>)> {
    if !s.is_ascii() || !(4..=5).contains(&s.len()) { return None; }
    let from: Square = s[0..2].parse().ok()?;
    let to: Square = s[2..4].parse().ok()?;
    let promotion = match s[4..].chars().next() {
        None => None,
        Some('q') => Some(Piece::Queen),
        Some('r') => Some(Piece::Rook),
        Some('b') => Some(Piece::Bishop),
        Some('n') => Some(Piece::Knight),
        Some(_) => return None,
    };
    Some((from, to, promotion))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sq(s: &str) -> Square { s.parse().unwrap() }

    #[test]
    fn startpos_has_twenty_moves() {
        let pos = Position::startpos();
        assert_eq!(pos.legal_moves().len(), 20);
        assert_eq!(pos.side_to_move(), Color::White);
    }

    #[test]
    fn castling_is_exposed_as_king_step() {
        let pos = Position::from_fen("r3k2r/8/8/8/8/8/8/R3K2R w KQkq - 0 1").unwrap();
        let moves = pos.legal_moves();
        assert!(moves.iter().any(|m| m.from == sq("e1") && m.to == sq("g1")));
        assert!(moves.iter().any(|m| m.from == sq("e1") && m.to == sq("c1")));
        let after = pos.play(sq("e1"), sq("g1"), None).unwrap();
        assert_eq!(after.piece_on(sq("g1")), Some(Piece::King));
        assert_eq!(after.piece_on(sq("f1")), Some(Piece::Rook));
    }

    #[test]
    fn promotion_defaults_to_queen() {
        let pos = Position::from_fen("8/4P3/8/8/8/8/k7/4K3 w - - 0 1").unwrap();
        let after = pos.play(sq("e7"), sq("e8"), None).unwrap();
        assert_eq!(after.piece_on(sq("e8")), Some(Piece::Queen));
        let under = pos.play(sq("e7"), sq("e8"), Some(Piece::Knight)).unwrap();
        assert_eq!(under.piece_on(sq("e8")), Some(Piece::Knight));
    }

    #[test]
    fn play_leaves_original_untouched() {
        let pos = Position::startpos();
        let fen = pos.fen();
        let next = pos.play(sq("e2"), sq("e4"), None).unwrap();
        assert_eq!(pos.fen(), fen);
        assert_eq!(next.side_to_move(), Color::Black);
        assert!(pos.play(sq("e2"), sq("e5"), None).is_err());
    }
}
