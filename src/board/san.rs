//! Standard algebraic notation: parsing tokens against a position and
//! rendering canonical SAN for a legal move.

use std::str::FromStr;

use cozy_chess::{Piece, Square};
use thiserror::Error;

use super::cozy::{Position, SquareMove};

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum SanError {
    #[error("empty move token")]
    Empty,
    #[error("malformed move token `{0}`")]
    Malformed(String),
    #[error("no legal move matches `{0}`")]
    Illegal(String),
    #[error("`{0}` matches more than one legal move")]
    Ambiguous(String),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum San {
    Castle { long: bool },
    Normal {
        piece: Piece,
        file: Option<u8>,
        rank: Option<u8>,
        capture: bool,
        to: Square,
        promotion: Option<Piece>,
    },
}

fn piece_from_letter(c: char) -> Option<Piece> {
    match c {
        'K' => Some(Piece::King),
        'Q' => Some(Piece::Queen),
        'R' => Some(Piece::Rook),
        'B' => Some(Piece::Bishop),
        'N' => Some(Piece::Knight),
        'P' => Some(Piece::Pawn),
        _ => None,
    }
}

fn piece_letter(p: Piece) -> char {
    match p {
        Piece::King => 'K',
        Piece::Queen => 'Q',
        Piece::Rook => 'R',
        Piece::Bishop => 'B',
        Piece::Knight => 'N',
        Piece::Pawn => 'P',
    }
}

fn file_char(sq: Square) -> char { (b'a' + sq.file() as u8) as char }
fn rank_char(sq: Square) -> char { (b'1' + sq.rank() as u8) as char }

impl FromStr for San {
    type Err = SanError;

    fn from_str(token: &str) -> Result<Self, SanError> {
        let body = token.trim_end_matches(|c| matches!(c, '+' | '#' | '!' | '?'));
        if body.is_empty() { return Err(SanError::Empty); }
        match body {
            "O-O" | "0-0" => return Ok(San::Castle { long: false }),
            "O-O-O" | "0-0-0" => return Ok(San::Castle { long: true }),
            _ => {}
        }
        let malformed = || SanError::Malformed(token.to_string());
        if !body.is_ascii() { return Err(malformed()); }

        let (piece, rest) = match body.chars().next().and_then(piece_from_letter) {
            Some(p) => (p, &body[1..]),
            None => (Piece::Pawn, body),
        };
        let (rest, promotion) = match rest.split_once('=') {
            Some((head, promo)) => {
                let mut cs = promo.chars();
                match (cs.next().and_then(piece_from_letter), cs.next()) {
                    (Some(p), None) if !matches!(p, Piece::King | Piece::Pawn) => (head, Some(p)),
                    _ => return Err(malformed()),
                }
            }
            None => match rest.chars().last() {
                Some(c @ ('Q' | 'R' | 'B' | 'N')) if piece == Piece::Pawn => (&rest[..rest.len() - 1], piece_from_letter(c)),
                _ => (rest, None),
            },
        };
        if rest.len() < 2 { return Err(malformed()); }
        let (prefix, dest) = rest.split_at(rest.len() - 2);
        let to: Square = dest.parse().map_err(|_| malformed())?;

        let mut file = None;
        let mut rank = None;
        let mut capture = false;
        for c in prefix.chars() {
            match c {
                'a'..='h' if file.is_none() && rank.is_none() && !capture => file = Some(c as u8 - b'a'),
                '1'..='8' if rank.is_none() && !capture => rank = Some(c as u8 - b'1'),
                'x' if !capture => capture = true,
                _ => return Err(malformed()),
            }
        }
        if piece == Piece::Pawn && capture && file.is_none() { return Err(malformed()); }
        Ok(San::Normal { piece, file, rank, capture, to, promotion })
    }
}

impl San {
    fn matches(&self, pos: &Position, m: &SquareMove) -> bool {
        let moving = pos.piece_on(m.from);
        match *self {
            San::Castle { long } => {
                let df = m.to.file() as i8 - m.from.file() as i8;
                let step = if long { -2 } else { 2 };
                moving == Some(Piece::King) && df == step
            }
            San::Normal { piece, file, rank, to, promotion, .. } => {
                let wanted = if m.promotion.is_some() { promotion.or(Some(Piece::Queen)) } else { promotion };
                moving == Some(piece)
                    && m.to == to
                    && file.map_or(true, |f| m.from.file() as u8 == f)
                    && rank.map_or(true, |r| m.from.rank() as u8 == r)
                    && m.promotion == wanted
            }
        }
    }
}

/// Parses `token` and finds the single legal move it denotes in `pos`.
pub fn resolve(pos: &Position, token: &str) -> Result<SquareMove, SanError> {
    let san: San = token.parse()?;
    let mut hits = pos.legal_moves().into_iter().filter(|m| san.matches(pos, m));
    let first = hits.next().ok_or_else(|| SanError::Illegal(token.to_string()))?;
    if hits.next().is_some() {
        return Err(SanError::Ambiguous(token.to_string()));
    }
    Ok(first)
}

/// Canonical SAN for a legal move: minimal disambiguation, `x` on captures,
/// `=Q` promotions and a `+`/`#` suffix.
pub fn render(pos: &Position, mv: SquareMove) -> String {
    let mut out = String::new();
    let df = mv.to.file() as i8 - mv.from.file() as i8;
    match pos.piece_on(mv.from) {
        Some(Piece::King) if df.abs() == 2 => out.push_str(if df > 0 { "O-O" } else { "O-O-O" }),
        Some(Piece::Pawn) | None => {
            if df != 0 {
                out.push(file_char(mv.from));
                out.push('x');
            }
            out.push_str(&mv.to.to_string());
            if let Some(p) = mv.promotion {
                out.push('=');
                out.push(piece_letter(p));
            }
        }
        Some(piece) => {
            out.push(piece_letter(piece));
            let rivals: Vec<Square> = pos
                .legal_moves()
                .into_iter()
                .filter(|o| o.to == mv.to && o.from != mv.from && pos.piece_on(o.from) == Some(piece))
                .map(|o| o.from)
                .collect();
            if !rivals.is_empty() {
                let shares_file = rivals.iter().any(|s| s.file() == mv.from.file());
                let shares_rank = rivals.iter().any(|s| s.rank() == mv.from.rank());
                if !shares_file {
                    out.push(file_char(mv.from));
                } else if !shares_rank {
                    out.push(rank_char(mv.from));
                } else {
                    out.push(file_char(mv.from));
                    out.push(rank_char(mv.from));
                }
            }
            if pos.color_on(mv.to) == Some(!pos.side_to_move()) { out.push('x'); }
            out.push_str(&mv.to.to_string());
        }
    }
    if let Ok(next) = pos.play(mv.from, mv.to, mv.promotion) {
        if next.is_checkmate() {
            out.push('#');
        } else if next.is_check() {
            out.push('+');
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sq(s: &str) -> Square { s.parse().unwrap() }

    #[test]
    fn parses_common_shapes() {
        assert_eq!("e4".parse::<San>().unwrap(), San::Normal { piece: Piece::Pawn, file: None, rank: None, capture: false, to: sq("e4"), promotion: None });
        assert_eq!("O-O-O+".parse::<San>().unwrap(), San::Castle { long: true });
        match "exd5".parse::<San>().unwrap() {
            San::Normal { piece, file, capture, .. } => {
                assert_eq!(piece, Piece::Pawn);
                assert_eq!(file, Some(4));
                assert!(capture);
            }
            other => panic!("unexpected {other:?}"),
        }
        match "e8=N".parse::<San>().unwrap() {
            San::Normal { promotion, .. } => assert_eq!(promotion, Some(Piece::Knight)),
            other => panic!("unexpected {other:?}"),
        }
        match "R1a3".parse::<San>().unwrap() {
            San::Normal { piece, rank, .. } => { assert_eq!(piece, Piece::Rook); assert_eq!(rank, Some(0)); }
            other => panic!("unexpected {other:?}"),
        }
    }

    #[test]
    fn rejects_garbage() {
        assert!(matches!("garbage".parse::<San>(), Err(SanError::Malformed(_))));
        assert!(matches!("".parse::<San>(), Err(SanError::Empty)));
        assert!(matches!("Nz9".parse::<San>(), Err(SanError::Malformed(_))));
        assert!(matches!("xd5".parse::<San>(), Err(SanError::Malformed(_))));
        assert!(matches!("e8=K".parse::<San>(), Err(SanError::Malformed(_))));
    }

    #[test]
    fn resolves_against_position() {
        let pos = Position::startpos();
        let m = resolve(&pos, "Nf3").unwrap();
        assert_eq!((m.from, m.to), (sq("g1"), sq("f3")));
        assert!(matches!(resolve(&pos, "Nd4"), Err(SanError::Illegal(_))));
        assert!(matches!(resolve(&pos, "e5"), Err(SanError::Illegal(_))));
    }

    #[test]
    fn ambiguity_needs_disambiguation() {
        // Knights on b1 and f3 can both reach d2.
        let pos = Position::from_fen("4k3/8/8/8/8/5N2/8/1N2K3 w - - 0 1").unwrap();
        assert!(matches!(resolve(&pos, "Nd2"), Err(SanError::Ambiguous(_))));
        let m = resolve(&pos, "Nbd2").unwrap();
        assert_eq!(m.from, sq("b1"));
        assert_eq!(render(&pos, m), "Nbd2");
    }

    #[test]
    fn rank_disambiguation_when_files_match() {
        // Rooks on a1 and a5 both reach a3.
        let pos = Position::from_fen("4k3/8/8/R7/8/8/8/R3K3 w - - 0 1").unwrap();
        let m = resolve(&pos, "R1a3").unwrap();
        assert_eq!(m.from, sq("a1"));
        assert_eq!(render(&pos, m), "R1a3");
    }

    #[test]
    fn renders_captures_castling_and_check() {
        let pos = Position::from_uci_moves(&["e2e4", "d7d5"]).unwrap();
        let m = resolve(&pos, "exd5").unwrap();
        assert_eq!(render(&pos, m), "exd5");

        let pos = Position::from_fen("r3k2r/8/8/8/8/8/8/R3K2R w KQkq - 0 1").unwrap();
        let m = resolve(&pos, "O-O").unwrap();
        assert_eq!((m.from, m.to), (sq("e1"), sq("g1")));
        assert_eq!(render(&pos, m), "O-O");

        let pos = Position::from_uci_moves(&["f2f3", "e7e5", "g2g4"]).unwrap();
        let m = resolve(&pos, "Qh4").unwrap();
        assert_eq!(render(&pos, m), "Qh4#");
    }
}
