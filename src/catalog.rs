//! Opening catalog: the built-in lines, JSON loading, lookup and filtering.
//! Each opening is recorded as movetext in standard algebraic notation.

use std::collections::HashSet;
use std::path::Path;
use std::str::FromStr;

use cozy_chess::Color;
use indicatif::ProgressBar;
use rand::Rng;
use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::compiler::try_compile;
use crate::oracle::PositionOracle;

#[derive(Debug, Error)]
pub enum CatalogError {
    #[error("cannot read catalog {path}: {source}")]
    Io { path: String, source: std::io::Error },
    #[error("invalid catalog JSON: {0}")]
    Json(#[from] serde_json::Error),
    #[error("duplicate opening id `{0}`")]
    DuplicateId(String),
    #[error("unknown difficulty `{0}`")]
    UnknownDifficulty(String),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Side {
    White,
    Black,
}

impl From<Side> for Color {
    fn from(side: Side) -> Color {
        match side { Side::White => Color::White, Side::Black => Color::Black }
    }
}

impl From<Color> for Side {
    fn from(color: Color) -> Side {
        match color { Color::White => Side::White, Color::Black => Side::Black }
    }
}

impl std::fmt::Display for Side {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(match self { Side::White => "White", Side::Black => "Black" })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Difficulty {
    Beginner,
    Intermediate,
    Advanced,
}

impl FromStr for Difficulty {
    type Err = CatalogError;

    fn from_str(s: &str) -> Result<Self, CatalogError> {
        match s.to_ascii_lowercase().as_str() {
            "beginner" => Ok(Difficulty::Beginner),
            "intermediate" => Ok(Difficulty::Intermediate),
            "advanced" => Ok(Difficulty::Advanced),
            _ => Err(CatalogError::UnknownDifficulty(s.to_string())),
        }
    }
}

impl std::fmt::Display for Difficulty {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        std::fmt::Debug::fmt(self, f)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Opening {
    pub id: String,
    pub name: String,
    pub eco: String,
    pub difficulty: Difficulty,
    /// The side the learner plays.
    pub side: Side,
    pub moves: String,
}

impl Opening {
    pub fn learner_color(&self) -> Color { self.side.into() }
}

fn opening(id: &str, name: &str, eco: &str, difficulty: Difficulty, side: Side, moves: &str) -> Opening {
    Opening {
        id: id.to_string(),
        name: name.to_string(),
        eco: eco.to_string(),
        difficulty,
        side,
        moves: moves.to_string(),
    }
}

/// Get all built-in openings
pub fn get_chess_openings() -> Vec<Opening> {
    use Difficulty::*;
    vec![
        opening("sicilian-defense", "Sicilian Defense", "B20", Intermediate, Side::Black,
            "1.e4 c5 2.Nf3 d6 3.d4 cxd4 4.Nxd4 Nf6 5.Nc3 a6"),
        opening("ruy-lopez", "Ruy Lopez", "C60", Intermediate, Side::White,
            "1.e4 e5 2.Nf3 Nc6 3.Bb5 a6 4.Ba4 Nf6 5.O-O Be7"),
        opening("french-defense", "French Defense", "C00", Intermediate, Side::Black,
            "1.e4 e6 2.d4 d5 3.Nc3 Nf6 4.Bg5 Be7"),
        opening("queens-gambit", "Queen's Gambit", "D06", Intermediate, Side::White,
            "1.d4 d5 2.c4 e6 3.Nc3 Nf6 4.Bg5 Be7"),
        opening("kings-indian-defense", "King's Indian Defense", "E60", Advanced, Side::Black,
            "1.d4 Nf6 2.c4 g6 3.Nc3 Bg7 4.e4 d6 5.Nf3 O-O"),
        opening("caro-kann", "Caro-Kann Defense", "B10", Beginner, Side::Black,
            "1.e4 c6 2.d4 d5 3.Nc3 dxe4 4.Nxe4 Bf5"),
        opening("london-system", "London System", "D02", Beginner, Side::White,
            "1.d4 d5 2.Nf3 Nf6 3.Bf4 c5 4.e3 Nc6"),
        opening("scandinavian-defense", "Scandinavian Defense", "B01", Beginner, Side::Black,
            "1.e4 d5 2.exd5 Qxd5 3.Nc3 Qa5 4.d4 Nf6"),
        opening("italian-game", "Italian Game", "C50", Beginner, Side::White,
            "1.e4 e5 2.Nf3 Nc6 3.Bc4 Bc5 4.c3 Nf6"),
        opening("english-opening", "English Opening", "A20", Intermediate, Side::White,
            "1.c4 e5 2.Nc3 Nf6 3.g3 d5 4.cxd5 Nxd5"),
        opening("scotch-game", "Scotch Game", "C45", Beginner, Side::White,
            "1.e4 e5 2.Nf3 Nc6 3.d4 exd4 4.Nxd4"),
        opening("kings-gambit", "King's Gambit", "C30", Advanced, Side::White,
            "1.e4 e5 2.f4 exf4 3.Nf3 g5 4.h4 g4"),
        opening("nimzo-indian-defense", "Nimzo-Indian Defense", "E20", Advanced, Side::Black,
            "1.d4 Nf6 2.c4 e6 3.Nc3 Bb4 4.e3 O-O"),
        opening("dutch-defense", "Dutch Defense", "A80", Intermediate, Side::Black,
            "1.d4 f5 2.g3 Nf6 3.Bg2 e6 4.Nf3 Be7"),
    ]
}

pub fn find<'a>(openings: &'a [Opening], id: &str) -> Option<&'a Opening> {
    openings.iter().find(|o| o.id == id)
}

/// Case-insensitive match on name or ECO code, optionally narrowed to one difficulty.
pub fn filter<'a>(openings: &'a [Opening], query: &str, difficulty: Option<Difficulty>) -> Vec<&'a Opening> {
    let needle = query.trim().to_lowercase();
    openings
        .iter()
        .filter(|o| needle.is_empty() || o.name.to_lowercase().contains(&needle) || o.eco.to_lowercase().contains(&needle))
        .filter(|o| difficulty.map_or(true, |d| o.difficulty == d))
        .collect()
}

pub fn pick_random<'a, R: Rng>(openings: &'a [Opening], rng: &mut R) -> Option<&'a Opening> {
    if openings.is_empty() { None } else { Some(&openings[rng.gen_range(0..openings.len())]) }
}

pub fn from_json_str(text: &str) -> Result<Vec<Opening>, CatalogError> {
    let openings: Vec<Opening> = serde_json::from_str(text)?;
    let mut seen = HashSet::new();
    for o in &openings {
        if !seen.insert(o.id.as_str()) {
            return Err(CatalogError::DuplicateId(o.id.clone()));
        }
    }
    Ok(openings)
}

pub fn load_json<P: AsRef<Path>>(path: P) -> Result<Vec<Opening>, CatalogError> {
    let path = path.as_ref();
    let text = std::fs::read_to_string(path)
        .map_err(|source| CatalogError::Io { path: path.display().to_string(), source })?;
    from_json_str(&text)
}

/// Outcome of compiling one catalog entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Verification {
    pub id: String,
    pub plies: usize,
    pub error: Option<String>,
}

impl Verification {
    pub fn is_ok(&self) -> bool { self.error.is_none() && self.plies > 0 }
}

/// Compiles every opening in parallel. Results keep catalog order.
pub fn verify_all<O: PositionOracle + Sync>(oracle: &O, openings: &[Opening], progress: Option<&ProgressBar>) -> Vec<Verification> {
    openings
        .par_iter()
        .map(|o| {
            let v = match try_compile(oracle, &o.moves) {
                Ok(seq) if seq.is_empty() => Verification { id: o.id.clone(), plies: 0, error: Some("no moves".to_string()) },
                Ok(seq) => Verification { id: o.id.clone(), plies: seq.len(), error: None },
                Err(e) => Verification { id: o.id.clone(), plies: 0, error: Some(e.to_string()) },
            };
            if let Some(pb) = progress { pb.inc(1); }
            v
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::SmallRng;
    use rand::SeedableRng;

    #[test]
    fn test_get_openings() {
        let openings = get_chess_openings();
        assert_eq!(openings.len(), 14);
        assert_eq!(openings[0].id, "sicilian-defense");
        assert_eq!(openings[0].learner_color(), Color::Black);
    }

    #[test]
    fn ids_are_unique() {
        let openings = get_chess_openings();
        let ids: HashSet<_> = openings.iter().map(|o| o.id.as_str()).collect();
        assert_eq!(ids.len(), openings.len());
    }

    #[test]
    fn filter_by_name_eco_and_difficulty() {
        let openings = get_chess_openings();
        let hits = filter(&openings, "GAMBIT", None);
        assert_eq!(hits.len(), 2);
        let hits = filter(&openings, "c5", None);
        assert!(hits.iter().any(|o| o.id == "italian-game"));
        let hits = filter(&openings, "", Some(Difficulty::Advanced));
        assert!(hits.iter().all(|o| o.difficulty == Difficulty::Advanced));
        assert_eq!(hits.len(), 3);
    }

    #[test]
    fn difficulty_parses_case_insensitively() {
        assert_eq!("beginner".parse::<Difficulty>().unwrap(), Difficulty::Beginner);
        assert!("expert".parse::<Difficulty>().is_err());
    }

    #[test]
    fn random_pick_is_from_catalog() {
        let openings = get_chess_openings();
        let mut rng = SmallRng::seed_from_u64(7);
        let o = pick_random(&openings, &mut rng).unwrap();
        assert!(find(&openings, &o.id).is_some());
        assert!(pick_random(&[], &mut rng).is_none());
    }
}
