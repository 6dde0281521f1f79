use cozy_chess::Square;
use piedrill::compiler::{compile, try_compile};
use piedrill::CozyOracle;
use pretty_assertions::assert_eq;

fn sq(s: &str) -> Square { s.parse().unwrap() }

#[test]
fn compiles_open_game_squares_and_notation() {
    let seq = compile(&CozyOracle, "1.e4 e5 2.Nf3 Nc6");
    let squares: Vec<(Square, Square)> = seq.iter().map(|m| (m.from, m.to)).collect();
    assert_eq!(squares, vec![(sq("e2"), sq("e4")), (sq("e7"), sq("e5")), (sq("g1"), sq("f3")), (sq("b8"), sq("c6"))]);
    let notation: Vec<&str> = seq.iter().map(|m| m.algebraic.as_str()).collect();
    assert_eq!(notation, vec!["e4", "e5", "Nf3", "Nc6"]);
    assert!(seq.iter().enumerate().all(|(i, m)| m.index == i));
}

#[test]
fn garbage_compiles_to_nothing() {
    assert!(compile(&CozyOracle, "garbage").is_empty());
    assert!(try_compile(&CozyOracle, "garbage").is_err());
}

#[test]
fn illegal_move_mid_line_drops_the_whole_line() {
    assert!(compile(&CozyOracle, "1.e4 e5 2.Nf3 Nf3").is_empty());
    assert!(compile(&CozyOracle, "1.e4 {unterminated").is_empty());
}

#[test]
fn empty_text_is_an_empty_line() {
    assert!(compile(&CozyOracle, "").is_empty());
    assert!(try_compile(&CozyOracle, "").unwrap().is_empty());
}

#[test]
fn compilation_is_deterministic() {
    let text = "1.d4 Nf6 2.c4 g6 3.Nc3 Bg7 4.e4 d6 5.Nf3 O-O";
    assert_eq!(compile(&CozyOracle, text), compile(&CozyOracle, text));
}

#[test]
fn castling_compiles_to_king_step() {
    let seq = compile(&CozyOracle, "1.e4 e5 2.Nf3 Nc6 3.Bc4 Bc5 4.O-O");
    let last = seq.last().unwrap();
    assert_eq!((last.from, last.to), (sq("e1"), sq("g1")));
    assert_eq!(last.algebraic, "O-O");
}

#[test]
fn notation_is_canonicalised() {
    // Sloppy source notation: missing capture mark, redundant check mark, annotations.
    let seq = compile(&CozyOracle, "1. e4 d5 2. ed5!? Qd5 3. Nc3 Qa5+ 4. d4");
    let notation: Vec<&str> = seq.iter().map(|m| m.algebraic.as_str()).collect();
    assert_eq!(notation, vec!["e4", "d5", "exd5", "Qxd5", "Nc3", "Qa5", "d4"]);
}

#[test]
fn check_suffix_is_rendered() {
    let seq = compile(&CozyOracle, "1.e4 e5 2.Bc4 Nc6 3.Qh5 Nf6 4.Qxf7");
    assert_eq!(seq.last().unwrap().algebraic, "Qxf7#");
}
