//! Text presentation of trainer snapshots and parsing of typed commands.

use cozy_chess::Square;
use serde::Serialize;

use crate::board::cozy::parse_coordinate_move;
use crate::catalog::{Opening, Side};
use crate::compiler::{replay, try_compile, CompiledMove};
use crate::oracle::{OracleError, PositionOracle};
use crate::trainer::{turns, Snapshot, Status, TurnRow};

pub const HELP: &str = "commands: <from><to> (e2e4, e2 e4, e2-e4), hint, restart, moves, help, quit";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Command {
    Move(Square, Square),
    Hint,
    Restart,
    Moves,
    Help,
    Quit,
}

pub fn parse_command(line: &str) -> Option<Command> {
    let line = line.trim().to_lowercase();
    match line.as_str() {
        "hint" | "h" => return Some(Command::Hint),
        "restart" | "reset" | "r" => return Some(Command::Restart),
        "moves" | "m" => return Some(Command::Moves),
        "help" | "?" => return Some(Command::Help),
        "quit" | "exit" | "q" => return Some(Command::Quit),
        _ => {}
    }
    let compact: String = line.chars().filter(|c| !c.is_whitespace() && *c != '-').collect();
    parse_coordinate_move(&compact).map(|(from, to, _)| Command::Move(from, to))
}

fn placement(fen: &str) -> [[Option<char>; 8]; 8] {
    let mut grid = [[None; 8]; 8];
    let board = fen.split_whitespace().next().unwrap_or("");
    for (i, row) in board.split('/').take(8).enumerate() {
        let rank = 7 - i;
        let mut file = 0usize;
        for c in row.chars() {
            if let Some(d) = c.to_digit(10) {
                file += d as usize;
            } else if file < 8 {
                grid[rank][file] = Some(c);
                file += 1;
            }
        }
    }
    grid
}

/// Board from the learner's side. Last-move squares are wrapped in `( )`,
/// hinted squares in `[ ]`.
pub fn render_board(snap: &Snapshot, hint: Option<&CompiledMove>) -> String {
    let hint = hint.map(|m| (m.from.to_string(), m.to.to_string()));
    draw_board(&snap.fen, snap.learner_side, snap.last_move.as_ref(), hint.as_ref())
}

fn draw_board(fen: &str, view: Side, last: Option<&(String, String)>, hint: Option<&(String, String)>) -> String {
    let grid = placement(fen);
    let on = |pair: Option<&(String, String)>, name: &str| pair.map_or(false, |(a, b)| a == name || b == name);
    let white_view = view == Side::White;
    let ranks: Vec<usize> = if white_view { (0..8).rev().collect() } else { (0..8).collect() };
    let files: Vec<usize> = if white_view { (0..8).collect() } else { (0..8).rev().collect() };

    let mut out = String::new();
    for &r in &ranks {
        out.push_str(&format!("{} ", r + 1));
        for &f in &files {
            let name = format!("{}{}", (b'a' + f as u8) as char, r + 1);
            let (l, rt) = if on(hint, &name) {
                ('[', ']')
            } else if on(last, &name) {
                ('(', ')')
            } else {
                (' ', ' ')
            };
            out.push(l);
            out.push(grid[r][f].unwrap_or('.'));
            out.push(rt);
        }
        out.push('\n');
    }
    out.push_str("  ");
    for &f in &files {
        out.push(' ');
        out.push((b'a' + f as u8) as char);
        out.push(' ');
    }
    out.push('\n');
    out
}

pub fn progress_bar(progress: usize, total: usize, width: usize) -> String {
    let filled = if total == 0 { 0 } else { (progress.min(total) * width) / total };
    format!("[{}{}] {}/{}", "#".repeat(filled), "-".repeat(width - filled), progress, total)
}

pub fn move_list(snap: &Snapshot) -> String { numbered(&snap.turns) }

fn numbered(rows: &[TurnRow]) -> String {
    rows.iter()
        .map(|t| match &t.black {
            Some(b) => format!("{}. {} {}", t.number, t.white, b),
            None => format!("{}. {}", t.number, t.white),
        })
        .collect::<Vec<_>>()
        .join("  ")
}

pub fn status_panel(snap: &Snapshot) -> String {
    let state = match snap.status {
        Status::Playing if snap.awaiting_reply => "opponent thinking",
        Status::Playing => "your move",
        Status::Completed => "completed",
        Status::Failed => "failed",
    };
    let mut out = format!("{} (you play {})\n", snap.opening_name, snap.learner_side);
    out.push_str(&format!("{}  mistakes: {}  {}\n", progress_bar(snap.progress, snap.sequence_length, 20), snap.mistakes, state));
    let moves = move_list(snap);
    if !moves.is_empty() {
        out.push_str(&moves);
        out.push('\n');
    }
    out.push_str("> ");
    out.push_str(&snap.message);
    out.push('\n');
    out
}

pub fn opening_line(o: &Opening) -> String {
    format!("{:<24} {:<28} {:<4} {:<13} {}", o.id, o.name, o.eco, o.difficulty.to_string(), o.side)
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct HintView {
    pub from: String,
    pub to: String,
    pub algebraic: String,
}

impl From<&CompiledMove> for HintView {
    fn from(m: &CompiledMove) -> Self {
        Self { from: m.from.to_string(), to: m.to.to_string(), algebraic: m.algebraic.clone() }
    }
}

#[derive(Serialize)]
struct Frame<'a> {
    #[serde(flatten)]
    snapshot: &'a Snapshot,
    #[serde(skip_serializing_if = "Option::is_none")]
    hint: Option<HintView>,
}

/// One JSON line for `--json` hosts: the snapshot, plus a `hint` object when
/// one was asked for.
pub fn json_frame(snap: &Snapshot, hint: Option<&CompiledMove>) -> serde_json::Result<String> {
    serde_json::to_string(&Frame { snapshot: snap, hint: hint.map(HintView::from) })
}

pub fn json_turns(snap: &Snapshot) -> serde_json::Result<String> {
    serde_json::to_string(&snap.turns)
}

/// What a learner sees about an opening before practising it.
#[derive(Debug, Clone, Serialize)]
pub struct Details<'a> {
    #[serde(flatten)]
    pub opening: &'a Opening,
    pub line: String,
    pub plies: usize,
    /// Position after the last move of the line.
    pub fen: String,
    #[serde(skip)]
    last_move: Option<(String, String)>,
}

impl<'a> Details<'a> {
    pub fn new<O: PositionOracle>(oracle: &O, opening: &'a Opening) -> Result<Self, OracleError> {
        let sequence = try_compile(oracle, &opening.moves)?;
        let end = replay(oracle, &sequence)?;
        Ok(Self {
            opening,
            line: numbered(&turns(&sequence, sequence.len())),
            plies: sequence.len(),
            fen: oracle.fen(&end),
            last_move: sequence.last().map(|m| (m.from.to_string(), m.to.to_string())),
        })
    }
}

pub fn details_panel(d: &Details) -> String {
    let o = d.opening;
    let mut out = format!("{} ({})\n", o.name, o.eco);
    out.push_str(&format!("Difficulty:  {}\n", o.difficulty));
    out.push_str(&format!("You play:    {}\n", o.side));
    out.push_str(&format!("Line:        {}\n", d.line));
    out.push_str(&format!("FEN:         {}\n\n", d.fen));
    out.push_str(&draw_board(&d.fen, o.side, d.last_move.as_ref(), None));
    out
}
