use std::time::Instant;

use cozy_chess::{Color, Square};
use serde::Serialize;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum Status {
    Playing,
    Completed,
    Failed,
}

/// Identifies one scheduled scripted reply. Timers hold only this; the live
/// session is consulted again when it fires.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ReplyTicket {
    pub generation: u64,
    pub index: usize,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PendingReply {
    pub ticket: ReplyTicket,
    pub due: Instant,
}

/// Mutable state of one practice attempt. Recreated wholesale on reset.
#[derive(Debug, Clone)]
pub struct Session<P> {
    pub(crate) generation: u64,
    pub(crate) position: P,
    pub(crate) progress: usize,
    pub(crate) status: Status,
    pub(crate) learner_side: Color,
    pub(crate) last_move: Option<(Square, Square)>,
    pub(crate) message: String,
    pub(crate) mistakes: u32,
    pub(crate) pending: Option<PendingReply>,
    pub(crate) stalled: bool,
}

impl<P> Session<P> {
    pub(crate) fn new(generation: u64, position: P, learner_side: Color) -> Self {
        Self {
            generation,
            position,
            progress: 0,
            status: Status::Playing,
            learner_side,
            last_move: None,
            message: String::new(),
            mistakes: 0,
            pending: None,
            stalled: false,
        }
    }

    pub fn generation(&self) -> u64 { self.generation }
    pub fn position(&self) -> &P { &self.position }
    pub fn progress(&self) -> usize { self.progress }
    pub fn status(&self) -> Status { self.status }
    pub fn learner_side(&self) -> Color { self.learner_side }
    pub fn last_move(&self) -> Option<(Square, Square)> { self.last_move }
    pub fn message(&self) -> &str { &self.message }
    pub fn mistakes(&self) -> u32 { self.mistakes }
    pub fn pending(&self) -> Option<PendingReply> { self.pending }
    pub fn is_stalled(&self) -> bool { self.stalled }

    /// Side that must move next according to the scripted line.
    pub fn expected_side(&self) -> Color {
        if self.progress % 2 == 0 { Color::White } else { Color::Black }
    }
}
