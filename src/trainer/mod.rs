//! The practice-session state machine.
//!
//! A [`Trainer`] owns exactly one [`Session`]. Learner gestures arrive through
//! [`Trainer::submit_move`], [`Trainer::hint`] and [`Trainer::reset`]; scripted
//! replies are deferred and arrive later through [`Trainer::fire_reply`] (or
//! [`Trainer::tick`]) carrying only a [`ReplyTicket`].

pub mod params;
pub mod session;
pub mod snapshot;

use std::time::Instant;

use cozy_chess::{Color, Piece, Square};
use log::{debug, error, info};

use crate::catalog::{Opening, Side};
use crate::compiler::{compile, CompiledMove};
use crate::oracle::{CozyOracle, PositionOracle};

pub use params::{FailurePolicy, TrainerParams};
pub use session::{PendingReply, ReplyTicket, Session, Status};
pub use snapshot::{turns, Snapshot, TurnRow};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RejectReason {
    NotPlaying,
    Stalled,
    NotYourTurn,
    Illegal,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MoveOutcome {
    /// Nothing changed.
    Rejected(RejectReason),
    /// Matched the line; a scripted reply is pending.
    Correct,
    /// Matched the line and finished it.
    Completed,
    /// Legal but not the scripted move.
    Wrong { expected: String },
    /// Matched the line and was applied, but the session stalled afterwards.
    Halted,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReplyOutcome {
    Applied(CompiledMove),
    Completed(CompiledMove),
    /// Ticket does not belong to the live session's pending reply.
    Stale,
    Exhausted,
    /// The scripted move could not be applied; the session is stalled.
    Halted,
}

fn color_name(c: Color) -> &'static str {
    match c { Color::White => "White", Color::Black => "Black" }
}

pub struct Trainer<O: PositionOracle = CozyOracle> {
    oracle: O,
    opening: Opening,
    sequence: Vec<CompiledMove>,
    params: TrainerParams,
    session: Session<O::Position>,
    generations: u64,
}

impl Trainer<CozyOracle> {
    pub fn cozy(opening: Opening, params: TrainerParams) -> Self {
        Self::new(CozyOracle, opening, params)
    }
}

impl<O: PositionOracle> Trainer<O> {
    /// Compiles the opening's line and starts the first session.
    pub fn new(oracle: O, opening: Opening, params: TrainerParams) -> Self {
        let sequence = compile(&oracle, &opening.moves);
        let session = Session::new(1, oracle.start_position(), opening.learner_color());
        let mut trainer = Self { oracle, opening, sequence, params, session, generations: 1 };
        trainer.begin();
        trainer
    }

    pub fn opening(&self) -> &Opening { &self.opening }
    pub fn sequence(&self) -> &[CompiledMove] { &self.sequence }
    pub fn params(&self) -> &TrainerParams { &self.params }
    pub fn session(&self) -> &Session<O::Position> { &self.session }
    pub fn oracle(&self) -> &O { &self.oracle }

    /// Replaces the session with a fresh one. Any reply pending in the old
    /// session dies with it; its ticket will be reported stale.
    pub fn reset(&mut self) {
        self.generations += 1;
        self.session = Session::new(self.generations, self.oracle.start_position(), self.opening.learner_color());
        self.begin();
    }

    fn begin(&mut self) {
        info!("session {} for `{}`: {} plies, learner plays {}", self.session.generation, self.opening.id, self.sequence.len(), color_name(self.session.learner_side));
        if self.sequence.is_empty() {
            self.session.status = Status::Completed;
            self.session.message = format!("There are no moves to practice for the {}.", self.opening.name);
            return;
        }
        let side = color_name(self.session.learner_side);
        if self.session.learner_side == Color::White {
            self.session.message = format!("Play the {} as {}. Make your first move.", self.opening.name, side);
        } else {
            self.session.message = format!("Play the {} as {}. Watch White's first move.", self.opening.name, side);
            self.schedule_reply();
        }
    }

    fn learner_to_move(&self) -> bool {
        self.oracle.side_to_move(&self.session.position) == self.session.learner_side
    }

    fn check_input(&self) -> Result<(), RejectReason> {
        if self.session.status != Status::Playing { return Err(RejectReason::NotPlaying); }
        if self.session.stalled { return Err(RejectReason::Stalled); }
        if !self.learner_to_move() { return Err(RejectReason::NotYourTurn); }
        Ok(())
    }

    /// Handles a learner gesture. Only origin and destination are compared
    /// with the scripted move.
    pub fn submit_move(&mut self, from: Square, to: Square) -> MoveOutcome {
        if let Err(reason) = self.check_input() {
            debug!("rejected {}{}: {:?}", from, to, reason);
            return MoveOutcome::Rejected(reason);
        }
        if !self.oracle.is_legal(&self.session.position, from, to, Some(Piece::Queen)) {
            debug!("rejected {}{}: illegal", from, to);
            return MoveOutcome::Rejected(RejectReason::Illegal);
        }
        let Some(expected) = self.sequence.get(self.session.progress).cloned() else {
            return MoveOutcome::Rejected(RejectReason::NotPlaying);
        };

        if (expected.from, expected.to) != (from, to) {
            return self.wrong_move(&expected);
        }

        let promotion = expected.promotion.or(Some(Piece::Queen));
        match self.oracle.apply_move(&self.session.position, from, to, promotion) {
            Ok(next) => self.session.position = next,
            Err(e) => {
                error!("oracle refused validated move {}{}: {}", from, to, e);
                return MoveOutcome::Rejected(RejectReason::Illegal);
            }
        }
        self.session.progress += 1;
        self.session.last_move = Some((from, to));
        if !self.verify() {
            return MoveOutcome::Halted;
        }
        if self.finish_if_done() {
            return MoveOutcome::Completed;
        }
        let opponent = color_name(!self.session.learner_side);
        self.session.message = format!("Correct, {}! Waiting for {}'s reply.", expected.algebraic, opponent);
        self.schedule_reply();
        MoveOutcome::Correct
    }

    fn wrong_move(&mut self, expected: &CompiledMove) -> MoveOutcome {
        self.session.mistakes += 1;
        self.session.message = if self.params.reveal_expected {
            format!("Not quite. The expected move was {}.", expected.algebraic)
        } else {
            "Not quite. Try again.".to_string()
        };
        if let FailurePolicy::MistakeLimit(limit) = self.params.failure_policy {
            if self.session.mistakes >= limit {
                info!("session {} failed after {} mistakes", self.session.generation, self.session.mistakes);
                self.session.status = Status::Failed;
                self.session.message = format!("Too many mistakes. Restart to try the {} again.", self.opening.name);
            }
        }
        MoveOutcome::Wrong { expected: expected.algebraic.clone() }
    }

    fn schedule_reply(&mut self) {
        if let Some(p) = self.session.pending {
            error!("reply {:?} already pending; not scheduling another", p.ticket);
            return;
        }
        let ticket = ReplyTicket { generation: self.session.generation, index: self.session.progress };
        debug!("scheduling reply {:?} in {:?}", ticket, self.params.reply_delay);
        self.session.pending = Some(PendingReply { ticket, due: Instant::now() + self.params.reply_delay });
    }

    pub fn pending_reply(&self) -> Option<ReplyTicket> { self.session.pending.map(|p| p.ticket) }

    pub fn reply_due(&self) -> Option<Instant> { self.session.pending.map(|p| p.due) }

    /// Fires the pending reply if its delay has elapsed by `now`.
    pub fn tick(&mut self, now: Instant) -> Option<ReplyOutcome> {
        let pending = self.session.pending?;
        if now < pending.due { return None; }
        Some(self.fire_reply(pending.ticket))
    }

    /// Applies the scripted reply named by `ticket` to the live session.
    pub fn fire_reply(&mut self, ticket: ReplyTicket) -> ReplyOutcome {
        if ticket.generation != self.session.generation {
            debug!("discarding reply {:?} from a previous session (live {})", ticket, self.session.generation);
            return ReplyOutcome::Stale;
        }
        if self.pending_reply() != Some(ticket) || self.session.status != Status::Playing || self.session.stalled {
            debug!("discarding reply {:?}: not pending", ticket);
            return ReplyOutcome::Stale;
        }
        self.session.pending = None;
        let Some(mv) = self.sequence.get(self.session.progress).cloned() else {
            return ReplyOutcome::Exhausted;
        };
        match self.oracle.apply_move(&self.session.position, mv.from, mv.to, mv.promotion) {
            Ok(next) => self.session.position = next,
            Err(e) => {
                error!("scripted move {} ({}{}) could not be applied: {}", mv.algebraic, mv.from, mv.to, e);
                self.stall();
                return ReplyOutcome::Halted;
            }
        }
        self.session.progress += 1;
        self.session.last_move = Some((mv.from, mv.to));
        if !self.verify() {
            return ReplyOutcome::Halted;
        }
        if self.finish_if_done() {
            return ReplyOutcome::Completed(mv);
        }
        self.session.message = format!("{} played {}. Your turn.", color_name(mv.side()), mv.algebraic);
        ReplyOutcome::Applied(mv)
    }

    fn finish_if_done(&mut self) -> bool {
        if self.session.progress < self.sequence.len() { return false; }
        self.session.status = Status::Completed;
        self.session.pending = None;
        self.session.message = format!("Well done! You completed the {}.", self.opening.name);
        info!("session {} completed `{}`", self.session.generation, self.opening.id);
        true
    }

    /// Side to move must match the parity of `progress`.
    fn verify(&mut self) -> bool {
        let actual = self.oracle.side_to_move(&self.session.position);
        if actual == self.session.expected_side() { return true; }
        error!("session {} out of sync: {} to move at ply {}", self.session.generation, color_name(actual), self.session.progress);
        self.stall();
        false
    }

    fn stall(&mut self) {
        self.session.stalled = true;
        self.session.pending = None;
        self.session.message = "The line could not be continued. Restart to try again.".to_string();
    }

    /// Next scripted move, for the presentation to highlight. Nothing once
    /// the session is finished or stalled.
    pub fn hint(&self) -> Option<&CompiledMove> {
        if self.session.status != Status::Playing || self.session.stalled { return None; }
        self.sequence.get(self.session.progress)
    }

    /// Legal moves of the current position grouped by origin square.
    pub fn legal_destinations(&self) -> Vec<(Square, Vec<Square>)> {
        let mut out: Vec<(Square, Vec<Square>)> = Vec::new();
        for m in self.oracle.legal_moves(&self.session.position) {
            match out.iter_mut().find(|(from, _)| *from == m.from) {
                Some((_, tos)) => if !tos.contains(&m.to) { tos.push(m.to) },
                None => out.push((m.from, vec![m.to])),
            }
        }
        out
    }

    pub fn snapshot(&self) -> Snapshot {
        let s = &self.session;
        let movable = self.check_input().is_ok();
        let legal_destinations = if movable {
            self.legal_destinations()
                .into_iter()
                .map(|(from, tos)| (from.to_string(), tos.iter().map(|t| t.to_string()).collect()))
                .collect()
        } else {
            Default::default()
        };
        Snapshot {
            opening_id: self.opening.id.clone(),
            opening_name: self.opening.name.clone(),
            fen: self.oracle.fen(&s.position),
            learner_side: Side::from(s.learner_side),
            side_to_move: Side::from(self.oracle.side_to_move(&s.position)),
            legal_destinations,
            last_move: s.last_move.map(|(f, t)| (f.to_string(), t.to_string())),
            status: s.status,
            message: s.message.clone(),
            progress: s.progress,
            sequence_length: self.sequence.len(),
            mistakes: s.mistakes,
            awaiting_reply: s.pending.is_some(),
            turns: turns(&self.sequence, s.progress),
        }
    }
}
