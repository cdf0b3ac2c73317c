use std::collections::BTreeSet;

use tracing::{debug, info};

use crate::error::DrillError;
use crate::session::answer;
use crate::session::drill::{Drill, DrillKind, DrillQueue, PairingSet};
use crate::session::result::{DrillOutcome, LessonSummary, Verdict};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum PairSide {
    Target,
    Native,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum PairingOutcome {
    /// Only one side is selected so far.
    Pending,
    Matched,
    Mismatched,
}

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct PairingProgress {
    pending_target: Option<String>,
    pending_native: Option<String>,
    /// Matched pairs, keyed by target term.
    matched: BTreeSet<String>,
    mistakes: usize,
}

/// The learner's in-progress answer. Its shape follows the current drill kind.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub enum DrillAnswer {
    #[default]
    None,
    Selection(Option<usize>),
    /// Bag positions in the order they were placed.
    Tokens(Vec<usize>),
    Pairing(PairingProgress),
}

impl DrillAnswer {
    fn for_kind(kind: &DrillKind) -> Self {
        match kind {
            DrillKind::Intro | DrillKind::Challenge => DrillAnswer::None,
            DrillKind::Pairing(_) => DrillAnswer::Pairing(PairingProgress::default()),
            DrillKind::Scramble(_) => DrillAnswer::Tokens(Vec::new()),
            DrillKind::Choice(_) | DrillKind::Quiz(_) => DrillAnswer::Selection(None),
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Phase {
    Answering,
    FeedbackShown(Verdict),
    Completed,
}

#[derive(Clone, Debug)]
pub enum AdvanceResult {
    /// Moved on to the drill at this index.
    Next(usize),
    /// The last drill was passed. Returned once per session.
    Completed(LessonSummary),
}

/// Walks a drill queue one drill at a time.
///
/// All per-drill state (selection, placed tokens, pairing progress, feedback,
/// verdict) is dropped together whenever the index advances.
pub struct SessionController {
    queue: DrillQueue,
    index: usize,
    answer: DrillAnswer,
    phase: Phase,
    outcomes: Vec<DrillOutcome>,
}

impl SessionController {
    pub fn new(queue: DrillQueue) -> Self {
        let answer = queue
            .get(0)
            .map(|d| DrillAnswer::for_kind(&d.kind))
            .unwrap_or_default();
        Self {
            queue,
            index: 0,
            answer,
            phase: Phase::Answering,
            outcomes: Vec::new(),
        }
    }

    pub fn queue(&self) -> &DrillQueue {
        &self.queue
    }

    pub fn index(&self) -> usize {
        self.index
    }

    pub fn len(&self) -> usize {
        self.queue.len()
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    pub fn answer(&self) -> &DrillAnswer {
        &self.answer
    }

    pub fn is_complete(&self) -> bool {
        self.phase == Phase::Completed
    }

    pub fn feedback_visible(&self) -> bool {
        matches!(self.phase, Phase::FeedbackShown(_))
    }

    pub fn verdict(&self) -> Verdict {
        match self.phase {
            Phase::FeedbackShown(v) => v,
            Phase::Answering | Phase::Completed => Verdict::Unknown,
        }
    }

    /// Fraction of the queue reached, counting the current drill.
    pub fn progress(&self) -> f64 {
        if self.queue.is_empty() {
            return 0.0;
        }
        (self.index + 1) as f64 / self.queue.len() as f64
    }

    pub fn current(&self) -> Result<&Drill, DrillError> {
        self.queue.get(self.index).ok_or(DrillError::EmptyQueue)
    }

    fn ensure_open(&self) -> Result<&Drill, DrillError> {
        if self.phase == Phase::Completed {
            return Err(DrillError::SessionAlreadyComplete);
        }
        self.current()
    }

    fn ensure_answering(&self) -> Result<(), DrillError> {
        if self.feedback_visible() {
            Err(DrillError::FeedbackLocked)
        } else {
            Ok(())
        }
    }

    // ── Choice / Quiz ───────────────────────────────────────────────────

    /// Record the chosen option of a choice or quiz drill.
    pub fn submit_selection(&mut self, option: usize) -> Result<(), DrillError> {
        let drill = self.ensure_open()?;
        let set = match &drill.kind {
            DrillKind::Choice(set) | DrillKind::Quiz(set) => set,
            other => {
                return Err(DrillError::KindMismatch {
                    action: "select",
                    kind: other.name(),
                });
            }
        };
        self.ensure_answering()?;
        if option >= set.options.len() {
            return Err(DrillError::OutOfRange {
                what: "option",
                position: option,
            });
        }
        self.answer = DrillAnswer::Selection(Some(option));
        Ok(())
    }

    pub fn selected_option(&self) -> Option<usize> {
        match self.answer {
            DrillAnswer::Selection(sel) => sel,
            _ => None,
        }
    }

    // ── Scramble ────────────────────────────────────────────────────────

    /// Place the token at `bag_position` at the end of the assembled sentence.
    pub fn submit_token(&mut self, bag_position: usize) -> Result<(), DrillError> {
        let drill = self.ensure_open()?;
        let DrillKind::Scramble(bag) = &drill.kind else {
            return Err(DrillError::KindMismatch {
                action: "place token",
                kind: drill.kind.name(),
            });
        };
        let bag_len = bag.tokens.len();
        self.ensure_answering()?;
        if bag_position >= bag_len {
            return Err(DrillError::OutOfRange {
                what: "token",
                position: bag_position,
            });
        }
        let DrillAnswer::Tokens(placed) = &mut self.answer else {
            return Err(DrillError::KindMismatch {
                action: "place token",
                kind: "scramble",
            });
        };
        if placed.contains(&bag_position) {
            return Err(DrillError::TokenInUse(bag_position));
        }
        placed.push(bag_position);
        Ok(())
    }

    /// Remove the token at `placed_position` from the assembled sentence,
    /// returning its bag position to play.
    pub fn retract_token(&mut self, placed_position: usize) -> Result<usize, DrillError> {
        let drill = self.ensure_open()?;
        if !matches!(drill.kind, DrillKind::Scramble(_)) {
            return Err(DrillError::KindMismatch {
                action: "retract token",
                kind: drill.kind.name(),
            });
        }
        self.ensure_answering()?;
        let DrillAnswer::Tokens(placed) = &mut self.answer else {
            return Err(DrillError::KindMismatch {
                action: "retract token",
                kind: "scramble",
            });
        };
        if placed_position >= placed.len() {
            return Err(DrillError::OutOfRange {
                what: "placed token",
                position: placed_position,
            });
        }
        Ok(placed.remove(placed_position))
    }

    pub fn is_token_used(&self, bag_position: usize) -> bool {
        matches!(&self.answer, DrillAnswer::Tokens(placed) if placed.contains(&bag_position))
    }

    pub fn placed_tokens(&self) -> Vec<&str> {
        let (Ok(Drill {
            kind: DrillKind::Scramble(bag),
            ..
        }), DrillAnswer::Tokens(placed)) = (self.current(), &self.answer)
        else {
            return Vec::new();
        };
        placed.iter().map(|&p| bag.tokens[p].as_str()).collect()
    }

    // ── Pairing ─────────────────────────────────────────────────────────

    /// Select a term on one side of a pairing drill. Once both sides hold a
    /// selection the pair is evaluated and both selections are cleared.
    pub fn submit_pairing_selection(
        &mut self,
        side: PairSide,
        key: &str,
    ) -> Result<PairingOutcome, DrillError> {
        if self.phase == Phase::Completed {
            return Err(DrillError::SessionAlreadyComplete);
        }
        let drill = self.queue.get(self.index).ok_or(DrillError::EmptyQueue)?;
        let (DrillKind::Pairing(set), DrillAnswer::Pairing(progress)) =
            (&drill.kind, &mut self.answer)
        else {
            return Err(DrillError::KindMismatch {
                action: "pair",
                kind: drill.kind.name(),
            });
        };

        let known = match side {
            PairSide::Target => set.contains_target(key),
            PairSide::Native => set.contains_native(key),
        };
        if !known {
            return Err(DrillError::UnknownPairKey(key.to_string()));
        }
        if is_matched(set, progress, side, key) {
            return Err(DrillError::AlreadyMatched(key.to_string()));
        }

        match side {
            PairSide::Target => progress.pending_target = Some(key.to_string()),
            PairSide::Native => progress.pending_native = Some(key.to_string()),
        }

        let (Some(target), Some(native)) = (
            progress.pending_target.as_deref(),
            progress.pending_native.as_deref(),
        ) else {
            return Ok(PairingOutcome::Pending);
        };

        let outcome = if set.is_pair(target, native) {
            progress.matched.insert(target.to_string());
            PairingOutcome::Matched
        } else {
            progress.mistakes += 1;
            PairingOutcome::Mismatched
        };
        progress.pending_target = None;
        progress.pending_native = None;
        debug!(?outcome, matched = progress.matched.len(), "pairing attempt");
        Ok(outcome)
    }

    pub fn pairing_complete(&self) -> bool {
        match (self.current(), &self.answer) {
            (
                Ok(Drill {
                    kind: DrillKind::Pairing(set),
                    ..
                }),
                DrillAnswer::Pairing(progress),
            ) => progress.matched.len() == set.pairs.len(),
            _ => false,
        }
    }

    pub fn matched_count(&self) -> usize {
        match &self.answer {
            DrillAnswer::Pairing(progress) => progress.matched.len(),
            _ => 0,
        }
    }

    pub fn pending_pair(&self) -> (Option<&str>, Option<&str>) {
        match &self.answer {
            DrillAnswer::Pairing(progress) => (
                progress.pending_target.as_deref(),
                progress.pending_native.as_deref(),
            ),
            _ => (None, None),
        }
    }

    pub fn is_pair_key_matched(&self, side: PairSide, key: &str) -> bool {
        match (self.current(), &self.answer) {
            (
                Ok(Drill {
                    kind: DrillKind::Pairing(set),
                    ..
                }),
                DrillAnswer::Pairing(progress),
            ) => is_matched(set, progress, side, key),
            _ => false,
        }
    }

    // ── Validation and progression ──────────────────────────────────────

    /// Judge the current answer and show feedback. Once feedback is visible,
    /// further calls return the recorded verdict unchanged.
    pub fn check(&mut self) -> Result<Verdict, DrillError> {
        let drill = self.ensure_open()?;
        if let Phase::FeedbackShown(verdict) = self.phase {
            return Ok(verdict);
        }

        let correct = match (&drill.kind, &self.answer) {
            (DrillKind::Choice(set) | DrillKind::Quiz(set), DrillAnswer::Selection(sel)) => {
                let option = sel.ok_or(DrillError::NotReady)?;
                set.is_correct(option)
            }
            (DrillKind::Scramble(bag), DrillAnswer::Tokens(placed)) => {
                if placed.is_empty() {
                    return Err(DrillError::NotReady);
                }
                let tokens: Vec<&str> = placed.iter().map(|&p| bag.tokens[p].as_str()).collect();
                answer::sentences_match(&answer::join_tokens(&tokens), &bag.answer)
            }
            (kind, _) => {
                return Err(DrillError::KindMismatch {
                    action: "check",
                    kind: kind.name(),
                });
            }
        };

        let verdict = Verdict::from_bool(correct);
        debug!(index = self.index, kind = drill.kind.name(), ?verdict, "checked drill");
        self.phase = Phase::FeedbackShown(verdict);
        Ok(verdict)
    }

    /// Move past the current drill.
    ///
    /// Allowed once feedback is shown, on intro and challenge drills, and on
    /// a pairing drill with every pair matched. From the last drill this
    /// completes the session; that result is produced only once.
    pub fn advance(&mut self) -> Result<AdvanceResult, DrillError> {
        let drill = self.ensure_open()?;
        let kind = drill.kind.name();

        let verdict = match (self.phase, &drill.kind) {
            (Phase::FeedbackShown(v), _) => v,
            (_, DrillKind::Intro | DrillKind::Challenge) => Verdict::Unknown,
            (_, DrillKind::Pairing(_)) if self.pairing_complete() => match &self.answer {
                DrillAnswer::Pairing(p) => Verdict::from_bool(p.mistakes == 0),
                _ => Verdict::Unknown,
            },
            _ => return Err(DrillError::NotReady),
        };
        self.outcomes.push(DrillOutcome {
            kind: kind.to_string(),
            verdict,
        });

        if self.index + 1 >= self.queue.len() {
            self.phase = Phase::Completed;
            let outcomes = std::mem::take(&mut self.outcomes);
            let summary = LessonSummary::from_outcomes(self.queue.lesson_id(), outcomes);
            info!(
                lesson = %summary.lesson_id,
                correct = summary.correct,
                checked = summary.checked,
                "lesson complete"
            );
            return Ok(AdvanceResult::Completed(summary));
        }

        self.index += 1;
        self.answer = self
            .queue
            .get(self.index)
            .map(|d| DrillAnswer::for_kind(&d.kind))
            .unwrap_or_default();
        self.phase = Phase::Answering;
        Ok(AdvanceResult::Next(self.index))
    }
}

fn is_matched(set: &PairingSet, progress: &PairingProgress, side: PairSide, key: &str) -> bool {
    match side {
        PairSide::Target => progress.matched.contains(key),
        PairSide::Native => progress
            .matched
            .iter()
            .any(|t| set.native_for(t) == Some(key)),
    }
}
