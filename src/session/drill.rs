use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// Display text shared by every drill kind. Which fields are set depends on
/// the kind and on the lesson section the drill was compiled from.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DrillText {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub target: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub native: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub explanation: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub speaker: Option<String>,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Pair {
    pub target: String,
    pub native: String,
}

/// Word pairs to match. Targets are unique within the set, and so are natives.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct PairingSet {
    pub pairs: Vec<Pair>,
}

impl PairingSet {
    pub fn contains_target(&self, target: &str) -> bool {
        self.pairs.iter().any(|p| p.target == target)
    }

    pub fn contains_native(&self, native: &str) -> bool {
        self.pairs.iter().any(|p| p.native == native)
    }

    pub fn is_pair(&self, target: &str, native: &str) -> bool {
        self.pairs
            .iter()
            .any(|p| p.target == target && p.native == native)
    }

    pub fn native_for(&self, target: &str) -> Option<&str> {
        self.pairs
            .iter()
            .find(|p| p.target == target)
            .map(|p| p.native.as_str())
    }

    /// Native column in display order. Sorting keeps it from lining up with
    /// the target column.
    pub fn natives_sorted(&self) -> Vec<&str> {
        let mut natives: Vec<&str> = self.pairs.iter().map(|p| p.native.as_str()).collect();
        natives.sort_unstable();
        natives
    }
}

/// A sentence and the shuffled bag of its whitespace-delimited tokens.
/// The bag is a multiset: repeated words are distinct bag positions.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScrambleBag {
    pub answer: String,
    pub tokens: Vec<String>,
}

impl ScrambleBag {
    /// Bag positions that spell out the answer in order.
    pub fn solution_positions(&self) -> Vec<usize> {
        let mut used = vec![false; self.tokens.len()];
        let mut positions = Vec::with_capacity(self.tokens.len());
        for word in self.answer.split_whitespace() {
            if let Some(pos) = self
                .tokens
                .iter()
                .enumerate()
                .position(|(i, t)| !used[i] && t == word)
            {
                used[pos] = true;
                positions.push(pos);
            }
        }
        positions
    }
}

/// Options for a single-answer question. `answer` occurs exactly once.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct OptionSet {
    pub answer: String,
    pub options: Vec<String>,
}

impl OptionSet {
    pub fn is_correct(&self, index: usize) -> bool {
        self.options.get(index).is_some_and(|o| *o == self.answer)
    }

    pub fn answer_index(&self) -> Option<usize> {
        self.options.iter().position(|o| *o == self.answer)
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum DrillKind {
    Intro,
    Pairing(PairingSet),
    Scramble(ScrambleBag),
    Choice(OptionSet),
    Quiz(OptionSet),
    Challenge,
}

impl DrillKind {
    pub fn name(&self) -> &'static str {
        match self {
            DrillKind::Intro => "intro",
            DrillKind::Pairing(_) => "pairing",
            DrillKind::Scramble(_) => "scramble",
            DrillKind::Choice(_) => "choice",
            DrillKind::Quiz(_) => "quiz",
            DrillKind::Challenge => "challenge",
        }
    }

    /// Whether the learner must pass `check()` before moving on.
    pub fn requires_check(&self) -> bool {
        match self {
            DrillKind::Scramble(_) | DrillKind::Choice(_) | DrillKind::Quiz(_) => true,
            DrillKind::Intro | DrillKind::Pairing(_) | DrillKind::Challenge => false,
        }
    }

    /// The string a learner has to produce, for kinds that have one.
    pub fn correct_answer(&self) -> Option<&str> {
        match self {
            DrillKind::Scramble(bag) => Some(&bag.answer),
            DrillKind::Choice(set) | DrillKind::Quiz(set) => Some(&set.answer),
            DrillKind::Intro | DrillKind::Pairing(_) | DrillKind::Challenge => None,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Drill {
    #[serde(flatten)]
    pub text: DrillText,
    pub kind: DrillKind,
}

impl Drill {
    pub fn new(kind: DrillKind, text: DrillText) -> Self {
        Self { text, kind }
    }

    /// Text worth sending to the pronunciation service, if any.
    pub fn speakable(&self) -> Option<&str> {
        match &self.kind {
            DrillKind::Scramble(bag) => Some(&bag.answer),
            _ => self.text.target.as_deref(),
        }
    }
}

/// The drills compiled for one lesson. Built once and never mutated.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct DrillQueue {
    lesson_id: String,
    drills: Vec<Drill>,
}

impl DrillQueue {
    pub fn new(lesson_id: impl Into<String>, drills: Vec<Drill>) -> Self {
        Self {
            lesson_id: lesson_id.into(),
            drills,
        }
    }

    pub fn lesson_id(&self) -> &str {
        &self.lesson_id
    }

    pub fn len(&self) -> usize {
        self.drills.len()
    }

    pub fn is_empty(&self) -> bool {
        self.drills.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<&Drill> {
        self.drills.get(index)
    }

    pub fn iter(&self) -> impl Iterator<Item = &Drill> {
        self.drills.iter()
    }

    pub fn kind_counts(&self) -> BTreeMap<&'static str, usize> {
        let mut counts = BTreeMap::new();
        for drill in &self.drills {
            *counts.entry(drill.kind.name()).or_insert(0) += 1;
        }
        counts
    }
}
