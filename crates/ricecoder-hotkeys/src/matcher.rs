//! Incremental matching of key combinations against a single pattern
//!
//! A [`SeqMatchState`] records how far one pattern has progressed. Elements
//! before the current position are frozen, elements after it are untouched.
//! Only a `Digits` element can be in progress at the current position.

use crate::models::{KeyCombination, KeySeq, SeqElem};

/// Progress on one digit run
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum DigitsState {
    #[default]
    Empty,
    Partial(String),
    Done(u64),
}

/// Progress on one pattern element
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SeqElemState {
    Key { matched: bool },
    Digit { value: Option<u64> },
    Digits(DigitsState),
}

impl SeqElemState {
    fn initial(elem: &SeqElem) -> Self {
        match elem {
            SeqElem::Key(_) => SeqElemState::Key { matched: false },
            SeqElem::Digit => SeqElemState::Digit { value: None },
            SeqElem::Digits => SeqElemState::Digits(DigitsState::Empty),
        }
    }

    fn is_complete(&self) -> bool {
        match self {
            SeqElemState::Key { matched } => *matched,
            SeqElemState::Digit { value } => value.is_some(),
            SeqElemState::Digits(state) => matches!(state, DigitsState::Done(_)),
        }
    }

    fn capture(&self) -> Option<u64> {
        match self {
            SeqElemState::Digit { value } => *value,
            SeqElemState::Digits(DigitsState::Done(value)) => Some(*value),
            _ => None,
        }
    }
}

/// Progress of one pattern, one state per pattern element
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SeqMatchState {
    elems: Vec<SeqElemState>,
}

impl SeqMatchState {
    /// Fresh state with nothing matched
    pub fn new(seq: &KeySeq) -> Self {
        SeqMatchState {
            elems: seq.elems().iter().map(SeqElemState::initial).collect(),
        }
    }

    pub fn elems(&self) -> &[SeqElemState] {
        &self.elems
    }

    /// Index of the first element that is not complete
    pub fn position(&self) -> usize {
        self.elems
            .iter()
            .position(|state| !state.is_complete())
            .unwrap_or(self.elems.len())
    }

    pub fn is_complete(&self) -> bool {
        self.elems.iter().all(SeqElemState::is_complete)
    }

    /// True when nothing has been consumed yet
    pub fn is_fresh(&self) -> bool {
        self.position() == 0 && !self.in_digits()
    }

    /// True while a digit run is accumulating
    pub fn in_digits(&self) -> bool {
        self.elems
            .iter()
            .any(|state| matches!(state, SeqElemState::Digits(DigitsState::Partial(_))))
    }

    /// Close every digit run in progress.
    ///
    /// A run too long for a `u64` stays open, which leaves the state incomplete.
    pub fn finalize_digits(&mut self) {
        for state in &mut self.elems {
            if let SeqElemState::Digits(DigitsState::Partial(digits)) = state {
                if let Ok(value) = digits.parse::<u64>() {
                    *state = SeqElemState::Digits(DigitsState::Done(value));
                }
            }
        }
    }

    /// Captured values in pattern order
    pub fn captures(&self) -> Vec<u64> {
        self.elems.iter().filter_map(SeqElemState::capture).collect()
    }
}

/// Result of feeding one key combination to a pattern
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Advance {
    Matched { state: SeqMatchState, captures: Vec<u64> },
    Partial(SeqMatchState),
    Failed,
}

impl Advance {
    pub fn is_failed(&self) -> bool {
        matches!(self, Advance::Failed)
    }
}

/// Feed one key combination to a pattern's match state
pub fn advance(state: &SeqMatchState, seq: &KeySeq, combo: &KeyCombination) -> Advance {
    let pattern = seq.elems();
    if pattern.len() != state.elems.len() {
        return Advance::Failed;
    }

    let mut next = state.clone();
    let mut pos = next.position();

    if let Some(SeqElemState::Digits(DigitsState::Partial(digits))) = next.elems.get_mut(pos) {
        if combo.is_bare_digit() {
            digits.push_str(&combo.key);
            return Advance::Partial(next);
        }
        match digits.parse::<u64>() {
            Ok(value) => next.elems[pos] = SeqElemState::Digits(DigitsState::Done(value)),
            Err(_) => return Advance::Failed,
        }
        pos += 1;
    }

    let Some(elem) = pattern.get(pos) else {
        return Advance::Failed;
    };

    next.elems[pos] = match elem {
        SeqElem::Key(expected) if expected == combo => SeqElemState::Key { matched: true },
        SeqElem::Digit if combo.is_bare_digit() => SeqElemState::Digit {
            value: combo.digit().map(u64::from),
        },
        SeqElem::Digits if combo.is_bare_digit() => {
            SeqElemState::Digits(DigitsState::Partial(combo.key.clone()))
        }
        _ => return Advance::Failed,
    };

    if next.is_complete() {
        let captures = next.captures();
        Advance::Matched {
            state: next,
            captures,
        }
    } else {
        Advance::Partial(next)
    }
}
