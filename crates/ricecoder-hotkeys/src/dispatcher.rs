//! Live matcher: consumes key-down events and dispatches bound actions
//!
//! The dispatcher is either idle or awaiting more keys. While awaiting it owns
//! the pending keys, one match state per surviving pattern and the sequence
//! timer. A session is thrown away as soon as it ends, whether by execution,
//! cancellation or timeout.

use std::collections::BTreeMap;
use std::time::Instant;

use crate::config::{HotkeyConfig, TimeoutPolicy};
use crate::format::format_combinations;
use crate::keymap::Keymap;
use crate::matcher::{advance, Advance, SeqMatchState};
use crate::models::{KeyCombination, KeyEvent, KeyEventKind, Platform};
use crate::timer::{SequenceTimeout, SequenceTimer};

/// Receives executed actions and sequence notifications
pub trait HotkeyHandler {
    /// Run an action. Returns false when the action could not be handled.
    fn execute(&mut self, action: &str, captures: &[u64]) -> bool;

    fn on_sequence_start(&mut self, _pending: &[KeyCombination]) {}

    fn on_sequence_progress(&mut self, _pending: &[KeyCombination]) {}

    fn on_sequence_cancel(&mut self) {}
}

impl<F> HotkeyHandler for F
where
    F: FnMut(&str, &[u64]) -> bool,
{
    fn execute(&mut self, action: &str, captures: &[u64]) -> bool {
        self(action, captures)
    }
}

/// Holds the current handler so it can be swapped without rebuilding the dispatcher
///
/// With no handler installed every match counts as handled and the caller acts
/// on the returned [`Dispatch`].
#[derive(Default)]
pub struct HandlerSlot {
    handler: Option<Box<dyn HotkeyHandler>>,
}

impl HandlerSlot {
    pub fn set(&mut self, handler: Box<dyn HotkeyHandler>) {
        self.handler = Some(handler);
    }

    pub fn clear(&mut self) {
        self.handler = None;
    }

    pub fn is_set(&self) -> bool {
        self.handler.is_some()
    }

    /// Run every bound action; handled if any of them was
    fn execute_all(&mut self, actions: &[String], captures: &[u64]) -> bool {
        match self.handler.as_mut() {
            Some(handler) => actions
                .iter()
                .fold(false, |handled, action| handler.execute(action, captures) || handled),
            None => true,
        }
    }

    fn start(&mut self, pending: &[KeyCombination]) {
        if let Some(handler) = self.handler.as_mut() {
            handler.on_sequence_start(pending);
        }
    }

    fn progress(&mut self, pending: &[KeyCombination]) {
        if let Some(handler) = self.handler.as_mut() {
            handler.on_sequence_progress(pending);
        }
    }

    fn cancel(&mut self) {
        if let Some(handler) = self.handler.as_mut() {
            handler.on_sequence_cancel();
        }
    }
}

impl std::fmt::Debug for HandlerSlot {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HandlerSlot")
            .field("is_set", &self.is_set())
            .finish()
    }
}

/// Decision taken for one event or timeout
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Dispatch {
    /// Not a hotkey; the host should handle the key normally
    Ignored,
    Executed {
        pattern: String,
        actions: Vec<String>,
        captures: Vec<u64>,
    },
    /// Waiting for more keys
    Awaiting { pending: Vec<KeyCombination> },
    Cancelled,
}

impl Dispatch {
    /// Whether the host's default action for the key should be suppressed
    pub fn prevent_default(&self) -> bool {
        !matches!(self, Dispatch::Ignored)
    }

    pub fn is_executed(&self) -> bool {
        matches!(self, Dispatch::Executed { .. })
    }
}

/// Options the dispatcher reads on every event
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DispatchOptions {
    pub timeout: SequenceTimeout,
    pub policy: TimeoutPolicy,
    pub enable_on_editable: bool,
    pub platform: Platform,
}

impl From<&HotkeyConfig> for DispatchOptions {
    fn from(config: &HotkeyConfig) -> Self {
        DispatchOptions {
            timeout: config.sequence_timeout(),
            policy: config.timeout_policy,
            enable_on_editable: config.enable_on_editable,
            platform: config.platform(),
        }
    }
}

impl Default for DispatchOptions {
    fn default() -> Self {
        DispatchOptions::from(&HotkeyConfig::default())
    }
}

#[derive(Debug, Default)]
struct Session {
    pending: Vec<KeyCombination>,
    /// Keyed by keymap declaration index
    states: BTreeMap<usize, SeqMatchState>,
}

/// The live hotkey matcher
#[derive(Debug)]
pub struct Dispatcher {
    keymap: Keymap,
    options: DispatchOptions,
    session: Option<Session>,
    timer: SequenceTimer,
    handler: HandlerSlot,
}

impl Dispatcher {
    pub fn new(keymap: Keymap, options: DispatchOptions) -> Self {
        Dispatcher {
            keymap,
            options,
            session: None,
            timer: SequenceTimer::new(),
            handler: HandlerSlot::default(),
        }
    }

    pub fn set_handler(&mut self, handler: Box<dyn HotkeyHandler>) {
        self.handler.set(handler);
    }

    pub fn clear_handler(&mut self) {
        self.handler.clear();
    }

    /// Replace the keymap. Any session in progress is cancelled.
    pub fn set_keymap(&mut self, keymap: Keymap) {
        self.cancel();
        self.keymap = keymap;
    }

    pub fn keymap(&self) -> &Keymap {
        &self.keymap
    }

    pub fn set_options(&mut self, options: DispatchOptions) {
        self.options = options;
    }

    pub fn options(&self) -> &DispatchOptions {
        &self.options
    }

    pub fn is_awaiting(&self) -> bool {
        self.session.is_some()
    }

    /// Keys typed so far in the current session
    pub fn pending(&self) -> &[KeyCombination] {
        self.session.as_ref().map_or(&[], |s| s.pending.as_slice())
    }

    /// Patterns still in play, in declaration order
    pub fn tracked_patterns(&self) -> Vec<&str> {
        self.session.as_ref().map_or_else(Vec::new, |session| {
            session
                .states
                .keys()
                .filter_map(|&idx| self.keymap.entry(idx))
                .map(|entry| entry.pattern.as_str())
                .collect()
        })
    }

    /// Match state of a tracked pattern
    pub fn match_state(&self, pattern: &str) -> Option<&SeqMatchState> {
        let session = self.session.as_ref()?;
        let idx = self
            .keymap
            .entries()
            .iter()
            .position(|entry| entry.pattern == pattern.trim())?;
        session.states.get(&idx)
    }

    pub fn next_deadline(&self) -> Option<Instant> {
        self.timer.deadline()
    }

    /// Process one keyboard event
    pub fn handle_key(&mut self, event: &KeyEvent, now: Instant) -> Dispatch {
        if event.kind != KeyEventKind::Down || event.is_modifier_key() {
            return Dispatch::Ignored;
        }
        if event.targets_editable && !self.options.enable_on_editable {
            return Dispatch::Ignored;
        }

        let combo = event.combination();
        if self.session.is_some() {
            if combo.is_bare("enter") {
                return self.submit();
            }
            if combo.is_bare("escape") {
                return self.cancel();
            }
            if combo.is_bare("backspace") && !self.backspace_continues(&combo) {
                return self.undo_last(now);
            }
        }

        self.step(combo, now)
    }

    /// Resolve the session if its timer has expired at `now`
    pub fn handle_timeout(&mut self, now: Instant) -> Dispatch {
        if self.session.is_none() || !self.timer.fire(now) {
            return Dispatch::Ignored;
        }
        tracing::debug!(pending = %self.pending_id(), "hotkey sequence timed out");
        self.resolve_expired(true)
    }

    /// Cancel the current session, if any
    pub fn cancel(&mut self) -> Dispatch {
        self.timer.cancel();
        match self.session.take() {
            Some(session) => {
                tracing::debug!(
                    pending = %format_combinations(&session.pending, self.options.platform).id,
                    "hotkey sequence cancelled"
                );
                self.handler.cancel();
                Dispatch::Cancelled
            }
            None => Dispatch::Ignored,
        }
    }

    fn step(&mut self, combo: KeyCombination, now: Instant) -> Dispatch {
        let from_idle = self.session.is_none();
        let candidates: Vec<(usize, SeqMatchState)> = match &self.session {
            None => self
                .keymap
                .entries()
                .iter()
                .enumerate()
                .map(|(idx, entry)| (idx, SeqMatchState::new(&entry.seq)))
                .collect(),
            Some(session) => session
                .states
                .iter()
                .map(|(&idx, state)| (idx, state.clone()))
                .collect(),
        };

        let mut matched: Vec<(usize, Vec<u64>)> = Vec::new();
        let mut partial = 0usize;
        let mut survivors = BTreeMap::new();
        for (idx, state) in candidates {
            let Some(entry) = self.keymap.entry(idx) else {
                continue;
            };
            match advance(&state, &entry.seq, &combo) {
                Advance::Matched { state, captures } => {
                    matched.push((idx, captures));
                    survivors.insert(idx, state);
                }
                Advance::Partial(state) => {
                    partial += 1;
                    survivors.insert(idx, state);
                }
                Advance::Failed => {}
            }
        }

        tracing::debug!(
            key = %combo,
            matched = matched.len(),
            partial,
            from_idle,
            "advanced hotkey patterns"
        );

        if matched.len() == 1 && partial == 0 {
            let (idx, captures) = matched.remove(0);
            self.timer.cancel();
            self.session = None;
            if let Some(dispatch) = self.execute(idx, captures) {
                return dispatch;
            }
            if from_idle {
                return Dispatch::Ignored;
            }
            self.handler.cancel();
            return Dispatch::Cancelled;
        }

        if from_idle && matched.is_empty() && partial == 0 {
            return Dispatch::Ignored;
        }

        self.timer.cancel();
        let session = self.session.get_or_insert_with(Session::default);
        session.pending.push(combo);
        session.states = survivors;

        if self.options.timeout.is_immediate() {
            return self.resolve_expired(!from_idle);
        }

        let pending = session.pending.clone();
        if from_idle {
            self.handler.start(&pending);
        } else {
            self.handler.progress(&pending);
        }
        self.timer.arm(now, self.options.timeout);
        Dispatch::Awaiting { pending }
    }

    /// Whether Backspace would itself advance a tracked pattern
    fn backspace_continues(&self, combo: &KeyCombination) -> bool {
        let Some(session) = &self.session else {
            return false;
        };
        session.states.iter().any(|(&idx, state)| {
            !state.in_digits()
                && self
                    .keymap
                    .entry(idx)
                    .is_some_and(|entry| !advance(state, &entry.seq, combo).is_failed())
        })
    }

    /// Drop the last pending key and rebuild every match state from scratch
    fn undo_last(&mut self, now: Instant) -> Dispatch {
        self.timer.cancel();
        let Some(mut session) = self.session.take() else {
            return Dispatch::Ignored;
        };
        session.pending.pop();
        if session.pending.is_empty() {
            self.handler.cancel();
            return Dispatch::Cancelled;
        }

        let states = self.replay(&session.pending);
        let pending = session.pending;
        tracing::debug!(
            pending = %format_combinations(&pending, self.options.platform).id,
            tracked = states.len(),
            "replayed hotkey sequence after backspace"
        );
        self.session = Some(Session {
            pending: pending.clone(),
            states,
        });
        if self.options.timeout.is_immediate() {
            return self.resolve_expired(true);
        }
        self.handler.progress(&pending);
        self.timer.arm(now, self.options.timeout);
        Dispatch::Awaiting { pending }
    }

    /// Match states obtained by feeding `pending` to fresh states of every pattern
    pub fn replay(&self, pending: &[KeyCombination]) -> BTreeMap<usize, SeqMatchState> {
        let mut states: BTreeMap<usize, SeqMatchState> = self
            .keymap
            .entries()
            .iter()
            .enumerate()
            .map(|(idx, entry)| (idx, SeqMatchState::new(&entry.seq)))
            .collect();

        for combo in pending {
            states = states
                .into_iter()
                .filter_map(|(idx, state)| {
                    let entry = self.keymap.entry(idx)?;
                    match advance(&state, &entry.seq, combo) {
                        Advance::Matched { state, .. } | Advance::Partial(state) => {
                            Some((idx, state))
                        }
                        Advance::Failed => None,
                    }
                })
                .collect();
        }
        states
    }

    /// Enter: execute the first complete pattern or give up
    fn submit(&mut self) -> Dispatch {
        self.timer.cancel();
        let Some(mut session) = self.session.take() else {
            return Dispatch::Ignored;
        };

        for state in session.states.values_mut() {
            state.finalize_digits();
        }
        for (&idx, state) in &session.states {
            if state.is_complete() {
                if let Some(dispatch) = self.execute(idx, state.captures()) {
                    return dispatch;
                }
            }
        }

        let typed = format_combinations(&session.pending, self.options.platform).id;
        let exact = self
            .keymap
            .entries()
            .iter()
            .position(|entry| !entry.seq.has_placeholders() && entry.seq.id() == typed);
        if let Some(idx) = exact {
            if let Some(dispatch) = self.execute(idx, Vec::new()) {
                return dispatch;
            }
        }

        tracing::debug!(pending = %typed, "no complete hotkey on enter");
        self.handler.cancel();
        Dispatch::Cancelled
    }

    fn resolve_expired(&mut self, notify: bool) -> Dispatch {
        self.timer.cancel();
        let Some(mut session) = self.session.take() else {
            return Dispatch::Ignored;
        };

        if self.options.policy == TimeoutPolicy::Submit {
            for state in session.states.values_mut() {
                state.finalize_digits();
            }
            for (&idx, state) in &session.states {
                if state.is_complete() {
                    if let Some(dispatch) = self.execute(idx, state.captures()) {
                        return dispatch;
                    }
                }
            }
        }

        if notify {
            self.handler.cancel();
        }
        Dispatch::Cancelled
    }

    fn execute(&mut self, idx: usize, captures: Vec<u64>) -> Option<Dispatch> {
        let entry = self.keymap.entry(idx)?;
        let pattern = entry.pattern.clone();
        let actions = entry.actions.clone();
        if !self.handler.execute_all(&actions, &captures) {
            tracing::debug!(%pattern, "hotkey handler declined actions");
            return None;
        }
        tracing::info!(%pattern, ?actions, ?captures, "executed hotkey");
        Some(Dispatch::Executed {
            pattern,
            actions,
            captures,
        })
    }

    fn pending_id(&self) -> String {
        format_combinations(self.pending(), self.options.platform).id
    }
}
