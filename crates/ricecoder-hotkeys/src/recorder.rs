//! Interactive capture of a new binding from raw key-down/key-up pairs
//!
//! A chord is complete when every held key has been released. Tapping `#`
//! cycles the element at the current position through a digit placeholder,
//! a digit-run placeholder and the literal `#` key.

use std::time::Instant;

use crate::config::HotkeyConfig;
use crate::format::{format_elems, FormattedSeq};
use crate::models::{
    is_modifier_key, is_shifted_symbol, modifier_for_key, KeyCombination, KeyEvent, KeyEventKind,
    KeySeq, Modifiers, Platform, SeqElem,
};
use crate::timer::{SequenceTimeout, SequenceTimer};

/// What the recorder did with an event
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RecorderEvent {
    /// Not recording, or the event carried nothing new
    Ignored,
    /// Held keys or the pending sequence changed
    Updated,
    /// Capture finished with Enter or by timeout
    Submitted(KeySeq),
    /// Capture interrupted by Tab, partial input included
    Flushed(KeySeq),
    Cancelled,
}

impl RecorderEvent {
    /// The captured sequence, if the recording ended with one
    pub fn captured(&self) -> Option<&KeySeq> {
        match self {
            RecorderEvent::Submitted(seq) | RecorderEvent::Flushed(seq) => Some(seq),
            _ => None,
        }
    }

    pub fn is_finished(&self) -> bool {
        matches!(
            self,
            RecorderEvent::Submitted(_) | RecorderEvent::Flushed(_) | RecorderEvent::Cancelled
        )
    }
}

/// Result of one key event
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecorderStep {
    pub event: RecorderEvent,
    pub prevent_default: bool,
}

impl RecorderStep {
    fn consumed(event: RecorderEvent) -> Self {
        RecorderStep {
            event,
            prevent_default: true,
        }
    }

    fn ignored() -> Self {
        RecorderStep {
            event: RecorderEvent::Ignored,
            prevent_default: false,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RecorderOptions {
    pub timeout: SequenceTimeout,
    /// Prevent focus traversal when Tab flushes the capture
    pub intercept_tab: bool,
}

impl From<&HotkeyConfig> for RecorderOptions {
    fn from(config: &HotkeyConfig) -> Self {
        RecorderOptions {
            timeout: config.recorder_timeout(),
            intercept_tab: config.intercept_tab,
        }
    }
}

impl Default for RecorderOptions {
    fn default() -> Self {
        RecorderOptions::from(&HotkeyConfig::default())
    }
}

#[derive(Debug, Default)]
struct Recording {
    pending: Vec<SeqElem>,
    /// Raw key names in press order
    held: Vec<String>,
    provisional: Option<KeyCombination>,
    /// Consecutive `#` taps at the current position
    hash_cycle: u8,
}

impl Recording {
    fn refresh_provisional(&mut self, event_modifiers: Modifiers) {
        let Some(key) = self.held.iter().find(|key| !is_modifier_key(key)) else {
            return;
        };

        let mut modifiers = self
            .held
            .iter()
            .filter(|key| is_modifier_key(key))
            .fold(event_modifiers, |acc, key| acc.union(modifier_for_key(key)));
        if is_shifted_symbol(key) {
            modifiers.shift = false;
        }
        self.provisional = Some(KeyCombination::new(key, modifiers));
    }

    fn push_hash(&mut self) {
        match self.hash_cycle {
            0 | 3 => {
                self.pending.push(SeqElem::Digit);
                self.hash_cycle = 1;
            }
            1 => {
                self.replace_last(SeqElem::Digits);
                self.hash_cycle = 2;
            }
            _ => {
                self.replace_last(SeqElem::Key(KeyCombination::bare("#")));
                self.hash_cycle = 3;
            }
        }
    }

    fn replace_last(&mut self, elem: SeqElem) {
        match self.pending.last_mut() {
            Some(last) => *last = elem,
            None => self.pending.push(elem),
        }
    }
}

/// Binding recorder state machine
#[derive(Debug)]
pub struct Recorder {
    options: RecorderOptions,
    recording: Option<Recording>,
    timer: SequenceTimer,
    timeout_paused: bool,
}

impl Recorder {
    pub fn new(options: RecorderOptions) -> Self {
        Recorder {
            options,
            recording: None,
            timer: SequenceTimer::new(),
            timeout_paused: false,
        }
    }

    pub fn set_options(&mut self, options: RecorderOptions) {
        self.options = options;
    }

    /// Begin a fresh capture, discarding any capture in progress
    pub fn start(&mut self) {
        self.timer.cancel();
        self.recording = Some(Recording::default());
        tracing::debug!("recorder started");
    }

    pub fn is_recording(&self) -> bool {
        self.recording.is_some()
    }

    /// Elements captured so far
    pub fn pending(&self) -> KeySeq {
        self.recording
            .as_ref()
            .map(|r| KeySeq::new(r.pending.clone()))
            .unwrap_or_default()
    }

    /// Chord currently held down, not yet committed
    pub fn provisional(&self) -> Option<&KeyCombination> {
        self.recording.as_ref()?.provisional.as_ref()
    }

    pub fn formatted(&self, platform: Platform) -> FormattedSeq {
        let elems = self.recording.as_ref().map_or(&[][..], |r| r.pending.as_slice());
        format_elems(elems, platform)
    }

    pub fn next_deadline(&self) -> Option<Instant> {
        self.timer.deadline()
    }

    pub fn is_timeout_paused(&self) -> bool {
        self.timeout_paused
    }

    pub fn cancel(&mut self) -> RecorderEvent {
        self.timer.cancel();
        match self.recording.take() {
            Some(_) => {
                tracing::debug!("recorder cancelled");
                RecorderEvent::Cancelled
            }
            None => RecorderEvent::Ignored,
        }
    }

    /// Route a raw key event to the down or up handler
    pub fn handle_key(&mut self, event: &KeyEvent, now: Instant) -> RecorderStep {
        match event.kind {
            KeyEventKind::Down => self.key_down(event, now),
            KeyEventKind::Up => self.key_up(event, now),
        }
    }

    pub fn key_down(&mut self, event: &KeyEvent, _now: Instant) -> RecorderStep {
        if self.recording.is_none() {
            return RecorderStep::ignored();
        }

        let combo = event.combination();
        if combo.is_bare("tab") {
            let event = self.flush();
            return RecorderStep {
                event,
                prevent_default: self.options.intercept_tab,
            };
        }
        if combo.is_bare("enter") {
            return RecorderStep::consumed(self.submit());
        }
        if combo.is_bare("escape") {
            return RecorderStep::consumed(self.cancel());
        }

        self.timer.cancel();
        let Some(recording) = self.recording.as_mut() else {
            return RecorderStep::ignored();
        };
        if !recording.held.contains(&event.key) {
            recording.held.push(event.key.clone());
        }
        recording.refresh_provisional(event.modifiers);
        RecorderStep::consumed(RecorderEvent::Updated)
    }

    pub fn key_up(&mut self, event: &KeyEvent, now: Instant) -> RecorderStep {
        let Some(recording) = self.recording.as_mut() else {
            return RecorderStep::ignored();
        };
        let was_held = recording.held.iter().any(|key| *key == event.key);
        recording.held.retain(|key| *key != event.key);

        // Releasing Meta can swallow the key-up of the key pressed with it
        let meta_released = event.key == "meta" && recording.provisional.is_some();
        if !recording.held.is_empty() && !meta_released {
            return RecorderStep::consumed(RecorderEvent::Updated);
        }
        if !was_held && recording.provisional.is_none() {
            return RecorderStep::ignored();
        }
        recording.held.clear();
        RecorderStep::consumed(self.complete_chord(now))
    }

    fn complete_chord(&mut self, now: Instant) -> RecorderEvent {
        let Some(recording) = self.recording.as_mut() else {
            return RecorderEvent::Ignored;
        };

        if let Some(combo) = recording.provisional.take() {
            if combo.is_bare("#") {
                recording.push_hash();
            } else {
                recording.pending.push(SeqElem::Key(combo));
                recording.hash_cycle = 0;
            }
            tracing::debug!(
                pending = %format_elems(&recording.pending, Platform::current()).id,
                "recorder captured chord"
            );
        }

        if recording.pending.is_empty() {
            return RecorderEvent::Updated;
        }
        self.schedule(now)
    }

    /// Arm the timer, or submit right away for a zero timeout
    fn schedule(&mut self, now: Instant) -> RecorderEvent {
        if self.timeout_paused {
            return RecorderEvent::Updated;
        }
        if self.options.timeout.is_immediate() {
            return self.submit();
        }
        self.timer.arm(now, self.options.timeout);
        RecorderEvent::Updated
    }

    /// Submit on an expired deadline
    pub fn handle_timeout(&mut self, now: Instant) -> RecorderEvent {
        if self.recording.is_none() || !self.timer.fire(now) {
            return RecorderEvent::Ignored;
        }
        self.submit()
    }

    /// Suspend or resume the auto-submit timer
    pub fn set_timeout_paused(&mut self, paused: bool, now: Instant) -> RecorderEvent {
        if paused == self.timeout_paused {
            return RecorderEvent::Ignored;
        }
        self.timeout_paused = paused;
        if paused {
            self.timer.cancel();
            return RecorderEvent::Ignored;
        }

        let resumable = self
            .recording
            .as_ref()
            .is_some_and(|r| !r.pending.is_empty() && r.held.is_empty());
        if resumable {
            self.schedule(now)
        } else {
            RecorderEvent::Ignored
        }
    }

    fn submit(&mut self) -> RecorderEvent {
        self.timer.cancel();
        let Some(recording) = self.recording.take() else {
            return RecorderEvent::Ignored;
        };
        if recording.pending.is_empty() {
            tracing::debug!("recorder submitted nothing");
            return RecorderEvent::Cancelled;
        }
        let seq = KeySeq::new(recording.pending);
        tracing::info!(binding = %seq.id(), "recorded binding");
        RecorderEvent::Submitted(seq)
    }

    fn flush(&mut self) -> RecorderEvent {
        self.timer.cancel();
        let Some(mut recording) = self.recording.take() else {
            return RecorderEvent::Ignored;
        };
        if let Some(combo) = recording.provisional.take() {
            recording.pending.push(SeqElem::Key(combo));
        }
        let seq = KeySeq::new(recording.pending);
        tracing::debug!(binding = %seq.id(), "recorder flushed on tab");
        RecorderEvent::Flushed(seq)
    }
}

impl Default for Recorder {
    fn default() -> Self {
        Recorder::new(RecorderOptions::default())
    }
}
