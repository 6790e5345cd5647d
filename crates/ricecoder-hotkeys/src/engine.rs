//! Hotkey engine: one session object owning the keymap, matcher and recorder
//!
//! Events go to the recorder while a capture is in progress and to the
//! dispatcher otherwise. Binding changes are kept as [`UserOverrides`] on top
//! of the declared keymap and written to the configured store. Store failures
//! are logged and never reach the caller.

use std::collections::BTreeMap;
use std::future;
use std::time::Instant;

use tokio::sync::mpsc;

use crate::completion::{Completion, CompletionResolver};
use crate::config::HotkeyConfig;
use crate::conflict::{ConflictDetector, ConflictInfo};
use crate::dispatcher::{Dispatch, DispatchOptions, Dispatcher, HotkeyHandler};
use crate::error::KeymapError;
use crate::keymap::Keymap;
use crate::models::{KeyEvent, Platform};
use crate::persistence::{KeyValueStore, UserOverrides};
use crate::recorder::{Recorder, RecorderEvent, RecorderOptions};
use crate::registry::ActionRegistry;

/// Output of the component that handled an event
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EngineEvent {
    Dispatched(Dispatch),
    Recorded(RecorderEvent),
}

impl EngineEvent {
    pub fn is_ignored(&self) -> bool {
        matches!(
            self,
            EngineEvent::Dispatched(Dispatch::Ignored) | EngineEvent::Recorded(RecorderEvent::Ignored)
        )
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EngineStep {
    pub event: EngineEvent,
    pub prevent_default: bool,
}

/// Hotkey session for one application window or terminal
pub struct HotkeyEngine {
    config: HotkeyConfig,
    declared: Keymap,
    overrides: UserOverrides,
    store: Option<Box<dyn KeyValueStore>>,
    dispatcher: Dispatcher,
    recorder: Recorder,
    /// Action that receives the binding being recorded
    recording_for: Option<String>,
}

impl HotkeyEngine {
    pub fn new(keymap: Keymap, config: HotkeyConfig) -> Self {
        HotkeyEngine {
            dispatcher: Dispatcher::new(keymap.clone(), DispatchOptions::from(&config)),
            recorder: Recorder::new(RecorderOptions::from(&config)),
            config,
            declared: keymap,
            overrides: UserOverrides::new(),
            store: None,
            recording_for: None,
        }
    }

    /// Attach an override store and apply the overrides it holds
    pub fn with_store(mut self, store: Box<dyn KeyValueStore>) -> Self {
        self.overrides = match UserOverrides::load(store.as_ref()) {
            Ok(overrides) => overrides,
            Err(e) => {
                tracing::warn!("failed to load hotkey overrides: {}", e);
                UserOverrides::new()
            }
        };
        self.store = Some(store);
        self.refresh_keymap();
        self
    }

    pub fn set_handler(&mut self, handler: Box<dyn HotkeyHandler>) {
        self.dispatcher.set_handler(handler);
    }

    pub fn config(&self) -> &HotkeyConfig {
        &self.config
    }

    pub fn set_config(&mut self, config: HotkeyConfig) {
        self.dispatcher.set_options(DispatchOptions::from(&config));
        self.recorder.set_options(RecorderOptions::from(&config));
        self.config = config;
    }

    pub fn platform(&self) -> Platform {
        self.config.platform()
    }

    /// Keymap in effect: declared bindings with overrides applied
    pub fn keymap(&self) -> &Keymap {
        self.dispatcher.keymap()
    }

    /// Replace the declared keymap; overrides are re-applied on top
    pub fn set_keymap(&mut self, keymap: Keymap) {
        self.declared = keymap;
        self.refresh_keymap();
    }

    pub fn overrides(&self) -> &UserOverrides {
        &self.overrides
    }

    pub fn dispatcher(&self) -> &Dispatcher {
        &self.dispatcher
    }

    pub fn recorder(&self) -> &Recorder {
        &self.recorder
    }

    /// Route one key event to the recorder or the dispatcher
    pub fn handle_key(&mut self, event: &KeyEvent, now: Instant) -> EngineStep {
        if self.recorder.is_recording() {
            let step = self.recorder.handle_key(event, now);
            self.finish_recording(&step.event);
            return EngineStep {
                event: EngineEvent::Recorded(step.event),
                prevent_default: step.prevent_default,
            };
        }

        let dispatch = self.dispatcher.handle_key(event, now);
        EngineStep {
            prevent_default: dispatch.prevent_default(),
            event: EngineEvent::Dispatched(dispatch),
        }
    }

    /// Deliver an expired deadline to whichever component owns it
    pub fn handle_timeout(&mut self, now: Instant) -> EngineEvent {
        if self.recorder.is_recording() {
            let event = self.recorder.handle_timeout(now);
            self.finish_recording(&event);
            EngineEvent::Recorded(event)
        } else {
            EngineEvent::Dispatched(self.dispatcher.handle_timeout(now))
        }
    }

    pub fn next_deadline(&self) -> Option<Instant> {
        if self.recorder.is_recording() {
            self.recorder.next_deadline()
        } else {
            self.dispatcher.next_deadline()
        }
    }

    /// Start capturing a binding. With an action, the captured sequence becomes its new binding.
    pub fn start_recording(&mut self, action: Option<&str>) {
        self.dispatcher.cancel();
        self.recorder.start();
        self.recording_for = action.map(str::to_string);
    }

    pub fn cancel_recording(&mut self) -> RecorderEvent {
        self.recording_for = None;
        self.recorder.cancel()
    }

    pub fn set_recorder_timeout_paused(&mut self, paused: bool, now: Instant) -> RecorderEvent {
        let event = self.recorder.set_timeout_paused(paused, now);
        self.finish_recording(&event);
        event
    }

    fn finish_recording(&mut self, event: &RecorderEvent) {
        if !event.is_finished() {
            return;
        }
        let Some(action) = self.recording_for.take() else {
            return;
        };
        let Some(seq) = event.captured().filter(|seq| !seq.is_empty()) else {
            return;
        };
        let pattern = seq.id();
        if let Err(e) = self.rebind(&action, Some(&pattern)) {
            tracing::warn!(%action, %pattern, "recorded binding rejected: {}", e);
        }
    }

    /// Bind an action to a new pattern, or disable it with `None`, and persist the change
    pub fn rebind(&mut self, action: &str, pattern: Option<&str>) -> Result<(), KeymapError> {
        let mut candidate = self.keymap().clone();
        candidate.rebind_action(action, pattern)?;

        self.overrides
            .set(action, pattern.map(|p| p.trim().to_string()));
        self.refresh_keymap();
        self.persist();
        tracing::info!(%action, pattern = pattern.unwrap_or("<none>"), "rebound hotkey");
        Ok(())
    }

    /// Drop the override for an action, restoring its declared bindings
    pub fn reset_binding(&mut self, action: &str) {
        if self.overrides.reset(action) {
            self.refresh_keymap();
            self.persist();
        }
    }

    pub fn reset_all(&mut self) {
        if !self.overrides.is_empty() {
            self.overrides = UserOverrides::new();
            self.refresh_keymap();
            self.persist();
        }
    }

    pub fn conflicts(&self) -> BTreeMap<String, ConflictInfo> {
        ConflictDetector::detect(self.keymap())
    }

    pub fn check_binding(&self, pattern: &str, action: &str) -> Option<ConflictInfo> {
        ConflictDetector::check_binding(self.keymap(), pattern, action)
    }

    /// Continuations of the keys typed in the current session
    pub fn completions(&self) -> Vec<Completion> {
        CompletionResolver::resolve(self.dispatcher.pending(), self.keymap(), self.platform())
    }

    pub fn enabled_completions(&self, registry: &dyn ActionRegistry) -> Vec<Completion> {
        CompletionResolver::resolve_enabled(
            self.dispatcher.pending(),
            self.keymap(),
            self.platform(),
            registry,
        )
    }

    fn refresh_keymap(&mut self) {
        let mut keymap = self.declared.clone();
        self.overrides.apply(&mut keymap);
        self.dispatcher.set_keymap(keymap);
    }

    fn persist(&self) {
        let Some(store) = self.store.as_ref() else {
            return;
        };
        if let Err(e) = self.overrides.save(store.as_ref()) {
            tracing::warn!("failed to persist hotkey overrides: {}", e);
        }
    }

    /// Drive the engine from a channel of key events until the sender is dropped.
    ///
    /// Deadlines are awaited on the tokio clock, so paused test time works.
    pub async fn run<F>(&mut self, mut events: mpsc::Receiver<KeyEvent>, mut on_event: F)
    where
        F: FnMut(&EngineEvent),
    {
        loop {
            let deadline = self.next_deadline();
            tokio::select! {
                received = events.recv() => match received {
                    Some(event) => {
                        let step = self.handle_key(&event, tokio::time::Instant::now().into_std());
                        if !step.event.is_ignored() {
                            on_event(&step.event);
                        }
                    }
                    None => break,
                },
                _ = sleep_until(deadline) => {
                    let event = self.handle_timeout(tokio::time::Instant::now().into_std());
                    if !event.is_ignored() {
                        on_event(&event);
                    }
                }
            }
        }
        tracing::debug!("hotkey event channel closed");
    }
}

async fn sleep_until(deadline: Option<Instant>) {
    match deadline {
        Some(deadline) => tokio::time::sleep_until(tokio::time::Instant::from_std(deadline)).await,
        None => future::pending::<()>().await,
    }
}

impl std::fmt::Debug for HotkeyEngine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HotkeyEngine")
            .field("config", &self.config)
            .field("keymap", self.keymap())
            .field("overrides", &self.overrides)
            .field("has_store", &self.store.is_some())
            .field("recording_for", &self.recording_for)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Modifiers;
    use crate::persistence::MemoryStore;

    #[test]
    fn test_rebind_rejects_empty_pattern() {
        let mut engine = HotkeyEngine::new(Keymap::from_pairs([("ctrl+s", "save")]), HotkeyConfig::default());
        assert!(matches!(
            engine.rebind("save", Some("  ")),
            Err(KeymapError::EmptyPattern)
        ));
        assert_eq!(engine.keymap().patterns_for_action("save"), vec!["ctrl+s"]);
        assert!(engine.overrides().is_empty());
    }

    #[test]
    fn test_reset_binding_restores_declared() {
        let mut engine = HotkeyEngine::new(Keymap::from_pairs([("ctrl+s", "save")]), HotkeyConfig::default())
            .with_store(Box::new(MemoryStore::new()));
        engine.rebind("save", Some("g s")).unwrap();
        assert_eq!(engine.keymap().patterns_for_action("save"), vec!["g s"]);
        engine.reset_binding("save");
        assert_eq!(engine.keymap().patterns_for_action("save"), vec!["ctrl+s"]);
    }

    #[test]
    fn test_recording_does_not_dispatch() {
        let mut engine = HotkeyEngine::new(Keymap::from_pairs([("x", "cut")]), HotkeyConfig::default());
        engine.start_recording(None);
        let step = engine.handle_key(&KeyEvent::down("x", Modifiers::NONE), Instant::now());
        assert_eq!(step.event, EngineEvent::Recorded(RecorderEvent::Updated));
    }
}
