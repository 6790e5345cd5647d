//! Hotkey sequence engine for ricecoder
//!
//! This crate matches a live stream of key events against declared bindings:
//! - Pattern parsing and platform-aware formatting (`g \d+ j`, `ctrl+k ctrl+c`)
//! - Incremental matching with numeric captures and sequence timeouts
//! - Static conflict detection (duplicates, overlaps, prefixes)
//! - Completion of partially typed sequences
//! - Interactive recording of new bindings
//! - JSON/YAML keymaps and config, persisted user overrides

pub mod bridge;
pub mod completion;
pub mod config;
pub mod conflict;
pub mod dispatcher;
pub mod engine;
pub mod error;
pub mod format;
pub mod keymap;
pub mod matcher;
pub mod models;
pub mod parser;
pub mod persistence;
pub mod recorder;
pub mod registry;
pub mod timer;

// Re-export public types
pub use completion::{Completion, CompletionResolver};
pub use config::{HotkeyConfig, TimeoutPolicy};
pub use conflict::{elems_compatible, ConflictDetector, ConflictInfo, ConflictKind};
pub use dispatcher::{Dispatch, DispatchOptions, Dispatcher, HandlerSlot, HotkeyHandler};
pub use engine::{EngineEvent, EngineStep, HotkeyEngine};
pub use error::{ConfigError, KeymapError, StoreError};
pub use format::{combination_display, combination_id, format_combinations, format_key_seq, FormattedSeq};
pub use keymap::{Keymap, KeymapEntry};
pub use matcher::{advance, Advance, DigitsState, SeqElemState, SeqMatchState};
pub use models::{
    normalize_key, KeyCombination, KeyEvent, KeyEventKind, KeySeq, Modifiers, Platform, SeqElem,
};
pub use parser::{
    parse_key_seq, JsonKeymapParser, KeybindEntry, KeymapParser, ParserRegistry, YamlKeymapParser,
};
pub use persistence::{FileStore, KeyValueStore, MemoryStore, UserOverrides, OVERRIDES_KEY};
pub use recorder::{Recorder, RecorderEvent, RecorderOptions, RecorderStep};
pub use registry::{ActionInfo, ActionRegistry, StaticActionRegistry};
pub use timer::{SequenceTimeout, SequenceTimer};
