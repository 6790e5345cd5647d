//! Hotkey demo - type sequences in a raw-mode terminal and watch them resolve
//!
//! Ctrl+C quits.

use std::io::Write;
use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;
use crossterm::event::{self, Event, KeyCode, KeyModifiers, KeyboardEnhancementFlags};
use crossterm::{execute, terminal};
use ricecoder_hotkeys::{
    bridge, format_combinations, Dispatch, EngineEvent, FileStore, HotkeyConfig, HotkeyEngine,
    KeyEvent, KeyEventKind, Keymap, Platform, RecorderEvent,
};
use tokio::sync::mpsc;

/// Interactive hotkey sequence demo
#[derive(Parser, Debug)]
#[command(name = "hotkeys-demo")]
#[command(about = "Match typed key sequences against a keymap")]
#[command(version)]
struct Args {
    /// Keymap document (JSON or YAML)
    #[arg(long)]
    keymap: Option<PathBuf>,

    /// Engine configuration (JSON or YAML)
    #[arg(long)]
    config: Option<PathBuf>,

    /// Record a new binding for this action before matching
    #[arg(long, value_name = "ACTION")]
    record: Option<String>,

    /// Enable debug logging
    #[arg(short, long)]
    verbose: bool,
}

const DEFAULT_KEYMAP: &[(&str, &str)] = &[
    ("ctrl+s", "file.save"),
    ("g g", "cursor.top"),
    ("G", "cursor.bottom"),
    (r"g \d+ j", "cursor.down"),
    (r"\d+ d d", "line.delete"),
    ("ctrl+k ctrl+c", "comment.add"),
    ("ctrl+k ctrl+u", "comment.remove"),
];

/// Restores the terminal when dropped
struct RawModeGuard {
    enhanced: bool,
}

impl RawModeGuard {
    fn enable() -> Result<Self> {
        terminal::enable_raw_mode().context("failed to enable raw mode")?;
        let enhanced = terminal::supports_keyboard_enhancement().unwrap_or(false);
        if enhanced {
            execute!(
                std::io::stdout(),
                event::PushKeyboardEnhancementFlags(KeyboardEnhancementFlags::REPORT_EVENT_TYPES)
            )?;
        }
        Ok(RawModeGuard { enhanced })
    }
}

impl Drop for RawModeGuard {
    fn drop(&mut self) {
        if self.enhanced {
            let _ = execute!(std::io::stdout(), event::PopKeyboardEnhancementFlags);
        }
        let _ = terminal::disable_raw_mode();
    }
}

fn line(text: impl AsRef<str>) {
    let mut stdout = std::io::stdout();
    let _ = write!(stdout, "{}\r\n", text.as_ref());
    let _ = stdout.flush();
}

fn load_keymap(path: Option<&PathBuf>) -> Result<Keymap> {
    match path {
        Some(path) => Keymap::load(path)
            .with_context(|| format!("failed to load keymap from {}", path.display())),
        None => Ok(Keymap::from_pairs(DEFAULT_KEYMAP.iter().copied())),
    }
}

fn describe(event: &EngineEvent, platform: Platform) -> Option<String> {
    let text = match event {
        EngineEvent::Dispatched(Dispatch::Executed {
            pattern,
            actions,
            captures,
        }) => format!("{} -> {} {:?}", pattern, actions.join(", "), captures),
        EngineEvent::Dispatched(Dispatch::Awaiting { pending }) => {
            format!("{} ...", format_combinations(pending, platform).display)
        }
        EngineEvent::Dispatched(Dispatch::Cancelled) => "sequence cancelled".to_string(),
        EngineEvent::Recorded(RecorderEvent::Submitted(seq))
        | EngineEvent::Recorded(RecorderEvent::Flushed(seq)) => format!("recorded {}", seq.id()),
        EngineEvent::Recorded(RecorderEvent::Cancelled) => "recording cancelled".to_string(),
        _ => return None,
    };
    Some(text)
}

/// Read terminal events on a blocking thread until Ctrl+C
fn spawn_reader(tx: mpsc::Sender<KeyEvent>, synthesize_release: bool) {
    tokio::task::spawn_blocking(move || {
        while let Ok(ev) = event::read() {
            let Event::Key(key) = ev else {
                continue;
            };
            if key.code == KeyCode::Char('c') && key.modifiers.contains(KeyModifiers::CONTROL) {
                break;
            }
            let Some(converted) = bridge::from_crossterm(key) else {
                continue;
            };
            let release = (synthesize_release && converted.kind == KeyEventKind::Down).then(|| {
                let mut up = converted.clone();
                up.kind = KeyEventKind::Up;
                up
            });
            if tx.blocking_send(converted).is_err() {
                break;
            }
            if let Some(up) = release {
                if tx.blocking_send(up).is_err() {
                    break;
                }
            }
        }
    });
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    tracing_subscriber::fmt()
        .with_max_level(if args.verbose {
            tracing::Level::DEBUG
        } else {
            tracing::Level::INFO
        })
        .with_writer(std::io::stderr)
        .init();

    let config = match &args.config {
        Some(path) => HotkeyConfig::load(path)
            .with_context(|| format!("failed to load config from {}", path.display()))?,
        None => HotkeyConfig::default(),
    };
    let keymap = load_keymap(args.keymap.as_ref())?;

    let mut engine = HotkeyEngine::new(keymap, config);
    match FileStore::with_default_location() {
        Ok(store) => engine = engine.with_store(Box::new(store)),
        Err(e) => tracing::warn!("running without saved overrides: {}", e),
    }

    for (pattern, info) in engine.conflicts() {
        tracing::warn!(%pattern, kinds = ?info.kinds(), "binding conflict");
    }

    engine.set_handler(Box::new(|action: &str, captures: &[u64]| -> bool {
        line(format!("  run {} {:?}", action, captures));
        true
    }));

    let guard = RawModeGuard::enable()?;
    line("hotkeys-demo: type a sequence, Ctrl+C to quit");
    if let Some(action) = &args.record {
        line(format!("recording a binding for {} (Enter to finish)", action));
        engine.start_recording(Some(action));
    }

    let (tx, rx) = mpsc::channel(64);
    spawn_reader(tx, !guard.enhanced);

    let platform = engine.platform();
    engine
        .run(rx, |event| {
            if let Some(text) = describe(event, platform) {
                line(text);
            }
        })
        .await;
    drop(guard);
    Ok(())
}
