//! Main-screen selection.
//!
//! Screens are resolved from an explicit registry keyed by the
//! configured screen name. An unknown key falls back to a no-op
//! placeholder so a bad configuration never prevents startup from
//! reporting what went wrong.

use std::collections::HashMap;

use tokio::task::JoinHandle;
use tracing::{info, warn};

use remuco_core::{LogView, Player, PlayerEvent};

// ── MainScreen ───────────────────────────────────────────────────

/// The narrow surface the session driver needs from a UI.
pub trait MainScreen: Send {
    /// Hand the screen its player session and the shared log view.
    fn set_up(&mut self, player: Player, log: LogView);

    /// Give or take the screen's turn (foreground/background).
    fn activate(&mut self, active: bool);
}

/// Factory producing a boxed screen.
pub type ScreenFactory = fn() -> Box<dyn MainScreen>;

// ── Registry ─────────────────────────────────────────────────────

/// Maps configuration keys to screen factories.
pub struct ScreenRegistry {
    factories: HashMap<&'static str, ScreenFactory>,
}

impl Default for ScreenRegistry {
    fn default() -> Self {
        let mut registry = Self {
            factories: HashMap::new(),
        };
        registry.register("console", || Box::new(ConsoleScreen::new()));
        registry
    }
}

impl ScreenRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a factory under a key, replacing any previous one.
    pub fn register(&mut self, key: &'static str, factory: ScreenFactory) {
        self.factories.insert(key, factory);
    }

    /// Resolve a screen by key, falling back to the placeholder.
    pub fn resolve(&self, key: &str) -> Box<dyn MainScreen> {
        match self.factories.get(key) {
            Some(factory) => factory(),
            None => {
                warn!("no main screen registered for {key:?}; using placeholder");
                Box::new(PlaceholderScreen)
            }
        }
    }
}

// ── PlaceholderScreen ────────────────────────────────────────────

/// A screen that does nothing. Used when resolution fails.
pub struct PlaceholderScreen;

impl MainScreen for PlaceholderScreen {
    fn set_up(&mut self, _player: Player, _log: LogView) {}

    fn activate(&mut self, _active: bool) {}
}

// ── ConsoleScreen ────────────────────────────────────────────────

/// Minimal terminal screen: prints decoded player events as lines.
pub struct ConsoleScreen {
    player: Option<Player>,
    task: Option<JoinHandle<()>>,
}

impl ConsoleScreen {
    pub fn new() -> Self {
        Self {
            player: None,
            task: None,
        }
    }
}

impl Default for ConsoleScreen {
    fn default() -> Self {
        Self::new()
    }
}

impl MainScreen for ConsoleScreen {
    fn set_up(&mut self, player: Player, _log: LogView) {
        info!("remote player: {}", player.info().name);
        self.player = Some(player);
    }

    fn activate(&mut self, active: bool) {
        if active {
            let Some(mut player) = self.player.take() else {
                return;
            };
            self.task = Some(tokio::spawn(async move {
                while let Some(event) = player.next_event().await {
                    match event {
                        PlayerEvent::State(state) => {
                            info!(
                                "{:?}, volume {}%, shuffle {}, repeat {}",
                                state.playback, state.volume, state.shuffle, state.repeat
                            );
                        }
                        PlayerEvent::Item(item) => {
                            info!("now loaded: {} - {}", item.artist, item.title);
                        }
                        PlayerEvent::Progress(p) => {
                            info!("{}s / {}s", p.position_secs, p.length_secs);
                        }
                    }
                }
                info!("player event stream ended");
            }));
        } else if let Some(task) = self.task.take() {
            task.abort();
        }
    }
}

impl Drop for ConsoleScreen {
    fn drop(&mut self) {
        if let Some(task) = self.task.take() {
            task.abort();
        }
    }
}
