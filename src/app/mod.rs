//! Application state types and entry glue.
//!
//! Defines the state owned by the interactive console, the events that
//! background requests send back to it, and the theme. The event loop itself
//! lives in [`update`] (re-exported as `run`).

pub mod keymap;
pub mod update;

use std::borrow::Cow;
use std::path::Path;
use std::sync::Arc;

use ratatui::style::Color;
use serde_json::Value;
use tokio::sync::mpsc::{self, UnboundedReceiver, UnboundedSender};

use crate::api::UserApi;
use crate::config::DeployMode;
use crate::error::TransportError;
use crate::form::FormState;
use crate::model::UserRecord;
use crate::notify::Notifier;
use crate::search;
use crate::store::UserStore;
use keymap::Keymap;

/// Current input mode for key handling.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum InputMode {
    /// The user list has focus; keys go through the keymap.
    Normal,
    /// Typing a search query.
    Search,
    /// Typing into the add-user form.
    Form,
    Modal,
}

/// Overlay dialogs.
#[derive(Clone, Debug, PartialEq)]
pub enum ModalState {
    /// Detail of one user from the visible list.
    Detail(UserRecord),
    Help { scroll: u16 },
}

/// Completion of a request spawned by the event loop.
#[derive(Debug)]
pub enum AppEvent {
    UsersLoaded {
        seq: u64,
        result: Result<Value, TransportError>,
    },
    UserCreated(Result<(), TransportError>),
}

/// Color palette for theming the TUI.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Theme {
    pub text: Color,
    pub muted: Color,
    pub title: Color,
    pub border: Color,
    pub header_bg: Color,
    pub header_fg: Color,
    pub status_bg: Color,
    pub status_fg: Color,
    pub highlight_fg: Color,
    pub highlight_bg: Color,
    pub success: Color,
    pub error: Color,
}

impl Theme {
    /// Catppuccin Mocha theme defaults.
    pub fn mocha() -> Self {
        // Palette reference: https://github.com/catppuccin/catppuccin
        Self {
            text: Color::Rgb(0xcd, 0xd6, 0xf4),         // text
            muted: Color::Rgb(0x7f, 0x84, 0x9c),        // overlay1
            title: Color::Rgb(0xcb, 0xa6, 0xf7),        // mauve
            border: Color::Rgb(0x58, 0x5b, 0x70),       // surface2
            header_bg: Color::Rgb(0x31, 0x32, 0x44),    // surface0
            header_fg: Color::Rgb(0xb4, 0xbe, 0xfe),    // lavender
            status_bg: Color::Rgb(0x45, 0x47, 0x5a),    // surface1
            status_fg: Color::Rgb(0xcd, 0xd6, 0xf4),    // text
            highlight_fg: Color::Rgb(0xf9, 0xe2, 0xaf), // yellow
            highlight_bg: Color::Rgb(0x45, 0x47, 0x5a), // surface1
            success: Color::Rgb(0xa6, 0xe3, 0xa1),      // green
            error: Color::Rgb(0xf3, 0x8b, 0xa8),        // red
        }
    }

    /// Parse `key = color` lines on top of `mocha`. Unknown keys and bad
    /// colors are skipped.
    pub fn parse(contents: &str) -> Self {
        let mut theme = Self::mocha();
        for raw_line in contents.lines() {
            let line = raw_line.trim();
            if line.is_empty() || line.starts_with('#') {
                continue;
            }
            let Some((key, val)) = line.split_once('=') else {
                continue;
            };
            let Some(color) = Self::parse_color(val) else {
                continue;
            };
            match key.trim() {
                "text" => theme.text = color,
                "muted" => theme.muted = color,
                "title" => theme.title = color,
                "border" => theme.border = color,
                "header_bg" => theme.header_bg = color,
                "header_fg" => theme.header_fg = color,
                "status_bg" => theme.status_bg = color,
                "status_fg" => theme.status_fg = color,
                "highlight_fg" => theme.highlight_fg = color,
                "highlight_bg" => theme.highlight_bg = color,
                "success" => theme.success = color,
                "error" => theme.error = color,
                _ => {}
            }
        }
        theme
    }

    pub fn from_file(path: &Path) -> Option<Self> {
        let contents = std::fs::read_to_string(path).ok()?;
        Some(Self::parse(&contents))
    }

    /// Parse a color from hex ("#RRGGBB" or "RRGGBB") or "reset".
    fn parse_color(s: &str) -> Option<Color> {
        let lower = s.trim().to_ascii_lowercase();
        if lower == "reset" {
            return Some(Color::Reset);
        }
        let hex = lower.strip_prefix('#').unwrap_or(&lower);
        if hex.len() != 6 || !hex.is_ascii() {
            return None;
        }
        let channel = |i: usize| u8::from_str_radix(hex.get(i..i + 2)?, 16).ok();
        Some(Color::Rgb(channel(0)?, channel(2)?, channel(4)?))
    }

    fn color_to_str(c: Color) -> String {
        match c {
            Color::Rgb(r, g, b) => format!("#{:02X}{:02X}{:02X}", r, g, b),
            Color::Reset => "reset".to_string(),
            // best-effort hex for named colors
            Color::Black => "#000000".to_string(),
            Color::Red => "#FF0000".to_string(),
            Color::Green => "#00FF00".to_string(),
            Color::Yellow => "#FFFF00".to_string(),
            Color::Cyan => "#00FFFF".to_string(),
            Color::Gray => "#B3B3B3".to_string(),
            Color::DarkGray => "#4D4D4D".to_string(),
            Color::White => "#FFFFFF".to_string(),
            _ => "reset".to_string(),
        }
    }

    /// Persist the theme in key=value format.
    pub fn write_file(&self, path: &Path) -> std::io::Result<()> {
        use std::fmt::Write as _;
        let mut buf = String::new();
        buf.push_str("# userdesk theme configuration\n");
        buf.push_str("# Colors: hex as #RRGGBB or RRGGBB, or 'reset'\n\n");
        for (k, v) in [
            ("text", self.text),
            ("muted", self.muted),
            ("title", self.title),
            ("border", self.border),
            ("header_bg", self.header_bg),
            ("header_fg", self.header_fg),
            ("status_bg", self.status_bg),
            ("status_fg", self.status_fg),
            ("highlight_fg", self.highlight_fg),
            ("highlight_bg", self.highlight_bg),
            ("success", self.success),
            ("error", self.error),
        ] {
            let _ = writeln!(&mut buf, "{} = {}", k, Self::color_to_str(v));
        }
        std::fs::write(path, buf)
    }

    /// Load from `path`; if missing, write `mocha` there and return it.
    pub fn load_or_init(path: &Path) -> Self {
        if path.exists() {
            return Self::from_file(path).unwrap_or_else(Self::mocha);
        }
        let t = Self::mocha();
        if let Err(err) = t.write_file(path) {
            tracing::debug!(path = %path.display(), %err, "could not write default theme");
        }
        t
    }
}

pub struct AppState {
    pub api: Arc<dyn UserApi>,
    pub base_url: String,
    pub mode: DeployMode,
    pub store: UserStore,
    pub form: FormState,
    pub notifier: Notifier,
    pub input_mode: InputMode,
    pub search_query: String,
    pub selected_index: usize,
    pub rows_per_page: usize,
    pub modal: Option<ModalState>,
    pub theme: Theme,
    pub keymap: Keymap,
    pub should_quit: bool,
    /// Sequence number of the fetch whose result is still wanted.
    pub(crate) fetch_seq: u64,
    events_tx: UnboundedSender<AppEvent>,
    events_rx: UnboundedReceiver<AppEvent>,
}

impl AppState {
    pub fn new(api: Arc<dyn UserApi>, base_url: impl Into<String>, mode: DeployMode) -> Self {
        let (events_tx, events_rx) = mpsc::unbounded_channel();
        Self {
            api,
            base_url: base_url.into(),
            mode,
            store: UserStore::new(),
            form: FormState::new(),
            notifier: Notifier::new(),
            input_mode: InputMode::Normal,
            search_query: String::new(),
            selected_index: 0,
            rows_per_page: 10,
            modal: None,
            theme: Theme::mocha(),
            keymap: Keymap::default(),
            should_quit: false,
            fetch_seq: 0,
            events_tx,
            events_rx,
        }
    }

    pub fn with_theme(mut self, theme: Theme) -> Self {
        self.theme = theme;
        self
    }

    pub fn with_keymap(mut self, keymap: Keymap) -> Self {
        self.keymap = keymap;
        self
    }

    /// The canonical list filtered by the current search query.
    pub fn visible_users(&self) -> Cow<'_, [UserRecord]> {
        search::apply(self.store.users(), &self.search_query)
    }

    pub fn selected_user(&self) -> Option<UserRecord> {
        self.visible_users().get(self.selected_index).cloned()
    }

    /// Keep the selection inside the visible list.
    pub fn clamp_selection(&mut self) {
        let len = self.visible_users().len();
        self.selected_index = self.selected_index.min(len.saturating_sub(1));
    }

    pub(crate) fn events_tx(&self) -> UnboundedSender<AppEvent> {
        self.events_tx.clone()
    }

    pub(crate) fn try_next_event(&mut self) -> Option<AppEvent> {
        self.events_rx.try_recv().ok()
    }

    /// Wait for the next request completion.
    pub async fn next_event(&mut self) -> Option<AppEvent> {
        self.events_rx.recv().await
    }
}

/// Re-export the application event loop entry function.
pub use update::run_app as run;
