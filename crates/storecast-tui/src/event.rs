//! Event handling for the STORECAST TUI.
//!
//! Provides keyboard input handling and event routing.

use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};

/// Application-level events that can trigger state changes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AppEvent {
    /// Request application quit
    Quit,
    /// Force quit (Ctrl+C)
    ForceQuit,
    /// Show help overlay
    ShowHelp,
    /// Cancel current overlay
    Cancel,
    /// Move up in the store list
    NavigateUp,
    /// Move down in the store list
    NavigateDown,
    /// Jump to the top of the store list
    GoToTop,
    /// Jump to the bottom of the store list
    GoToBottom,
    /// Select the highlighted store
    Select,
    /// Re-run the health check and reload the catalog
    Refresh,
    /// No action needed
    None,
}

/// Input handler for converting key events to app events.
#[derive(Debug, Default)]
pub struct InputHandler;

impl InputHandler {
    pub fn new() -> Self {
        Self
    }

    /// Handle a key event and return the corresponding app event.
    pub fn handle_key(&self, key: KeyEvent) -> AppEvent {
        // Ctrl+C always force quits
        if key.modifiers.contains(KeyModifiers::CONTROL) && key.code == KeyCode::Char('c') {
            return AppEvent::ForceQuit;
        }

        match key.code {
            KeyCode::Char('q') | KeyCode::Char('Q') => AppEvent::Quit,
            KeyCode::Char('?') | KeyCode::Char('h') | KeyCode::Char('H') => AppEvent::ShowHelp,
            KeyCode::Esc => AppEvent::Cancel,

            KeyCode::Up | KeyCode::Char('k') => AppEvent::NavigateUp,
            KeyCode::Down | KeyCode::Char('j') => AppEvent::NavigateDown,
            KeyCode::Home | KeyCode::Char('g') => AppEvent::GoToTop,
            KeyCode::End | KeyCode::Char('G') => AppEvent::GoToBottom,

            KeyCode::Enter => AppEvent::Select,
            KeyCode::Char('r') | KeyCode::Char('R') => AppEvent::Refresh,

            _ => AppEvent::None,
        }
    }
}
