//! Main application state and loop for the STORECAST TUI.
//!
//! The `App` struct owns the session snapshot, the orchestration controller,
//! and the receive side of the fetch-event channel. Each pass of the loop
//! drains resolved fetches into the session, redraws when something changed,
//! and handles keyboard input.

use std::io;
use std::sync::Arc;
use std::time::{Duration, Instant};

use crossterm::event::{self, Event, KeyEvent, KeyEventKind};
use ratatui::{Terminal, backend::CrosstermBackend};
use tokio::sync::mpsc::{self, UnboundedReceiver};
use tracing::info;

use storecast_client::ForecastApi;

use crate::controller::Controller;
use crate::event::{AppEvent, InputHandler};
use crate::session::{FetchEvent, SessionState};
use crate::view;

/// Result type for app operations.
pub type AppResult<T> = std::result::Result<T, Box<dyn std::error::Error>>;

/// Poll interval for keyboard events; also bounds redraw latency.
const FRAME_DURATION: Duration = Duration::from_millis(50);

/// Header timestamp cache duration (update every second).
const TIMESTAMP_CACHE_DURATION: Duration = Duration::from_secs(1);

/// Main application state.
pub struct App {
    /// Session snapshot everything on screen derives from
    pub(crate) session: SessionState,
    /// Spawns fetch episodes
    controller: Controller,
    /// Completions from in-flight episodes
    fetch_events: UnboundedReceiver<FetchEvent>,
    /// Input handler for key events
    input_handler: InputHandler,
    /// Cursor position in the store list
    pub(crate) list_cursor: usize,
    /// Whether the app should quit
    should_quit: bool,
    /// Whether to show the help overlay
    pub(crate) show_help: bool,
    /// Dirty flag - whether UI needs redraw
    dirty: bool,
    /// Cached timestamp for the header (updated every second)
    pub(crate) cached_timestamp: String,
    last_timestamp_update: Instant,
}

impl App {
    /// Create a new app driving the given API implementation.
    pub fn new(api: Arc<dyn ForecastApi>) -> Self {
        let (tx, rx) = mpsc::unbounded_channel();
        Self {
            session: SessionState::new(),
            controller: Controller::new(api, tx),
            fetch_events: rx,
            input_handler: InputHandler::new(),
            list_cursor: 0,
            should_quit: false,
            show_help: false,
            dirty: true,
            cached_timestamp: chrono::Local::now().format("%Y-%m-%d %H:%M:%S").to_string(),
            last_timestamp_update: Instant::now(),
        }
    }

    /// Returns the current session snapshot.
    pub fn session(&self) -> &SessionState {
        &self.session
    }

    /// Returns whether the app should quit.
    pub fn should_quit(&self) -> bool {
        self.should_quit
    }

    fn mark_dirty(&mut self) {
        self.dirty = true;
    }

    fn take_dirty(&mut self) -> bool {
        std::mem::take(&mut self.dirty)
    }

    fn refresh_timestamp(&mut self) {
        if self.last_timestamp_update.elapsed() >= TIMESTAMP_CACHE_DURATION {
            self.cached_timestamp = chrono::Local::now().format("%Y-%m-%d %H:%M:%S").to_string();
            self.last_timestamp_update = Instant::now();
            self.mark_dirty();
        }
    }

    /// Drain resolved fetches into the session snapshot.
    fn drain_fetch_events(&mut self) {
        while let Ok(event) = self.fetch_events.try_recv() {
            self.session.apply(event);
            self.mark_dirty();
        }
    }

    /// Handle a key event.
    pub fn handle_key_event(&mut self, key: KeyEvent) {
        let event = self.input_handler.handle_key(key);
        self.handle_app_event(event);
    }

    /// Handle an application event.
    pub fn handle_app_event(&mut self, event: AppEvent) {
        match event {
            AppEvent::Quit | AppEvent::ForceQuit => self.should_quit = true,
            AppEvent::ShowHelp => {
                self.show_help = true;
                self.mark_dirty();
            }
            AppEvent::Cancel => {
                self.show_help = false;
                self.mark_dirty();
            }
            AppEvent::NavigateUp => {
                if self.list_cursor > 0 {
                    self.list_cursor -= 1;
                    self.mark_dirty();
                }
            }
            AppEvent::NavigateDown => {
                if self.list_cursor + 1 < self.session.catalog.len() {
                    self.list_cursor += 1;
                    self.mark_dirty();
                }
            }
            AppEvent::GoToTop => {
                self.list_cursor = 0;
                self.mark_dirty();
            }
            AppEvent::GoToBottom => {
                self.list_cursor = self.session.catalog.len().saturating_sub(1);
                self.mark_dirty();
            }
            AppEvent::Select => self.select_highlighted_store(),
            AppEvent::Refresh => {
                info!("manual refresh requested");
                self.session.begin_refresh();
                self.controller.start();
                self.mark_dirty();
            }
            AppEvent::None => {}
        }
    }

    /// Select the store under the cursor and start its episode.
    fn select_highlighted_store(&mut self) {
        let Some(store) = self.session.catalog.get(self.list_cursor).cloned() else {
            return;
        };
        let episode = self.session.select(store.clone());
        self.controller.run_episode(store, episode);
        self.mark_dirty();
    }

    /// Run the main application loop.
    pub async fn run(&mut self) -> AppResult<()> {
        // Setup terminal
        crossterm::terminal::enable_raw_mode()?;
        let mut stdout = io::stdout();
        crossterm::execute!(stdout, crossterm::terminal::EnterAlternateScreen)?;
        let backend = CrosstermBackend::new(stdout);
        let mut terminal = Terminal::new(backend)?;

        // Kick off the mount-time episodes
        self.controller.start();

        let result = self.run_loop(&mut terminal).await;

        // Restore terminal
        crossterm::terminal::disable_raw_mode()?;
        crossterm::execute!(
            terminal.backend_mut(),
            crossterm::terminal::LeaveAlternateScreen
        )?;
        terminal.show_cursor()?;

        result
    }

    async fn run_loop(
        &mut self,
        terminal: &mut Terminal<CrosstermBackend<io::Stdout>>,
    ) -> AppResult<()> {
        while !self.should_quit {
            self.drain_fetch_events();
            self.refresh_timestamp();

            if self.take_dirty() {
                terminal.draw(|frame| view::render(frame, self))?;
            }

            if event::poll(FRAME_DURATION)?
                && let Event::Key(key) = event::read()?
                && key.kind == KeyEventKind::Press
            {
                self.handle_key_event(key);
            }
        }
        Ok(())
    }
}
