//! Main application state and event loop

use super::input::TextInput;
use super::ui;
use crate::client::MealApi;
use crate::config::Config;
use crate::controller::QueryController;
use crate::detail::{spawn_detail_worker, DetailRequest, DetailResponse};
use crate::meal::Meal;
use crate::view::SearchView;
use anyhow::Result;
use arboard::Clipboard;
use crossterm::{
    cursor::SetCursorStyle,
    event::{self, Event, KeyCode, KeyEventKind, KeyModifiers},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{backend::CrosstermBackend, widgets::ListState, Terminal};
use std::io::{self, Stdout};
use std::sync::mpsc::{self, Receiver, Sender};
use std::sync::Arc;
use std::time::{Duration, Instant};

/// Toast notification state
pub struct Toast {
    pub message: String,
    pub expires_at: Instant,
    pub is_error: bool,
}

impl Toast {
    pub fn new(message: String, duration: Duration) -> Self {
        Self {
            message,
            expires_at: Instant::now() + duration,
            is_error: false,
        }
    }

    pub fn error(message: String, duration: Duration) -> Self {
        Self {
            is_error: true,
            ..Self::new(message, duration)
        }
    }

    pub fn is_expired(&self) -> bool {
        Instant::now() >= self.expires_at
    }
}

/// Which part of the screen receives navigation keys
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Focus {
    Input,
    Suggestions,
    Results,
    /// Scrolling the recipe of the selected result
    Detail,
}

/// Detail pane contents for the selected result
#[derive(Debug, Clone)]
pub enum DetailPane {
    Empty,
    Loaded(Box<Meal>),
    Failed(String),
}

/// Application state
pub struct App {
    pub input: TextInput,
    pub controller: QueryController,
    pub focus: Focus,
    pub suggestion_list: ListState,
    pub result_list: ListState,
    pub detail: DetailPane,
    pub detail_scroll: u16,
    pub toast: Option<Toast>,
    pub should_quit: bool,
    /// Ticks since start; drives the spinner
    frame: u64,
    /// Query text last handed to the controller (for change detection)
    last_query: String,
    /// Result ids currently listed, to detect a new result set
    listed_ids: Vec<String>,
    detail_tx: Sender<DetailRequest>,
    detail_rx: Receiver<DetailResponse>,
    /// Meal id of pending detail request (None = not waiting)
    pending_detail_for: Option<String>,
    detail_request_started: Option<Instant>,
}

impl App {
    pub fn new(api: Arc<dyn MealApi>, config: &Config) -> Self {
        let (detail_tx, detail_req_rx) = mpsc::channel::<DetailRequest>();
        let (detail_resp_tx, detail_rx) = mpsc::channel::<DetailResponse>();
        spawn_detail_worker(Arc::clone(&api), detail_req_rx, detail_resp_tx);

        Self {
            input: TextInput::new(),
            controller: QueryController::new(api, config),
            focus: Focus::Input,
            suggestion_list: ListState::default(),
            result_list: ListState::default(),
            detail: DetailPane::Empty,
            detail_scroll: 0,
            toast: None,
            should_quit: false,
            frame: 0,
            last_query: String::new(),
            listed_ids: Vec::new(),
            detail_tx,
            detail_rx,
            pending_detail_for: None,
            detail_request_started: None,
        }
    }

    pub fn view(&self) -> SearchView {
        SearchView::from_state(self.controller.state())
    }

    /// Forward input changes, then apply worker responses
    pub fn tick(&mut self) {
        self.frame = self.frame.wrapping_add(1);
        self.forward_query();

        self.controller.poll();
        self.sync_lists();
        self.poll_detail_responses();
        self.update_toast();
    }

    pub fn spinner(&self) -> char {
        const FRAMES: [char; 4] = ['◐', '◓', '◑', '◒'];
        FRAMES[(self.frame / 8) as usize % FRAMES.len()]
    }

    fn forward_query(&mut self) {
        if self.input.text != self.last_query {
            self.last_query = self.input.text.clone();
            self.controller.on_query_change(&self.last_query);
        }
    }

    /// Keep selections and focus valid after the controller state changed
    fn sync_lists(&mut self) {
        let state = self.controller.state();

        if state.suggestions.is_empty() {
            self.suggestion_list.select(None);
            if self.focus == Focus::Suggestions {
                self.focus = Focus::Input;
            }
        } else if let Some(sel) = self.suggestion_list.selected() {
            self.suggestion_list
                .select(Some(sel.min(state.suggestions.len() - 1)));
        }

        let ids: Vec<String> = state.results.iter().map(|m| m.id.clone()).collect();
        if ids != self.listed_ids {
            self.listed_ids = ids;
            self.result_list = ListState::default();
            if self.listed_ids.is_empty() {
                if matches!(self.focus, Focus::Results | Focus::Detail) {
                    self.focus = Focus::Input;
                }
            } else {
                self.result_list.select(Some(0));
            }
            self.enqueue_detail_request();
        }
    }

    pub fn selected_meal(&self) -> Option<&Meal> {
        self.result_list
            .selected()
            .and_then(|i| self.controller.state().results.get(i))
    }

    /// Request details for the selected result; the worker coalesces rapid requests
    fn enqueue_detail_request(&mut self) {
        let Some(meal_id) = self.selected_meal().map(|m| m.id.clone()) else {
            self.pending_detail_for = None;
            self.detail_request_started = None;
            self.detail = DetailPane::Empty;
            return;
        };

        if self.pending_detail_for.as_deref() == Some(meal_id.as_str()) {
            return;
        }

        self.pending_detail_for = Some(meal_id.clone());
        self.detail_request_started = Some(Instant::now());
        let _ = self.detail_tx.send(DetailRequest { meal_id });
    }

    fn poll_detail_responses(&mut self) {
        while let Ok(resp) = self.detail_rx.try_recv() {
            // Ignore responses for meals we no longer care about
            if self.pending_detail_for.as_deref() != Some(resp.meal_id.as_str()) {
                continue;
            }

            self.detail = match resp.result {
                Ok(meal) => DetailPane::Loaded(Box::new(meal)),
                Err(e) => DetailPane::Failed(e.to_string()),
            };
            self.detail_scroll = 0;
            if self.focus == Focus::Detail && !matches!(self.detail, DetailPane::Loaded(_)) {
                self.focus = Focus::Results;
            }
            self.pending_detail_for = None;
            self.detail_request_started = None;
        }
    }

    /// True once a detail request has been outstanding long enough to show "Loading..."
    pub fn is_loading_details(&self) -> bool {
        const LOADING_DELAY_MS: u64 = 100;
        self.detail_request_started
            .map(|t| t.elapsed() > Duration::from_millis(LOADING_DELAY_MS))
            .unwrap_or(false)
    }

    fn update_toast(&mut self) {
        if self.toast.as_ref().is_some_and(Toast::is_expired) {
            self.toast = None;
        }
    }

    fn move_selection(list: &mut ListState, len: usize, delta: isize) {
        if len == 0 {
            return;
        }
        let current = list.selected().unwrap_or(0) as isize;
        let next = (current + delta).clamp(0, len as isize - 1);
        list.select(Some(next as usize));
    }

    fn commit_search(&mut self, term: Option<String>) {
        self.forward_query();
        // Validation failures are already reflected in the controller's error
        let _ = self.controller.search(term.as_deref());
        self.focus = Focus::Input;
    }

    /// Move focus to the recipe of the selected result, once it has loaded
    fn focus_detail(&mut self) {
        let loaded_id = match self.detail {
            DetailPane::Loaded(ref meal) => Some(meal.id.as_str()),
            _ => None,
        };
        if loaded_id.is_some() && loaded_id == self.selected_meal().map(|m| m.id.as_str()) {
            self.focus = Focus::Detail;
        } else {
            self.toast = Some(Toast::new(
                "Recipe still loading".to_string(),
                Duration::from_secs(1),
            ));
        }
    }

    fn open_url(&mut self, url: Option<String>, what: &str) {
        self.toast = Some(match url {
            Some(url) => match open::that(&url) {
                Ok(()) => Toast::new("Opened in browser".to_string(), Duration::from_secs(2)),
                Err(e) => {
                    log::warn!("Failed to open {}: {}", url, e);
                    Toast::error("Failed to open browser".to_string(), Duration::from_secs(2))
                }
            },
            None => Toast::error(format!("No {} for this meal", what), Duration::from_secs(2)),
        });
    }

    fn copy_shopping_list(&mut self) {
        let Some(meal) = self.selected_meal() else {
            self.toast = Some(Toast::error(
                "No meal selected".to_string(),
                Duration::from_secs(2),
            ));
            return;
        };

        let text = meal
            .ingredients
            .iter()
            .map(|i| match i.measure.as_deref() {
                Some(m) => format!("{} - {}", i.name, m),
                None => i.name.clone(),
            })
            .collect::<Vec<_>>()
            .join("\n");
        let name = meal.name.clone();

        let copied = Clipboard::new().and_then(|mut c| c.set_text(text));
        self.toast = Some(match copied {
            Ok(()) => Toast::new(
                format!("Copied ingredients for {}", name),
                Duration::from_secs(2),
            ),
            Err(e) => {
                log::warn!("Clipboard unavailable: {}", e);
                Toast::error("Clipboard not available".to_string(), Duration::from_secs(2))
            }
        });
    }

    pub fn handle_event(&mut self, event: Event) {
        let Event::Key(key) = event else {
            return;
        };
        if key.kind != KeyEventKind::Press {
            return;
        }

        match (key.code, key.modifiers) {
            (KeyCode::Char('c'), KeyModifiers::CONTROL) => {
                self.should_quit = true;
                return;
            }
            (KeyCode::Char('o'), KeyModifiers::CONTROL) => {
                let url = self.selected_meal().and_then(|m| m.source.clone());
                self.open_url(url, "source page");
                return;
            }
            (KeyCode::Char('y'), KeyModifiers::CONTROL) => {
                let url = self.selected_meal().and_then(|m| m.youtube.clone());
                self.open_url(url, "video");
                return;
            }
            (KeyCode::Char('l'), KeyModifiers::CONTROL) => {
                self.copy_shopping_list();
                return;
            }
            _ => {}
        }

        let view = self.view();
        match self.focus {
            Focus::Input => match key.code {
                KeyCode::Esc => self.should_quit = true,
                KeyCode::Enter => self.commit_search(None),
                KeyCode::Down | KeyCode::Tab if view.show_suggestions() => {
                    self.focus = Focus::Suggestions;
                    self.suggestion_list.select(Some(0));
                }
                KeyCode::Down | KeyCode::Tab if view.show_results() => {
                    self.focus = Focus::Results;
                }
                _ => {
                    self.input.handle_key(key.code, key.modifiers);
                }
            },
            Focus::Suggestions => match key.code {
                KeyCode::Esc => self.focus = Focus::Input,
                KeyCode::Up if self.suggestion_list.selected() == Some(0) => {
                    self.focus = Focus::Input;
                }
                KeyCode::Up => {
                    Self::move_selection(&mut self.suggestion_list, view.suggestions.len(), -1)
                }
                KeyCode::Down | KeyCode::Tab => {
                    Self::move_selection(&mut self.suggestion_list, view.suggestions.len(), 1)
                }
                KeyCode::Enter => {
                    let chosen = self
                        .suggestion_list
                        .selected()
                        .and_then(|i| view.suggestions.get(i).cloned());
                    if chosen.is_some() {
                        self.commit_search(chosen);
                    }
                }
                _ => {
                    self.focus = Focus::Input;
                    self.input.handle_key(key.code, key.modifiers);
                }
            },
            Focus::Results => match key.code {
                KeyCode::Esc => self.focus = Focus::Input,
                KeyCode::Up if self.result_list.selected().unwrap_or(0) == 0 => {
                    self.focus = Focus::Input;
                }
                KeyCode::Up => {
                    Self::move_selection(&mut self.result_list, view.results.len(), -1);
                    self.enqueue_detail_request();
                }
                KeyCode::Down => {
                    Self::move_selection(&mut self.result_list, view.results.len(), 1);
                    self.enqueue_detail_request();
                }
                KeyCode::PageUp => {
                    Self::move_selection(&mut self.result_list, view.results.len(), -10);
                    self.enqueue_detail_request();
                }
                KeyCode::PageDown => {
                    Self::move_selection(&mut self.result_list, view.results.len(), 10);
                    self.enqueue_detail_request();
                }
                KeyCode::Enter | KeyCode::Right => self.focus_detail(),
                _ => {
                    self.focus = Focus::Input;
                    self.input.handle_key(key.code, key.modifiers);
                }
            },
            Focus::Detail => match key.code {
                KeyCode::Esc | KeyCode::Left | KeyCode::Tab => self.focus = Focus::Results,
                KeyCode::Up => self.detail_scroll = self.detail_scroll.saturating_sub(1),
                KeyCode::Down => self.detail_scroll = self.detail_scroll.saturating_add(1),
                KeyCode::PageUp => self.detail_scroll = self.detail_scroll.saturating_sub(10),
                KeyCode::PageDown => self.detail_scroll = self.detail_scroll.saturating_add(10),
                KeyCode::Home => self.detail_scroll = 0,
                _ => {
                    self.focus = Focus::Input;
                    self.input.handle_key(key.code, key.modifiers);
                }
            },
        }
    }
}

/// Run the TUI application
pub fn run(api: Arc<dyn MealApi>, config: &Config) -> Result<()> {
    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen, SetCursorStyle::BlinkingBar)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let mut app = App::new(api, config);

    let result = run_loop(&mut terminal, &mut app);

    disable_raw_mode()?;
    execute!(
        terminal.backend_mut(),
        LeaveAlternateScreen,
        SetCursorStyle::DefaultUserShape
    )?;
    terminal.show_cursor()?;

    result
}

fn run_loop(terminal: &mut Terminal<CrosstermBackend<Stdout>>, app: &mut App) -> Result<()> {
    // Upper bound on how long a redraw waits for input (~60 Hz)
    const FRAME_TIME: Duration = Duration::from_millis(16);

    while !app.should_quit {
        app.tick();
        terminal.draw(|f| ui::render(f, app))?;

        // Block until input or the next frame, then take whatever else is queued
        if event::poll(FRAME_TIME)? {
            app.handle_event(event::read()?);
            while !app.should_quit && event::poll(Duration::ZERO)? {
                app.handle_event(event::read()?);
            }
        }
    }

    Ok(())
}
