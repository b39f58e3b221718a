use std::io::Stdout;
use std::time::{Duration, Instant};

use anyhow::{Context, Result};
use crossterm::event::{self, Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers};
use crossterm::execute;
use crossterm::terminal::{
    disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen,
};
use rand::rngs::StdRng;
use rand::SeedableRng;
use ratatui::backend::CrosstermBackend;
use ratatui::widgets::ListState;
use ratatui::Terminal;
use time::OffsetDateTime;

use crate::compose::compose_intent_url;
use crate::config::{AppConfig, Palette};
use crate::session::{FeedSession, SessionOptions};
use crate::source::{self, SearchSource};
use crate::ui;

pub mod state;

pub use state::{DashboardState, FocusPane, SearchPanel, View};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Action {
    Quit,
    SelectNext,
    SelectPrevious,
    JumpTop,
    ToggleFocus,
    Refresh,
    MarkAllRead,
    CycleFilter,
    SimulateOutage,
    NewComposeLink,
    RunSearch,
    ShowLive,
}

pub struct App {
    pub config: AppConfig,
    session: FeedSession,
    source: Option<Box<dyn SearchSource>>,
    state: DashboardState,
    list_state: ListState,
    palette: Palette,
    should_quit: bool,
    tick_rate: Duration,
    epoch: Instant,
    rng: StdRng,
}

impl App {
    pub fn new(config: AppConfig) -> Result<Self> {
        let mut session = FeedSession::with_seed(SessionOptions::default(), config.feed.seed);
        session.initialize();

        let mut rng = match config.feed.seed {
            Some(seed) => StdRng::seed_from_u64(seed.wrapping_add(1)),
            None => StdRng::from_entropy(),
        };
        let mut state = DashboardState::new(compose_intent_url(&mut rng));

        let source = match source::build(&config.source, config.feed.seed) {
            Ok(source) => Some(source),
            Err(err) => {
                tracing::warn!(error = %err, "search source unavailable");
                state.set_status_message(Some(err.user_message()));
                None
            }
        };

        Ok(Self {
            palette: config.palette(),
            tick_rate: config.feed.tick_rate(),
            config,
            session,
            source,
            state,
            list_state: ListState::default(),
            should_quit: false,
            epoch: Instant::now(),
            rng,
        })
    }

    pub fn run(&mut self) -> Result<()> {
        let mut terminal = setup_terminal()?;
        let result = self.event_loop(&mut terminal);
        self.session.dispose();
        restore_terminal(&mut terminal)?;
        result
    }

    pub fn session(&self) -> &FeedSession {
        &self.session
    }

    pub fn state(&self) -> &DashboardState {
        &self.state
    }

    fn event_loop(&mut self, terminal: &mut Terminal<CrosstermBackend<Stdout>>) -> Result<()> {
        let mut last_tick = Instant::now();
        loop {
            terminal
                .draw(|frame| {
                    let visible = self.state.visible(self.session.records()).len();
                    self.list_state
                        .select((visible > 0).then_some(self.state.selected));
                    let view = ui::DashboardView {
                        session: &self.session,
                        state: &self.state,
                        palette: &self.palette,
                        handle: &self.config.feed.handle,
                        now: OffsetDateTime::now_utc(),
                    };
                    ui::draw_dashboard(frame, &view, &mut self.list_state);
                })
                .context("rendering frame")?;

            if self.should_quit {
                break;
            }

            let timeout = self
                .tick_rate
                .checked_sub(last_tick.elapsed())
                .unwrap_or_else(|| Duration::from_millis(0));

            if event::poll(timeout).context("polling for terminal events")? {
                if let Event::Key(key) = event::read().context("reading terminal event")? {
                    self.handle_key(key);
                }
            }

            if last_tick.elapsed() >= self.tick_rate {
                self.sync_to(self.epoch.elapsed());
                last_tick = Instant::now();
            }
        }
        Ok(())
    }

    /// Bring the session up to `now` since the dashboard started.
    pub fn sync_to(&mut self, now: Duration) {
        self.session.advance_to(now);
        self.state.reanchor(self.session.records());
    }

    pub fn handle_key(&mut self, key: KeyEvent) {
        if key.kind != KeyEventKind::Press {
            return;
        }
        let plain = !key
            .modifiers
            .intersects(KeyModifiers::CONTROL | KeyModifiers::ALT | KeyModifiers::SUPER);

        let action = match key.code {
            KeyCode::Char('c') if key.modifiers.contains(KeyModifiers::CONTROL) => {
                Some(Action::Quit)
            }
            KeyCode::Char('q') => Some(Action::Quit),
            KeyCode::Char('j') | KeyCode::Down => Some(Action::SelectNext),
            KeyCode::Char('k') | KeyCode::Up => Some(Action::SelectPrevious),
            KeyCode::Char('g') | KeyCode::Home => Some(Action::JumpTop),
            KeyCode::Tab => Some(Action::ToggleFocus),
            KeyCode::Char('r') if plain => Some(Action::Refresh),
            KeyCode::Char('m') if plain => Some(Action::MarkAllRead),
            KeyCode::Char('f') if plain => Some(Action::CycleFilter),
            KeyCode::Char('o') if plain => Some(Action::SimulateOutage),
            KeyCode::Char('c') if plain => Some(Action::NewComposeLink),
            KeyCode::Char('s') | KeyCode::Char('/') if plain => Some(Action::RunSearch),
            KeyCode::Esc => Some(Action::ShowLive),
            _ => None,
        };

        if let Some(action) = action {
            self.handle_action(action);
        }
    }

    fn handle_action(&mut self, action: Action) {
        let records = self.session.records();
        match action {
            Action::Quit => self.should_quit = true,
            Action::SelectNext => self.state.move_selection(1, records),
            Action::SelectPrevious => self.state.move_selection(-1, records),
            Action::JumpTop => self.state.jump_to_top(records),
            Action::ToggleFocus => self.state.toggle_focus(),
            Action::Refresh => {
                self.state.show_view(View::Live);
                self.session.refresh();
                self.state.set_status_message(Some("Refreshing mentions..."));
            }
            Action::MarkAllRead => {
                self.session.mark_all_read();
                self.state.set_status_message(Some("All mentions marked as read"));
            }
            Action::CycleFilter => {
                self.state.cycle_filter();
                let label = format!("Showing {} mentions", self.state.filter_label());
                self.state.set_status_message(Some(label));
            }
            Action::SimulateOutage => {
                if !self.session.trigger_outage() {
                    self.state
                        .set_status_message(Some("Outage only simulated while connected"));
                }
            }
            Action::NewComposeLink => {
                self.state.compose_link = compose_intent_url(&mut self.rng);
                self.state.set_status_message(Some("New compose link ready"));
            }
            Action::RunSearch => self.run_search(),
            Action::ShowLive => self.state.show_view(View::Live),
        }
    }

    fn run_search(&mut self) {
        let Some(source) = self.source.as_mut() else {
            self.state
                .set_status_message(Some("Search unavailable: source not configured"));
            return;
        };
        let query = self.config.source.query.clone();
        match source.search(&query, self.config.source.max_results) {
            Ok(response) => {
                let has_more = response.meta.next_token.is_some();
                let results = response.into_records(OffsetDateTime::now_utc());
                let message = format!("{} results for {query}", results.len());
                self.state.search = SearchPanel {
                    query,
                    source: source.name(),
                    results,
                    has_more,
                };
                self.state.show_view(View::Search);
                self.state.set_status_message(Some(message));
            }
            Err(err) => {
                tracing::warn!(error = %err, "search failed");
                self.state.set_status_message(Some(err.user_message()));
            }
        }
    }
}

fn setup_terminal() -> Result<Terminal<CrosstermBackend<Stdout>>> {
    enable_raw_mode().context("enabling raw mode")?;
    let mut stdout = std::io::stdout();
    execute!(stdout, EnterAlternateScreen).context("switching to alternate screen")?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend).context("creating terminal backend")?;
    terminal.hide_cursor().context("hiding cursor")?;
    Ok(terminal)
}

fn restore_terminal(terminal: &mut Terminal<CrosstermBackend<Stdout>>) -> Result<()> {
    terminal.show_cursor().ok();
    disable_raw_mode().context("disabling raw mode")?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen).context("restoring screen state")?;
    Ok(())
}
