use std::io;
use std::time::{Duration, Instant};

use anyhow::{Context, Result};
use crossterm::event::{self, Event, KeyCode, KeyEvent, KeyEventKind};
use crossterm::execute;
use crossterm::terminal::{
    EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode,
};
use ratatui::layout::{Constraint, Direction, Layout};
use ratatui::prelude::*;
use ratatui::style::{Color, Style};
use ratatui::widgets::{Block, Borders, Clear, Paragraph};

use pool_terminal::config::AppConfig;
use pool_terminal::error::PoolError;
use pool_terminal::matchups::round_robin;
use pool_terminal::reference::{Allowlist, load_roster};
use pool_terminal::schema::load_schema_doc;
use pool_terminal::state::{AppState, InputMode, Screen, parse_score_entry};
use pool_terminal::store::PredictionStore;
use pool_terminal::export;

struct App {
    state: AppState,
    store: PredictionStore,
    allowlist: Allowlist,
    config: AppConfig,
    should_quit: bool,
}

impl App {
    fn new(config: AppConfig, store: PredictionStore, allowlist: Allowlist) -> Result<Self> {
        let mut app = Self {
            state: AppState::new(),
            store,
            allowlist,
            config,
            should_quit: false,
        };
        app.state.group_names = app.store.group_names()?;
        app.refresh_board()?;
        app.state
            .push_log(format!("[INFO] {} allowed users loaded", app.allowlist.len()));
        Ok(app)
    }

    fn refresh_board(&mut self) -> Result<()> {
        self.state.board = self.store.list_predictions()?;
        Ok(())
    }

    fn on_key(&mut self, key: KeyEvent) {
        if self.state.help_overlay {
            if matches!(key.code, KeyCode::Char('?') | KeyCode::Esc) {
                self.state.help_overlay = false;
            }
            return;
        }
        if self.state.input != InputMode::None {
            self.on_input_key(key);
            return;
        }

        match key.code {
            KeyCode::Char('q') => self.should_quit = true,
            KeyCode::Char('1') => self.state.screen = Screen::Groups,
            KeyCode::Char('2') => self.open_matchups(),
            KeyCode::Char('3') | KeyCode::Char('b') => self.state.screen = Screen::Board,
            KeyCode::Char('j') | KeyCode::Down => self.state.select_next(),
            KeyCode::Char('k') | KeyCode::Up => self.state.select_prev(),
            KeyCode::Char('u') => {
                self.state.input = InputMode::User(self.state.user_id.clone());
            }
            KeyCode::Char('e') => self.export_board(),
            KeyCode::Enter => match self.state.screen {
                Screen::Groups => self.open_matchups(),
                Screen::Matchups => self.begin_score_entry(),
                Screen::Board => {}
            },
            KeyCode::Esc => self.state.screen = Screen::Groups,
            KeyCode::Char('?') => self.state.help_overlay = true,
            _ => {}
        }
    }

    fn on_input_key(&mut self, key: KeyEvent) {
        match key.code {
            KeyCode::Esc => self.state.input = InputMode::None,
            KeyCode::Backspace => match &mut self.state.input {
                InputMode::User(buf) | InputMode::Score(buf) => {
                    buf.pop();
                }
                InputMode::None => {}
            },
            KeyCode::Char(ch) => match &mut self.state.input {
                InputMode::User(buf) => buf.push(ch),
                InputMode::Score(buf) => {
                    if ch.is_ascii_digit() || matches!(ch, '-' | ':' | ' ') {
                        buf.push(ch);
                    }
                }
                InputMode::None => {}
            },
            KeyCode::Enter => {
                let input = std::mem::replace(&mut self.state.input, InputMode::None);
                match input {
                    InputMode::User(buf) => self.set_user(buf.trim()),
                    InputMode::Score(buf) => self.submit_score(&buf),
                    InputMode::None => {}
                }
            }
            _ => {}
        }
    }

    fn set_user(&mut self, user_id: &str) {
        if user_id.is_empty() {
            self.state.push_log("[WARN] User id must not be empty");
            return;
        }
        if !self.allowlist.is_allowed_user(user_id) {
            self.state
                .push_log(format!("[WARN] {user_id} is not on the allow-list"));
            return;
        }
        self.state.user_id = user_id.to_string();
        self.state.push_log(format!("[INFO] Submitting as {user_id}"));
    }

    fn open_matchups(&mut self) {
        let Some(group) = self.state.current_group().map(str::to_string) else {
            self.state.push_log("[INFO] No group selected");
            return;
        };
        match self.store.group_roster(&group) {
            Ok(roster) => {
                self.state.matchups = round_robin(&roster);
                self.state.selected_matchup = 0;
                self.state.screen = Screen::Matchups;
            }
            Err(err) => {
                self.state.push_log(format!("[ERROR] Load group {group}: {err}"));
            }
        }
    }

    fn begin_score_entry(&mut self) {
        if self.state.current_matchup().is_none() {
            self.state.push_log("[INFO] No matchup selected");
            return;
        }
        if self.state.user_id.is_empty() {
            self.state.push_log("[WARN] Set a user id first (press u)");
            return;
        }
        self.state.input = InputMode::Score(String::new());
    }

    fn submit_score(&mut self, raw: &str) {
        let Some((home, away)) = self.state.current_matchup().cloned() else {
            self.state.push_log("[INFO] No matchup selected");
            return;
        };
        let user_id = self.state.user_id.clone();
        if !self.allowlist.is_allowed_user(&user_id) {
            self.state
                .push_log(format!("[WARN] {user_id} is not on the allow-list"));
            return;
        }
        let Some((home_score, visitor_score)) = parse_score_entry(raw) else {
            self.state
                .push_log(format!("[WARN] Invalid score entry {raw:?} (expected e.g. 2-1)"));
            return;
        };

        let existing = match self.store.has_existing_prediction(&user_id, &home, &away) {
            Ok(existing) => existing,
            Err(err) => {
                self.state.push_log(format!("[ERROR] Prediction lookup: {err}"));
                return;
            }
        };

        match self
            .store
            .submit_prediction(&user_id, &home, &away, home_score, visitor_score)
        {
            Ok(()) => {
                let verb = if existing { "Updated" } else { "Recorded" };
                self.state.push_log(format!(
                    "[INFO] {verb} {home} {home_score}-{visitor_score} {away} for {user_id}"
                ));
                if let Err(err) = self.refresh_board() {
                    self.state.push_log(format!("[ERROR] Refresh board: {err}"));
                }
            }
            Err(err @ PoolError::Validation(_)) => {
                self.state.push_log(format!("[WARN] {err}"));
            }
            Err(err) => {
                self.state.push_log(format!("[ERROR] Submit prediction: {err}"));
            }
        }
    }

    fn export_board(&mut self) {
        match export::export_board(&self.config.export_dir, &self.state.board) {
            Ok(path) => {
                self.state
                    .push_log(format!("[INFO] Exported board to {}", path.display()));
            }
            Err(err) => {
                self.state.push_log(format!("[ERROR] Export failed: {err}"));
            }
        }
    }
}

fn main() -> Result<()> {
    let _ = dotenvy::from_filename(".env.local");
    let _ = dotenvy::from_filename(".env");

    let config_path = AppConfig::resolve_path();
    let config = AppConfig::load(&config_path)
        .with_context(|| format!("load configuration {}", config_path.display()))?;

    let schema_doc = load_schema_doc(&config.schema_path).context("load schema document")?;
    let mut store = PredictionStore::open(&config.database_path).context("open prediction store")?;
    store.apply_schema(&schema_doc).context("apply schema")?;

    let roster = load_roster(&config.roster_path).context("load group roster")?;
    store.seed_competitors(&roster).context("seed group roster")?;
    let allowlist = Allowlist::load(&config.allowlist_path).context("load allow-list")?;

    let mut app = App::new(config, store, allowlist)?;

    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen)?;
    let backend = ratatui::backend::CrosstermBackend::new(stdout);
    let mut terminal = ratatui::Terminal::new(backend)?;

    let res = run_app(&mut terminal, &mut app);

    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    terminal.show_cursor()?;

    if let Err(err) = res {
        eprintln!("error: {err}");
    }
    Ok(())
}

fn run_app<B: Backend>(terminal: &mut Terminal<B>, app: &mut App) -> io::Result<()> {
    let tick_rate = Duration::from_millis(250);
    let mut last_tick = Instant::now();

    loop {
        terminal.draw(|f| ui(f, app))?;

        let timeout = tick_rate
            .checked_sub(last_tick.elapsed())
            .unwrap_or(Duration::ZERO);
        if event::poll(timeout)? {
            if let Event::Key(key) = event::read()? {
                if key.kind == KeyEventKind::Press {
                    app.on_key(key);
                }
            }
        }

        if last_tick.elapsed() >= tick_rate {
            last_tick = Instant::now();
        }

        if app.should_quit {
            return Ok(());
        }
    }
}

fn ui(frame: &mut Frame, app: &App) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(2),
            Constraint::Min(1),
            Constraint::Length(5),
            Constraint::Length(1),
        ])
        .split(frame.size());

    let header =
        Paragraph::new(header_text(&app.state)).block(Block::default().borders(Borders::BOTTOM));
    frame.render_widget(header, chunks[0]);

    match app.state.screen {
        Screen::Groups => render_groups(frame, chunks[1], &app.state),
        Screen::Matchups => render_matchups(frame, chunks[1], &app.state),
        Screen::Board => render_board(frame, chunks[1], &app.state),
    }

    render_console(frame, chunks[2], &app.state);

    let footer =
        Paragraph::new(footer_text(&app.state)).block(Block::default().borders(Borders::TOP));
    frame.render_widget(footer, chunks[3]);

    if app.state.help_overlay {
        render_help_overlay(frame, frame.size());
    }
}

fn header_text(state: &AppState) -> String {
    let screen = match state.screen {
        Screen::Groups => "GROUPS",
        Screen::Matchups => "MATCHUPS",
        Screen::Board => "BOARD",
    };
    let user = if state.user_id.is_empty() {
        "no user (press u)".to_string()
    } else {
        state.user_id.clone()
    };
    format!("EUROCUP POOL | {screen} | {user}")
}

fn footer_text(state: &AppState) -> String {
    match &state.input {
        InputMode::User(_) => "Type user id | Enter Confirm | Esc Cancel".to_string(),
        InputMode::Score(_) => "Type score e.g. 2-1 | Enter Submit | Esc Cancel".to_string(),
        InputMode::None => match state.screen {
            Screen::Groups => {
                "1 Groups | 2/Enter Matchups | 3 Board | j/k Move | u User | e Export | ? Help | q Quit"
                    .to_string()
            }
            Screen::Matchups => {
                "Enter Predict | j/k Move | 1 Groups | 3 Board | u User | ? Help | q Quit".to_string()
            }
            Screen::Board => {
                "1 Groups | 2 Matchups | j/k Scroll | e Export | ? Help | q Quit".to_string()
            }
        },
    }
}

fn render_groups(frame: &mut Frame, area: Rect, state: &AppState) {
    let text = if state.group_names.is_empty() {
        "No groups seeded".to_string()
    } else {
        state
            .group_names
            .iter()
            .enumerate()
            .map(|(idx, name)| {
                let prefix = if idx == state.selected_group { "> " } else { "  " };
                format!("{prefix}Group {name}")
            })
            .collect::<Vec<_>>()
            .join("\n")
    };
    let list = Paragraph::new(text).block(Block::default().title("Groups").borders(Borders::ALL));
    frame.render_widget(list, area);
}

fn render_matchups(frame: &mut Frame, area: Rect, state: &AppState) {
    let title = state
        .current_group()
        .map(|g| format!("Matchups - Group {g}"))
        .unwrap_or_else(|| "Matchups".to_string());

    let text = if state.matchups.is_empty() {
        "No matchups for this group".to_string()
    } else {
        state
            .matchups
            .iter()
            .enumerate()
            .map(|(idx, (home, away))| {
                let prefix = if idx == state.selected_matchup { "> " } else { "  " };
                let score = match state.board_entry(home, away) {
                    Some(row) => format!("{}-{}", row.home_score, row.visitor_score),
                    None => "-".to_string(),
                };
                format!("{prefix}{home:<14} vs {away:<14} {score:>5}")
            })
            .collect::<Vec<_>>()
            .join("\n")
    };
    let list = Paragraph::new(text).block(Block::default().title(title).borders(Borders::ALL));
    frame.render_widget(list, area);
}

fn render_board(frame: &mut Frame, area: Rect, state: &AppState) {
    let block = Block::default().title("Prediction Board").borders(Borders::ALL);
    let inner = block.inner(area);
    frame.render_widget(block, area);

    if state.board.is_empty() {
        let empty =
            Paragraph::new("No predictions yet").style(Style::default().fg(Color::DarkGray));
        frame.render_widget(empty, inner);
        return;
    }
    if inner.height == 0 {
        return;
    }

    let header = format!(
        "{:<20} {:<14} {:<14} {:>5}",
        "User", "Home", "Away", "Score"
    );
    let mut lines = vec![header];

    let visible = inner.height.saturating_sub(1) as usize;
    let max_start = state.board.len().saturating_sub(visible);
    let start = state.board_scroll.min(max_start);
    for row in state.board.iter().skip(start).take(visible) {
        lines.push(format!(
            "{:<20} {:<14} {:<14} {:>2}-{:<2}",
            row.user_id, row.home, row.away, row.home_score, row.visitor_score
        ));
    }

    let board = Paragraph::new(lines.join("\n"));
    frame.render_widget(board, inner);
}

fn render_console(frame: &mut Frame, area: Rect, state: &AppState) {
    let text = match &state.input {
        InputMode::User(buf) => format!("user id> {buf}_"),
        InputMode::Score(buf) => {
            let matchup = state
                .current_matchup()
                .map(|(home, away)| format!("{home} vs {away}"))
                .unwrap_or_default();
            format!("{matchup} score> {buf}_")
        }
        InputMode::None => {
            if state.logs.is_empty() {
                "No messages yet".to_string()
            } else {
                state
                    .logs
                    .iter()
                    .rev()
                    .take(3)
                    .cloned()
                    .collect::<Vec<_>>()
                    .into_iter()
                    .rev()
                    .collect::<Vec<_>>()
                    .join("\n")
            }
        }
    };
    let console = Paragraph::new(text).block(Block::default().title("Console").borders(Borders::ALL));
    frame.render_widget(console, area);
}

fn render_help_overlay(frame: &mut Frame, area: Rect) {
    let popup_area = centered_rect(60, 60, area);
    frame.render_widget(Clear, popup_area);

    let text = [
        "Eurocup Pool - Help",
        "",
        "Global:",
        "  1            Groups",
        "  2            Matchups for selected group",
        "  3 / b        Prediction board",
        "  u            Set user id",
        "  e            Export board to XLSX",
        "  ?            Toggle help",
        "  q            Quit",
        "",
        "Lists:",
        "  j/k or ↑/↓   Move/scroll",
        "  Enter        Open group / predict matchup",
    ]
    .join("\n");

    let help = Paragraph::new(text)
        .block(Block::default().title("Help").borders(Borders::ALL))
        .style(Style::default());
    frame.render_widget(help, popup_area);
}

fn centered_rect(percent_x: u16, percent_y: u16, area: Rect) -> Rect {
    let vertical = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Percentage((100 - percent_y) / 2),
            Constraint::Percentage(percent_y),
            Constraint::Percentage((100 - percent_y) / 2),
        ])
        .split(area);

    let horizontal = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Percentage((100 - percent_x) / 2),
            Constraint::Percentage(percent_x),
            Constraint::Percentage((100 - percent_x) / 2),
        ])
        .split(vertical[1]);

    horizontal[1]
}
