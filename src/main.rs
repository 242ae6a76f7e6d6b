use std::env;
use std::io;
use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};

use crossterm::event::{
    self, DisableMouseCapture, EnableMouseCapture, Event, KeyCode, KeyEvent, KeyEventKind,
};
use crossterm::execute;
use crossterm::terminal::{
    EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode,
};
use ratatui::layout::{Constraint, Direction, Layout, Rect};
use ratatui::prelude::*;
use ratatui::style::{Color, Modifier, Style};
use ratatui::widgets::{Bar, BarChart, BarGroup, Block, Borders, Clear, Paragraph};

use proscout_terminal::catalog::{MetricCatalog, global_catalog};
use proscout_terminal::dataset::Dataset;
use proscout_terminal::export::export_ranking_xlsx;
use proscout_terminal::ingest::load_dataset;
use proscout_terminal::persist::{SessionCache, load_session, save_session};
use proscout_terminal::query::{ScoutReport, SimilarityReport};
use proscout_terminal::radar::RadarPayload;
use proscout_terminal::sample_data::sample_dataset;
use proscout_terminal::state::{AppState, Screen, SetupField};

const EXPORT_FILE: &str = "proscout_ranking.xlsx";
const DEMO_PLAYERS_PER_POSITION: usize = 12;

struct App {
    state: AppState,
    catalog: &'static MetricCatalog,
    dataset_path: Option<PathBuf>,
    should_quit: bool,
}

impl App {
    fn new(state: AppState, dataset_path: Option<PathBuf>) -> Self {
        Self {
            state,
            catalog: global_catalog(),
            dataset_path,
            should_quit: false,
        }
    }

    fn on_key(&mut self, key: KeyEvent) {
        match key.code {
            KeyCode::Char('q') => {
                self.should_quit = true;
                return;
            }
            KeyCode::Char('?') => {
                self.state.help_overlay = !self.state.help_overlay;
                return;
            }
            KeyCode::Char('1') => {
                self.state.screen = Screen::Setup;
                return;
            }
            KeyCode::Char('2') => {
                if self.state.report.is_some() {
                    self.state.screen = Screen::Ranking;
                }
                return;
            }
            KeyCode::Char('3') => {
                if self.state.similarity.is_some() {
                    self.state.screen = Screen::Similarity;
                }
                return;
            }
            _ => {}
        }

        match self.state.screen {
            Screen::Setup => self.on_setup_key(key),
            Screen::Ranking => self.on_ranking_key(key),
            Screen::Similarity => self.on_similarity_key(key),
        }
    }

    fn on_setup_key(&mut self, key: KeyEvent) {
        match key.code {
            KeyCode::Tab => self.state.setup_field = self.state.setup_field.next(),
            KeyCode::Char('+') | KeyCode::Right => self.state.adjust_filter(true),
            KeyCode::Char('-') | KeyCode::Left => self.state.adjust_filter(false),
            KeyCode::Char('p') => self.state.cycle_position(true),
            KeyCode::Char('P') => self.state.cycle_position(false),
            KeyCode::Char('j') | KeyCode::Down => {
                self.state.move_archetype_cursor(self.catalog, true)
            }
            KeyCode::Char('k') | KeyCode::Up => {
                self.state.move_archetype_cursor(self.catalog, false)
            }
            KeyCode::Char(' ') => self.state.toggle_archetype(self.catalog),
            KeyCode::Enter | KeyCode::Char('g') => self.state.run_analysis(self.catalog),
            _ => {}
        }
    }

    fn on_ranking_key(&mut self, key: KeyEvent) {
        match key.code {
            KeyCode::Char('j') | KeyCode::Down => self.state.select_next(),
            KeyCode::Char('k') | KeyCode::Up => self.state.select_prev(),
            KeyCode::Char('s') => self.state.run_similarity(self.catalog),
            KeyCode::Char('e') => self.export_ranking(),
            KeyCode::Char('b') | KeyCode::Esc => self.state.screen = Screen::Setup,
            _ => {}
        }
    }

    fn on_similarity_key(&mut self, key: KeyEvent) {
        match key.code {
            KeyCode::Char('b') | KeyCode::Esc => self.state.screen = Screen::Ranking,
            _ => {}
        }
    }

    fn export_ranking(&mut self) {
        let Some(report) = &self.state.report else {
            self.state.push_log("[INFO] Nothing to export yet");
            return;
        };
        let position = self.state.position().to_string();
        let archetypes = self.state.selection(self.catalog);
        match export_ranking_xlsx(Path::new(EXPORT_FILE), &position, &archetypes, report) {
            Ok(done) => self.state.push_log(format!(
                "[INFO] Exported {} rows x {} metrics to {EXPORT_FILE}",
                done.rows, done.metrics
            )),
            Err(err) => self.state.push_log(format!("[WARN] Export failed: {err}")),
        }
    }
}

fn main() -> io::Result<()> {
    let session = load_session();
    let (dataset, label, dataset_path) = open_dataset(session.as_ref());

    let mut state = AppState::new(dataset, label);
    restore_session(&mut state, session.as_ref(), dataset_path.as_deref());

    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen, EnableMouseCapture)?;
    let backend = ratatui::backend::CrosstermBackend::new(stdout);
    let mut terminal = ratatui::Terminal::new(backend)?;

    let mut app = App::new(state, dataset_path);
    let res = run_app(&mut terminal, &mut app);

    disable_raw_mode()?;
    execute!(
        terminal.backend_mut(),
        LeaveAlternateScreen,
        DisableMouseCapture
    )?;
    terminal.show_cursor()?;

    let mut session = SessionCache::default();
    session.dataset_path = app.dataset_path.as_ref().map(|p| p.display().to_string());
    session.filter = Some(app.state.filter);
    session.position = Some(app.state.position().to_string());
    session.archetypes = app.state.selection(app.catalog);
    save_session(session);

    if let Err(err) = res {
        eprintln!("error: {err}");
    }
    Ok(())
}

/// Dataset source precedence: CLI argument, then SCOUT_DATASET, then the
/// previous session's file, then the built-in demo population.
fn open_dataset(session: Option<&SessionCache>) -> (Dataset, String, Option<PathBuf>) {
    let candidate = env::args()
        .nth(1)
        .or_else(|| env::var("SCOUT_DATASET").ok().filter(|s| !s.trim().is_empty()))
        .or_else(|| session.and_then(|s| s.dataset_path.clone()));

    if let Some(raw) = candidate {
        let path = PathBuf::from(raw.trim());
        match load_dataset(&path) {
            Ok(dataset) => {
                let label = path.display().to_string();
                return (dataset, label, Some(path));
            }
            Err(err) => {
                eprintln!("warning: {err:#}; falling back to demo data");
            }
        }
    }

    let dataset = sample_dataset(global_catalog(), DEMO_PLAYERS_PER_POSITION);
    (dataset, "demo population".to_string(), None)
}

fn restore_session(state: &mut AppState, session: Option<&SessionCache>, path: Option<&Path>) {
    let Some(session) = session else {
        return;
    };
    // Filter bounds and selections only carry over to the same file.
    let same_file = match (&session.dataset_path, path) {
        (Some(saved), Some(current)) => Path::new(saved) == current,
        _ => false,
    };
    if !same_file {
        return;
    }
    if let Some(filter) = session.filter {
        state.filter = filter;
    }
    if let Some(position) = &session.position {
        state.set_position(position);
    }
    for archetype in &session.archetypes {
        state.selected_archetypes.insert(archetype.clone());
    }
    state.push_log("[INFO] Restored previous session parameters");
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
            Constraint::Length(1),
        ])
        .split(frame.size());

    let header = Paragraph::new(header_text(app)).block(Block::default().borders(Borders::BOTTOM));
    frame.render_widget(header, chunks[0]);

    match app.state.screen {
        Screen::Setup => render_setup(frame, chunks[1], app),
        Screen::Ranking => render_ranking(frame, chunks[1], app),
        Screen::Similarity => render_similarity(frame, chunks[1], app),
    }

    let footer = Paragraph::new(footer_text(app.state.screen))
        .style(Style::default().fg(Color::DarkGray));
    frame.render_widget(footer, chunks[2]);

    if app.state.help_overlay {
        render_help(frame);
    }
}

fn header_text(app: &App) -> String {
    format!(
        "PROScout Terminal — {} · {} players · {}",
        app.state.dataset_label,
        app.state.dataset.len(),
        app.state.position()
    )
}

fn footer_text(screen: Screen) -> &'static str {
    match screen {
        Screen::Setup => {
            "tab field · +/- adjust · p position · j/k move · space toggle · enter analyse · ? help · q quit"
        }
        Screen::Ranking => "j/k select · s similarity · e export · b back · ? help · q quit",
        Screen::Similarity => "b back · ? help · q quit",
    }
}

fn render_setup(frame: &mut Frame, area: Rect, app: &App) {
    let columns = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Percentage(45), Constraint::Percentage(55)])
        .split(area);

    let left = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Length(8), Constraint::Min(1)])
        .split(columns[0]);

    let filters = Paragraph::new(filter_text(app))
        .block(Block::default().title("Filters").borders(Borders::ALL));
    frame.render_widget(filters, left[0]);

    let archetypes = Paragraph::new(archetype_text(app))
        .block(Block::default().title("Archetypes").borders(Borders::ALL));
    frame.render_widget(archetypes, left[1]);

    let console = Paragraph::new(console_text(&app.state))
        .block(Block::default().title("Console").borders(Borders::ALL));
    frame.render_widget(console, columns[1]);
}

fn filter_text(app: &App) -> Text<'static> {
    let f = app.state.filter;
    let field = app.state.setup_field;
    let mark = |own: SetupField| if field == own { "> " } else { "  " };
    let mut lines = vec![
        Line::from(format!("{}Age min      {}", mark(SetupField::AgeMin), f.age_min)),
        Line::from(format!("{}Age max      {}", mark(SetupField::AgeMax), f.age_max)),
        Line::from(format!(
            "{}Minutes min  {}",
            mark(SetupField::MinutesMin),
            f.minutes_min
        )),
        Line::from(format!(
            "{}Minutes max  {}",
            mark(SetupField::MinutesMax),
            f.minutes_max
        )),
        Line::from(format!("  Position     {}", app.state.position())),
    ];
    if let Some(warning) = &app.state.report_warning {
        lines.push(Line::styled(
            warning.clone(),
            Style::default().fg(Color::Yellow),
        ));
    }
    Text::from(lines)
}

fn archetype_text(app: &App) -> Text<'static> {
    let names = app.state.archetype_names(app.catalog);
    if names.is_empty() {
        return Text::from("No archetypes for this position");
    }
    let mut lines = Vec::new();
    for (idx, name) in names.iter().enumerate() {
        let cursor = if idx == app.state.archetype_cursor { ">" } else { " " };
        let checked = if app.state.selected_archetypes.contains(name) {
            "[x]"
        } else {
            "[ ]"
        };
        let style = if app.state.selected_archetypes.contains(name) {
            Style::default().add_modifier(Modifier::BOLD)
        } else {
            Style::default()
        };
        lines.push(Line::styled(format!("{cursor} {checked} {name}"), style));
    }
    Text::from(lines)
}

fn console_text(state: &AppState) -> String {
    if state.logs.is_empty() {
        return "Console ready".to_string();
    }
    state
        .logs
        .iter()
        .rev()
        .take(30)
        .rev()
        .cloned()
        .collect::<Vec<_>>()
        .join("\n")
}

fn render_ranking(frame: &mut Frame, area: Rect, app: &App) {
    let Some(report) = &app.state.report else {
        let empty = Paragraph::new("Run an analysis from the setup screen first")
            .block(Block::default().title("Ranking").borders(Borders::ALL));
        frame.render_widget(empty, area);
        return;
    };

    let columns = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Percentage(55), Constraint::Percentage(45)])
        .split(area);

    let table = Paragraph::new(ranking_text(report, &app.state))
        .block(Block::default().title("Ranking").borders(Borders::ALL));
    frame.render_widget(table, columns[0]);

    render_radar(
        frame,
        columns[1],
        "Radar — top player",
        &report.radar,
        &[report
            .rows
            .first()
            .map(|r| r.key.label())
            .unwrap_or_default()],
    );
}

fn ranking_text(report: &ScoutReport, state: &AppState) -> Text<'static> {
    if report.rows.is_empty() {
        return Text::from("No player has any of the selected metrics");
    }
    let mut lines = vec![Line::styled(
        format!("{:<24} {:<14} {:>4} {:>6}", "Player", "Team", "Age", "Score"),
        Style::default().add_modifier(Modifier::BOLD),
    )];
    let (start, end) = visible_range(state.ranking_selected, report.rows.len(), 30);
    for (idx, row) in report.rows[start..end].iter().enumerate() {
        let absolute = start + idx;
        let prefix = if absolute == state.ranking_selected { ">" } else { " " };
        let age = row.age.map(|a| a.to_string()).unwrap_or_else(|| "-".into());
        let line = format!(
            "{prefix}{:<23} {:<14} {:>4} {:>6.1}",
            clip(&row.key.player, 23),
            clip(&row.key.team, 14),
            age,
            row.score
        );
        let style = if absolute == state.ranking_selected {
            Style::default().bg(Color::DarkGray)
        } else {
            Style::default()
        };
        lines.push(Line::styled(line, style));
    }
    Text::from(lines)
}

fn render_similarity(frame: &mut Frame, area: Rect, app: &App) {
    let Some(report) = &app.state.similarity else {
        let empty = Paragraph::new("Pick a player in the ranking and press s")
            .block(Block::default().title("Similarity").borders(Borders::ALL));
        frame.render_widget(empty, area);
        return;
    };

    let columns = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Percentage(50), Constraint::Percentage(50)])
        .split(area);

    let table = Paragraph::new(similarity_text(report))
        .block(Block::default().title("Nearest profiles").borders(Borders::ALL));
    frame.render_widget(table, columns[0]);

    let labels: Vec<String> = report
        .rows
        .first()
        .map(|nearest| vec!["reference".to_string(), nearest.key.label()])
        .unwrap_or_default();
    render_radar(
        frame,
        columns[1],
        "Radar — reference vs nearest",
        &report.radar,
        &labels,
    );
}

fn similarity_text(report: &SimilarityReport) -> Text<'static> {
    if report.rows.is_empty() {
        return Text::from("No comparable players");
    }
    let mut lines = vec![Line::styled(
        format!("{:<24} {:<14} {:>4} {:>6}", "Player", "Team", "Age", "Sim"),
        Style::default().add_modifier(Modifier::BOLD),
    )];
    for row in &report.rows {
        let age = row.age.map(|a| a.to_string()).unwrap_or_else(|| "-".into());
        lines.push(Line::from(format!(
            " {:<23} {:<14} {:>4} {:>6.1}",
            clip(&row.key.player, 23),
            clip(&row.key.team, 14),
            age,
            row.score
        )));
    }
    Text::from(lines)
}

/// Radar rendered as a horizontal percentile bar chart, one bar per KPI,
/// colored by group. Two-player payloads alternate bars per metric.
fn render_radar(frame: &mut Frame, area: Rect, title: &str, radar: &RadarPayload, labels: &[String]) {
    let block = Block::default().title(title.to_string()).borders(Borders::ALL);
    let inner = block.inner(area);
    frame.render_widget(block, area);
    if inner.height == 0 || inner.width == 0 {
        return;
    }
    if radar.is_empty() {
        let empty = Paragraph::new("No radar metrics available for this position");
        frame.render_widget(empty, inner);
        return;
    }

    let mut bars = Vec::new();
    for (idx, metric) in radar.metrics.iter().enumerate() {
        let color = hex_color(radar.colors[idx]);
        for (player_idx, values) in radar.values.iter().enumerate() {
            let value = values[idx].round() as u64;
            let label = if player_idx == 0 {
                clip(metric, 28)
            } else {
                format!("  vs {}", labels.get(1).map(String::as_str).unwrap_or(""))
            };
            let style = if player_idx == 0 {
                Style::default().fg(color)
            } else {
                Style::default().fg(color).add_modifier(Modifier::DIM)
            };
            bars.push(
                Bar::default()
                    .value(value)
                    .label(label.into())
                    .style(style),
            );
        }
    }

    let chart = BarChart::default()
        .data(BarGroup::default().bars(&bars))
        .direction(Direction::Horizontal)
        .bar_width(1)
        .bar_gap(0)
        .max(100);
    frame.render_widget(chart, inner);
}

fn render_help(frame: &mut Frame) {
    let area = centered_rect(60, 50, frame.size());
    frame.render_widget(Clear, area);
    let text = "\
1/2/3      switch screens
tab        next filter field
+/-        adjust focused bound
p / P      cycle position
j/k        move cursor
space      toggle archetype
enter/g    run analysis
s          similarity for selected player
e          export ranking to xlsx
?          toggle this help
q          quit";
    let help = Paragraph::new(text).block(Block::default().title("Keys").borders(Borders::ALL));
    frame.render_widget(help, area);
}

fn centered_rect(percent_x: u16, percent_y: u16, r: Rect) -> Rect {
    let vertical = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Percentage((100 - percent_y) / 2),
            Constraint::Percentage(percent_y),
            Constraint::Percentage((100 - percent_y) / 2),
        ])
        .split(r);
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

fn visible_range(selected: usize, total: usize, visible: usize) -> (usize, usize) {
    if total == 0 {
        return (0, 0);
    }
    if total <= visible {
        return (0, total);
    }
    let mut start = selected.saturating_sub(visible / 2);
    if start + visible > total {
        start = total - visible;
    }
    (start, start + visible)
}

fn clip(s: &str, max: usize) -> String {
    if s.chars().count() <= max {
        s.to_string()
    } else {
        let mut out: String = s.chars().take(max.saturating_sub(1)).collect();
        out.push('…');
        out
    }
}

fn hex_color(hex: &str) -> Color {
    let hex = hex.trim_start_matches('#');
    if hex.len() != 6 {
        return Color::Gray;
    }
    let parse = |range| u8::from_str_radix(&hex[range], 16).unwrap_or(0x99);
    Color::Rgb(parse(0..2), parse(2..4), parse(4..6))
}
