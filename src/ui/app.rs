//! The `--watch` status view: a thin, read-only dashboard over a
//! running [`Runner`], grounded in `aicheye-crustty`'s `App` (terminal
//! setup, a `run` loop that draws then polls for events, `q` to quit)
//! but reduced to a single pane — there is no heap or C-style stack
//! here, just the function table, recent `display` output, and the
//! reload log.

use crate::errors::ReloadOutcome;
use crate::runner::Runner;
use crate::ui::theme::DEFAULT_THEME;

use crossterm::{
    event::{self, Event, KeyCode, KeyEventKind},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{
    backend::{Backend, CrosstermBackend},
    layout::{Constraint, Direction, Layout},
    style::Style,
    text::{Line, Span},
    widgets::{Block, Borders, List, ListItem, Paragraph},
    Frame, Terminal,
};
use std::io;
use std::time::{Duration, Instant};

/// Sets up the alternate screen, runs the status view to completion (or
/// until `q`), then restores the terminal — matching `aicheye-crustty`'s
/// `main.rs` setup/run/teardown sequence, just moved behind one call so
/// `main.rs` doesn't need to know about `crossterm` directly.
pub fn run_status_view(runner: &mut Runner) -> io::Result<()> {
    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let mut app = App::new();
    let result = app.run(&mut terminal, runner);

    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    terminal.show_cursor()?;
    result
}

/// Local UI state. Everything it displays is read straight off `Runner`
/// each frame — this struct holds nothing that duplicates `Runner`'s
/// own state.
pub struct App {
    should_quit: bool,
    status_message: String,
    last_step_time: Instant,
}

impl App {
    pub fn new() -> Self {
        App {
            should_quit: false,
            status_message: String::from("running..."),
            last_step_time: Instant::now(),
        }
    }

    pub fn run<B: Backend>(&mut self, terminal: &mut Terminal<B>, runner: &mut Runner) -> io::Result<()> {
        loop {
            terminal.draw(|f| self.render(f, runner))?;

            if self.should_quit {
                break;
            }

            if self.last_step_time.elapsed() >= Duration::from_millis(10) {
                self.last_step_time = Instant::now();
                match runner.step_once() {
                    Ok(Some(value)) => {
                        self.status_message = format!("done: {}", value.display_form());
                    }
                    Ok(None) => {}
                    Err(e) => {
                        self.status_message = format!("error: {}", e);
                    }
                }
            }

            if event::poll(Duration::from_millis(20))? {
                if let Event::Key(key) = event::read()? {
                    if key.kind == KeyEventKind::Press {
                        if let KeyCode::Char('q') | KeyCode::Char('Q') = key.code {
                            self.should_quit = true;
                        }
                    }
                }
            }
        }
        Ok(())
    }

    fn render(&self, frame: &mut Frame, runner: &Runner) {
        let rows = Layout::default()
            .direction(Direction::Vertical)
            .constraints([Constraint::Percentage(40), Constraint::Percentage(35), Constraint::Percentage(25)])
            .split(frame.area());

        self.render_function_table(frame, rows[0], runner);
        self.render_display_log(frame, rows[1], runner);
        self.render_reload_log(frame, rows[2], runner);
    }

    fn render_function_table(&self, frame: &mut Frame, area: ratatui::layout::Rect, runner: &Runner) {
        let mut names = runner.function_table().names();
        names.sort();

        let items: Vec<ListItem> = names
            .iter()
            .map(|name| {
                let record = runner.function_table().lookup(name);
                let arity = record.map(|r| r.params.len()).unwrap_or(0);
                let snapshot = runner
                    .function_table()
                    .snapshot_time(name)
                    .map(|t| format!("{:.1}s ago", t.elapsed().as_secs_f64()))
                    .unwrap_or_else(|| "no snapshot".to_string());
                let line = Line::from(vec![
                    Span::styled(name.clone(), Style::default().fg(DEFAULT_THEME.function)),
                    Span::raw(format!("  ({} arg{})  ", arity, if arity == 1 { "" } else { "s" })),
                    Span::styled(snapshot, Style::default().fg(DEFAULT_THEME.comment)),
                ]);
                ListItem::new(line)
            })
            .collect();

        let title = format!(" functions — {} ", runner.source_path().display());
        let block = Block::default()
            .borders(Borders::ALL)
            .border_style(Style::default().fg(DEFAULT_THEME.border_normal))
            .title(title);
        frame.render_widget(List::new(items).block(block), area);
    }

    fn render_display_log(&self, frame: &mut Frame, area: ratatui::layout::Rect, runner: &Runner) {
        let lines = runner.display_lines();
        let visible_rows = area.height.saturating_sub(2) as usize;
        let start = lines.len().saturating_sub(visible_rows);
        let text: Vec<Line> = lines[start..]
            .iter()
            .map(|line| Line::from(Span::styled(line.clone(), Style::default().fg(DEFAULT_THEME.fg))))
            .collect();

        let block = Block::default()
            .borders(Borders::ALL)
            .border_style(Style::default().fg(DEFAULT_THEME.border_normal))
            .title(" display output ");
        frame.render_widget(Paragraph::new(text).block(block), area);
    }

    fn render_reload_log(&self, frame: &mut Frame, area: ratatui::layout::Rect, runner: &Runner) {
        let log = runner.reload_log();
        let visible_rows = area.height.saturating_sub(2) as usize;
        let start = log.len().saturating_sub(visible_rows);

        let items: Vec<ListItem> = log[start..]
            .iter()
            .map(|(at, outcome)| {
                let (text, color) = match outcome {
                    ReloadOutcome::NoOp => ("no-op".to_string(), DEFAULT_THEME.comment),
                    ReloadOutcome::HotSwap { name } => (format!("hot-swap {}", name), DEFAULT_THEME.success),
                    ReloadOutcome::FullReset => ("full reset".to_string(), DEFAULT_THEME.secondary),
                    ReloadOutcome::BadReload { reason } => (format!("bad reload: {}", reason), DEFAULT_THEME.error),
                };
                let age = format!("{:>5.1}s  ", at.elapsed().as_secs_f64());
                ListItem::new(Line::from(vec![
                    Span::styled(age, Style::default().fg(DEFAULT_THEME.comment)),
                    Span::styled(text, Style::default().fg(color)),
                ]))
            })
            .collect();

        let status = format!(" reload log — {} — press q to quit ", self.status_message);
        let block = Block::default()
            .borders(Borders::ALL)
            .border_style(Style::default().fg(DEFAULT_THEME.border_focused))
            .title(status);
        frame.render_widget(List::new(items).block(block), area);
    }
}

impl Default for App {
    fn default() -> Self {
        Self::new()
    }
}
