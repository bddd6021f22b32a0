use anyhow::Result;
use crossterm::{
    event::{self, DisableMouseCapture, EnableMouseCapture, Event, KeyCode},
    execute,
    terminal::{EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode},
};
use dotguide_engine::{Analysis, Analyzer, GuideFile, Severity, io};
use ratatui::{
    Frame, Terminal,
    backend::CrosstermBackend,
    layout::{Constraint, Direction, Layout},
    style::{Color, Style},
    text::{Line, Span},
    widgets::{Block, Borders, List, ListItem, ListState, Paragraph},
};
use std::{
    io::{Stdout, stdout},
    path::PathBuf,
};

struct App<'a> {
    guides_path: PathBuf,
    analyzer: Analyzer<'a>,
    guides: Vec<GuideFile>,
    file_list_state: ListState,
    current_content: Vec<Line<'static>>,
}

impl<'a> App<'a> {
    fn new(guides_path: PathBuf, analyzer: Analyzer<'a>) -> Result<Self> {
        let guides = io::list_guides(&guides_path)?;

        let mut app = Self {
            guides_path,
            analyzer,
            guides,
            file_list_state: ListState::default(),
            current_content: Vec::new(),
        };

        // Select first guide if available
        if !app.guides.is_empty() {
            app.file_list_state.select(Some(0));
            app.update_content_for_selection();
        }

        Ok(app)
    }

    fn next_file(&mut self) {
        if self.guides.is_empty() {
            return;
        }
        let i = match self.file_list_state.selected() {
            Some(i) => (i + 1) % self.guides.len(),
            None => 0,
        };
        self.file_list_state.select(Some(i));
        self.update_content_for_selection();
    }

    fn previous_file(&mut self) {
        if self.guides.is_empty() {
            return;
        }
        let i = match self.file_list_state.selected() {
            Some(0) | None => self.guides.len() - 1,
            Some(i) => i - 1,
        };
        self.file_list_state.select(Some(i));
        self.update_content_for_selection();
    }

    fn update_content_for_selection(&mut self) {
        let Some(guide) = self
            .file_list_state
            .selected()
            .and_then(|index| self.guides.get(index))
        else {
            return;
        };

        self.current_content = match io::read_guide(guide.relative_path(), &self.guides_path) {
            Ok(text) => render_analysis(&self.analyzer.run(&text)),
            Err(e) => vec![Line::from(format!("Error reading file: {e}"))],
        };
    }
}

/// Messages first, then what is wrong with them.
fn render_analysis(analysis: &Analysis) -> Vec<Line<'static>> {
    let mut lines = vec![Line::from(format!(
        "Messages ({})",
        analysis.messages.len()
    ))];

    for (index, message) in analysis.messages.iter().enumerate() {
        let [first, last] = message.lines();
        let preview = message
            .text
            .trim_start_matches('\u{200b}')
            .lines()
            .next()
            .unwrap_or_default()
            .to_string();
        let mut spans = vec![Span::raw(format!("#{} [{first}-{last}] ", index + 1))];
        if let Some(tag) = &message.tag {
            spans.push(Span::styled(format!("({tag}) "), Style::default().fg(Color::Cyan)));
        }
        spans.push(Span::raw(preview));
        lines.push(Line::from(spans));
    }

    lines.push(Line::default());
    if analysis.diagnostics.is_empty() && analysis.json_markers.is_empty() {
        lines.push(Line::from("No problems found"));
        return lines;
    }

    lines.push(Line::from(format!(
        "Diagnostics ({} errors, {} warnings)",
        analysis.count(Severity::Error),
        analysis.count(Severity::Warning)
    )));
    for diagnostic in &analysis.diagnostics {
        let color = match diagnostic.severity {
            Severity::Error => Color::Red,
            Severity::Warning => Color::Yellow,
        };
        lines.push(Line::styled(
            diagnostic.to_string(),
            Style::default().fg(color),
        ));
    }
    for marker in &analysis.json_markers {
        lines.push(Line::styled(
            format!("{}:{}: note: {}", marker.line, marker.column, marker.message),
            Style::default().fg(Color::Blue),
        ));
    }

    lines
}

pub fn run(guides_path: PathBuf, analyzer: Analyzer<'_>) -> Result<()> {
    let mut app = App::new(guides_path, analyzer)?;

    // Setup terminal
    enable_raw_mode()?;
    let mut stdout = stdout();
    execute!(stdout, EnterAlternateScreen, EnableMouseCapture)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let res = run_app(&mut terminal, &mut app);

    // Restore terminal
    disable_raw_mode()?;
    execute!(
        terminal.backend_mut(),
        LeaveAlternateScreen,
        DisableMouseCapture
    )?;
    terminal.show_cursor()?;

    res
}

fn run_app(terminal: &mut Terminal<CrosstermBackend<Stdout>>, app: &mut App<'_>) -> Result<()> {
    loop {
        terminal.draw(|f| ui(f, app))?;

        if let Event::Key(key) = event::read()? {
            match key.code {
                KeyCode::Char('q') => return Ok(()),
                KeyCode::Down | KeyCode::Char('j') => app.next_file(),
                KeyCode::Up | KeyCode::Char('k') => app.previous_file(),
                _ => {}
            }
        }
    }
}

fn ui(f: &mut Frame, app: &mut App<'_>) {
    let rows = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Min(0), Constraint::Length(1)])
        .split(f.area());

    let chunks = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Percentage(30), Constraint::Percentage(70)])
        .split(rows[0]);

    // Guide list panel
    let file_items: Vec<ListItem> = app
        .guides
        .iter()
        .map(|guide| ListItem::new(Line::from(guide.relative_path().as_str().to_string())))
        .collect();

    let files_list = List::new(file_items)
        .block(Block::default().borders(Borders::ALL).title("Guides"))
        .highlight_style(Style::default().bg(Color::Yellow).fg(Color::Black));

    f.render_stateful_widget(files_list, chunks[0], &mut app.file_list_state);

    // Analysis panel
    let content_text = if app.current_content.is_empty() {
        vec![Line::from("No guide files found")]
    } else {
        app.current_content.clone()
    };

    let title = app
        .file_list_state
        .selected()
        .and_then(|index| app.guides.get(index))
        .map_or("Analysis", |guide| guide.display_name());

    let content = Paragraph::new(content_text)
        .block(Block::default().borders(Borders::ALL).title(title))
        .wrap(ratatui::widgets::Wrap { trim: false });

    f.render_widget(content, chunks[1]);

    let help = Paragraph::new(Line::from("q: Quit | ↑/k: Previous | ↓/j: Next"));
    f.render_widget(help, rows[1]);
}
