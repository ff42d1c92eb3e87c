use std::io;
use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use crossterm::event::{self, Event, KeyCode, KeyEvent, KeyEventKind};
use crossterm::execute;
use crossterm::terminal::{
    EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode,
};
use ratatui::layout::{Constraint, Direction, Layout};
use ratatui::prelude::*;
use ratatui::style::{Color, Modifier, Style};
use ratatui::widgets::{
    Bar, BarChart, BarGroup, Block, Borders, Cell, Clear, Paragraph, Row, Table,
};
use tracing::info;

use ipl_selector::compare::{Comparison, PlayerCard, Verdict};
use ipl_selector::config::AppConfig;
use ipl_selector::dataset::DatasetStore;
use ipl_selector::selector::Selector;
use ipl_selector::state::{AppState, Field, Screen, field_label, screen_label};
use ipl_selector::telemetry;

struct App {
    state: AppState,
    should_quit: bool,
}

impl App {
    fn new(state: AppState) -> Self {
        Self {
            state,
            should_quit: false,
        }
    }

    fn on_key(&mut self, key: KeyEvent) {
        if self.state.help_overlay {
            if matches!(key.code, KeyCode::Char('?') | KeyCode::Esc | KeyCode::Char('q')) {
                self.state.help_overlay = false;
            }
            return;
        }
        match key.code {
            KeyCode::Char('q') => self.should_quit = true,
            KeyCode::Char('1') => self.state.set_screen(Screen::Suggest),
            KeyCode::Char('2') => self.state.set_screen(Screen::Compare),
            KeyCode::Tab | KeyCode::Down | KeyCode::Char('j') => self.state.focus_next(),
            KeyCode::BackTab | KeyCode::Up | KeyCode::Char('k') => self.state.focus_prev(),
            KeyCode::Left | KeyCode::Char('h') => self.state.adjust(-1),
            KeyCode::Right | KeyCode::Char('l') => self.state.adjust(1),
            KeyCode::PageDown | KeyCode::Char('J') => self.state.scroll_suggestions(5),
            KeyCode::PageUp | KeyCode::Char('K') => self.state.scroll_suggestions(-5),
            KeyCode::Enter | KeyCode::Char('s') => {
                if self.state.screen == Screen::Suggest {
                    self.state.run_suggest();
                }
            }
            KeyCode::Char('?') => self.state.help_overlay = true,
            _ => {}
        }
    }
}

fn main() -> Result<()> {
    let args: Vec<String> = std::env::args().skip(1).collect();
    let config = AppConfig::from_env().with_args(&args);
    if let Some(path) = &config.log_file {
        // The dashboard still runs without a log file.
        if let Err(err) = telemetry::init_file(path) {
            eprintln!("warning: {err:#}");
        }
    }

    let store = DatasetStore::open(config.dataset_paths());
    let selector = Selector::from_store(&store, config.team_policy)
        .with_context(|| format!("load datasets from {}", config.data_dir.display()))?;
    let cached = selector.prewarm();
    info!(
        seasons = selector.seasons().len(),
        cached,
        policy = selector.policy().label(),
        "selector ready"
    );
    let state = AppState::new(Arc::new(selector), config.top_n);
    let mut app = App::new(state);

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
    loop {
        terminal.draw(|f| ui(f, app))?;

        if event::poll(tick_rate)?
            && let Event::Key(key) = event::read()?
            && key.kind == KeyEventKind::Press
        {
            app.on_key(key);
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

    let header = Paragraph::new(header_text(&app.state))
        .block(Block::default().borders(Borders::BOTTOM));
    frame.render_widget(header, chunks[0]);

    match app.state.screen {
        Screen::Suggest => render_suggest(frame, chunks[1], &app.state),
        Screen::Compare => render_compare(frame, chunks[1], &app.state),
    }

    let console = Paragraph::new(console_text(&app.state))
        .block(Block::default().title("Console").borders(Borders::ALL));
    frame.render_widget(console, chunks[2]);

    let footer = Paragraph::new(footer_text(&app.state)).style(Style::default().fg(Color::DarkGray));
    frame.render_widget(footer, chunks[3]);

    if app.state.help_overlay {
        render_help_overlay(frame, frame.size());
    }
}

fn header_text(state: &AppState) -> String {
    format!(
        " IPL TEAM SELECTOR | {} | Season {}",
        screen_label(state.screen),
        state.selected_season().unwrap_or("-")
    )
}

fn footer_text(state: &AppState) -> String {
    match state.screen {
        Screen::Suggest => {
            "1 Suggest | 2 Compare | Tab/↑/↓ Field | ←/→ Change | Enter/s Suggest | PgUp/PgDn Scroll | ? Help | q Quit".to_string()
        }
        Screen::Compare => {
            "1 Suggest | 2 Compare | Tab/↑/↓ Field | ←/→ Change | ? Help | q Quit".to_string()
        }
    }
}

fn field_value(state: &AppState, field: Field) -> String {
    let value = match field {
        Field::Season => state.selected_season().map(str::to_string),
        Field::TeamA => state.team_a_name().map(str::to_string),
        Field::TeamB => state.team_b_name().map(str::to_string),
        Field::TopN => Some(state.top_n.to_string()),
        Field::Team1 => state.team1_name().map(str::to_string),
        Field::Player1 => state.player1_name().map(str::to_string),
        Field::Team2 => state.team2_name().map(str::to_string),
        Field::Player2 => state.player2_name().map(str::to_string),
    };
    value.unwrap_or_else(|| "-".to_string())
}

fn picker_lines(state: &AppState, fields: &[Field]) -> Vec<Line<'static>> {
    let mut lines = Vec::new();
    for field in fields {
        let focused = *field == state.focus;
        let label_style = if focused {
            Style::default().fg(Color::Yellow).add_modifier(Modifier::BOLD)
        } else {
            Style::default().add_modifier(Modifier::BOLD)
        };
        let marker = if focused { "> " } else { "  " };
        lines.push(Line::styled(
            format!("{marker}{}", field_label(*field)),
            label_style,
        ));
        lines.push(Line::raw(format!("   ◂ {} ▸", field_value(state, *field))));
    }
    lines
}

fn render_suggest(frame: &mut Frame, area: Rect, state: &AppState) {
    let columns = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Length(34), Constraint::Min(30)])
        .split(area);

    let sidebar = Paragraph::new(picker_lines(state, state.fields()))
        .block(Block::default().title("Match Details").borders(Borders::ALL));
    frame.render_widget(sidebar, columns[0]);

    let Some(set) = &state.suggestions else {
        let text = state
            .notice
            .clone()
            .unwrap_or_else(|| "Press Enter to suggest players".to_string());
        let empty = Paragraph::new(text)
            .style(Style::default().fg(Color::DarkGray))
            .block(Block::default().title("Suggested Players").borders(Borders::ALL));
        frame.render_widget(empty, columns[1]);
        return;
    };

    let header = Row::new(vec!["#", "Player", "Team", "Final score"])
        .style(Style::default().add_modifier(Modifier::BOLD));
    let rows: Vec<Row> = set
        .rows
        .iter()
        .enumerate()
        .skip(state.suggestion_scroll)
        .map(|(idx, s)| {
            let team_style = if s.team == set.team_a {
                Style::default().fg(Color::Green)
            } else {
                Style::default().fg(Color::Cyan)
            };
            Row::new(vec![
                Cell::from((idx + 1).to_string()),
                Cell::from(s.player.clone()),
                Cell::from(s.team.clone()).style(team_style),
                Cell::from(format!("{:.3}", s.final_score)),
            ])
        })
        .collect();
    let widths = [
        Constraint::Length(4),
        Constraint::Min(20),
        Constraint::Min(20),
        Constraint::Length(12),
    ];
    let title = format!("{} | eligible {}", set.title(), set.eligible);
    let table = Table::new(rows, widths)
        .header(header)
        .block(Block::default().title(title).borders(Borders::ALL));
    frame.render_widget(table, columns[1]);
}

fn render_compare(frame: &mut Frame, area: Rect, state: &AppState) {
    let rows = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Length(6), Constraint::Length(9), Constraint::Min(6)])
        .split(area);

    let pickers = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Percentage(20),
            Constraint::Percentage(40),
            Constraint::Percentage(40),
        ])
        .split(rows[0]);
    let season = Paragraph::new(picker_lines(state, &[Field::Season]))
        .block(Block::default().title("Season").borders(Borders::ALL));
    frame.render_widget(season, pickers[0]);
    let left = Paragraph::new(picker_lines(state, &[Field::Team1, Field::Player1]))
        .block(Block::default().title("Player 1").borders(Borders::ALL));
    frame.render_widget(left, pickers[1]);
    let right = Paragraph::new(picker_lines(state, &[Field::Team2, Field::Player2]))
        .block(Block::default().title("Player 2").borders(Borders::ALL));
    frame.render_widget(right, pickers[2]);

    let Some(cmp) = &state.comparison else {
        let text = state
            .notice
            .clone()
            .unwrap_or_else(|| "Pick two players to compare".to_string());
        let empty = Paragraph::new(text)
            .style(Style::default().fg(Color::DarkGray))
            .block(Block::default().title("Comparison").borders(Borders::ALL));
        frame.render_widget(empty, rows[1].union(rows[2]));
        return;
    };

    let cards = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Percentage(30),
            Constraint::Percentage(40),
            Constraint::Percentage(30),
        ])
        .split(rows[1]);
    render_card(frame, cards[0], &cmp.left, Color::Green);
    let verdicts = Paragraph::new(verdict_lines(cmp))
        .block(Block::default().title("Insights").borders(Borders::ALL));
    frame.render_widget(verdicts, cards[1]);
    render_card(frame, cards[2], &cmp.right, Color::Cyan);

    render_comparison_chart(frame, rows[2], cmp);
}

fn render_card(frame: &mut Frame, area: Rect, card: &PlayerCard, color: Color) {
    let text = [
        format!("Team: {}", card.team),
        format!("Runs: {}", card.runs),
        format!("Wickets: {}", card.wickets),
        format!("Performance: {:.3}", card.display_score()),
    ]
    .join("\n");
    let paragraph = Paragraph::new(text).block(
        Block::default()
            .title(card.player.clone())
            .title_style(Style::default().fg(color).add_modifier(Modifier::BOLD))
            .borders(Borders::ALL),
    );
    frame.render_widget(paragraph, area);
}

fn verdict_lines(cmp: &Comparison) -> Vec<Line<'static>> {
    let mut lines: Vec<Line<'static>> = cmp
        .verdicts()
        .iter()
        .map(|(category, verdict)| {
            Line::styled(
                cmp.verdict_text(*category),
                Style::default().fg(verdict_color(*verdict)),
            )
        })
        .collect();
    lines.push(Line::raw(""));
    lines.extend(cmp.insights().into_iter().map(Line::raw));
    lines
}

fn verdict_color(verdict: Verdict) -> Color {
    match verdict {
        Verdict::Left => Color::Green,
        Verdict::Right => Color::Cyan,
        Verdict::Tied => Color::Yellow,
    }
}

fn render_comparison_chart(frame: &mut Frame, area: Rect, cmp: &Comparison) {
    let block = Block::default().title("Head to Head").borders(Borders::ALL);
    let inner = block.inner(area);
    frame.render_widget(block, area);
    if inner.height < 3 || inner.width == 0 {
        return;
    }

    let series = cmp.chart_series();
    let slots = Layout::default()
        .direction(Direction::Vertical)
        .constraints(series.iter().map(|_| Constraint::Ratio(1, series.len() as u32)))
        .split(inner);
    for ((label, left, right), slot) in series.iter().zip(slots.iter()) {
        let chart = stat_bar_chart(label, cmp, *left, *right);
        frame.render_widget(chart, *slot);
    }
}

fn stat_bar_chart(label: &str, cmp: &Comparison, left: f64, right: f64) -> BarChart<'static> {
    // Bars are integers; scores keep three decimals of resolution.
    let scale = if label == "Performance" { 1000.0 } else { 1.0 };
    let bar = |name: &str, value: f64, color: Color, winner: bool| {
        let mut style = Style::default().fg(color);
        if winner {
            style = style.add_modifier(Modifier::BOLD);
        }
        let text = if scale > 1.0 {
            format!("{value:.3}")
        } else {
            format!("{value:.0}")
        };
        Bar::default()
            .label(Line::from(name.to_string()))
            .value((value.max(0.0) * scale).round() as u64)
            .text_value(text)
            .style(style)
    };
    let left_bar = bar(cmp.left.player.as_str(), left, Color::Green, left > right);
    let right_bar = bar(cmp.right.player.as_str(), right, Color::Cyan, right > left);

    BarChart::default()
        .data(
            BarGroup::default()
                .label(Line::from(label.to_string()))
                .bars(&[left_bar, right_bar]),
        )
        .direction(Direction::Horizontal)
        .bar_width(1)
        .bar_gap(0)
        .group_gap(0)
}

fn console_text(state: &AppState) -> String {
    if state.logs.is_empty() {
        return "No messages yet".to_string();
    }
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

fn render_help_overlay(frame: &mut Frame, area: Rect) {
    let popup_area = centered_rect(60, 60, area);
    frame.render_widget(Clear, popup_area);

    let text = [
        "IPL Team Selector - Help",
        "",
        "Global:",
        "  1            Suggest players",
        "  2            Compare players",
        "  Tab / ↑ / ↓  Move between fields",
        "  ← / →        Change the focused field",
        "  ?            Toggle help",
        "  q            Quit",
        "",
        "Suggest:",
        "  Enter / s    Rank players of Team A and Team B",
        "  PgUp / PgDn  Scroll results",
        "",
        "Scores are precomputed; no venue adjustment is applied.",
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
